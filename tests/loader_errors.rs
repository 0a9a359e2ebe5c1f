//! Structural errors reported while loading map documents

use lucid_map::parser::{load_map, load_map_file, ComponentKind, Direction};
use lucid_map::LoadError;
use pretty_assertions::assert_eq;

fn load_err(source: &str) -> LoadError {
    load_map(source).expect_err("document should be rejected")
}

#[test]
fn empty_document_is_empty_map() {
    let document = load_map("").unwrap();
    assert!(document.components.is_empty());
    assert!(document.groups.is_empty());
    assert!(document.layout.is_empty());
}

#[test]
fn component_needs_class_or_group() {
    let err = load_err("components: {pump: {label: P1}}");
    assert_eq!(
        err.to_string(),
        "expected group or class in component 'pump'; found only: {label}"
    );

    let err = load_err("components: {pump: {class: Pump, group: g}}");
    assert!(matches!(err, LoadError::ClassOrGroup { .. }));
}

#[test]
fn component_name_may_not_shadow_group() {
    let err = load_err(
        r#"
groups:
  station: {components: {p: {class: Pump}}}
components:
  station: {class: Pump}
"#,
    );
    assert_eq!(
        err.to_string(),
        "component name 'station' clashes with existing group"
    );
}

#[test]
fn group_rejects_unknown_keys() {
    let err = load_err("groups: {g: {components: {}, colour: red}}");
    assert_eq!(err.to_string(), "found unexpected keys in group 'g': {colour}");

    let err = load_err("widgets: {}");
    assert!(matches!(err, LoadError::UnexpectedKeys { ref keys, .. } if keys == &["widgets"]));
}

#[test]
fn anchors_must_name_members_and_directions() {
    let err = load_err("groups: {g: {components: {a: {class: A}}, anchors: {w: b}}}");
    assert_eq!(err.to_string(), "unexpected anchor name in group 'g': b");

    let err = load_err("groups: {g: {components: {a: {class: A}}, anchors: {left: a}}}");
    assert!(matches!(
        err,
        LoadError::InvalidAnchorDirection { ref direction, .. } if direction == "left"
    ));
}

#[test]
fn undeclared_layout_item_suggests_names() {
    let err = load_err(
        r#"
components:
  valve: {class: Valve}
  pump: {class: Pump}
layout:
  - horizontal: [valv, pump]
"#,
    );
    assert_eq!(
        err.to_string(),
        "unexpected item name: valv (did you mean: valve?)"
    );
}

#[test]
fn inverse_direction_counts_as_taken() {
    let err = load_err(
        r#"
components:
  a: {class: A}
  b: {class: B}
layout:
  - horizontal: [a, b]
  - directional: {b: {w: a}}
"#,
    );
    assert!(matches!(
        err,
        LoadError::AlreadyConnected { ref item, direction: Direction::West, .. } if item == "b"
    ));
}

#[test]
fn unknown_directive_and_direction() {
    let err = load_err("components: {a: {class: A}}\nlayout: [{sideways: [a]}]");
    assert!(matches!(err, LoadError::InvalidDirective { .. }));

    let err = load_err(
        "components: {a: {class: A}, b: {class: B}}\nlayout: [{directional: {a: {up: b}}}]",
    );
    assert_eq!(err.to_string(), "invalid direction connecting 'a': up");
}

#[test]
fn group_layout_only_sees_its_members() {
    let err = load_err(
        r#"
groups:
  g:
    components: {a: {class: A}}
    layout:
      - horizontal: [a, outside]
components:
  outside: {class: B}
"#,
    );
    assert!(matches!(err, LoadError::UnexpectedItem { ref name, .. } if name == "outside"));
}

#[test]
fn declared_connector_is_kept() {
    let document = load_map(
        r#"
components:
  a: {class: A}
  "pipe*": {class: Pipe, width: "5"}
layout:
  - horizontal: [a, "pipe*"]
"#,
    )
    .unwrap();
    let pipe = &document.components["pipe*"];
    assert_eq!(pipe.kind, ComponentKind::Class("Pipe".to_string()));
    assert_eq!(pipe.properties["width"], "5");
}

#[test]
fn missing_file_reports_path() {
    let err = load_map_file(std::path::Path::new("/nonexistent/map.yaml")).unwrap_err();
    assert!(err.to_string().contains("/nonexistent/map.yaml"));
}

#[test]
fn yaml_syntax_error_is_rendered_with_source() {
    let source = "components:\n  a: {class: A\n";
    let err = load_err(source);
    assert!(matches!(err, LoadError::Yaml(_)));
    let report = err.format(source, "station.yaml");
    assert!(report.contains("station.yaml"));
}
