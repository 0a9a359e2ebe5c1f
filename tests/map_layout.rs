//! End-to-end layout of YAML maps through the public API

use lucid_map::layout::{edge_point, validate, BoundingBox, Point, Size};
use lucid_map::parser::{load_map, Direction, CONNECTOR_CLASS};
use lucid_map::{
    arrange_document, build_scene, format_positions, Catalog, HeadlessScene, LayoutError,
    MapError, Macros, RenderConfig, Scene,
};

const CATALOG: &str = r#"
[classes.Valve]
width = 40
height = 40

[classes.Pump]
width = 60
height = 30

[classes.Tank]
width = 100
height = 80

[classes.Drain]
width = 20
height = 20
"#;

const STATION: &str = r#"
groups:
  station:
    components:
      inlet: {class: Valve}
      pump: {class: Pump}
    layout:
      - horizontal: [inlet, pump]
    anchors: {w: inlet, e: pump}
components:
  tank: {class: Tank}
  main: {group: station}
  drain: {class: Drain}
layout:
  - horizontal: [tank, main, drain]
"#;

fn config() -> RenderConfig {
    RenderConfig::new().with_catalog(Catalog::from_str(CATALOG).unwrap())
}

fn bounds(scene: &HeadlessScene, name: &str) -> BoundingBox {
    scene.bounding_box(scene.find(name).unwrap())
}

#[test]
fn three_components_east_then_south() {
    let source = r#"
components:
  A: {class: Tank}
  B: {class: Valve}
  C: {class: Pump}
layout:
  - horizontal: [A, B]
  - vertical: [B, C]
"#;
    let (scene, arranged) = build_scene(source, &config()).unwrap();
    let (a, b, c) = (bounds(&scene, "A"), bounds(&scene, "B"), bounds(&scene, "C"));

    assert_eq!(b.x, a.right() + 30.0);
    assert_eq!(b.center().y, a.center().y);
    assert_eq!(c.y, b.bottom() + 30.0);
    assert_eq!(c.center().x, b.center().x);
    assert!(arranged.is_valid());
    assert!(validate(&scene, &arranged.shapes));
}

#[test]
fn connector_placeholder_is_synthesized() {
    let source = r#"
components:
  a: {class: Valve}
  b: {class: Pump}
layout:
  - horizontal: [a, "conn*"]
  - horizontal: ["conn*", b]
"#;
    let document = load_map(source).unwrap();
    let connectors: Vec<_> = document
        .components
        .values()
        .filter(|c| c.is_connector())
        .map(|c| c.name.as_str())
        .collect();
    assert_eq!(connectors, vec!["conn*"]);

    let (scene, arranged) = build_scene(source, &config()).unwrap();
    let conn = scene.item(scene.find("conn*").unwrap()).unwrap();
    assert_eq!(conn.widget.class, CONNECTOR_CLASS);
    assert_eq!(conn.widget.name, "conn_");
    assert_eq!(conn.widget.size, Size::new(1.0, 1.0));

    let (a, c, b) = (bounds(&scene, "a"), bounds(&scene, "conn*"), bounds(&scene, "b"));
    assert!(a.right() < c.x);
    assert!(c.right() < b.x);
    assert_eq!(arranged.connections.len(), 2);
    assert!(arranged.is_valid());
}

#[test]
fn group_attaches_through_its_anchors() {
    let (scene, arranged) = build_scene(STATION, &config()).unwrap();
    let tank = bounds(&scene, "tank");
    let inlet = bounds(&scene, "main.inlet");
    let pump = bounds(&scene, "main.pump");
    let drain = bounds(&scene, "drain");

    assert_eq!(inlet.x, tank.right() + 30.0);
    assert_eq!(inlet.center().y, tank.center().y);
    assert_eq!(pump.x, inlet.right() + 30.0);
    assert_eq!(drain.x, pump.right() + 30.0);
    assert_eq!(drain.center().y, pump.center().y);

    let tank_to_main = arranged
        .connections
        .iter()
        .find(|c| c.from == "tank")
        .unwrap();
    assert_eq!(tank_to_main.to, "main");
    assert_eq!(tank_to_main.direction, Direction::East);
    assert_eq!(tank_to_main.line.start, edge_point(&tank, Direction::East));
    assert_eq!(tank_to_main.line.end, edge_point(&inlet, Direction::West));

    // two top-level edges plus the one inside the group
    assert_eq!(arranged.connections.len(), 3);
    assert_eq!(scene.lines().len(), 3);
    assert!(arranged.is_valid());
}

#[test]
fn station_positions_snapshot() {
    let (scene, _) = build_scene(STATION, &config()).unwrap();
    insta::assert_snapshot!(format_positions(&scene), @r###"
    tank Tank -290 -30 100 80
    main.inlet Valve -160 -10 40 40
    main.pump Pump -90 -5 60 30
    drain Drain 0 0 20 20
    "###);
}

#[test]
fn nested_group_anchor_resolves_inward() {
    let source = r#"
groups:
  cell:
    components:
      left: {class: Valve}
      right: {class: Valve}
    layout:
      - horizontal: [left, right]
    anchors: {w: left, e: right, s: left}
  row:
    components:
      first: {group: cell}
      gauge: {class: Drain}
    layout:
      - vertical: [first, gauge]
    anchors: {w: first}
components:
  tank: {class: Tank}
  line: {group: row}
layout:
  - horizontal: [tank, line]
"#;
    let (scene, arranged) = build_scene(source, &config()).unwrap();
    let tank = bounds(&scene, "tank");
    let left = bounds(&scene, "line.first.left");

    assert_eq!(left.x, tank.right() + 30.0);
    assert_eq!(left.center().y, tank.center().y);
    assert!(arranged.is_valid());
}

#[test]
fn group_without_facing_anchor_fails() {
    let source = r#"
groups:
  bare:
    components: {x: {class: Valve}}
components:
  tank: {class: Tank}
  g: {group: bare}
layout:
  - horizontal: [tank, g]
"#;
    let err = build_scene(source, &config()).unwrap_err();
    assert!(matches!(
        err,
        MapError::Layout(LayoutError::MissingAnchor { ref group, direction: Direction::West })
            if group == "g"
    ));
}

#[test]
fn macros_flow_into_properties() {
    let source = r#"
groups:
  station:
    macros: {prefix: "XCS"}
    components:
      pump:
        class: "${kind}"
        label: "${prefix}:${unit}"
components:
  main: {group: station, macros: {unit: "P1"}}
"#;
    let document = load_map(source).unwrap();
    let macros: Macros = [("kind".to_string(), "Pump".to_string())]
        .into_iter()
        .collect();
    let mut catalog = Catalog::from_str(CATALOG).unwrap();
    let mut scene = HeadlessScene::new();
    let arranged = arrange_document(
        &document,
        &mut catalog,
        &mut scene,
        &macros,
        &Default::default(),
    )
    .unwrap();

    let pump = scene.item(arranged.shapes["main.pump"]).unwrap();
    assert_eq!(pump.widget.class, "Pump");
    assert_eq!(pump.widget.label.as_deref(), Some("XCS:P1"));
    assert_eq!(scene.position(arranged.shapes["main.pump"]), Point::new(0.0, 0.0));
}

#[test]
fn instantiation_failure_names_the_component() {
    let source = r#"
groups:
  station:
    components:
      pump: {class: Pump, height: tall}
components:
  main: {group: station}
"#;
    let err = build_scene(source, &config()).unwrap_err();
    assert_eq!(
        err.to_string(),
        "instantiation failed for main.pump: invalid value 'tall' for height: expected a number"
    );
}

#[test]
fn loop_is_rejected_before_layout() {
    let source = r#"
components:
  n0: {class: Valve}
  n1: {class: Valve}
  n2: {class: Valve}
  n3: {class: Valve}
  n4: {class: Valve}
layout:
  - directional:
      n0: {n: n1}
      n1: {e: n2}
      n2: {n: n3}
      n3: {w: n4}
      n4: {s: n1}
"#;
    let err = build_scene(source, &config()).unwrap_err();
    assert!(matches!(err, MapError::Load(_)));
    assert!(err.to_string().contains("'n1' is placed relative to more than one item"));
}

#[test]
fn two_items_north_of_one_hub_conflict() {
    let source = r#"
components:
  hub: {class: Tank}
  x: {class: Valve}
  y: {class: Valve}
layout:
  - directional: {hub: {n: x}}
  - directional: {hub: {n: y}}
"#;
    let err = build_scene(source, &config()).unwrap_err();
    assert_eq!(
        err.to_string(),
        "load error: hub/n already connected to x; attempting to connect to y"
    );
}
