//! Declaration loader: YAML document -> [`Document`]

use std::path::Path;

use indexmap::{IndexMap, IndexSet};
use log::debug;
use serde_yaml::{Mapping, Value};

use super::ast::{ComponentDecl, ComponentKind, Direction, Document, GroupDecl, Macros};
use super::grammar::parse_layout_value;
use super::value::{describe, key, mapping, optional_mapping, scalar};
use crate::error::LoadError;

const DOCUMENT_KEYS: [&str; 3] = ["groups", "components", "layout"];
const GROUP_KEYS: [&str; 4] = ["components", "layout", "macros", "anchors"];

/// Load a map from YAML source text
pub fn load_map(source: &str) -> Result<Document, LoadError> {
    let value: Value = serde_yaml::from_str(source)?;
    load_document(&value)
}

/// Load a map from a YAML file on disk
pub fn load_map_file(path: &Path) -> Result<Document, LoadError> {
    let source = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    load_map(&source)
}

/// Load a whole document: groups first, then top-level components, then the
/// top-level layout over their union
pub fn load_document(value: &Value) -> Result<Document, LoadError> {
    let doc = match value {
        Value::Null => Mapping::new(),
        other => mapping(other, "map document")?.clone(),
    };
    reject_unknown_keys(&doc, &DOCUMENT_KEYS, "map document")?;

    let mut groups = IndexMap::new();
    for (name, declaration) in optional_mapping(doc.get("groups"), "groups")? {
        let name = key(&name, "groups")?;
        let group = load_group(&name, &declaration)?;
        groups.insert(name, group);
    }
    let group_names: IndexSet<String> = groups.keys().cloned().collect();

    let mut components = IndexMap::new();
    for (name, declaration) in optional_mapping(doc.get("components"), "components")? {
        let name = key(&name, "components")?;
        let component = load_component(&name, &declaration, &group_names)?;
        components.insert(name, component);
    }

    let valid_names: IndexSet<String> = components
        .keys()
        .chain(groups.keys())
        .cloned()
        .collect();
    let (layout, connectors) = parse_layout_value(doc.get("layout"), &valid_names)?;
    add_connectors(&mut components, connectors);

    debug!("groups: {:?}", groups.keys().collect::<Vec<_>>());
    debug!("valid names: {:?}", valid_names);
    debug!("components: {:?}", components.keys().collect::<Vec<_>>());
    debug!("layout: {:?}", layout);

    Ok(Document {
        groups,
        components,
        layout,
        valid_names,
    })
}

/// Load one group declaration
pub fn load_group(name: &str, declaration: &Value) -> Result<GroupDecl, LoadError> {
    let context = format!("group '{}'", name);
    let groupd = mapping(declaration, &context)?;
    reject_unknown_keys(groupd, &GROUP_KEYS, &context)?;

    let mut components = IndexMap::new();
    let no_groups = IndexSet::new();
    for (member, componentd) in optional_mapping(groupd.get("components"), &context)? {
        let member = key(&member, &context)?;
        let component = load_component(&member, &componentd, &no_groups)?;
        components.insert(member, component);
    }

    let members: IndexSet<String> = components.keys().cloned().collect();
    let (layout, connectors) = parse_layout_value(groupd.get("layout"), &members)?;
    add_connectors(&mut components, connectors);

    let mut anchors = IndexMap::new();
    for (side, member) in optional_mapping(groupd.get("anchors"), &context)? {
        let side = key(&side, &context)?;
        let direction = side
            .parse::<Direction>()
            .map_err(|_| LoadError::InvalidAnchorDirection {
                group: name.to_string(),
                direction: side.clone(),
            })?;
        let member = scalar(&member, &context)?;
        if !components.contains_key(&member) {
            return Err(LoadError::UnknownAnchor {
                group: name.to_string(),
                anchor: member,
            });
        }
        anchors.insert(direction, member);
    }

    Ok(GroupDecl {
        name: name.to_string(),
        components,
        layout,
        anchors,
        macros: load_macros(groupd.get("macros"), &context)?,
    })
}

/// Load one component declaration
///
/// Exactly one of `class` or `group` selects the kind; `macros` is split off
/// and every other key becomes a templated property.
pub fn load_component(
    name: &str,
    declaration: &Value,
    sibling_groups: &IndexSet<String>,
) -> Result<ComponentDecl, LoadError> {
    if sibling_groups.contains(name) {
        return Err(LoadError::NameClash {
            name: name.to_string(),
        });
    }

    let context = format!("component '{}'", name);
    let componentd = match declaration {
        Value::Null => Mapping::new(),
        other => mapping(other, &context)?.clone(),
    };

    let kind = match (componentd.get("class"), componentd.get("group")) {
        (Some(class), None) => ComponentKind::Class(scalar(class, &context)?),
        (None, Some(group)) => ComponentKind::Group(scalar(group, &context)?),
        _ => {
            return Err(LoadError::ClassOrGroup {
                name: name.to_string(),
                found: componentd
                    .keys()
                    .map(|k| key(k, &context).unwrap_or_default())
                    .collect(),
            })
        }
    };

    let mut properties = IndexMap::new();
    for (prop, value) in &componentd {
        let prop = key(prop, &context)?;
        if matches!(prop.as_str(), "class" | "group" | "macros") {
            continue;
        }
        properties.insert(prop, scalar(value, &context)?);
    }

    Ok(ComponentDecl {
        name: name.to_string(),
        kind,
        macros: load_macros(componentd.get("macros"), &context)?,
        properties,
    })
}

fn load_macros(value: Option<&Value>, context: &str) -> Result<Macros, LoadError> {
    let context = format!("macros of {}", context);
    let mut macros = Macros::new();
    for (name, value) in optional_mapping(value, &context)? {
        macros.insert(key(&name, &context)?, scalar(&value, &context)?);
    }
    Ok(macros)
}

fn reject_unknown_keys(map: &Mapping, allowed: &[&str], context: &str) -> Result<(), LoadError> {
    let unexpected: Vec<String> = map
        .keys()
        .map(|k| match k {
            Value::String(s) => s.clone(),
            other => format!("<{}>", describe(other)),
        })
        .filter(|k| !allowed.contains(&k.as_str()))
        .collect();

    if unexpected.is_empty() {
        Ok(())
    } else {
        Err(LoadError::unexpected_keys(context, unexpected))
    }
}

/// Connector placeholders need no declaration; an explicit one wins
fn add_connectors(components: &mut IndexMap<String, ComponentDecl>, connectors: IndexSet<String>) {
    for connector in connectors {
        components
            .entry(connector.clone())
            .or_insert_with(|| ComponentDecl::connector(connector));
    }
}
