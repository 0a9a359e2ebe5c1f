//! Widget catalog: the headless widget factory
//!
//! A catalog describes widget classes in TOML: their default size and,
//! optionally, the properties they accept. It implements
//! [`WidgetFactory`] for the [`HeadlessScene`](crate::scene::HeadlessScene)
//! widget type.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::layout::types::Size;
use crate::parser::ast::CONNECTOR_CLASS;
use crate::scene::Widget;
use crate::template::WidgetFactory;

/// Errors that can occur when loading a catalog or building widgets from it
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Failed to read catalog file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse catalog TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("unknown widget class '{0}'")]
    UnknownClass(String),
    #[error("class '{class}' has no property '{property}'")]
    UnknownProperty { class: String, property: String },
    #[error("invalid value '{value}' for {property}: expected a number")]
    InvalidValue { property: String, value: String },
}

/// What the catalog knows about one widget class
#[derive(Debug, Clone, PartialEq)]
pub struct WidgetClass {
    pub size: Size,
    /// Accepted extra properties; `None` accepts anything
    pub properties: Option<Vec<String>>,
}

/// A set of widget classes
#[derive(Debug, Clone)]
pub struct Catalog {
    pub name: Option<String>,
    /// Size used for classes the catalog does not list
    pub default_size: Size,
    /// Reject unlisted classes instead of falling back to `default_size`
    pub strict: bool,
    pub classes: HashMap<String, WidgetClass>,
}

#[derive(Deserialize)]
struct TomlCatalog {
    metadata: Option<TomlMetadata>,
    defaults: Option<TomlDefaults>,
    #[serde(default)]
    classes: HashMap<String, TomlClass>,
}

#[derive(Deserialize)]
struct TomlMetadata {
    name: Option<String>,
}

#[derive(Deserialize)]
struct TomlDefaults {
    width: Option<f64>,
    height: Option<f64>,
    strict: Option<bool>,
}

#[derive(Deserialize)]
struct TomlClass {
    width: f64,
    height: f64,
    properties: Option<Vec<String>>,
}

/// Built-in catalog: generic boxes plus the connector placeholder
const DEFAULT_CATALOG: &str = r##"
[defaults]
width = 80
height = 30
strict = false

[classes.MapConnector]
width = 1
height = 1
properties = []
"##;

const DEFAULT_SIZE: Size = Size {
    width: 80.0,
    height: 30.0,
};

impl Catalog {
    /// Load a catalog from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Load a catalog from a TOML string
    ///
    /// The connector placeholder class is added unless the catalog defines it.
    pub fn from_str(content: &str) -> Result<Self, CatalogError> {
        let parsed: TomlCatalog = toml::from_str(content)?;

        let defaults = parsed.defaults.as_ref();
        let default_size = Size::new(
            defaults.and_then(|d| d.width).unwrap_or(DEFAULT_SIZE.width),
            defaults.and_then(|d| d.height).unwrap_or(DEFAULT_SIZE.height),
        );

        let mut classes: HashMap<String, WidgetClass> = parsed
            .classes
            .into_iter()
            .map(|(name, class)| {
                let class = WidgetClass {
                    size: Size::new(class.width, class.height),
                    properties: class.properties,
                };
                (name, class)
            })
            .collect();
        classes
            .entry(CONNECTOR_CLASS.to_string())
            .or_insert_with(|| WidgetClass {
                size: Size::new(1.0, 1.0),
                properties: Some(Vec::new()),
            });

        Ok(Catalog {
            name: parsed.metadata.and_then(|m| m.name),
            default_size,
            strict: defaults.and_then(|d| d.strict).unwrap_or(false),
            classes,
        })
    }

    /// Find a class by its full name, then by its last dotted segment
    pub fn lookup(&self, class_name: &str) -> Option<&WidgetClass> {
        self.classes.get(class_name).or_else(|| {
            let short = class_name.rsplit('.').next()?;
            self.classes.get(short)
        })
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::from_str(DEFAULT_CATALOG).expect("Default catalog should be valid TOML")
    }
}

fn parse_number(property: &str, value: &str) -> Result<f64, CatalogError> {
    value
        .trim()
        .parse()
        .map_err(|_| CatalogError::InvalidValue {
            property: property.to_string(),
            value: value.to_string(),
        })
}

impl WidgetFactory for Catalog {
    type Widget = Widget;
    type Error = CatalogError;

    fn create(&mut self, class_name: &str, object_name: &str) -> Result<Widget, CatalogError> {
        let size = match self.lookup(class_name) {
            Some(class) => class.size,
            None if self.strict => return Err(CatalogError::UnknownClass(class_name.to_string())),
            None => self.default_size,
        };
        Ok(Widget::new(class_name, object_name, size))
    }

    fn apply_property(
        &mut self,
        widget: &mut Widget,
        name: &str,
        value: &str,
    ) -> Result<(), CatalogError> {
        match name {
            "width" => widget.size.width = parse_number(name, value)?,
            "height" => widget.size.height = parse_number(name, value)?,
            "label" | "text" => widget.label = Some(value.to_string()),
            _ => {
                let allowed = self
                    .lookup(&widget.class)
                    .and_then(|class| class.properties.as_ref())
                    .map_or(true, |props| props.iter().any(|p| p == name));
                if !allowed {
                    return Err(CatalogError::UnknownProperty {
                        class: widget.class.clone(),
                        property: name.to_string(),
                    });
                }
                widget
                    .properties
                    .insert(name.to_string(), value.to_string());
            }
        }
        Ok(())
    }
}
