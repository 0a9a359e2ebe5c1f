//! Helpers for walking untyped YAML values

use serde_yaml::{Mapping, Sequence, Value};

use crate::error::LoadError;

/// Human-readable name of a value's type, for error messages
pub fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a list",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}

/// Render a scalar as the string the document author wrote
pub fn scalar(value: &Value, context: &str) -> Result<String, LoadError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Null => Ok(String::new()),
        other => Err(LoadError::structure(context, "a scalar", describe(other))),
    }
}

pub fn mapping<'a>(value: &'a Value, context: &str) -> Result<&'a Mapping, LoadError> {
    value
        .as_mapping()
        .ok_or_else(|| LoadError::structure(context, "a mapping", describe(value)))
}

/// Like [`mapping`], but a missing or null value reads as empty
pub fn optional_mapping(value: Option<&Value>, context: &str) -> Result<Mapping, LoadError> {
    match value {
        None | Some(Value::Null) => Ok(Mapping::new()),
        Some(value) => mapping(value, context).cloned(),
    }
}

pub fn sequence<'a>(value: &'a Value, context: &str) -> Result<&'a Sequence, LoadError> {
    value
        .as_sequence()
        .ok_or_else(|| LoadError::structure(context, "a list", describe(value)))
}

/// Mapping keys are names; only scalar keys are accepted
pub fn key(value: &Value, context: &str) -> Result<String, LoadError> {
    match value {
        Value::Null => Err(LoadError::structure(context, "a name", "null")),
        other => scalar(other, context),
    }
}
