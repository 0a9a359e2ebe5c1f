//! Error types for loading map documents

use std::path::PathBuf;

use ariadne::{Color, Label, Report, ReportKind, Source};
use thiserror::Error;

use crate::parser::ast::Direction;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

/// Structural and grammar errors raised while loading a document
///
/// Loading never produces a partial model: the first violation aborts.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("failed to read map file '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A node of the document has the wrong shape
    #[error("{context}: expected {expected}, found {found}")]
    InvalidStructure {
        context: String,
        expected: String,
        found: String,
    },

    /// A layout directive is not a single-key record with a known key
    #[error(
        "layout directive should have exactly one key out of \
         {{vertical, horizontal, diagonal, directional}}, found {{{}}}",
        keys.join(", ")
    )]
    InvalidDirective { keys: Vec<String> },

    #[error("invalid direction connecting '{item}': {direction}")]
    InvalidDirection { item: String, direction: String },

    #[error("unexpected item name: {name}{}", format_suggestions(suggestions))]
    UnexpectedItem {
        name: String,
        suggestions: Vec<String>,
    },

    #[error(
        "{item}/{direction} already connected to {existing}; \
         attempting to connect to {attempted}"
    )]
    AlreadyConnected {
        item: String,
        direction: Direction,
        existing: String,
        attempted: String,
    },

    #[error("'{item}' is placed relative to more than one item: {}", parents.join(", "))]
    MultipleParents { item: String, parents: Vec<String> },

    #[error("cyclic layout: {}", cycle.join(" -> "))]
    CyclicLayout { cycle: Vec<String> },

    #[error("expected group or class in component '{name}'; found only: {{{}}}", found.join(", "))]
    ClassOrGroup { name: String, found: Vec<String> },

    #[error("component name '{name}' clashes with existing group")]
    NameClash { name: String },

    #[error("found unexpected keys in {context}: {{{}}}", keys.join(", "))]
    UnexpectedKeys { context: String, keys: Vec<String> },

    #[error("unexpected anchor name in group '{group}': {anchor}")]
    UnknownAnchor { group: String, anchor: String },

    #[error("invalid anchor direction in group '{group}': {direction}")]
    InvalidAnchorDirection { group: String, direction: String },
}

fn format_suggestions(suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        String::new()
    } else {
        format!(" (did you mean: {}?)", suggestions.join(", "))
    }
}

impl LoadError {
    pub fn structure(
        context: impl Into<String>,
        expected: impl Into<String>,
        found: impl Into<String>,
    ) -> Self {
        Self::InvalidStructure {
            context: context.into(),
            expected: expected.into(),
            found: found.into(),
        }
    }

    pub fn unexpected_item(name: impl Into<String>, suggestions: Vec<String>) -> Self {
        Self::UnexpectedItem {
            name: name.into(),
            suggestions,
        }
    }

    pub fn unexpected_keys(context: impl Into<String>, keys: Vec<String>) -> Self {
        Self::UnexpectedKeys {
            context: context.into(),
            keys,
        }
    }

    /// Byte offset into the source, known only for YAML syntax errors
    pub fn offset(&self) -> Option<usize> {
        match self {
            Self::Yaml(err) => err.location().map(|loc| loc.index()),
            _ => None,
        }
    }

    /// Get suggestions if available
    pub fn suggestions(&self) -> Option<&[String]> {
        match self {
            Self::UnexpectedItem { suggestions, .. } => Some(suggestions),
            _ => None,
        }
    }

    /// Format the error with source context using ariadne
    ///
    /// Errors without a source location are rendered as a plain message.
    pub fn format(&self, source: &str, filename: &str) -> String {
        let Some(offset) = self.offset() else {
            return format!("Error: {}\n", self);
        };
        let start = offset.min(source.len());
        let end = (start + 1).min(source.len());
        let span: Span = start..end;

        let mut buf = Vec::new();
        let written = Report::build(ReportKind::Error, filename, span.start)
            .with_message("invalid map document")
            .with_label(
                Label::new((filename, span))
                    .with_message(self.to_string())
                    .with_color(Color::Red),
            )
            .finish()
            .write((filename, Source::from(source)), &mut buf);

        match written {
            Ok(()) => String::from_utf8_lossy(&buf).into_owned(),
            Err(_) => format!("Error: {}\n", self),
        }
    }
}
