//! Error types for the layout engine

use thiserror::Error;

use crate::parser::ast::Direction;

/// Errors that can occur while building or laying out a diagram tree
#[derive(Debug, Error)]
pub enum LayoutError {
    /// Zero or several items have no parent
    #[error("not only one root? found: [{}]", roots.join(", "))]
    NoSingleRoot { roots: Vec<String> },

    /// A layout edge names an item with no shape
    #[error("layout refers to unknown item '{name}'")]
    UnknownItem { name: String },

    #[error("'{item}' has more than one parent: {}", parents.join(", "))]
    MultipleParents { item: String, parents: Vec<String> },

    /// Items caught in a cycle below the root
    #[error("items not reachable from root '{root}': {}", items.join(", "))]
    Unreachable { root: String, items: Vec<String> },

    #[error("group '{group}' has no anchor for side '{direction}'")]
    MissingAnchor { group: String, direction: Direction },

    #[error("shape for '{name}' is not in the scene")]
    ShapeNotInScene { name: String },
}

impl LayoutError {
    pub fn no_single_root(roots: Vec<String>) -> Self {
        Self::NoSingleRoot { roots }
    }

    pub fn missing_anchor(group: impl Into<String>, direction: Direction) -> Self {
        Self::MissingAnchor {
            group: group.into(),
            direction,
        }
    }
}
