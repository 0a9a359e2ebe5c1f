//! Parser for YAML map declarations
//!
//! Loading is strict: any structural violation aborts with a
//! [`LoadError`](crate::error::LoadError)
//! and no partial [`Document`] is produced.

pub mod ast;
pub mod grammar;
pub mod loader;
mod value;

pub use ast::{
    is_connector_name, Adjacency, ComponentDecl, ComponentKind, Direction, Document, GroupDecl,
    Macros, CONNECTOR_CLASS,
};
pub use grammar::{parse_layout, Directive, Edge, LayoutParser};
pub use loader::{load_component, load_document, load_group, load_map, load_map_file};
