//! Templating: macro expansion and instantiation of declarations
//!
//! A [`Document`](crate::parser::Document) is turned into widgets by walking
//! its components. Macro scopes combine from outer to inner: the caller's
//! scope, then a group's own macros, then the component referring to it,
//! then each member's macros.
//!
//! ```
//! use lucid_map::parser::{load_map, Macros};
//! use lucid_map::template::instantiate_document;
//! use lucid_map::Catalog;
//!
//! let doc = load_map("components: {a: {class: Label, label: '${who}'}}").unwrap();
//! let macros: Macros = [("who".to_string(), "pump".to_string())].into_iter().collect();
//! let mut catalog = Catalog::default();
//! let map = instantiate_document(&doc, &mut catalog, &macros, "").unwrap();
//! assert_eq!(map.widget("a").unwrap().label.as_deref(), Some("pump"));
//! ```

pub mod instantiate;
pub mod macros;

pub use instantiate::{
    add_prefix, instantiate_document, merge_layout, prefixed_layout, InstantiateError,
    Instantiated, InstantiatedComponent, InstantiatedGroup, InstantiatedMap, Instantiator,
    MacroRunaway, WidgetFactory,
};
pub use macros::{combine_macros, expand, resolve, substitute, Expansion, MAX_MACRO_PASSES};
