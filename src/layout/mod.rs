//! Layout engine: positions shapes according to a directional layout
//!
//! An adjacency map is turned into a [`DiagramTree`], laid out depth-first,
//! connected with straight lines and finally checked for overlaps.
//! [`arrange`] runs all of it for an instantiated map, groups included.

pub mod config;
pub mod engine;
pub mod error;
pub mod lint;
pub mod map;
pub mod routing;
pub mod tree;
pub mod types;

pub use config::LayoutConfig;
pub use engine::{anchor_box, layout, placement};
pub use error::LayoutError;
pub use lint::{find_collisions, validate, Collision};
pub use map::{arrange, ArrangedMap};
pub use routing::{connect, edge_point, Connection};
pub use tree::{build_tree, DiagramNode, DiagramTree, NodeGeometry, NodeId, ShapeGroup};
pub use types::*;
