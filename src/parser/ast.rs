//! In-memory model of a map declaration document

use std::fmt;
use std::str::FromStr;

use indexmap::{IndexMap, IndexSet};
use thiserror::Error;

/// Class name used for synthesized connector components
pub const CONNECTOR_CLASS: &str = "MapConnector";

/// A flat macro scope: macro name -> substitution value
pub type Macros = IndexMap<String, String>;

/// Normalized layout: item -> {direction -> item}
pub type Adjacency = IndexMap<String, IndexMap<Direction, String>>;

/// One of the eight compass directions used for relative placement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Direction {
    North,
    South,
    East,
    West,
    NorthEast,
    NorthWest,
    SouthEast,
    SouthWest,
}

impl Direction {
    pub const ALL: [Direction; 8] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
        Direction::NorthEast,
        Direction::NorthWest,
        Direction::SouthEast,
        Direction::SouthWest,
    ];

    /// The opposite direction (n <-> s, e <-> w, ne <-> sw, nw <-> se)
    pub fn inverse(self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::South => Direction::North,
            Direction::East => Direction::West,
            Direction::West => Direction::East,
            Direction::NorthEast => Direction::SouthWest,
            Direction::SouthWest => Direction::NorthEast,
            Direction::NorthWest => Direction::SouthEast,
            Direction::SouthEast => Direction::NorthWest,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::North => "n",
            Direction::South => "s",
            Direction::East => "e",
            Direction::West => "w",
            Direction::NorthEast => "ne",
            Direction::NorthWest => "nw",
            Direction::SouthEast => "se",
            Direction::SouthWest => "sw",
        }
    }

    /// Horizontal component: 1 for east-ish, -1 for west-ish, 0 otherwise
    pub fn dx(self) -> i8 {
        match self {
            Direction::East | Direction::NorthEast | Direction::SouthEast => 1,
            Direction::West | Direction::NorthWest | Direction::SouthWest => -1,
            Direction::North | Direction::South => 0,
        }
    }

    /// Vertical component in screen coordinates (y grows downward)
    pub fn dy(self) -> i8 {
        match self {
            Direction::South | Direction::SouthEast | Direction::SouthWest => 1,
            Direction::North | Direction::NorthEast | Direction::NorthWest => -1,
            Direction::East | Direction::West => 0,
        }
    }

    pub fn is_cardinal(self) -> bool {
        self.dx() == 0 || self.dy() == 0
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid direction '{0}' (expected one of n, s, e, w, ne, nw, se, sw)")]
pub struct ParseDirectionError(pub String);

impl FromStr for Direction {
    type Err = ParseDirectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Direction::ALL
            .into_iter()
            .find(|d| d.as_str() == s)
            .ok_or_else(|| ParseDirectionError(s.to_string()))
    }
}

/// Connector placeholders are any item name ending in `*`
pub fn is_connector_name(name: &str) -> bool {
    name.ends_with('*')
}

/// Iterate over every (from, direction, to) edge of an adjacency map
pub fn edges(layout: &Adjacency) -> impl Iterator<Item = (&str, Direction, &str)> {
    layout.iter().flat_map(|(from, targets)| {
        targets
            .iter()
            .map(move |(direction, to)| (from.as_str(), *direction, to.as_str()))
    })
}

/// What a component declaration refers to
#[derive(Debug, Clone, PartialEq)]
pub enum ComponentKind {
    /// A widget class, possibly containing macros
    Class(String),
    /// A reference to a group declared at the top level
    Group(String),
}

/// A single component declaration
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentDecl {
    pub name: String,
    pub kind: ComponentKind,
    pub macros: Macros,
    /// Property name -> templated value, in declaration order
    pub properties: IndexMap<String, String>,
}

impl ComponentDecl {
    /// Synthesize the declaration for a connector placeholder
    pub fn connector(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ComponentKind::Class(CONNECTOR_CLASS.to_string()),
            macros: Macros::new(),
            properties: IndexMap::new(),
        }
    }

    pub fn is_connector(&self) -> bool {
        matches!(&self.kind, ComponentKind::Class(class) if class == CONNECTOR_CLASS)
    }
}

/// A named sub-graph with its own layout and anchors
#[derive(Debug, Clone, PartialEq)]
pub struct GroupDecl {
    pub name: String,
    pub components: IndexMap<String, ComponentDecl>,
    pub layout: Adjacency,
    /// Side of the group -> member used when attaching on that side
    pub anchors: IndexMap<Direction, String>,
    pub macros: Macros,
}

/// A fully loaded map document
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document {
    pub groups: IndexMap<String, GroupDecl>,
    pub components: IndexMap<String, ComponentDecl>,
    pub layout: Adjacency,
    /// Names usable in the top-level layout (components and groups)
    pub valid_names: IndexSet<String>,
}
