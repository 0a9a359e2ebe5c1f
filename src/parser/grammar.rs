//! Layout directive grammar
//!
//! A layout is an ordered list of single-key directives:
//!
//! ```yaml
//! layout:
//!   - horizontal: [source, "junction*", pump]
//!   - vertical: [pump, gauge]
//!   - diagonal: [gauge, valve]
//!   - directional:
//!       pump: {ne: relief}
//! ```
//!
//! Chains connect consecutive items (`vertical` via `s`, `horizontal` via
//! `e`, `diagonal` via `se`); `directional` lists edges explicitly. All
//! directives of one layout fold into a single [`Adjacency`] map in which
//! every (item, direction) slot, forward or inverse, is assigned at most once.

use std::collections::HashMap;

use indexmap::{IndexMap, IndexSet};
use log::debug;
use serde_yaml::Value;

use super::ast::{edges, is_connector_name, Adjacency, Direction};
use super::value::{key, mapping, optional_mapping, scalar, sequence};
use crate::error::LoadError;

/// A directed edge: `to` is placed on the `direction` side of `from`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    pub from: String,
    pub direction: Direction,
    pub to: String,
}

impl Edge {
    pub fn new(from: impl Into<String>, direction: Direction, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            direction,
            to: to.into(),
        }
    }
}

/// A single layout directive
#[derive(Debug, Clone, PartialEq)]
pub enum Directive {
    Vertical(Vec<String>),
    Horizontal(Vec<String>),
    Diagonal(Vec<String>),
    Directional(Vec<Edge>),
}

impl Directive {
    /// Parse one `{kind: body}` record
    pub fn from_yaml(value: &Value) -> Result<Self, LoadError> {
        let record = mapping(value, "layout directive")?;
        let mut entries = record.iter();
        let (kind, body) = match (entries.next(), entries.next()) {
            (Some(entry), None) => entry,
            _ => {
                return Err(LoadError::InvalidDirective {
                    keys: record
                        .keys()
                        .map(|k| key(k, "layout directive").unwrap_or_default())
                        .collect(),
                })
            }
        };

        let kind = key(kind, "layout directive")?;
        match kind.as_str() {
            "vertical" => Ok(Self::Vertical(chain(body, &kind)?)),
            "horizontal" => Ok(Self::Horizontal(chain(body, &kind)?)),
            "diagonal" => Ok(Self::Diagonal(chain(body, &kind)?)),
            "directional" => directional(body).map(Self::Directional),
            _ => Err(LoadError::InvalidDirective { keys: vec![kind] }),
        }
    }

    /// Expand the directive into its directed edges, in order
    pub fn edges(&self) -> Vec<Edge> {
        match self {
            Self::Vertical(items) => zip_chain(items, Direction::South),
            Self::Horizontal(items) => zip_chain(items, Direction::East),
            Self::Diagonal(items) => zip_chain(items, Direction::SouthEast),
            Self::Directional(edges) => edges.clone(),
        }
    }
}

fn zip_chain(items: &[String], direction: Direction) -> Vec<Edge> {
    items
        .windows(2)
        .map(|pair| Edge::new(&pair[0], direction, &pair[1]))
        .collect()
}

fn chain(body: &Value, kind: &str) -> Result<Vec<String>, LoadError> {
    let context = format!("'{}' directive", kind);
    sequence(body, &context)?
        .iter()
        .map(|item| scalar(item, &context))
        .collect()
}

fn directional(body: &Value) -> Result<Vec<Edge>, LoadError> {
    let mut result = Vec::new();
    for (item, targets) in mapping(body, "'directional' directive")? {
        let item = key(item, "'directional' directive")?;
        let context = format!("directions of '{}'", item);
        for (direction, target) in optional_mapping(Some(targets), &context)? {
            let direction = key(&direction, &context)?;
            let direction =
                direction
                    .parse::<Direction>()
                    .map_err(|_| LoadError::InvalidDirection {
                        item: item.clone(),
                        direction: direction.clone(),
                    })?;
            result.push(Edge::new(&item, direction, scalar(&target, &context)?));
        }
    }
    Ok(result)
}

/// Accumulates directives into one adjacency map
///
/// The connection registry records every assigned (item, direction) slot,
/// including the implied inverse slot of the target.
pub struct LayoutParser<'a> {
    valid_names: &'a IndexSet<String>,
    layout: Adjacency,
    connections: HashMap<(String, Direction), String>,
    connectors: IndexSet<String>,
}

impl<'a> LayoutParser<'a> {
    pub fn new(valid_names: &'a IndexSet<String>) -> Self {
        Self {
            valid_names,
            layout: Adjacency::new(),
            connections: HashMap::new(),
            connectors: IndexSet::new(),
        }
    }

    /// Register every edge of `directive`, returning the edges added
    pub fn parse_directive(&mut self, directive: &Directive) -> Result<Vec<Edge>, LoadError> {
        let edges = directive.edges();
        for edge in &edges {
            self.connect(edge)?;
        }
        Ok(edges)
    }

    fn connect(&mut self, edge: &Edge) -> Result<(), LoadError> {
        self.check_name(&edge.from)?;
        self.check_name(&edge.to)?;

        let inverse = edge.direction.inverse();
        self.check_free(&edge.from, edge.direction, &edge.to)?;
        self.check_free(&edge.to, inverse, &edge.from)?;

        debug!("layout edge {} -{}-> {}", edge.from, edge.direction, edge.to);
        self.layout
            .entry(edge.from.clone())
            .or_default()
            .insert(edge.direction, edge.to.clone());
        self.connections
            .insert((edge.from.clone(), edge.direction), edge.to.clone());
        self.connections
            .insert((edge.to.clone(), inverse), edge.from.clone());
        Ok(())
    }

    fn check_name(&mut self, name: &str) -> Result<(), LoadError> {
        if is_connector_name(name) {
            self.connectors.insert(name.to_string());
            Ok(())
        } else if self.valid_names.contains(name) {
            Ok(())
        } else {
            Err(LoadError::unexpected_item(
                name,
                find_similar(self.valid_names, name, 2),
            ))
        }
    }

    fn check_free(&self, item: &str, direction: Direction, attempted: &str) -> Result<(), LoadError> {
        match self.connections.get(&(item.to_string(), direction)) {
            Some(existing) => Err(LoadError::AlreadyConnected {
                item: item.to_string(),
                direction,
                existing: existing.clone(),
                attempted: attempted.to_string(),
            }),
            None => Ok(()),
        }
    }

    /// Finish parsing, rejecting layouts that do not form a forest
    pub fn finish(self) -> Result<(Adjacency, IndexSet<String>), LoadError> {
        check_tree_shape(&self.layout)?;
        Ok((self.layout, self.connectors))
    }
}

/// Fold an ordered list of directives into one adjacency map plus the set of
/// connector names they mention
pub fn parse_layout(
    directives: &[Directive],
    valid_names: &IndexSet<String>,
) -> Result<(Adjacency, IndexSet<String>), LoadError> {
    let mut parser = LayoutParser::new(valid_names);
    for directive in directives {
        parser.parse_directive(directive)?;
    }
    parser.finish()
}

/// Parse the `layout` entry of a document or group; absent means empty
pub fn parse_layout_value(
    value: Option<&Value>,
    valid_names: &IndexSet<String>,
) -> Result<(Adjacency, IndexSet<String>), LoadError> {
    let directives = match value {
        None | Some(Value::Null) => Vec::new(),
        Some(value) => sequence(value, "layout")?
            .iter()
            .map(Directive::from_yaml)
            .collect::<Result<Vec<_>, _>>()?,
    };
    parse_layout(&directives, valid_names)
}

/// Every item has at most one parent and following parents never loops
fn check_tree_shape(layout: &Adjacency) -> Result<(), LoadError> {
    let mut parents: IndexMap<&str, Vec<&str>> = IndexMap::new();
    for (from, _, to) in edges(layout) {
        parents.entry(to).or_default().push(from);
    }

    if let Some((item, found)) = parents.iter().find(|(_, found)| found.len() > 1) {
        return Err(LoadError::MultipleParents {
            item: item.to_string(),
            parents: found.iter().map(|p| p.to_string()).collect(),
        });
    }

    for start in parents.keys() {
        let mut chain: IndexSet<&str> = IndexSet::new();
        let mut current = Some(*start);
        while let Some(item) = current {
            if let Some(pos) = chain.get_index_of(item) {
                let mut cycle: Vec<String> =
                    chain.iter().skip(pos).rev().map(|s| s.to_string()).collect();
                if let Some(first) = cycle.first().cloned() {
                    cycle.push(first);
                }
                return Err(LoadError::CyclicLayout { cycle });
            }
            chain.insert(item);
            current = parents.get(item).and_then(|found| found.first().copied());
        }
    }
    Ok(())
}

/// Compute Levenshtein edit distance between two strings
fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let n = b_chars.len();

    let mut prev: Vec<usize> = (0..=n).collect();
    let mut row = vec![0usize; n + 1];
    for (i, ca) in a_chars.iter().enumerate() {
        row[0] = i + 1;
        for (j, cb) in b_chars.iter().enumerate() {
            let cost = usize::from(ca != cb);
            row[j + 1] = (prev[j + 1] + 1).min(row[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut row);
    }
    prev[n]
}

/// Find declared names within a maximum edit distance, closest first
fn find_similar(valid: &IndexSet<String>, target: &str, max_distance: usize) -> Vec<String> {
    let mut candidates: Vec<(&String, usize)> = valid
        .iter()
        .map(|name| (name, levenshtein_distance(name, target)))
        .filter(|(_, dist)| *dist > 0 && *dist <= max_distance)
        .collect();

    candidates.sort_by_key(|(_, d)| *d);
    candidates
        .into_iter()
        .map(|(name, _)| name.clone())
        .take(3)
        .collect()
}
