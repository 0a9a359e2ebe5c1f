//! Arrangement of a whole instantiated map
//!
//! Groups are laid out innermost first. Once a group's members are placed
//! it takes part in the enclosing layout as a single node that presents
//! one of its members on each anchored side.

use indexmap::IndexMap;
use log::{debug, warn};

use super::config::LayoutConfig;
use super::engine::layout;
use super::error::LayoutError;
use super::lint::{find_collisions, Collision};
use super::routing::{connect, Connection};
use super::tree::{build_tree, DiagramTree, NodeGeometry};
use crate::parser::ast::{Adjacency, Direction};
use crate::scene::Scene;
use crate::template::{Instantiated, InstantiatedMap};

/// Outcome of [`arrange`]
#[derive(Debug)]
pub struct ArrangedMap<S> {
    /// Every widget's shape, keyed by its full component name
    pub shapes: IndexMap<String, S>,
    pub connections: Vec<Connection>,
    /// Overlaps found after layout; empty when validation is disabled
    pub collisions: Vec<Collision>,
}

impl<S> ArrangedMap<S> {
    pub fn is_valid(&self) -> bool {
        self.collisions.is_empty()
    }
}

/// An instantiated item whose widgets are already in the scene
enum Placed<S> {
    Shape(S),
    Group {
        name: String,
        members: IndexMap<String, Placed<S>>,
        layout: Adjacency,
        anchors: IndexMap<Direction, String>,
    },
}

impl<S: Copy> Placed<S> {
    fn collect_shapes(&self, out: &mut Vec<S>) {
        match self {
            Self::Shape(shape) => out.push(*shape),
            Self::Group { members, .. } => {
                for member in members.values() {
                    member.collect_shapes(out);
                }
            }
        }
    }
}

fn place<Sc: Scene>(
    scene: &mut Sc,
    item: Instantiated<Sc::Widget>,
    shapes: &mut IndexMap<String, Sc::Shape>,
) -> Placed<Sc::Shape> {
    match item {
        Instantiated::Component(component) => {
            let shape = scene.add_widget(&component.name, component.widget);
            shapes.insert(component.name, shape);
            Placed::Shape(shape)
        }
        Instantiated::Group(group) => Placed::Group {
            members: place_all(scene, group.components, shapes),
            name: group.name,
            layout: group.layout,
            anchors: group.anchors,
        },
    }
}

fn place_all<Sc: Scene>(
    scene: &mut Sc,
    items: IndexMap<String, Instantiated<Sc::Widget>>,
    shapes: &mut IndexMap<String, Sc::Shape>,
) -> IndexMap<String, Placed<Sc::Shape>> {
    let mut placed = IndexMap::new();
    for (name, item) in items {
        let item = place(scene, item, shapes);
        placed.insert(name, item);
    }
    placed
}

/// Lays out levels bottom-up, keeping every tree for connection
struct Arranger<'a, S> {
    config: &'a LayoutConfig,
    trees: Vec<DiagramTree<S>>,
}

impl<'a, S: Copy + Eq> Arranger<'a, S> {
    fn arrange_level<Sc: Scene<Shape = S>>(
        &mut self,
        scene: &mut Sc,
        members: &IndexMap<String, Placed<S>>,
        adjacency: &Adjacency,
    ) -> Result<IndexMap<String, NodeGeometry<S>>, LayoutError> {
        let mut items = IndexMap::new();
        for (name, member) in members {
            let geometry = match member {
                Placed::Shape(shape) => NodeGeometry::Plain(*shape),
                Placed::Group {
                    name: group,
                    members,
                    layout: inner,
                    anchors,
                } => self.arrange_group(scene, group, members, inner, anchors)?,
            };
            items.insert(name.clone(), geometry);
        }

        if items.is_empty() {
            return Ok(items);
        }
        let mut tree = build_tree(&items, adjacency)?;
        layout(scene, &mut tree, self.config)?;
        self.trees.push(tree);
        Ok(items)
    }

    fn arrange_group<Sc: Scene<Shape = S>>(
        &mut self,
        scene: &mut Sc,
        name: &str,
        members: &IndexMap<String, Placed<S>>,
        adjacency: &Adjacency,
        anchors: &IndexMap<Direction, String>,
    ) -> Result<NodeGeometry<S>, LayoutError> {
        debug!("Laying out group {}", name);
        let items = self.arrange_level(scene, members, adjacency)?;

        let mut resolved = IndexMap::new();
        for (side, member) in anchors {
            let geometry = items.get(member).ok_or_else(|| LayoutError::UnknownItem {
                name: member.clone(),
            })?;
            // a nested group answers through its own anchor on the same side
            if let Some(shape) = geometry.anchor(*side) {
                resolved.insert(*side, shape);
            }
        }

        let mut shapes = Vec::new();
        for member in members.values() {
            member.collect_shapes(&mut shapes);
        }
        Ok(NodeGeometry::Group {
            shapes,
            anchors: resolved,
        })
    }
}

/// Place, lay out, connect and check every widget of `map`
///
/// Widgets are moved into the scene. Each group is laid out on its own
/// first, then the top-level layout arranges the results.
pub fn arrange<Sc: Scene>(
    scene: &mut Sc,
    map: InstantiatedMap<Sc::Widget>,
    config: &LayoutConfig,
) -> Result<ArrangedMap<Sc::Shape>, LayoutError> {
    let mut shapes = IndexMap::new();
    let top = place_all(scene, map.components, &mut shapes);

    let mut arranger = Arranger {
        config,
        trees: Vec::new(),
    };
    arranger.arrange_level(scene, &top, &map.layout)?;

    let mut connections = Vec::new();
    for tree in arranger.trees.iter().rev() {
        connections.extend(connect(scene, tree)?);
    }

    let collisions = if config.validate {
        find_collisions(&*scene, &shapes)
    } else {
        Vec::new()
    };
    for collision in &collisions {
        warn!("Collision: {}", collision);
    }

    debug!(
        "Arranged {} shapes with {} connections",
        shapes.len(),
        connections.len()
    );
    Ok(ArrangedMap {
        shapes,
        connections,
        collisions,
    })
}
