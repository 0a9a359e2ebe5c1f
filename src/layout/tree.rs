//! Diagram tree built from an adjacency map
//!
//! Nodes live in an arena and refer to each other by [`NodeId`]. Each node
//! keeps its children per direction, a back-reference to its parent and a
//! [`ShapeGroup`] that accumulates the shapes of its positioned subtree.

use std::collections::HashSet;

use indexmap::IndexMap;
use log::debug;

use super::error::LayoutError;
use super::types::{BoundingBox, Point};
use crate::parser::ast::{edges, Adjacency, Direction};
use crate::scene::Scene;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// What a node stands for in the scene
#[derive(Debug, Clone, PartialEq)]
pub enum NodeGeometry<S> {
    /// A single shape
    Plain(S),
    /// An already laid out group; `anchors` pick the member shape presented
    /// on each side
    Group {
        shapes: Vec<S>,
        anchors: IndexMap<Direction, S>,
    },
}

impl<S: Copy> NodeGeometry<S> {
    pub fn shapes(&self) -> Vec<S> {
        match self {
            Self::Plain(shape) => vec![*shape],
            Self::Group { shapes, .. } => shapes.clone(),
        }
    }

    /// Shape presented on `side`; a group without that anchor has none
    pub fn anchor(&self, side: Direction) -> Option<S> {
        match self {
            Self::Plain(shape) => Some(*shape),
            Self::Group { anchors, .. } => anchors.get(&side).copied(),
        }
    }

    pub fn is_group(&self) -> bool {
        matches!(self, Self::Group { .. })
    }
}

/// A set of shapes moved and measured together
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeGroup<S> {
    members: Vec<S>,
}

impl<S> Default for ShapeGroup<S> {
    fn default() -> Self {
        Self {
            members: Vec::new(),
        }
    }
}

impl<S: Copy + Eq> ShapeGroup<S> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a shape; adding a member twice is a no-op
    pub fn add(&mut self, shape: S) {
        if !self.members.contains(&shape) {
            self.members.push(shape);
        }
    }

    pub fn members(&self) -> &[S] {
        &self.members
    }

    pub fn contains(&self, shape: S) -> bool {
        self.members.contains(&shape)
    }

    /// Union of the members' boxes, or `None` for an empty group
    pub fn bounding_rect<Sc: Scene<Shape = S>>(&self, scene: &Sc) -> Option<BoundingBox> {
        self.members
            .iter()
            .map(|shape| scene.bounding_box(*shape))
            .reduce(|a, b| a.union(&b))
    }

    pub fn translate<Sc: Scene<Shape = S>>(&self, scene: &mut Sc, delta: Point) {
        for shape in &self.members {
            let position = scene.position(*shape);
            scene.set_position(*shape, position + delta);
        }
    }
}

impl<S: Copy + Eq> Extend<S> for ShapeGroup<S> {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        for shape in iter {
            self.add(shape);
        }
    }
}

#[derive(Debug, Clone)]
pub struct DiagramNode<S> {
    pub name: String,
    pub geometry: NodeGeometry<S>,
    /// Set once this node's own position has been committed
    pub positioned: bool,
    pub children: IndexMap<Direction, Vec<NodeId>>,
    pub parent: Option<NodeId>,
    pub group: ShapeGroup<S>,
}

impl<S> DiagramNode<S> {
    pub fn has_children(&self) -> bool {
        self.children.values().any(|nodes| !nodes.is_empty())
    }

    /// Direction from this node to `child`, if it is a direct child
    pub fn direction_to_child(&self, child: NodeId) -> Option<Direction> {
        self.children
            .iter()
            .find(|(_, nodes)| nodes.contains(&child))
            .map(|(direction, _)| *direction)
    }
}

/// A rooted tree of diagram nodes
#[derive(Debug, Clone)]
pub struct DiagramTree<S> {
    nodes: Vec<DiagramNode<S>>,
    root: NodeId,
    index: IndexMap<String, NodeId>,
}

impl<S: Copy + Eq> DiagramTree<S> {
    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> &DiagramNode<S> {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut DiagramNode<S> {
        &mut self.nodes[id.0]
    }

    pub fn find(&self, name: &str) -> Option<NodeId> {
        self.index.get(name).copied()
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &DiagramNode<S>)> {
        self.nodes.iter().enumerate().map(|(idx, node)| (NodeId(idx), node))
    }

    /// Direct children of `id` as (direction, child) pairs, in layout order
    pub fn edges(&self, id: NodeId) -> Vec<(Direction, NodeId)> {
        self.node(id)
            .children
            .iter()
            .flat_map(|(direction, nodes)| nodes.iter().map(move |child| (*direction, *child)))
            .collect()
    }

    /// Direction from `id` back to its parent
    pub fn direction_to_parent(&self, id: NodeId) -> Option<Direction> {
        let parent = self.node(id).parent?;
        self.node(parent)
            .direction_to_child(id)
            .map(Direction::inverse)
    }

    /// Translate every shape in the node's group
    pub fn move_node<Sc: Scene<Shape = S>>(&self, scene: &mut Sc, id: NodeId, delta: Point) {
        if delta != Point::default() {
            self.node(id).group.translate(scene, delta);
        }
    }

    /// Add all shapes of `child`'s group to `parent`'s group
    pub fn absorb(&mut self, parent: NodeId, child: NodeId) {
        let members = self.node(child).group.members().to_vec();
        self.node_mut(parent).group.extend(members);
    }
}

/// Build a tree with one node per item; edges of `layout` become
/// parent -> child links
///
/// Exactly one node may be left without a parent, and every node must be
/// reachable from it.
pub fn build_tree<S: Copy + Eq>(
    items: &IndexMap<String, NodeGeometry<S>>,
    layout: &Adjacency,
) -> Result<DiagramTree<S>, LayoutError> {
    let mut nodes: Vec<DiagramNode<S>> = Vec::with_capacity(items.len());
    let mut index = IndexMap::new();
    for (name, geometry) in items {
        let mut group = ShapeGroup::new();
        group.extend(geometry.shapes());
        index.insert(name.clone(), NodeId(nodes.len()));
        nodes.push(DiagramNode {
            name: name.clone(),
            geometry: geometry.clone(),
            positioned: false,
            children: IndexMap::new(),
            parent: None,
            group,
        });
    }

    let lookup = |name: &str| {
        index
            .get(name)
            .copied()
            .ok_or_else(|| LayoutError::UnknownItem {
                name: name.to_string(),
            })
    };

    for (from, direction, to) in edges(layout) {
        let parent = lookup(from)?;
        let child = lookup(to)?;
        if let Some(existing) = nodes[child.0].parent {
            return Err(LayoutError::MultipleParents {
                item: to.to_string(),
                parents: vec![nodes[existing.0].name.clone(), from.to_string()],
            });
        }
        nodes[parent.0]
            .children
            .entry(direction)
            .or_default()
            .push(child);
        nodes[child.0].parent = Some(parent);
    }

    let roots: Vec<NodeId> = (0..nodes.len())
        .map(NodeId)
        .filter(|id| nodes[id.0].parent.is_none())
        .collect();
    let root = match roots.as_slice() {
        [root] => *root,
        _ => {
            return Err(LayoutError::no_single_root(
                roots.iter().map(|id| nodes[id.0].name.clone()).collect(),
            ))
        }
    };

    let mut reached = HashSet::from([root]);
    let mut stack = vec![root];
    while let Some(id) = stack.pop() {
        for child in nodes[id.0].children.values().flatten() {
            if reached.insert(*child) {
                stack.push(*child);
            }
        }
    }
    if reached.len() != nodes.len() {
        return Err(LayoutError::Unreachable {
            root: nodes[root.0].name.clone(),
            items: nodes
                .iter()
                .enumerate()
                .filter(|(idx, _)| !reached.contains(&NodeId(*idx)))
                .map(|(_, node)| node.name.clone())
                .collect(),
        });
    }

    debug!("diagram tree rooted at {}", nodes[root.0].name);
    Ok(DiagramTree { nodes, root, index })
}
