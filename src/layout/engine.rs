//! Depth-first placement of a diagram tree
//!
//! Nodes are placed relative to their neighbours one edge at a time. The
//! first edge of a node moves the node itself next to its (already laid out)
//! child; every further edge moves the child next to the node. Whatever
//! moves takes its whole attached subtree along, and after each edge the
//! child's shapes join the node's group.
//!
//! Spacing is measured between the two boxes facing each other only. The
//! engine does not steer around the rest of either subtree; overlaps that
//! result are reported by the validator.

use std::collections::HashSet;

use log::debug;

use super::config::LayoutConfig;
use super::error::LayoutError;
use super::tree::{DiagramNode, DiagramTree, NodeId};
use super::types::{BoundingBox, Point};
use crate::parser::ast::Direction;
use crate::scene::Scene;

/// Box of the shape `node` presents on `side`
///
/// For a plain node that is its own shape; a group answers with the member
/// anchored on that side.
pub fn anchor_box<Sc: Scene>(
    scene: &Sc,
    node: &DiagramNode<Sc::Shape>,
    side: Direction,
) -> Result<BoundingBox, LayoutError> {
    let anchor = node
        .geometry
        .anchor(side)
        .ok_or_else(|| LayoutError::missing_anchor(&node.name, side))?;
    Ok(scene.bounding_box(anchor))
}

/// Target origin of `mover` when placed `direction` of `reference`
///
/// Along an axis the direction moves on, the boxes are kept `spacing`
/// apart. Along an axis it does not move on, they are centered on each
/// other.
pub fn placement(
    reference: &BoundingBox,
    mover: &BoundingBox,
    direction: Direction,
    spacing: f64,
) -> Point {
    let (r, m) = (reference, mover);
    let x = match direction.dx() {
        1 => r.right() + spacing,
        -1 => r.x - spacing - m.width,
        _ => r.center().x - m.width / 2.0,
    };
    let y = match direction.dy() {
        1 => r.bottom() + spacing,
        -1 => r.y - spacing - m.height,
        _ => r.center().y - m.height / 2.0,
    };
    Point::new(x, y)
}

/// Lay out the whole tree starting at its root
///
/// Positions are relative: the first shape placed keeps its current
/// position and everything else is arranged around it.
pub fn layout<Sc: Scene>(
    scene: &mut Sc,
    tree: &mut DiagramTree<Sc::Shape>,
    config: &LayoutConfig,
) -> Result<(), LayoutError> {
    for (_, node) in tree.nodes() {
        if node.geometry.shapes().iter().any(|shape| !scene.contains(*shape)) {
            return Err(LayoutError::ShapeNotInScene {
                name: node.name.clone(),
            });
        }
    }

    let mut visited = HashSet::new();
    let root = tree.root();
    layout_subtree(scene, tree, root, &mut visited, config)?;

    if let Some(span) = tree.node(root).group.bounding_rect(&*scene) {
        debug!(
            "Laid out {} nodes within {}x{} at ({}, {})",
            tree.len(),
            span.width,
            span.height,
            span.x,
            span.y
        );
    }
    Ok(())
}

/// Lay out the subtree below `id`; nodes already in `visited` are skipped
pub fn layout_subtree<Sc: Scene>(
    scene: &mut Sc,
    tree: &mut DiagramTree<Sc::Shape>,
    id: NodeId,
    visited: &mut HashSet<NodeId>,
    config: &LayoutConfig,
) -> Result<(), LayoutError> {
    if !visited.insert(id) {
        return Ok(());
    }

    let edges = tree.edges(id);
    for (_, child) in &edges {
        if tree.node(*child).has_children() {
            layout_subtree(scene, tree, *child, visited, config)?;
        }
    }

    for (direction, child) in edges {
        let inverse = direction.inverse();
        if tree.node(id).positioned {
            let reference = anchor_box(&*scene, tree.node(id), direction)?;
            let mover = anchor_box(&*scene, tree.node(child), inverse)?;
            let target = placement(&reference, &mover, direction, config.min_spacing);
            debug!(
                "place {} {} of {} at ({}, {})",
                tree.node(child).name,
                direction,
                tree.node(id).name,
                target.x,
                target.y
            );
            tree.move_node(scene, child, target - mover.origin());
        } else {
            let reference = anchor_box(&*scene, tree.node(child), inverse)?;
            let mover = anchor_box(&*scene, tree.node(id), direction)?;
            let target = placement(&reference, &mover, inverse, config.min_spacing);
            debug!(
                "place {} {} of {} at ({}, {})",
                tree.node(id).name,
                inverse,
                tree.node(child).name,
                target.x,
                target.y
            );
            tree.move_node(scene, id, target - mover.origin());
            tree.node_mut(id).positioned = true;
        }
        tree.absorb(id, child);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::tree::{build_tree, NodeGeometry};
    use crate::layout::types::Size;
    use crate::parser::ast::Adjacency;
    use crate::scene::{HeadlessScene, ShapeId, Widget};
    use indexmap::IndexMap;

    fn scene_with(sizes: &[(f64, f64)]) -> (HeadlessScene, IndexMap<String, NodeGeometry<ShapeId>>) {
        let mut scene = HeadlessScene::new();
        let mut items = IndexMap::new();
        for (idx, (w, h)) in sizes.iter().enumerate() {
            let name = idx.to_string();
            let shape = scene.add_widget(&name, Widget::new("Box", &name, Size::new(*w, *h)));
            items.insert(name, NodeGeometry::Plain(shape));
        }
        (scene, items)
    }

    fn layout_of(edges: &[(usize, Direction, usize)]) -> Adjacency {
        let mut layout = Adjacency::new();
        for (from, direction, to) in edges {
            layout
                .entry(from.to_string())
                .or_default()
                .insert(*direction, to.to_string());
        }
        layout
    }

    fn origin(scene: &HeadlessScene, name: &str) -> Point {
        scene.position(scene.find(name).unwrap())
    }

    fn run(sizes: &[(f64, f64)], edges: &[(usize, Direction, usize)]) -> HeadlessScene {
        let (mut scene, items) = scene_with(sizes);
        let mut tree = build_tree(&items, &layout_of(edges)).unwrap();
        layout(&mut scene, &mut tree, &LayoutConfig::default()).unwrap();
        scene
    }

    fn overlaps(scene: &HeadlessScene) -> bool {
        scene
            .items()
            .any(|(id, _)| !scene.colliding_shapes(id).is_empty())
    }

    #[test]
    fn test_star_of_four() {
        let scene = run(
            &[(12.0, 3.0), (21.0, 3.0), (12.0, 6.0), (3.0, 3.0), (9.0, 3.0)],
            &[
                (0, Direction::West, 1),
                (0, Direction::East, 2),
                (0, Direction::North, 3),
                (0, Direction::South, 4),
            ],
        );

        assert_eq!(origin(&scene, "1"), Point::new(0.0, 0.0));
        assert_eq!(origin(&scene, "0"), Point::new(51.0, 0.0));
        assert_eq!(origin(&scene, "2"), Point::new(93.0, -1.5));
        assert_eq!(origin(&scene, "3"), Point::new(55.5, -33.0));
        assert_eq!(origin(&scene, "4"), Point::new(52.5, 33.0));
        assert!(!overlaps(&scene));
    }

    #[test]
    fn test_east_is_centered_vertically() {
        let scene = run(&[(40.0, 20.0), (10.0, 60.0)], &[(0, Direction::East, 1)]);
        let a = scene.bounding_box(scene.find("0").unwrap());
        let b = scene.bounding_box(scene.find("1").unwrap());

        assert_eq!(b.x, a.right() + 30.0);
        assert_eq!(a.center().y, b.center().y);
    }

    #[test]
    fn test_intercardinal_offsets_both_axes() {
        let scene = run(&[(10.0, 10.0), (20.0, 5.0)], &[(0, Direction::SouthEast, 1)]);
        let a = scene.bounding_box(scene.find("0").unwrap());
        let b = scene.bounding_box(scene.find("1").unwrap());

        assert_eq!(b.x, a.right() + 30.0);
        assert_eq!(b.y, a.bottom() + 30.0);
    }

    #[test]
    fn test_spiral_folds_onto_itself() {
        let scene = run(
            &[(3.0, 3.0); 6],
            &[
                (0, Direction::North, 1),
                (1, Direction::East, 2),
                (2, Direction::South, 3),
                (3, Direction::West, 4),
                (4, Direction::North, 5),
            ],
        );
        assert_eq!(origin(&scene, "5"), Point::new(0.0, 0.0));
        assert_eq!(origin(&scene, "4"), Point::new(0.0, 33.0));
        assert_eq!(origin(&scene, "3"), Point::new(33.0, 33.0));
        assert_eq!(origin(&scene, "2"), Point::new(33.0, 0.0));
        // each step only clears its direct neighbour, so the ends meet
        assert_eq!(origin(&scene, "1"), Point::new(0.0, 0.0));
        assert_eq!(origin(&scene, "0"), Point::new(0.0, 33.0));
        assert!(overlaps(&scene));
    }

    #[test]
    fn test_group_anchor_lands_next_to_neighbour() {
        let mut scene = HeadlessScene::new();
        let a = scene.add_widget("a", Widget::new("Box", "a", Size::new(10.0, 10.0)));
        let left = scene.add_widget("g.left", Widget::new("Box", "g.left", Size::new(10.0, 10.0)));
        let right = scene.add_widget("g.right", Widget::new("Box", "g.right", Size::new(10.0, 30.0)));
        scene.set_position(right, Point::new(40.0, 0.0));

        let mut anchors = IndexMap::new();
        anchors.insert(Direction::West, right);
        let mut items = IndexMap::new();
        items.insert("a".to_string(), NodeGeometry::Plain(a));
        items.insert(
            "g".to_string(),
            NodeGeometry::Group {
                shapes: vec![left, right],
                anchors,
            },
        );
        let mut adjacency = Adjacency::new();
        adjacency
            .entry("a".to_string())
            .or_default()
            .insert(Direction::East, "g".to_string());

        let mut tree = build_tree(&items, &adjacency).unwrap();
        layout(&mut scene, &mut tree, &LayoutConfig::default()).unwrap();

        // spaced and centered against the west anchor, not the whole group
        assert_eq!(scene.position(a), Point::new(0.0, 10.0));
        assert_eq!(scene.position(left), Point::new(0.0, 0.0));
        assert_eq!(scene.position(right), Point::new(40.0, 0.0));
        assert_eq!(scene.position(right).x - scene.bounding_box(a).right(), 30.0);
    }

    #[test]
    fn test_group_without_facing_anchor() {
        let mut scene = HeadlessScene::new();
        let a = scene.add_widget("a", Widget::new("Box", "a", Size::new(10.0, 10.0)));
        let inner = scene.add_widget("g.x", Widget::new("Box", "g.x", Size::new(10.0, 10.0)));

        let mut items = IndexMap::new();
        items.insert("a".to_string(), NodeGeometry::Plain(a));
        items.insert(
            "g".to_string(),
            NodeGeometry::Group {
                shapes: vec![inner],
                anchors: IndexMap::new(),
            },
        );
        let mut adjacency = Adjacency::new();
        adjacency
            .entry("a".to_string())
            .or_default()
            .insert(Direction::East, "g".to_string());

        let mut tree = build_tree(&items, &adjacency).unwrap();
        let err = layout(&mut scene, &mut tree, &LayoutConfig::default()).unwrap_err();
        assert!(matches!(err, LayoutError::MissingAnchor { ref group, direction: Direction::West }
            if group == "g"));
    }

    #[test]
    fn test_placement_west() {
        let reference = BoundingBox::new(100.0, 0.0, 10.0, 10.0);
        let mover = BoundingBox::new(0.0, 0.0, 20.0, 4.0);
        let target = placement(&reference, &mover, Direction::West, 5.0);
        assert_eq!(target, Point::new(75.0, 3.0));
    }

    #[test]
    fn test_gap_ignores_wider_subtree() {
        // A east of B, C south of B; C overhangs B on both sides
        let scene = run(
            &[(100.0, 80.0), (40.0, 40.0), (60.0, 30.0)],
            &[(0, Direction::East, 1), (1, Direction::South, 2)],
        );
        let a = scene.bounding_box(scene.find("0").unwrap());
        let b = scene.bounding_box(scene.find("1").unwrap());
        let c = scene.bounding_box(scene.find("2").unwrap());

        assert_eq!(b.x - a.right(), 30.0);
        assert_eq!(c.y - b.bottom(), 30.0);
        assert_eq!(a.center().y, b.center().y);
        assert_eq!(b.center().x, c.center().x);
    }
}
