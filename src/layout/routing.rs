//! Connector lines between laid out nodes

use std::collections::HashSet;

use log::debug;

use super::error::LayoutError;
use super::tree::{DiagramTree, NodeId};
use super::types::{BoundingBox, LineSegment, Point};
use crate::parser::ast::Direction;
use crate::scene::Scene;

/// A line drawn for one layout edge
#[derive(Debug, Clone, PartialEq)]
pub struct Connection {
    pub from: String,
    pub to: String,
    /// Direction from `from` to `to`
    pub direction: Direction,
    pub line: LineSegment,
}

/// Attachment point on the `side` of a box
///
/// Cardinal sides attach at the middle of the edge, intercardinal sides at
/// the corner.
pub fn edge_point(bounds: &BoundingBox, side: Direction) -> Point {
    let x = match side.dx() {
        1 => bounds.width,
        -1 => 0.0,
        _ => bounds.width / 2.0,
    };
    let y = match side.dy() {
        1 => bounds.height,
        -1 => 0.0,
        _ => bounds.height / 2.0,
    };
    bounds.origin() + Point::new(x, y)
}

/// Add a line for every edge of the tree to the scene
pub fn connect<Sc: Scene>(
    scene: &mut Sc,
    tree: &DiagramTree<Sc::Shape>,
) -> Result<Vec<Connection>, LayoutError> {
    let mut visited = HashSet::new();
    let mut connections = Vec::new();
    connect_subtree(scene, tree, tree.root(), &mut visited, &mut connections)?;
    Ok(connections)
}

pub fn connect_subtree<Sc: Scene>(
    scene: &mut Sc,
    tree: &DiagramTree<Sc::Shape>,
    id: NodeId,
    visited: &mut HashSet<NodeId>,
    connections: &mut Vec<Connection>,
) -> Result<(), LayoutError> {
    if !visited.insert(id) {
        return Ok(());
    }

    let edges = tree.edges(id);
    for (_, child) in &edges {
        if tree.node(*child).has_children() {
            connect_subtree(scene, tree, *child, visited, connections)?;
        }
    }

    let node = tree.node(id);
    for (direction, child) in edges {
        let child = tree.node(child);
        let start = attachment(&*scene, &node.name, node.geometry.anchor(direction), direction)?;
        let end = attachment(
            &*scene,
            &child.name,
            child.geometry.anchor(direction.inverse()),
            direction.inverse(),
        )?;

        let line = LineSegment::new(start, end);
        debug!("connect {} -{}-> {}", node.name, direction, child.name);
        scene.add_line(line);
        connections.push(Connection {
            from: node.name.clone(),
            to: child.name.clone(),
            direction,
            line,
        });
    }
    Ok(())
}

fn attachment<Sc: Scene>(
    scene: &Sc,
    name: &str,
    anchor: Option<Sc::Shape>,
    side: Direction,
) -> Result<Point, LayoutError> {
    let shape = anchor.ok_or_else(|| LayoutError::missing_anchor(name, side))?;
    Ok(edge_point(&scene.bounding_box(shape), side))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::config::LayoutConfig;
    use crate::layout::engine::layout;
    use crate::layout::tree::{build_tree, NodeGeometry};
    use crate::layout::types::Size;
    use crate::parser::ast::Adjacency;
    use crate::scene::{HeadlessScene, Widget};
    use indexmap::IndexMap;

    #[test]
    fn test_edge_points() {
        let bounds = BoundingBox::new(10.0, 20.0, 40.0, 20.0);
        assert_eq!(edge_point(&bounds, Direction::North), Point::new(30.0, 20.0));
        assert_eq!(edge_point(&bounds, Direction::South), Point::new(30.0, 40.0));
        assert_eq!(edge_point(&bounds, Direction::East), Point::new(50.0, 30.0));
        assert_eq!(edge_point(&bounds, Direction::West), Point::new(10.0, 30.0));
        assert_eq!(edge_point(&bounds, Direction::NorthEast), Point::new(50.0, 20.0));
        assert_eq!(edge_point(&bounds, Direction::SouthWest), Point::new(10.0, 40.0));
    }

    #[test]
    fn test_lines_join_facing_edges() {
        let mut scene = HeadlessScene::new();
        let mut items = IndexMap::new();
        for (name, w, h) in [("a", 20.0, 10.0), ("b", 10.0, 10.0), ("c", 30.0, 6.0)] {
            let shape = scene.add_widget(name, Widget::new("Box", name, Size::new(w, h)));
            items.insert(name.to_string(), NodeGeometry::Plain(shape));
        }
        let mut adjacency = Adjacency::new();
        adjacency
            .entry("a".to_string())
            .or_default()
            .insert(Direction::East, "b".to_string());
        adjacency
            .entry("b".to_string())
            .or_default()
            .insert(Direction::South, "c".to_string());

        let mut tree = build_tree(&items, &adjacency).unwrap();
        layout(&mut scene, &mut tree, &LayoutConfig::default()).unwrap();
        let connections = connect(&mut scene, &tree).unwrap();

        assert_eq!(connections.len(), 2);
        assert_eq!(scene.lines().len(), 2);

        // b -> c is drawn first: subtrees are connected before their parent
        let bc = &connections[0];
        assert_eq!((bc.from.as_str(), bc.to.as_str()), ("b", "c"));
        let b = scene.bounding_box(scene.find("b").unwrap());
        let c = scene.bounding_box(scene.find("c").unwrap());
        assert_eq!(bc.line.start, Point::new(b.center().x, b.bottom()));
        assert_eq!(bc.line.end, Point::new(c.center().x, c.y));
        assert_eq!(bc.line.end.y - bc.line.start.y, 30.0);

        let ab = &connections[1];
        let a = scene.bounding_box(scene.find("a").unwrap());
        assert_eq!(ab.line.start, Point::new(a.right(), a.center().y));
        assert_eq!(ab.line.end, Point::new(b.x, b.center().y));
    }
}
