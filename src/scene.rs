//! Scene abstraction: the drawing surface shapes and lines are added to
//!
//! The layout engine is generic over [`Scene`]. [`HeadlessScene`] keeps
//! everything in memory and backs the CLI, the SVG renderer and the tests.

use std::fmt;
use std::hash::Hash;

use indexmap::IndexMap;

use crate::layout::types::{BoundingBox, LineSegment, Point, Size};

/// An append-only surface holding positioned shapes and connector lines
pub trait Scene {
    type Widget;
    /// Handle to a shape owned by the scene
    type Shape: Copy + Eq + Hash + fmt::Debug;

    /// Take ownership of `widget` and place it at the origin
    fn add_widget(&mut self, name: &str, widget: Self::Widget) -> Self::Shape;

    fn contains(&self, shape: Self::Shape) -> bool;

    /// Name the shape was added under
    fn shape_name(&self, shape: Self::Shape) -> Option<String>;

    /// Top-left corner in scene coordinates
    fn position(&self, shape: Self::Shape) -> Point;

    fn set_position(&mut self, shape: Self::Shape, position: Point);

    fn size(&self, shape: Self::Shape) -> Size;

    fn add_line(&mut self, line: LineSegment);

    /// Other shapes whose boxes overlap `shape`; lines never collide
    fn colliding_shapes(&self, shape: Self::Shape) -> Vec<Self::Shape>;

    fn bounding_box(&self, shape: Self::Shape) -> BoundingBox {
        BoundingBox::from_origin(self.position(shape), self.size(shape))
    }
}

/// A widget as produced by the [`Catalog`](crate::catalog::Catalog) factory
#[derive(Debug, Clone, PartialEq)]
pub struct Widget {
    pub class: String,
    /// Object name given at creation
    pub name: String,
    pub size: Size,
    pub label: Option<String>,
    pub properties: IndexMap<String, String>,
}

impl Widget {
    pub fn new(class: impl Into<String>, name: impl Into<String>, size: Size) -> Self {
        Self {
            class: class.into(),
            name: name.into(),
            size,
            label: None,
            properties: IndexMap::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShapeId(usize);

#[derive(Debug, Clone)]
pub struct SceneItem {
    /// Name the shape was registered under (the component path)
    pub name: String,
    pub widget: Widget,
    pub position: Point,
}

impl SceneItem {
    pub fn bounds(&self) -> BoundingBox {
        BoundingBox::from_origin(self.position, self.widget.size)
    }
}

/// In-memory [`Scene`] implementation
#[derive(Debug, Clone, Default)]
pub struct HeadlessScene {
    items: Vec<SceneItem>,
    lines: Vec<LineSegment>,
}

impl HeadlessScene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> impl Iterator<Item = (ShapeId, &SceneItem)> {
        self.items
            .iter()
            .enumerate()
            .map(|(idx, item)| (ShapeId(idx), item))
    }

    pub fn item(&self, shape: ShapeId) -> Option<&SceneItem> {
        self.items.get(shape.0)
    }

    /// Look a shape up by the name it was added under
    pub fn find(&self, name: &str) -> Option<ShapeId> {
        self.items
            .iter()
            .position(|item| item.name == name)
            .map(ShapeId)
    }

    pub fn lines(&self) -> &[LineSegment] {
        &self.lines
    }

    /// Bounds of everything in the scene, lines included
    pub fn bounds(&self) -> Option<BoundingBox> {
        self.items
            .iter()
            .map(SceneItem::bounds)
            .chain(self.lines.iter().map(LineSegment::bounds))
            .reduce(|a, b| a.union(&b))
    }
}

impl Scene for HeadlessScene {
    type Widget = Widget;
    type Shape = ShapeId;

    fn add_widget(&mut self, name: &str, widget: Widget) -> ShapeId {
        self.items.push(SceneItem {
            name: name.to_string(),
            widget,
            position: Point::default(),
        });
        ShapeId(self.items.len() - 1)
    }

    fn contains(&self, shape: ShapeId) -> bool {
        shape.0 < self.items.len()
    }

    fn shape_name(&self, shape: ShapeId) -> Option<String> {
        self.item(shape).map(|item| item.name.clone())
    }

    fn position(&self, shape: ShapeId) -> Point {
        self.item(shape).map(|item| item.position).unwrap_or_default()
    }

    fn set_position(&mut self, shape: ShapeId, position: Point) {
        if let Some(item) = self.items.get_mut(shape.0) {
            item.position = position;
        }
    }

    fn size(&self, shape: ShapeId) -> Size {
        self.item(shape).map(|item| item.widget.size).unwrap_or_default()
    }

    fn add_line(&mut self, line: LineSegment) {
        self.lines.push(line);
    }

    fn colliding_shapes(&self, shape: ShapeId) -> Vec<ShapeId> {
        let Some(target) = self.item(shape).map(SceneItem::bounds) else {
            return Vec::new();
        };
        self.items()
            .filter(|(id, item)| *id != shape && item.bounds().intersects(&target))
            .map(|(id, _)| id)
            .collect()
    }
}
