//! Post-layout overlap check
//!
//! The engine never avoids collisions on its own; this pass reports any
//! pair of shapes whose boxes overlap once layout is done. Connector lines
//! are not shapes and are never checked.

use std::collections::{HashMap, HashSet};
use std::fmt;

use indexmap::IndexMap;
use log::{debug, warn};

use crate::scene::Scene;

/// Two named shapes whose boxes overlap
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collision {
    pub name: String,
    pub other: String,
}

impl fmt::Display for Collision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' overlaps '{}'", self.name, self.other)
    }
}

/// Every overlapping pair involving `shapes`, each pair reported once
///
/// A shape outside `shapes` that overlaps one of them is reported under its
/// scene name. Pairs made only of such shapes are not looked for.
pub fn find_collisions<Sc: Scene>(
    scene: &Sc,
    shapes: &IndexMap<String, Sc::Shape>,
) -> Vec<Collision> {
    let names: HashMap<Sc::Shape, &str> = shapes
        .iter()
        .map(|(name, shape)| (*shape, name.as_str()))
        .collect();

    let mut seen = HashSet::new();
    let mut collisions = Vec::new();
    for (name, shape) in shapes {
        for other in scene.colliding_shapes(*shape) {
            if seen.contains(&(other, *shape)) || !seen.insert((*shape, other)) {
                continue;
            }
            let other_name = match names.get(&other) {
                Some(listed) => listed.to_string(),
                None => scene
                    .shape_name(other)
                    .unwrap_or_else(|| format!("{:?}", other)),
            };
            collisions.push(Collision {
                name: name.clone(),
                other: other_name,
            });
        }
    }
    collisions
}

/// True when no two of `shapes` overlap
pub fn validate<Sc: Scene>(scene: &Sc, shapes: &IndexMap<String, Sc::Shape>) -> bool {
    let collisions = find_collisions(scene, shapes);
    for collision in &collisions {
        warn!("Collision: {}", collision);
    }
    debug!(
        "validated {} shapes, {} collisions",
        shapes.len(),
        collisions.len()
    );
    collisions.is_empty()
}
