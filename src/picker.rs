use std::collections::HashMap;

use glam::Vec3;
use log::debug;

use crate::camera::Camera;
use crate::math::intersect_aabb;
use crate::scene::{NodeId, SceneGraph};

/// Most ancestors examined when matching a hit against the allow-list.
const MAX_ANCESTOR_DEPTH: usize = 32;

/// What an interactive node does when clicked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractiveKind {
    Door,
    Present,
    Letter,
}

/// One entry of the interactive registry. `is_open` is meaningful for doors
/// only.
#[derive(Debug, Clone)]
pub struct InteractiveNode {
    pub name: String,
    pub kind: InteractiveKind,
    pub is_open: bool,
}

/// Append-only registry of pointer-interactive node names.
///
/// Names accumulate over a session (door at start, the letter when its stop
/// arms, presents during the finale) and are never removed.
#[derive(Debug, Default)]
pub struct InteractiveSet {
    nodes: Vec<InteractiveNode>,
    by_name: HashMap<String, usize>,
}

impl InteractiveSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a name to the allow-list. Re-adding an existing name is a no-op.
    pub fn allow(&mut self, name: &str, kind: InteractiveKind) {
        if self.by_name.contains_key(name) {
            return;
        }
        debug!("allow-list grows: `{name}` ({kind:?})");
        self.by_name.insert(name.to_string(), self.nodes.len());
        self.nodes.push(InteractiveNode {
            name: name.to_string(),
            kind,
            is_open: false,
        });
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn kind_of(&self, name: &str) -> Option<InteractiveKind> {
        self.by_name.get(name).map(|&i| self.nodes[i].kind)
    }

    pub fn is_door_open(&self, name: &str) -> bool {
        self.by_name
            .get(name)
            .map(|&i| self.nodes[i].is_open)
            .unwrap_or(false)
    }

    pub fn set_door_open(&mut self, name: &str, open: bool) {
        if let Some(&i) = self.by_name.get(name) {
            self.nodes[i].is_open = open;
        }
    }

    /// Flip a door's state, returning the new one.
    pub fn toggle_door(&mut self, name: &str) -> bool {
        match self.by_name.get(name) {
            Some(&i) => {
                self.nodes[i].is_open = !self.nodes[i].is_open;
                self.nodes[i].is_open
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// A click resolved to an allow-listed node.
#[derive(Debug, Clone, PartialEq)]
pub struct Picked {
    /// The ancestor that matched the allow-list (not necessarily the mesh
    /// the ray hit).
    pub node: NodeId,
    pub name: String,
    pub kind: InteractiveKind,
}

/// Ray-based hit testing against the interactive allow-list.
#[derive(Debug, Default)]
pub struct InteractionPicker {
    hover: bool,
}

impl InteractionPicker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Update the hover flag from a pointer position (NDC, [-1, 1] per
    /// axis).
    pub fn pointer_move(
        &mut self,
        scene: &SceneGraph,
        camera: &Camera,
        interactives: &InteractiveSet,
        x: f32,
        y: f32,
    ) -> bool {
        self.hover = Self::pick(scene, camera, interactives, x, y).is_some();
        self.hover
    }

    pub fn hover(&self) -> bool {
        self.hover
    }

    /// Resolve a click. `None` when nothing interactive sits under the
    /// pointer; callers treat that as a no-op.
    pub fn click(
        &self,
        scene: &SceneGraph,
        camera: &Camera,
        interactives: &InteractiveSet,
        x: f32,
        y: f32,
    ) -> Option<Picked> {
        Self::pick(scene, camera, interactives, x, y)
    }

    fn pick(
        scene: &SceneGraph,
        camera: &Camera,
        interactives: &InteractiveSet,
        x: f32,
        y: f32,
    ) -> Option<Picked> {
        let (origin, dir) = camera.screen_ray(x, y);
        let hit = Self::nearest_hit(scene, origin, dir)?;
        Self::match_ancestor(scene, interactives, hit)
    }

    /// Nearest world-AABB intersection among nodes that carry geometry.
    fn nearest_hit(scene: &SceneGraph, origin: Vec3, dir: Vec3) -> Option<NodeId> {
        let mut best: Option<(NodeId, f32)> = None;
        for id in scene.ids() {
            let Some(bounds) = scene.world_bounds(id) else {
                continue;
            };
            if let Some(t) = intersect_aabb(origin, dir, &bounds) {
                if best.map_or(true, |(_, best_t)| t < best_t) {
                    best = Some((id, t));
                }
            }
        }
        best.map(|(id, _)| id)
    }

    /// Walk from the hit towards the root until an allow-listed name
    /// matches; only the first match acts. Depth-bounded so a malformed
    /// hierarchy cannot spin.
    fn match_ancestor(
        scene: &SceneGraph,
        interactives: &InteractiveSet,
        hit: NodeId,
    ) -> Option<Picked> {
        let mut current = Some(hit);
        for _ in 0..MAX_ANCESTOR_DEPTH {
            let id = current?;
            if let Some(name) = scene.name(id) {
                if let Some(kind) = interactives.kind_of(name) {
                    return Some(Picked {
                        node: id,
                        name: name.to_string(),
                        kind,
                    });
                }
            }
            current = scene.parent(id);
        }
        None
    }
}
