use std::collections::HashMap;

use glam::{Mat4, Quat, Vec3};

use crate::math::Aabb;

/// Handle to a node in a [`SceneGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// Local translation/rotation/scale of a scene node.
#[derive(Debug, Clone, Copy)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Transform {
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Self::IDENTITY
        }
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }
}

/// One node of the environment hierarchy.
#[derive(Debug, Clone)]
pub struct SceneNode {
    pub name: Option<String>,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub local: Transform,
    /// Local-space bounds. Nodes without geometry carry none and are
    /// invisible to ray picking.
    pub bounds: Option<Aabb>,
}

/// Named-node scene hierarchy produced by the environment source.
///
/// Storage is a flat arena; `NodeId`s stay valid for the graph's lifetime.
/// Animations mutate local rotation/scale in place, so world queries always
/// reflect the current state of the hierarchy.
#[derive(Debug, Default, Clone)]
pub struct SceneGraph {
    nodes: Vec<SceneNode>,
    by_name: HashMap<String, NodeId>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node. The first node registered under a name wins the
    /// lookup; later duplicates stay addressable by id only.
    pub fn add_node(
        &mut self,
        name: Option<&str>,
        parent: Option<NodeId>,
        local: Transform,
        bounds: Option<Aabb>,
    ) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(SceneNode {
            name: name.map(str::to_string),
            parent,
            children: Vec::new(),
            local,
            bounds,
        });
        if let Some(parent) = parent {
            self.nodes[parent.0].children.push(id);
        }
        if let Some(name) = name {
            self.by_name.entry(name.to_string()).or_insert(id);
        }
        id
    }

    pub fn find(&self, name: &str) -> Option<NodeId> {
        self.by_name.get(name).copied()
    }

    pub fn node(&self, id: NodeId) -> &SceneNode {
        &self.nodes[id.0]
    }

    pub fn name(&self, id: NodeId) -> Option<&str> {
        self.nodes[id.0].name.as_deref()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn local(&self, id: NodeId) -> &Transform {
        &self.nodes[id.0].local
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = NodeId> {
        (0..self.nodes.len()).map(NodeId)
    }

    /// World matrix via the parent chain.
    pub fn world_matrix(&self, id: NodeId) -> Mat4 {
        let mut matrix = self.nodes[id.0].local.matrix();
        let mut current = self.nodes[id.0].parent;
        while let Some(parent) = current {
            matrix = self.nodes[parent.0].local.matrix() * matrix;
            current = self.nodes[parent.0].parent;
        }
        matrix
    }

    /// World position and orientation, composed without matrix
    /// decomposition so the quaternion keeps its sign.
    pub fn world_transform(&self, id: NodeId) -> (Vec3, Quat) {
        let node = &self.nodes[id.0];
        let mut translation = node.local.translation;
        let mut rotation = node.local.rotation;
        let mut current = node.parent;
        while let Some(parent) = current {
            let up = &self.nodes[parent.0].local;
            translation = up.rotation * (up.scale * translation) + up.translation;
            rotation = up.rotation * rotation;
            current = self.nodes[parent.0].parent;
        }
        (translation, rotation)
    }

    /// World-space bounds, if the node carries geometry.
    pub fn world_bounds(&self, id: NodeId) -> Option<Aabb> {
        let bounds = self.nodes[id.0].bounds?;
        Some(bounds.transformed(&self.world_matrix(id)))
    }

    /// Union of world bounds across a node and all its descendants. Grouping
    /// nodes report the extent of the geometry hanging under them.
    pub fn subtree_bounds(&self, id: NodeId) -> Option<Aabb> {
        let mut bounds = self.world_bounds(id);
        let mut stack = self.nodes[id.0].children.clone();
        while let Some(next) = stack.pop() {
            if let Some(child) = self.world_bounds(next) {
                bounds = Some(match bounds {
                    Some(current) => current.union(child),
                    None => child,
                });
            }
            stack.extend(self.nodes[next.0].children.iter().copied());
        }
        bounds
    }

    pub fn set_local_translation(&mut self, id: NodeId, translation: Vec3) {
        self.nodes[id.0].local.translation = translation;
    }

    pub fn set_local_rotation(&mut self, id: NodeId, rotation: Quat) {
        self.nodes[id.0].local.rotation = rotation;
    }

    pub fn set_local_scale(&mut self, id: NodeId, scale: Vec3) {
        self.nodes[id.0].local.scale = scale;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_resolves_first_registration() {
        let mut scene = SceneGraph::new();
        let first = scene.add_node(Some("Door_001"), None, Transform::IDENTITY, None);
        let _shadow = scene.add_node(Some("Door_001"), None, Transform::IDENTITY, None);
        assert_eq!(scene.find("Door_001"), Some(first));
        assert_eq!(scene.find("Window_001"), None);
    }

    #[test]
    fn world_transform_composes_parent_chain() {
        let mut scene = SceneGraph::new();
        let root = scene.add_node(
            Some("root"),
            None,
            Transform {
                translation: Vec3::new(10.0, 0.0, 0.0),
                rotation: Quat::from_rotation_y(std::f32::consts::FRAC_PI_2),
                scale: Vec3::ONE,
            },
            None,
        );
        let child = scene.add_node(
            Some("child"),
            Some(root),
            Transform::from_translation(Vec3::new(0.0, 0.0, 1.0)),
            None,
        );

        let (position, rotation) = scene.world_transform(child);
        // Root's quarter turn about Y maps +Z to +X.
        assert!((position - Vec3::new(11.0, 0.0, 0.0)).length() < 1e-5);
        let forward = rotation * Vec3::Z;
        assert!((forward - Vec3::X).length() < 1e-5);
    }

    #[test]
    fn world_bounds_follow_animation() {
        let mut scene = SceneGraph::new();
        let node = scene.add_node(
            Some("box"),
            None,
            Transform::IDENTITY,
            Some(Aabb::new(Vec3::splat(-0.5), Vec3::splat(0.5))),
        );

        scene.set_local_translation(node, Vec3::new(4.0, 0.0, 0.0));
        let bounds = scene.world_bounds(node).expect("box has geometry");
        assert!((bounds.center() - Vec3::new(4.0, 0.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn nodes_without_geometry_have_no_world_bounds() {
        let mut scene = SceneGraph::new();
        let group = scene.add_node(Some("group"), None, Transform::IDENTITY, None);
        assert!(scene.world_bounds(group).is_none());
    }

    #[test]
    fn subtree_bounds_cover_descendant_geometry() {
        let mut scene = SceneGraph::new();
        let group = scene.add_node(
            Some("group"),
            None,
            Transform::from_translation(Vec3::new(2.0, 0.0, 0.0)),
            None,
        );
        scene.add_node(
            Some("mesh"),
            Some(group),
            Transform::from_translation(Vec3::new(1.0, 0.0, 0.0)),
            Some(Aabb::new(Vec3::splat(-0.5), Vec3::splat(0.5))),
        );

        let bounds = scene.subtree_bounds(group).expect("child geometry counts");
        assert!((bounds.center() - Vec3::new(3.0, 0.0, 0.0)).length() < 1e-5);
        assert!(scene.world_bounds(group).is_none());
    }
}
