//! Programmatic demo environment.
//!
//! A small winter cottage with every named node the built-in tour script
//! references, used by the binary when no glTF asset is supplied and by the
//! integration tests. Camera markers are authored as position/target pairs;
//! their node rotation points +Z at the target per the authoring-tool
//! convention the waypoint extractor compensates for.

use glam::{Quat, Vec3};

use crate::error::TourError;
use crate::math::Aabb;
use crate::scene::{NodeId, SceneGraph, Transform};
use crate::traits::EnvironmentSource;

/// Environment source wrapping [`create_demo_scene`].
#[derive(Debug, Default, Clone, Copy)]
pub struct DemoEnvironment;

impl EnvironmentSource for DemoEnvironment {
    fn load(&self) -> Result<SceneGraph, TourError> {
        Ok(create_demo_scene())
    }
}

/// Camera markers: eye position and the point the shot frames.
const CAMERA_STOPS: [([f32; 3], [f32; 3]); 18] = [
    ([0.0, 2.2, 16.0], [0.0, 1.8, 0.0]),   // the gate
    ([0.8, 2.0, 13.0], [0.0, 1.8, 0.0]),   // up the path
    ([1.6, 1.9, 10.0], [-1.0, 1.2, 4.0]),  // the garden, snowman to the left
    ([0.9, 1.8, 7.5], [0.0, 1.5, 2.1]),    // closer, framing the door
    ([0.0, 1.6, 5.0], [0.0, 1.4, 2.1]),    // the porch
    ([0.0, 1.6, 2.8], [0.0, 1.5, 0.0]),    // stepping through
    ([0.0, 1.6, 1.0], [-1.0, 1.3, -1.2]),  // the hallway
    ([-0.8, 1.5, 0.4], [-2.4, 1.0, -1.6]), // the hearth
    ([-1.6, 1.5, -0.2], [0.5, 1.4, -1.9]), // by the window
    ([0.6, 1.5, -0.4], [1.9, 1.1, -1.6]),  // the kitchen
    ([1.0, 1.4, -0.2], [1.9, 1.0, -1.4]),  // the desk from afar
    ([1.5, 1.3, -0.7], [1.9, 0.95, -1.4]), // the letter
    ([0.6, 1.7, -0.6], [0.0, 2.6, -1.8]),  // up the stairs
    ([0.2, 2.6, -1.2], [-0.9, 2.2, -1.9]), // the bedroom
    ([0.1, 2.5, -1.0], [-0.9, 2.2, -1.9]), // morning, same room
    ([0.2, 1.7, 0.2], [-2.2, 0.8, 0.6]),   // down again, toward the tree
    ([-0.9, 1.5, 1.4], [-2.2, 0.9, 0.4]),  // the tree
    ([-1.2, 1.3, 1.6], [-2.2, 0.6, 0.4]),  // the presents
];

/// Quaternion pointing a node's +Z axis from `position` at `target`.
fn aim(position: Vec3, target: Vec3) -> Quat {
    let dir = (target - position).normalize();
    let yaw = dir.x.atan2(dir.z);
    let pitch = -dir.y.asin();
    Quat::from_rotation_y(yaw) * Quat::from_rotation_x(pitch)
}

fn prop(
    scene: &mut SceneGraph,
    name: &str,
    parent: NodeId,
    translation: Vec3,
    half_size: Vec3,
) -> NodeId {
    scene.add_node(
        Some(name),
        Some(parent),
        Transform::from_translation(translation),
        Some(Aabb::new(-half_size, half_size)),
    )
}

/// Build the demo cottage.
pub fn create_demo_scene() -> SceneGraph {
    let mut scene = SceneGraph::new();
    let root = scene.add_node(Some("Root"), None, Transform::IDENTITY, None);

    // Grouping node for the building; carries no geometry so it never
    // occludes picking rays into the interior.
    let house = scene.add_node(Some("House_001"), Some(root), Transform::IDENTITY, None);

    // Door group sits at the hinge; the pickable panel hangs half a meter
    // towards the opening so hinge rotation swings it.
    let door = scene.add_node(
        Some("Door_001"),
        Some(house),
        Transform::from_translation(Vec3::new(-0.55, 1.1, 2.1)),
        None,
    );
    prop(
        &mut scene,
        "DoorPanel_001",
        door,
        Vec3::new(0.55, 0.0, 0.0),
        Vec3::new(0.55, 1.1, 0.05),
    );

    // Interior furniture.
    let desk = prop(
        &mut scene,
        "Desk_001",
        house,
        Vec3::new(1.9, 0.8, -1.4),
        Vec3::new(0.5, 0.05, 0.35),
    );
    prop(
        &mut scene,
        "Paper_001",
        desk,
        Vec3::new(0.0, 0.1, 0.0),
        Vec3::new(0.15, 0.02, 0.11),
    );
    prop(
        &mut scene,
        "Fireplace_001",
        house,
        Vec3::new(-2.4, 0.9, -1.6),
        Vec3::new(0.6, 0.9, 0.4),
    );
    prop(
        &mut scene,
        "Bed_001",
        house,
        Vec3::new(-0.9, 2.2, -1.9),
        Vec3::new(0.8, 0.3, 1.0),
    );

    // Tree and presents in the living-room corner.
    let tree = prop(
        &mut scene,
        "Tree_001",
        house,
        Vec3::new(-2.2, 1.2, 0.4),
        Vec3::new(0.6, 1.2, 0.6),
    );
    let present_spots = [
        Vec3::new(-0.6, -1.0, 0.9),
        Vec3::new(0.3, -1.0, 1.0),
        Vec3::new(0.8, -1.05, 0.4),
        Vec3::new(-0.2, -0.95, 1.4),
    ];
    for (i, spot) in present_spots.iter().enumerate() {
        prop(
            &mut scene,
            &format!("Present_00{}", i + 1),
            tree,
            *spot,
            Vec3::splat(0.18),
        );
    }

    // Snowman out in the garden plus its scripted story positions.
    prop(
        &mut scene,
        "Snowman_002",
        root,
        Vec3::new(-2.5, 0.9, 5.5),
        Vec3::new(0.5, 0.9, 0.5),
    );
    for (i, position) in [
        Vec3::new(0.9, 0.9, -0.1),
        Vec3::new(-3.0, 0.9, 7.0),
        Vec3::new(2.4, 0.9, 6.2),
    ]
    .iter()
    .enumerate()
    {
        let name = format!("snowMan_pos{}", i + 1);
        scene.add_node(
            Some(&name),
            Some(root),
            Transform::from_translation(*position),
            None,
        );
    }

    // Camera markers.
    for (i, (position, target)) in CAMERA_STOPS.iter().enumerate() {
        let position = Vec3::from_array(*position);
        let target = Vec3::from_array(*target);
        let name = format!("camAngle_{i}");
        scene.add_node(
            Some(&name),
            Some(root),
            Transform {
                translation: position,
                rotation: aim(position, target),
                scale: Vec3::ONE,
            },
            None,
        );
    }

    scene
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TourScript;
    use crate::waypoints::extract_waypoints;

    #[test]
    fn demo_scene_carries_every_scripted_node() {
        let scene = create_demo_scene();
        let script = TourScript::builtin();

        for spec in &script.waypoints {
            assert!(scene.find(&spec.name).is_some(), "missing {}", spec.name);
        }
        for name in [
            &script.door_node,
            &script.letter_node,
            &script.character_node,
            &script.character_spawn,
        ] {
            assert!(scene.find(name).is_some(), "missing {name}");
        }
        for present in &script.presents {
            assert!(scene.find(present).is_some(), "missing {present}");
        }
    }

    #[test]
    fn all_waypoints_extract_from_the_demo_scene() {
        let scene = create_demo_scene();
        let script = TourScript::builtin();
        let waypoints = extract_waypoints(&scene, &script.waypoints).expect("full set");
        assert_eq!(waypoints.len(), 18);
    }

    #[test]
    fn aim_points_positive_z_at_the_target() {
        let position = Vec3::new(0.0, 2.0, 10.0);
        let target = Vec3::new(1.0, 1.0, 2.0);
        let rotation = aim(position, target);

        let forward = rotation * Vec3::Z;
        let expected = (target - position).normalize();
        assert!((forward - expected).length() < 1e-4);
    }
}
