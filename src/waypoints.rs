use glam::Quat;
use log::warn;

use crate::config::WaypointSpec;
use crate::error::TourError;
use crate::scene::SceneGraph;

/// An authored camera pose on the tour path plus its caption.
#[derive(Debug, Clone)]
pub struct Waypoint {
    pub index: usize,
    pub position: glam::Vec3,
    pub orientation: Quat,
    pub title: String,
    pub description: String,
}

/// Resolve the scripted waypoint list against the environment.
///
/// Entries whose node is missing are skipped with a warning and the output
/// indices are compacted. The authoring tool points camera nodes down +Z
/// while the runtime camera looks down -Z, so every orientation gets half a
/// turn about the vertical axis. Returns `EmptyWaypointSet` when nothing
/// resolves; the tour must not start in that case.
pub fn extract_waypoints(
    scene: &SceneGraph,
    specs: &[WaypointSpec],
) -> Result<Vec<Waypoint>, TourError> {
    let flip = Quat::from_rotation_y(std::f32::consts::PI);
    let mut waypoints = Vec::with_capacity(specs.len());

    for spec in specs {
        let Some(id) = scene.find(&spec.name) else {
            warn!("{}, skipping waypoint", TourError::MissingNode(spec.name.clone()));
            continue;
        };
        let (position, rotation) = scene.world_transform(id);
        waypoints.push(Waypoint {
            index: waypoints.len(),
            position,
            orientation: (rotation * flip).normalize(),
            title: spec.title.clone(),
            description: spec.description.clone(),
        });
    }

    if waypoints.is_empty() {
        return Err(TourError::EmptyWaypointSet);
    }
    align_hemispheres(&mut waypoints);
    Ok(waypoints)
}

/// Flip quaternion signs so consecutive orientations share a hemisphere and
/// slerp takes the short way around. Runs strictly left to right after full
/// extraction: each decision compares against the already-corrected
/// predecessor.
fn align_hemispheres(waypoints: &mut [Waypoint]) {
    for i in 1..waypoints.len() {
        if waypoints[i - 1].orientation.dot(waypoints[i].orientation) < 0.0 {
            waypoints[i].orientation = -waypoints[i].orientation;
        }
    }
}
