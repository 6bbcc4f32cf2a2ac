use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use glam::{Quat, Vec3};
use log::{info, warn};

use crate::error::TourError;
use crate::math::Aabb;
use crate::scene::{NodeId, SceneGraph, Transform};
use crate::traits::EnvironmentSource;

/// Environment source backed by a glTF asset on disk.
pub struct GltfEnvironment {
    path: PathBuf,
}

impl GltfEnvironment {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl EnvironmentSource for GltfEnvironment {
    fn load(&self) -> Result<SceneGraph, TourError> {
        load_gltf_scene(&self.path).map_err(|err| TourError::AssetUnreadable(format!("{err:#}")))
    }
}

/// Import a glTF file into a named-node scene graph.
///
/// Unlike a render-oriented import this keeps the node hierarchy, names, and
/// per-node TRS transforms intact; mesh geometry is reduced to a local-space
/// AABB per node, which is all picking needs.
pub fn load_gltf_scene(path: impl AsRef<Path>) -> Result<SceneGraph> {
    let path = path.as_ref();
    let (document, buffers, _images) =
        gltf::import(path).with_context(|| format!("importing glTF asset {path:?}"))?;

    let mut graph = SceneGraph::new();
    for scene in document.scenes() {
        for node in scene.nodes() {
            import_node(&node, &buffers, None, &mut graph);
        }
    }

    info!(
        "imported {} nodes across {} scenes from {:?}",
        graph.len(),
        document.scenes().count(),
        path
    );
    if graph.is_empty() {
        warn!("glTF asset {path:?} contained no nodes");
    }
    Ok(graph)
}

fn import_node(
    node: &gltf::Node,
    buffers: &[gltf::buffer::Data],
    parent: Option<NodeId>,
    graph: &mut SceneGraph,
) {
    let (translation, rotation, scale) = node.transform().decomposed();
    let local = Transform {
        translation: Vec3::from_array(translation),
        rotation: Quat::from_array(rotation),
        scale: Vec3::from_array(scale),
    };
    let bounds = node.mesh().and_then(|mesh| mesh_bounds(&mesh, buffers));
    let id = graph.add_node(node.name(), parent, local, bounds);

    for child in node.children() {
        import_node(&child, buffers, Some(id), graph);
    }
}

/// Local-space bounds over every primitive's positions.
fn mesh_bounds(mesh: &gltf::Mesh, buffers: &[gltf::buffer::Data]) -> Option<Aabb> {
    let mut bounds: Option<Aabb> = None;
    for primitive in mesh.primitives() {
        let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()]));
        let Some(positions) = reader.read_positions() else {
            continue;
        };
        if let Some(prim) = Aabb::from_points(positions.map(Vec3::from_array)) {
            bounds = Some(match bounds {
                Some(existing) => existing.union(prim),
                None => prim,
            });
        }
    }
    bounds
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_asset_is_unreadable_not_a_panic() {
        let source = GltfEnvironment::new("/nonexistent/winter_cottage.glb");
        assert!(matches!(
            source.load(),
            Err(TourError::AssetUnreadable(_))
        ));
    }
}
