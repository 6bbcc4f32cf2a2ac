use crate::camera::Camera;
use crate::scene::SceneGraph;

/// Draw-the-frame abstraction. The tour hands over the current scene and
/// camera; what happens after that is the host's business.
pub trait Renderer {
    fn draw_frame(&mut self, scene: &SceneGraph, camera: &Camera);
}
