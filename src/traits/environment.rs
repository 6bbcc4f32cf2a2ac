use crate::error::TourError;
use crate::scene::SceneGraph;

/// Environment provider abstraction: yields the named-node scene graph the
/// tour runs inside, once, at startup.
pub trait EnvironmentSource {
    fn load(&self) -> Result<SceneGraph, TourError>;
}
