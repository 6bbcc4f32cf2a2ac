pub mod gltf;

pub use gltf::{load_gltf_scene, GltfEnvironment};
