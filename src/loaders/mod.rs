pub mod gltf;

pub use gltf::{load_scene, load_scene_from_slice};
