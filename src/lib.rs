pub mod camera;
pub mod cli;
pub mod controllers;
pub mod core;
pub mod gpu;
pub mod gui;
pub mod loaders;
pub mod math;
pub mod render;
pub mod scene;
pub mod traits;

pub use camera::Camera;
pub use controllers::{swap_controller, ControllerKind, FirstPersonCameraController, TrackballCameraController};
pub use loaders::load_scene;
pub use scene::SceneDocument;
pub use traits::{Button, CameraController, GraphicsContext, InputState, Uniform};
