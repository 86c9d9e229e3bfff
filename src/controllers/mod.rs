mod drag;
mod first_person;
mod trackball;

pub use drag::DragTracker;
pub use first_person::FirstPersonCameraController;
pub use trackball::TrackballCameraController;

use glam::Vec3;

use crate::camera::Camera;
use crate::traits::CameraController;

/// Radians per pixel of cursor motion
pub const ROTATION_SENSITIVITY: f32 = 0.01;
/// Radians of roll per frame while a roll key is held
pub const ROLL_STEP: f32 = 0.001;
/// Closest the trackball zoom may bring the eye to its target
pub const ZOOM_EPSILON: f32 = 1e-4;
pub const WORLD_UP: Vec3 = Vec3::Y;

/// Selectable camera controller variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ControllerKind {
    FirstPerson,
    #[default]
    Trackball,
}

impl ControllerKind {
    pub const ALL: [ControllerKind; 2] = [ControllerKind::FirstPerson, ControllerKind::Trackball];

    pub fn label(&self) -> &'static str {
        match self {
            ControllerKind::FirstPerson => "First person",
            ControllerKind::Trackball => "Trackball",
        }
    }

    /// Construct a controller of this kind looking through `camera`
    pub fn build(self, camera: Camera, speed: f32) -> Box<dyn CameraController> {
        match self {
            ControllerKind::FirstPerson => Box::new(FirstPersonCameraController::new(camera, speed)),
            ControllerKind::Trackball => Box::new(TrackballCameraController::new(camera, speed)),
        }
    }
}

/// Replace `current` with a fresh controller of `kind`, carrying over its
/// camera and speed so the view does not jump.
pub fn swap_controller(current: &dyn CameraController, kind: ControllerKind) -> Box<dyn CameraController> {
    log::info!("switching camera controller to {}", kind.label());
    kind.build(current.camera(), current.speed())
}
