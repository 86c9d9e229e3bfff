use super::input::InputState;
use crate::camera::Camera;
use crate::controllers::ControllerKind;

/// Interactive camera control shared by the first-person and trackball modes
pub trait CameraController {
    /// Read input and advance the camera by `elapsed_time` seconds.
    /// Returns true if the camera changed this frame.
    fn update(&mut self, input: &dyn InputState, elapsed_time: f32) -> bool;

    /// Current camera value
    fn camera(&self) -> Camera;

    /// Replace the camera
    fn set_camera(&mut self, camera: Camera);

    /// Which variant this is
    fn kind(&self) -> ControllerKind;

    /// Translation speed in world units per second
    fn speed(&self) -> f32;

    fn set_speed(&mut self, speed: f32);
}
