use glam::Vec3;

use super::drag::DragTracker;
use super::{ControllerKind, ROLL_STEP, ROTATION_SENSITIVITY, WORLD_UP};
use crate::camera::Camera;
use crate::traits::{Button, CameraController, InputState};

/// Fly-through camera: keys translate and roll the camera in its own frame,
/// dragging with the left button tilts and yaws it about the eye.
///
/// | input | motion |
/// | --- | --- |
/// | W / S | dolly in / out |
/// | A / D | truck left / right |
/// | Up / Down | pedestal up / down |
/// | Q / E | roll |
/// | left drag | pan (x) and tilt (y) |
#[derive(Debug, Clone)]
pub struct FirstPersonCameraController {
    camera: Camera,
    drag: DragTracker,
    speed: f32,
    world_up: Vec3,
}

impl FirstPersonCameraController {
    pub fn new(camera: Camera, speed: f32) -> Self {
        Self {
            camera,
            drag: DragTracker::new(Button::MouseLeft),
            speed,
            world_up: WORLD_UP,
        }
    }
}

/// +1, -1 or 0 depending on which of a key pair is held
fn axis(input: &dyn InputState, positive: Button, negative: Button) -> f32 {
    let mut value = 0.0;
    if input.is_down(positive) {
        value += 1.0;
    }
    if input.is_down(negative) {
        value -= 1.0;
    }
    value
}

impl CameraController for FirstPersonCameraController {
    fn update(&mut self, input: &dyn InputState, elapsed_time: f32) -> bool {
        let cursor_delta = self.drag.cursor_delta(input);

        let step = self.speed * elapsed_time;
        let dolly_in = step * axis(input, Button::KeyW, Button::KeyS);
        let truck_left = step * axis(input, Button::KeyA, Button::KeyD);
        let pedestal_up = step * axis(input, Button::ArrowUp, Button::ArrowDown);
        let roll_angle = ROLL_STEP * axis(input, Button::KeyE, Button::KeyQ);

        // cursor moving right pans the view right, i.e. a negative pan-left angle
        let pan_angle = -ROTATION_SENSITIVITY * cursor_delta.x;
        let tilt_angle = ROTATION_SENSITIVITY * cursor_delta.y;

        let has_moved = [truck_left, pedestal_up, dolly_in, pan_angle, tilt_angle, roll_angle]
            .iter()
            .any(|&v| v != 0.0);
        if !has_moved {
            return false;
        }

        self.camera = self
            .camera
            .move_local(truck_left, pedestal_up, dolly_in)
            .rotate_local(roll_angle, tilt_angle, 0.0)
            .rotate_world(pan_angle, self.world_up);

        true
    }

    fn camera(&self) -> Camera {
        self.camera
    }

    fn set_camera(&mut self, camera: Camera) {
        self.camera = camera;
    }

    fn kind(&self) -> ControllerKind {
        ControllerKind::FirstPerson
    }

    fn speed(&self) -> f32 {
        self.speed
    }

    fn set_speed(&mut self, speed: f32) {
        self.speed = speed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::InputSnapshot;

    fn controller() -> FirstPersonCameraController {
        let camera = Camera::new(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, Vec3::Y);
        FirstPersonCameraController::new(camera, 2.0)
    }

    #[test]
    fn idle_frame_reports_no_change() {
        let mut controller = controller();
        let before = controller.camera();

        assert!(!controller.update(&InputSnapshot::new(), 0.016));
        assert_eq!(controller.camera(), before);
    }

    #[test]
    fn held_button_without_motion_reports_no_change() {
        let mut controller = controller();
        let input = InputSnapshot::new()
            .with_pressed(Button::MouseLeft)
            .with_cursor(300.0, 200.0);

        assert!(!controller.update(&input, 0.016));
        assert!(!controller.update(&input, 0.016));
    }

    #[test]
    fn forward_key_dollies_by_speed_times_time() {
        let mut controller = controller();
        let input = InputSnapshot::new().with_pressed(Button::KeyW);

        assert!(controller.update(&input, 0.5));
        let eye = controller.camera().eye();
        assert!(eye.abs_diff_eq(Vec3::new(0.0, 0.0, 4.0), 1e-5), "eye = {:?}", eye);
    }

    #[test]
    fn opposite_keys_cancel() {
        let mut controller = controller();
        let input = InputSnapshot::new()
            .with_pressed(Button::KeyA)
            .with_pressed(Button::KeyD);

        assert!(!controller.update(&input, 0.5));
    }

    #[test]
    fn roll_step_ignores_elapsed_time() {
        let mut controller = controller();
        let input = InputSnapshot::new().with_pressed(Button::KeyE);

        assert!(controller.update(&input, 0.0));
        let up = controller.camera().up();
        assert!((up.x.abs() - ROLL_STEP.sin()).abs() < 1e-6, "up = {:?}", up);
        assert!(up.z.abs() < 1e-6);
    }

    #[test]
    fn zero_elapsed_time_translation_is_no_change() {
        let mut controller = controller();
        let input = InputSnapshot::new().with_pressed(Button::KeyW);
        assert!(!controller.update(&input, 0.0));
    }

    #[test]
    fn drag_right_yaws_about_world_up() {
        let mut controller = controller();
        let mut input = InputSnapshot::new()
            .with_pressed(Button::MouseLeft)
            .with_cursor(0.0, 0.0);
        controller.update(&input, 0.0);

        input.set_cursor(10.0, 0.0);
        assert!(controller.update(&input, 0.0));

        let camera = controller.camera();
        assert!(camera.eye().abs_diff_eq(Vec3::new(0.0, 0.0, 5.0), 1e-5));
        // pan angle -0.1 about +Y turns the -Z view toward +X
        let front = camera.front();
        assert!((front.x - 0.1f32.sin()).abs() < 1e-5, "front = {:?}", front);
        assert!((front.z + 0.1f32.cos()).abs() < 1e-5);
    }
}
