use glam::{Quat, Vec3};

use super::drag::DragTracker;
use super::{ControllerKind, ROTATION_SENSITIVITY, WORLD_UP, ZOOM_EPSILON};
use crate::camera::Camera;
use crate::traits::{Button, CameraController, InputState};

/// Orbit camera around a fixed target, driven by middle-button drags.
///
/// | input | motion |
/// | --- | --- |
/// | Shift + drag | pan left / right |
/// | Ctrl + drag | zoom toward / away from the target |
/// | drag | orbit around the target |
#[derive(Debug, Clone)]
pub struct TrackballCameraController {
    camera: Camera,
    drag: DragTracker,
    speed: f32,
    world_up: Vec3,
}

impl TrackballCameraController {
    pub fn new(camera: Camera, speed: f32) -> Self {
        Self {
            camera,
            drag: DragTracker::new(Button::MouseMiddle),
            speed,
            world_up: WORLD_UP,
        }
    }

    fn zoom(&mut self, mut amount: f32) -> bool {
        if amount == 0.0 {
            return false;
        }

        let view = self.camera.center() - self.camera.eye();
        let view_length = view.length();

        // never step onto or past the target
        if amount > 0.0 {
            amount = amount.min(view_length - ZOOM_EPSILON);
        }

        let eye = self.camera.eye() + (view / view_length) * amount;
        self.camera = Camera::new(eye, self.camera.center(), self.world_up);
        true
    }

    /// Pitch about the camera's left axis first, then yaw about world up
    fn orbit(&mut self, horizontal: f32, vertical: f32) -> bool {
        let radius = self.camera.eye() - self.camera.center();

        let longitude = Quat::from_axis_angle(self.camera.left(), vertical);
        let latitude = Quat::from_axis_angle(self.world_up, -horizontal);
        let radius = latitude * (longitude * radius);

        let eye = self.camera.center() + radius;
        self.camera = Camera::new(eye, self.camera.center(), self.world_up);
        true
    }
}

impl CameraController for TrackballCameraController {
    fn update(&mut self, input: &dyn InputState, _elapsed_time: f32) -> bool {
        let cursor_delta = self.drag.cursor_delta(input);

        let horizontal = ROTATION_SENSITIVITY * cursor_delta.x;
        let vertical = ROTATION_SENSITIVITY * cursor_delta.y;
        if horizontal == 0.0 && vertical == 0.0 {
            return false;
        }

        if input.is_down(Button::Shift) {
            self.camera = self.camera.move_local(horizontal, 0.0, 0.0);
            return true;
        }

        if input.is_down(Button::Control) {
            return self.zoom(horizontal);
        }

        self.orbit(horizontal, vertical)
    }

    fn camera(&self) -> Camera {
        self.camera
    }

    fn set_camera(&mut self, camera: Camera) {
        self.camera = camera;
    }

    fn kind(&self) -> ControllerKind {
        ControllerKind::Trackball
    }

    fn speed(&self) -> f32 {
        self.speed
    }

    fn set_speed(&mut self, speed: f32) {
        self.speed = speed;
    }
}
