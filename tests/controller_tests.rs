use glam::Vec3;
use gltf_viewer::camera::Camera;
use gltf_viewer::controllers::{
    swap_controller, ControllerKind, FirstPersonCameraController, TrackballCameraController,
};
use gltf_viewer::core::InputSnapshot;
use gltf_viewer::traits::{Button, CameraController};

#[cfg(test)]
mod controller_tests {
    use super::*;

    fn start_camera() -> Camera {
        Camera::new(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, Vec3::Y)
    }

    /// Hold the middle button with `modifiers`, press at the origin and move to `to`
    fn middle_drag(controller: &mut dyn CameraController, modifiers: &[Button], to: (f32, f32)) -> bool {
        let mut input = InputSnapshot::new()
            .with_pressed(Button::MouseMiddle)
            .with_cursor(0.0, 0.0);
        for &modifier in modifiers {
            input.press(modifier);
        }
        assert!(!controller.update(&input, 0.016), "press frame must not move the camera");
        input.set_cursor(to.0, to.1);
        controller.update(&input, 0.016)
    }

    #[test]
    fn test_trackball_orbit_matches_reference_values() {
        let mut controller = TrackballCameraController::new(start_camera(), 1.0);
        assert!(middle_drag(&mut controller, &[], (10.0, 10.0)));

        let camera = controller.camera();
        let expected = Vec3::new(-0.4966733, 0.4991671, 4.9501664);
        assert!(camera.eye().abs_diff_eq(expected, 1e-5), "eye = {:?}", camera.eye());
        assert_eq!(camera.center(), Vec3::ZERO);
    }

    #[test]
    fn test_trackball_zero_delta_reports_no_change() {
        let modifier_sets: [&[Button]; 4] = [
            &[],
            &[Button::Shift],
            &[Button::Control],
            &[Button::Shift, Button::Control],
        ];
        for modifiers in modifier_sets {
            let mut controller = TrackballCameraController::new(start_camera(), 1.0);
            assert!(!middle_drag(&mut controller, modifiers, (0.0, 0.0)));
            assert_eq!(controller.camera(), start_camera());
        }
    }

    #[test]
    fn test_trackball_repeated_zoom_never_crosses_center() {
        let mut controller = TrackballCameraController::new(start_camera(), 1.0);
        let mut input = InputSnapshot::new()
            .with_pressed(Button::MouseMiddle)
            .with_pressed(Button::Control)
            .with_cursor(0.0, 0.0);
        controller.update(&input, 0.016);

        for step in 1..=20 {
            input.set_cursor(step as f32 * 200.0, 0.0);
            controller.update(&input, 0.016);
            let eye = controller.camera().eye();
            assert!(eye.z > 0.0, "eye crossed the target at step {}: {:?}", step, eye);
        }
    }

    #[test]
    fn test_trackball_zoom_out_moves_by_horizontal_amount() {
        let mut controller = TrackballCameraController::new(start_camera(), 1.0);
        assert!(middle_drag(&mut controller, &[Button::Control], (-250.0, 0.0)));

        let distance = controller.camera().eye().distance(Vec3::ZERO);
        assert!((distance - 7.5).abs() < 1e-4, "distance = {}", distance);
    }

    #[test]
    fn test_trackball_pan_truck_left() {
        let mut controller = TrackballCameraController::new(start_camera(), 1.0);
        assert!(middle_drag(&mut controller, &[Button::Shift], (50.0, 0.0)));

        let camera = controller.camera();
        // left of a camera looking down -Z is -X
        assert!(camera.eye().abs_diff_eq(Vec3::new(-0.5, 0.0, 5.0), 1e-5));
        assert!(camera.center().abs_diff_eq(Vec3::new(-0.5, 0.0, 0.0), 1e-5));
    }

    #[test]
    fn test_first_person_forward_key() {
        let mut controller = FirstPersonCameraController::new(start_camera(), 2.0);
        let input = InputSnapshot::new().with_pressed(Button::KeyW);

        assert!(controller.update(&input, 0.5));
        let camera = controller.camera();
        assert!(camera.eye().abs_diff_eq(Vec3::new(0.0, 0.0, 4.0), 1e-5));
        assert!(camera.center().abs_diff_eq(Vec3::new(0.0, 0.0, -1.0), 1e-5));
    }

    #[test]
    fn test_first_person_idle() {
        let mut controller = FirstPersonCameraController::new(start_camera(), 2.0);
        assert!(!controller.update(&InputSnapshot::new(), 0.5));
        assert_eq!(controller.camera(), start_camera());
    }

    #[test]
    fn test_first_person_ignores_middle_drag() {
        let mut controller = FirstPersonCameraController::new(start_camera(), 2.0);
        assert!(!middle_drag(&mut controller, &[], (40.0, 40.0)));
    }

    #[test]
    fn test_swap_after_motion_keeps_view() {
        let mut first_person = ControllerKind::FirstPerson.build(start_camera(), 3.0);
        let input = InputSnapshot::new().with_pressed(Button::KeyA);
        assert!(first_person.update(&input, 1.0));
        let moved = first_person.camera();

        let trackball = swap_controller(first_person.as_ref(), ControllerKind::Trackball);
        assert_eq!(trackball.kind(), ControllerKind::Trackball);
        assert_eq!(trackball.camera(), moved);
        assert_eq!(trackball.speed(), 3.0);

        let back = swap_controller(trackball.as_ref(), ControllerKind::FirstPerson);
        assert_eq!(back.camera(), moved);
    }
}
