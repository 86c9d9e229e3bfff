use glam::Vec2;

use crate::traits::{Button, InputState};

/// Tracks one pointer button and turns cursor motion while it is held into
/// per-frame deltas.
///
/// The cursor is only snapshotted on the press edge, so the first frame of a
/// drag always reports a zero delta.
#[derive(Debug, Clone, Copy)]
pub struct DragTracker {
    button: Button,
    pressed: bool,
    last_cursor_position: Vec2,
}

impl DragTracker {
    pub fn new(button: Button) -> Self {
        Self {
            button,
            pressed: false,
            last_cursor_position: Vec2::ZERO,
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.pressed
    }

    /// Cursor movement since the previous call, zero when the button is up
    pub fn cursor_delta(&mut self, input: &dyn InputState) -> Vec2 {
        let down = input.is_down(self.button);
        if down && !self.pressed {
            self.pressed = true;
            self.last_cursor_position = Vec2::from(input.cursor_position());
        } else if !down && self.pressed {
            self.pressed = false;
        }

        if !self.pressed {
            return Vec2::ZERO;
        }

        let cursor = Vec2::from(input.cursor_position());
        let delta = cursor - self.last_cursor_position;
        self.last_cursor_position = cursor;
        delta
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::InputSnapshot;

    #[test]
    fn press_frame_has_zero_delta() {
        let mut drag = DragTracker::new(Button::MouseLeft);
        let input = InputSnapshot::new()
            .with_pressed(Button::MouseLeft)
            .with_cursor(100.0, 50.0);

        assert_eq!(drag.cursor_delta(&input), Vec2::ZERO);
        assert!(drag.is_dragging());
    }

    #[test]
    fn held_button_reports_motion() {
        let mut drag = DragTracker::new(Button::MouseLeft);
        let mut input = InputSnapshot::new()
            .with_pressed(Button::MouseLeft)
            .with_cursor(100.0, 50.0);
        drag.cursor_delta(&input);

        input.set_cursor(110.0, 45.0);
        assert_eq!(drag.cursor_delta(&input), Vec2::new(10.0, -5.0));

        input.set_cursor(111.0, 45.0);
        assert_eq!(drag.cursor_delta(&input), Vec2::new(1.0, 0.0));
    }

    #[test]
    fn release_stops_tracking() {
        let mut drag = DragTracker::new(Button::MouseMiddle);
        let mut input = InputSnapshot::new()
            .with_pressed(Button::MouseMiddle)
            .with_cursor(0.0, 0.0);
        drag.cursor_delta(&input);

        input.release(Button::MouseMiddle);
        input.set_cursor(40.0, 40.0);
        assert_eq!(drag.cursor_delta(&input), Vec2::ZERO);
        assert!(!drag.is_dragging());
    }

    #[test]
    fn motion_without_button_is_ignored() {
        let mut drag = DragTracker::new(Button::MouseLeft);
        let input = InputSnapshot::new()
            .with_pressed(Button::MouseMiddle)
            .with_cursor(10.0, 10.0);
        assert_eq!(drag.cursor_delta(&input), Vec2::ZERO);
    }
}
