use std::collections::HashSet;
use winit::event::{ElementState, MouseButton, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

use crate::traits::{Button, InputState};

/// Held buttons plus cursor position at one instant
#[derive(Debug, Clone, Default)]
pub struct InputSnapshot {
    pressed: HashSet<Button>,
    cursor_position: (f32, f32),
}

impl InputSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pressed(mut self, button: Button) -> Self {
        self.press(button);
        self
    }

    pub fn with_cursor(mut self, x: f32, y: f32) -> Self {
        self.set_cursor(x, y);
        self
    }

    pub fn press(&mut self, button: Button) {
        self.pressed.insert(button);
    }

    pub fn release(&mut self, button: Button) {
        self.pressed.remove(&button);
    }

    pub fn release_all(&mut self) {
        self.pressed.clear();
    }

    pub fn set_cursor(&mut self, x: f32, y: f32) {
        self.cursor_position = (x, y);
    }
}

impl InputState for InputSnapshot {
    fn is_down(&self, button: Button) -> bool {
        self.pressed.contains(&button)
    }

    fn cursor_position(&self) -> (f32, f32) {
        self.cursor_position
    }
}

/// Adapter that folds Winit window events into an `InputSnapshot`
#[derive(Debug, Clone, Default)]
pub struct WinitInput {
    state: InputSnapshot,
}

impl WinitInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process a Winit WindowEvent and update internal state
    pub fn process_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(keycode) = event.physical_key {
                    if let Some(button) = Self::keycode_to_button(keycode) {
                        self.apply(button, event.state);
                    }
                }
            }
            WindowEvent::MouseInput { state, button, .. } => {
                if let Some(btn) = Self::mouse_button_to_button(*button) {
                    self.apply(btn, *state);
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.state.set_cursor(position.x as f32, position.y as f32);
            }
            // releases that happen while unfocused never reach us
            WindowEvent::Focused(false) => self.state.release_all(),
            _ => {}
        }
    }

    pub fn snapshot(&self) -> &InputSnapshot {
        &self.state
    }

    fn apply(&mut self, button: Button, state: ElementState) {
        match state {
            ElementState::Pressed => self.state.press(button),
            ElementState::Released => self.state.release(button),
        }
    }

    /// Map Winit KeyCode to Button
    fn keycode_to_button(keycode: KeyCode) -> Option<Button> {
        match keycode {
            KeyCode::KeyW => Some(Button::KeyW),
            KeyCode::KeyA => Some(Button::KeyA),
            KeyCode::KeyS => Some(Button::KeyS),
            KeyCode::KeyD => Some(Button::KeyD),
            KeyCode::KeyQ => Some(Button::KeyQ),
            KeyCode::KeyE => Some(Button::KeyE),
            KeyCode::ArrowUp => Some(Button::ArrowUp),
            KeyCode::ArrowDown => Some(Button::ArrowDown),
            KeyCode::ShiftLeft | KeyCode::ShiftRight => Some(Button::Shift),
            KeyCode::ControlLeft | KeyCode::ControlRight => Some(Button::Control),
            KeyCode::Escape => Some(Button::Escape),
            _ => None,
        }
    }

    /// Map Winit MouseButton to Button
    fn mouse_button_to_button(button: MouseButton) -> Option<Button> {
        match button {
            MouseButton::Left => Some(Button::MouseLeft),
            MouseButton::Middle => Some(Button::MouseMiddle),
            MouseButton::Right => Some(Button::MouseRight),
            _ => None,
        }
    }
}

impl InputState for WinitInput {
    fn is_down(&self, button: Button) -> bool {
        self.state.is_down(button)
    }

    fn cursor_position(&self) -> (f32, f32) {
        self.state.cursor_position()
    }
}
