/// Input button identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Button {
    KeyW,
    KeyA,
    KeyS,
    KeyD,
    KeyQ,
    KeyE,
    ArrowUp,
    ArrowDown,
    Shift,
    Control,
    Escape,
    MouseLeft,
    MouseMiddle,
    MouseRight,
}

/// Point-in-time input queries
///
/// Implementations report the state at the moment of the call; nothing is
/// buffered between frames.
pub trait InputState {
    /// Check if button is currently down
    fn is_down(&self, button: Button) -> bool;

    /// Cursor position in window pixels
    fn cursor_position(&self) -> (f32, f32);
}
