//! Input management system
//!
//! Platform backends feed key and mouse events in; components query press
//! state through [`InputManager`]. Polling the OS is outside this crate.

use std::collections::HashSet;

/// Keyboard and mouse press-state tracker
#[derive(Debug, Default)]
pub struct InputManager {
    keys_down: HashSet<KeyCode>,
    keys_previous: HashSet<KeyCode>,
    buttons_down: HashSet<MouseButton>,
    buttons_previous: HashSet<MouseButton>,
    mouse_position: (f64, f64),
}

impl InputManager {
    /// Create a new input manager
    pub fn new() -> Self {
        Self::default()
    }

    /// Roll current state into previous state; call once at the start of a frame
    /// before new events are fed in.
    pub fn begin_frame(&mut self) {
        self.keys_previous.clone_from(&self.keys_down);
        self.buttons_previous.clone_from(&self.buttons_down);
    }

    /// Handle key input
    pub fn handle_key_input(&mut self, key: KeyCode, pressed: bool) {
        if pressed {
            self.keys_down.insert(key);
        } else {
            self.keys_down.remove(&key);
        }
    }

    /// Handle mouse button input
    pub fn handle_mouse_button(&mut self, button: MouseButton, pressed: bool) {
        if pressed {
            self.buttons_down.insert(button);
        } else {
            self.buttons_down.remove(&button);
        }
    }

    /// Handle mouse movement
    pub fn handle_mouse_move(&mut self, x: f64, y: f64) {
        self.mouse_position = (x, y);
    }

    /// Whether the key is currently held
    pub fn is_key_down(&self, key: KeyCode) -> bool {
        self.keys_down.contains(&key)
    }

    /// Whether the key went down this frame
    pub fn was_key_pressed(&self, key: KeyCode) -> bool {
        self.keys_down.contains(&key) && !self.keys_previous.contains(&key)
    }

    /// Whether the key went up this frame
    pub fn was_key_released(&self, key: KeyCode) -> bool {
        !self.keys_down.contains(&key) && self.keys_previous.contains(&key)
    }

    /// Whether the mouse button is currently held
    pub fn is_mouse_down(&self, button: MouseButton) -> bool {
        self.buttons_down.contains(&button)
    }

    /// Whether the mouse button went down this frame
    pub fn was_mouse_pressed(&self, button: MouseButton) -> bool {
        self.buttons_down.contains(&button) && !self.buttons_previous.contains(&button)
    }

    /// Last reported cursor position in window coordinates
    pub fn mouse_position(&self) -> (f64, f64) {
        self.mouse_position
    }
}

/// Key codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// A key
    A,
    /// D key
    D,
    /// E key
    E,
    /// Q key
    Q,
    /// S key
    S,
    /// W key
    W,
    /// Space key
    Space,
    /// Enter key
    Enter,
    /// Escape key
    Escape,
    /// Tab key
    Tab,
    /// Left arrow key
    Left,
    /// Right arrow key
    Right,
    /// Up arrow key
    Up,
    /// Down arrow key
    Down,
    /// Number key 1
    Num1,
    /// Number key 2
    Num2,
}

/// Mouse buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Left mouse button
    Left,
    /// Right mouse button
    Right,
    /// Middle mouse button
    Middle,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_press_edges() {
        let mut input = InputManager::new();
        input.begin_frame();
        input.handle_key_input(KeyCode::Space, true);
        assert!(input.is_key_down(KeyCode::Space));
        assert!(input.was_key_pressed(KeyCode::Space));

        input.begin_frame();
        assert!(input.is_key_down(KeyCode::Space));
        assert!(!input.was_key_pressed(KeyCode::Space));

        input.begin_frame();
        input.handle_key_input(KeyCode::Space, false);
        assert!(input.was_key_released(KeyCode::Space));
        assert!(!input.is_key_down(KeyCode::Space));
    }

    #[test]
    fn test_mouse_state() {
        let mut input = InputManager::new();
        input.handle_mouse_button(MouseButton::Right, true);
        input.handle_mouse_move(12.0, 34.5);
        assert!(input.is_mouse_down(MouseButton::Right));
        assert!(input.was_mouse_pressed(MouseButton::Right));
        assert!(!input.is_mouse_down(MouseButton::Left));
        assert_eq!(input.mouse_position(), (12.0, 34.5));
    }
}
