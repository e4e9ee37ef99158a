use std::collections::HashSet;

use super::types::{ButtonState, InputEvent, Key, MouseButton};

/// Input state for a single window.
///
/// Holds the current "is down" sets plus a snapshot of them taken by
/// [`begin_frame`](Self::begin_frame). Edge queries (`*_pressed`,
/// `*_released`) compare the two, so they stay true for the whole frame in
/// which the transition was observed.
#[derive(Debug, Default)]
pub struct InputState {
    /// Whether the window is focused.
    pub focused: bool,

    /// Pointer position in physical pixels, or `None` outside the window.
    pointer_pos: Option<(f32, f32)>,

    keys_down: HashSet<Key>,
    keys_prev: HashSet<Key>,

    buttons_down: HashSet<MouseButton>,
    buttons_prev: HashSet<MouseButton>,

    /// Vertical wheel movement accumulated this frame, in lines.
    wheel: f32,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshots the held sets and resets the wheel. Call once per frame,
    /// before pumping events.
    pub fn begin_frame(&mut self) {
        self.keys_prev.clone_from(&self.keys_down);
        self.buttons_prev.clone_from(&self.buttons_down);
        self.wheel = 0.0;
    }

    /// Applies a translated input event to the current state.
    pub fn apply_event(&mut self, ev: &InputEvent) {
        match *ev {
            InputEvent::Focused(focused) => {
                self.focused = focused;
                if !focused {
                    // Keys released while unfocused never arrive.
                    self.keys_down.clear();
                    self.buttons_down.clear();
                }
            }

            InputEvent::PointerMoved { x, y } => {
                self.pointer_pos = Some((x, y));
            }

            InputEvent::PointerLeft => {
                self.pointer_pos = None;
            }

            InputEvent::Key { key: Key::Unknown, .. } => {}

            InputEvent::Key { key, state } => match state {
                ButtonState::Pressed => {
                    self.keys_down.insert(key);
                }
                ButtonState::Released => {
                    self.keys_down.remove(&key);
                }
            },

            InputEvent::MouseButton { button, state } => match state {
                ButtonState::Pressed => {
                    self.buttons_down.insert(button);
                }
                ButtonState::Released => {
                    self.buttons_down.remove(&button);
                }
            },

            InputEvent::Wheel { lines } => {
                self.wheel += lines;
            }
        }
    }

    pub fn key_down(&self, key: Key) -> bool {
        self.keys_down.contains(&key)
    }

    /// Down now, up at the last `begin_frame`.
    pub fn key_pressed(&self, key: Key) -> bool {
        self.keys_down.contains(&key) && !self.keys_prev.contains(&key)
    }

    /// Up now, down at the last `begin_frame`.
    pub fn key_released(&self, key: Key) -> bool {
        !self.keys_down.contains(&key) && self.keys_prev.contains(&key)
    }

    pub fn button_down(&self, btn: MouseButton) -> bool {
        self.buttons_down.contains(&btn)
    }

    pub fn button_pressed(&self, btn: MouseButton) -> bool {
        self.buttons_down.contains(&btn) && !self.buttons_prev.contains(&btn)
    }

    pub fn button_released(&self, btn: MouseButton) -> bool {
        !self.buttons_down.contains(&btn) && self.buttons_prev.contains(&btn)
    }

    pub fn pointer_pos(&self) -> Option<(f32, f32)> {
        self.pointer_pos
    }

    /// Last known pointer position; `(0, 0)` before the pointer first enters.
    pub fn mouse_position(&self) -> (f32, f32) {
        self.pointer_pos.unwrap_or((0.0, 0.0))
    }

    /// Wheel lines scrolled this frame; positive is away from the user.
    pub fn wheel_delta(&self) -> f32 {
        self.wheel
    }
}
