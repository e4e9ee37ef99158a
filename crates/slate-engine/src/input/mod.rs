//! Input subsystem.
//!
//! Public API is platform-agnostic and does not expose winit types.
//! The runtime translates platform events into `InputEvent`s
//! (see `platform::winit`) and feeds them to `InputState`.

pub(crate) mod platform;
mod state;
mod types;

pub use state::InputState;
pub use types::{ButtonState, InputEvent, Key, MouseButton};
