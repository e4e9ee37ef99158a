//! 2D camera and projection.
//!
//! The camera maps world pixels to screen pixels with
//! `screen = zoom * R(-rotation) * (world - position)`; the projection then
//! maps screen pixels to normalized device coordinates. Both are folded into a
//! single [`Mat4`] uploaded once per camera change.

mod matrix;
mod view;

pub use matrix::Mat4;
pub use view::{Camera, MIN_ZOOM};
