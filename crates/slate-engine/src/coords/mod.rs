//! Coordinate and geometry types shared by the batch, camera, and runtime.
//!
//! Canonical screen space:
//! - Physical pixels of the drawable surface
//! - Origin top-left
//! - +X right, +Y down
//!
//! World space is screen space before the camera transform is applied.

mod rect;
mod vec2;
mod viewport;

pub use rect::Rect;
pub use vec2::Vec2;
pub use viewport::Viewport;
