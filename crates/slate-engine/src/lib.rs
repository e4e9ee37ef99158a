//! Slate: a small batched 2D renderer with a pumped window loop.
//!
//! The [`Engine`] owns the window, input, and timing; its [`Renderer`]
//! turns sprites, shapes, and text into quads batched by texture and drawn
//! through wgpu.

pub mod camera;
pub mod coords;
pub mod device;
pub mod input;
pub mod logging;
pub mod paint;
pub mod render;
pub mod renderer;
pub mod resources;
pub mod time;
pub mod window;

pub use camera::Camera;
pub use coords::{Rect, Vec2, Viewport};
pub use input::{Key, MouseButton};
pub use paint::Color;
pub use render::UvRect;
pub use renderer::{Renderer, SpriteOptions};
pub use resources::{FontHandle, TextureHandle};
pub use window::{Engine, EngineConfig};
