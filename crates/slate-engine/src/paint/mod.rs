//! Color model shared by the batch, primitives, and text.
//!
//! Colors are straight (non-premultiplied) RGBA in `[0, 1]` and are blended
//! with `src_alpha / one_minus_src_alpha`.

pub mod color;

pub use color::Color;
