//! Batched 2D rendering.
//!
//! Draw operations are turned into quads on the CPU (`quad`, `primitives`),
//! accumulated in a [`Batch`], and submitted through a [`RenderBackend`].
//! The batch flushes whenever the bound texture changes or it is full; the
//! frame driver additionally flushes before any change of projection or
//! scissor, so every quad is drawn with the state current when it was issued.
//!
//! Convention:
//! - Vertex positions are world pixels (top-left origin, +Y down).
//! - The projection uniform maps world pixels to NDC, camera included.

mod backend;
mod batch;
pub mod primitives;
mod quad;
mod vertex;
mod wgpu_backend;

#[cfg(test)]
pub(crate) mod recording;

pub use backend::{RenderBackend, TextureFilter, TextureKey};
pub use batch::{quad_indices, Batch, BatchStats, MAX_QUADS};
pub use quad::{build_quad, QuadRequest, UvRect};
pub use vertex::Vertex;
pub use wgpu_backend::WgpuBackend;
