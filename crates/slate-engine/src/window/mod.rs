//! Window and frame loop.
//!
//! Owns the `winit` event loop and window. The loop is driven by the
//! application through [`Engine::poll_and_advance`], which pumps pending
//! events without blocking.

mod runtime;

pub use runtime::{Engine, EngineConfig};
