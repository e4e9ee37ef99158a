//! Frame timing.
//!
//! One `FrameClock` per loop measures clamped deltas; `FrameLimiter`
//! optionally sleeps to hold a frame-rate cap.

mod frame_clock;
mod limiter;

pub use frame_clock::{FrameClock, FrameTime, MAX_DELTA};
pub use limiter::{remaining, FrameLimiter};
