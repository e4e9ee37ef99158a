use std::time::{Duration, Instant};

/// Longest delta a single tick reports, in seconds.
pub const MAX_DELTA: f32 = 0.1;

/// Rate reported before the first measurable frame.
const FALLBACK_FPS: f32 = 60.0;

/// Frame timing snapshot.
#[derive(Debug, Copy, Clone)]
pub struct FrameTime {
    /// Seconds since the previous tick, clamped to [`MAX_DELTA`].
    pub dt: f32,

    /// Monotonic timestamp taken at the tick.
    pub now: Instant,

    /// Monotonic frame counter.
    pub frame_index: u64,
}

impl FrameTime {
    /// Instantaneous rate derived from `dt`.
    pub fn fps(&self) -> f32 {
        if self.dt > 0.0 {
            1.0 / self.dt
        } else {
            FALLBACK_FPS
        }
    }
}

/// Frame clock producing `FrameTime` snapshots.
///
/// Delta time is clamped so a stall (debugger, window drag, minimize) shows
/// up as one slow frame instead of a huge simulation step.
#[derive(Debug, Clone)]
pub struct FrameClock {
    start: Instant,
    last: Instant,
    frame_index: u64,
    dt_max: Duration,
    latest: Option<FrameTime>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    fn starting_at(now: Instant) -> Self {
        Self {
            start: now,
            last: now,
            frame_index: 0,
            dt_max: Duration::from_secs_f32(MAX_DELTA),
            latest: None,
        }
    }

    /// Resets the delta baseline without touching elapsed time.
    pub fn reset(&mut self) {
        self.last = Instant::now();
    }

    /// Advances the clock and returns a new `FrameTime`.
    pub fn tick(&mut self) -> FrameTime {
        self.tick_at(Instant::now())
    }

    fn tick_at(&mut self, now: Instant) -> FrameTime {
        let dt = now.saturating_duration_since(self.last).min(self.dt_max);
        self.last = now;

        let ft = FrameTime {
            dt: dt.as_secs_f32(),
            now,
            frame_index: self.frame_index,
        };
        self.frame_index = self.frame_index.wrapping_add(1);
        self.latest = Some(ft);
        ft
    }

    /// Delta of the most recent tick, 0 before the first.
    pub fn delta(&self) -> f32 {
        self.latest.map_or(0.0, |ft| ft.dt)
    }

    pub fn fps(&self) -> f32 {
        self.latest.map_or(FALLBACK_FPS, |ft| ft.fps())
    }

    /// Seconds since the clock was created.
    pub fn elapsed(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}
