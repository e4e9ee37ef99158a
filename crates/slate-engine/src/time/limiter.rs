use std::time::{Duration, Instant};

/// Sleeps away the rest of a frame to hold a target rate.
///
/// A cap of 0 disables limiting.
#[derive(Debug, Clone)]
pub struct FrameLimiter {
    cap: u32,
    frame_end: Instant,
}

impl FrameLimiter {
    pub fn new(cap: u32) -> Self {
        Self {
            cap,
            frame_end: Instant::now(),
        }
    }

    pub fn cap(&self) -> u32 {
        self.cap
    }

    /// Changes the cap and restarts the current frame's budget.
    pub fn set_cap(&mut self, cap: u32) {
        self.cap = cap;
        self.frame_end = Instant::now();
    }

    /// Blocks until the frame budget is spent, then starts the next frame.
    pub fn wait(&mut self) {
        if let Some(rest) = self.budget_left() {
            std::thread::sleep(rest);
        }
        self.frame_end = Instant::now();
    }

    fn budget_left(&self) -> Option<Duration> {
        remaining(self.frame_end.elapsed(), self.cap)
    }
}

/// Time left in a frame of `1 / cap` seconds after `elapsed` has passed.
pub fn remaining(elapsed: Duration, cap: u32) -> Option<Duration> {
    if cap == 0 {
        return None;
    }
    let target = Duration::from_secs_f64(1.0 / f64::from(cap));
    target.checked_sub(elapsed).filter(|d| !d.is_zero())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uncapped_never_sleeps() {
        assert_eq!(remaining(Duration::ZERO, 0), None);
    }

    #[test]
    fn short_frames_sleep_the_difference() {
        let rest = remaining(Duration::from_millis(10), 50).unwrap();
        assert_eq!(rest, Duration::from_millis(10));
    }

    #[test]
    fn cap_change_restarts_the_budget() {
        let Some(stale) = Instant::now().checked_sub(Duration::from_secs(1)) else {
            return;
        };
        let mut limiter = FrameLimiter {
            cap: 30,
            frame_end: stale,
        };
        assert_eq!(limiter.budget_left(), None);

        limiter.set_cap(10);
        let left = limiter.budget_left().unwrap();
        assert!(left > Duration::from_millis(50) && left <= Duration::from_millis(100));
    }

    #[test]
    fn overrun_frames_do_not_sleep() {
        assert_eq!(remaining(Duration::from_millis(40), 30), None);
        assert_eq!(remaining(Duration::from_millis(20), 50), None);
    }
}
