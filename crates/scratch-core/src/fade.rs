//! Fade-out schedule for the remaining cover.
//!
//! Runs at a fixed 30 ticks per second. Alpha starts at 1 and drops by
//! `1 / (30 * duration)` per tick; the tick that takes it to zero finishes
//! the fade.

use std::time::Duration;

pub const TICKS_PER_SECOND: f64 = 30.0;

/// Interval between fade ticks.
pub fn tick_period() -> Duration {
    Duration::from_secs_f64(1.0 / TICKS_PER_SECOND)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FadeStep {
    /// Draw the cover at this alpha.
    Frame { alpha: f32 },
    /// Alpha reached zero: show the reward alone.
    Done,
}

/// Tick counter for one fade-out.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FadeOut {
    elapsed: u32,
    total: u32,
}

impl FadeOut {
    /// A fade lasting `duration` seconds. Non-positive or non-finite
    /// durations finish on the first tick.
    pub fn new(duration: f64) -> Self {
        let ticks = TICKS_PER_SECOND * duration;
        let total = if ticks.is_finite() && ticks > 0.0 {
            // Absorb rounding noise such as 30 * 0.1 = 3.0000000000000004
            ((ticks - 1e-9).ceil() as u32).max(1)
        } else {
            1
        };
        Self { elapsed: 0, total }
    }

    pub fn total_ticks(&self) -> u32 {
        self.total
    }

    pub fn alpha(&self) -> f32 {
        1.0 - self.elapsed as f32 / self.total as f32
    }

    pub fn is_done(&self) -> bool {
        self.elapsed >= self.total
    }

    pub fn advance(&mut self) -> FadeStep {
        self.elapsed = self.elapsed.saturating_add(1).min(self.total);
        if self.is_done() {
            FadeStep::Done
        } else {
            FadeStep::Frame {
                alpha: self.alpha(),
            }
        }
    }
}
