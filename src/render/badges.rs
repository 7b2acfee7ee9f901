//! Counter animation for the dashboard stat badges.
//!
//! Badges never jump to a new value; they sweep from the last displayed
//! value with a quartic ease-out over one second. The frames are computed
//! up front so the view can play them without blocking the session loop.

use std::time::Duration;

/// Total sweep duration.
pub const ANIMATION_DURATION: Duration = Duration::from_millis(1000);

/// Frames per sweep. At 25 ms a frame the sweep spans the full duration.
pub const FRAME_COUNT: usize = 40;

pub fn frame_interval() -> Duration {
    ANIMATION_DURATION / FRAME_COUNT as u32
}

/// Quartic ease-out: fast start, settling toward the target.
pub fn ease_out_quart(t: f64) -> f64 {
    let inv = 1.0 - t.clamp(0.0, 1.0);
    1.0 - inv * inv * inv * inv
}

/// A badge sweep ready for the view to play.
#[derive(Debug, Clone, PartialEq)]
pub struct BadgeAnimation {
    pub badge: &'static str,
    pub frames: Vec<f64>,
    /// Whether to format values as currency.
    pub monetary: bool,
}

impl BadgeAnimation {
    pub fn new(badge: &'static str, from: f64, to: f64, monetary: bool) -> Self {
        Self {
            badge,
            frames: animation_frames(from, to),
            monetary,
        }
    }

    /// The value the badge shows once the sweep completes.
    pub fn final_value(&self) -> f64 {
        *self.frames.last().unwrap_or(&0.0)
    }
}

/// Eased frame values from `from` to `to`, ending exactly on `to`.
pub fn animation_frames(from: f64, to: f64) -> Vec<f64> {
    if from == to {
        return vec![to];
    }
    (1..=FRAME_COUNT)
        .map(|i| {
            let t = i as f64 / FRAME_COUNT as f64;
            from + (to - from) * ease_out_quart(t)
        })
        .collect()
}
