//! Time utilities for the frame loop

use std::time::{Duration, Instant};

/// Frame rate the physics constants are tuned for
pub const REFERENCE_FPS: u32 = 60;

/// Milliseconds in one countdown second
pub const MS_PER_SECOND: f32 = 1000.0;

/// Wall-clock interval between frames for a given frame rate
pub fn frame_interval(fps: u32) -> Duration {
    Duration::from_micros(1_000_000 / fps.max(1) as u64)
}

/// Monotonic stopwatch used to stamp frames with elapsed milliseconds
#[derive(Debug, Clone)]
pub struct Timer {
    start: Instant,
}

impl Timer {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Milliseconds since the timer was created, with sub-ms precision
    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}
