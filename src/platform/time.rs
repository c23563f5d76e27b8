//! Frame timing
//!
//! Every engine is driven by one animation-frame callback per display
//! refresh. The clock turns raw timestamps into a clamped delta and a
//! time-scale factor relative to a 60 Hz reference frame.

use crate::consts::{LOW_FPS_THRESHOLD, MAX_FRAME_DELTA_MS, REFERENCE_FRAME_MS};

/// Timing for a single animation frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTime {
    /// Milliseconds since the previous frame, clamped to `MAX_FRAME_DELTA_MS`
    pub delta_ms: f64,
    /// `delta_ms` measured in 60 Hz frames. Physics multiplies by this.
    pub time_scale: f32,
    /// Instantaneous frame rate, for on-screen diagnostics only
    pub fps: f64,
}

impl FrameTime {
    /// Build frame timing from a raw (possibly huge or negative) delta
    pub fn from_delta(raw_delta_ms: f64) -> Self {
        let delta_ms = raw_delta_ms.clamp(0.0, MAX_FRAME_DELTA_MS);
        let fps = if delta_ms > 0.0 { 1000.0 / delta_ms } else { 0.0 };
        Self {
            delta_ms,
            time_scale: (delta_ms / REFERENCE_FRAME_MS) as f32,
            fps,
        }
    }

    /// A single reference frame (time scale 1.0)
    pub fn reference() -> Self {
        Self::from_delta(REFERENCE_FRAME_MS)
    }
}

/// Monotonic frame clock fed by `requestAnimationFrame` timestamps
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    last_timestamp: Option<f64>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance to `now_ms`. The first frame after creation or `reset`
    /// counts as one reference frame.
    pub fn tick(&mut self, now_ms: f64) -> FrameTime {
        let raw = match self.last_timestamp {
            Some(last) => now_ms - last,
            None => REFERENCE_FRAME_MS,
        };
        self.last_timestamp = Some(now_ms);
        FrameTime::from_delta(raw)
    }

    /// Forget the last timestamp (pause, unmount, tab hidden)
    pub fn reset(&mut self) {
        self.last_timestamp = None;
    }

    pub fn is_running(&self) -> bool {
        self.last_timestamp.is_some()
    }
}

/// Consecutive slow frames before quality is degraded
pub const SLOW_FRAMES_TO_DEGRADE: u32 = 30;
/// Consecutive healthy frames before quality is restored
pub const FAST_FRAMES_TO_RESTORE: u32 = 120;

/// Flags sustained sub-45fps rendering so games can drop trails and particles
#[derive(Debug, Clone, Default)]
pub struct PerfMonitor {
    slow_frames: u32,
    fast_frames: u32,
    low_quality: bool,
}

impl PerfMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn low_quality(&self) -> bool {
        self.low_quality
    }

    /// Record one raw frame delta. Returns the new flag when it flips.
    pub fn sample(&mut self, delta_ms: f64) -> Option<bool> {
        let slow = delta_ms > 0.0 && 1000.0 / delta_ms < LOW_FPS_THRESHOLD;
        if slow {
            self.slow_frames += 1;
            self.fast_frames = 0;
        } else {
            self.fast_frames += 1;
            self.slow_frames = 0;
        }

        if !self.low_quality && self.slow_frames >= SLOW_FRAMES_TO_DEGRADE {
            self.low_quality = true;
            log::info!("Sustained low frame rate, degrading effects");
            return Some(true);
        }
        if self.low_quality && self.fast_frames >= FAST_FRAMES_TO_RESTORE {
            self.low_quality = false;
            log::info!("Frame rate recovered, restoring effects");
            return Some(false);
        }
        None
    }
}
