//! Phosphor Arcade - the hidden arcade of a PCB/terminal themed portfolio
//!
//! Core modules:
//! - `sim`: Simulation for Pong, Snake and Lunar Lander (no DOM access)
//! - `renderer`: Display lists and the Canvas 2D backend
//! - `platform`: Frame clock, input state, storage, browser glue
//! - `arcade`: The shell that mounts one game at a time

pub mod arcade;
pub mod highscores;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use arcade::{Arcade, GameKind, Hud};
pub use highscores::HighScores;
pub use settings::{KeyLayout, PongPreset, Settings};

/// Shared configuration constants
pub mod consts {
    /// Logical canvas size. All coordinate math happens in this space.
    pub const CANVAS_WIDTH: f32 = 800.0;
    pub const CANVAS_HEIGHT: f32 = 300.0;

    /// Frame deltas above this are clamped (tab backgrounding, debugger pauses)
    pub const MAX_FRAME_DELTA_MS: f64 = 100.0;
    /// Physics constants are tuned for this frame length (60 Hz)
    pub const REFERENCE_FRAME_MS: f64 = 1000.0 / 60.0;

    /// Below this the performance monitor starts counting slow frames
    pub const LOW_FPS_THRESHOLD: f64 = 45.0;

    /// Accent used when the host does not supply one (emerald)
    pub const DEFAULT_ACCENT: &str = "#10b981";
    /// Pong ignores the accent and always draws in this phosphor green
    pub const PONG_PHOSPHOR: &str = "#4ade80";
    /// Canvas background
    pub const BACKGROUND: &str = "#020c08";
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Smallest signed difference `a - b` between two angles
#[inline]
pub fn angle_delta(a: f32, b: f32) -> f32 {
    normalize_angle(a - b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_2, PI};

    #[test]
    fn test_normalize_angle_wraps() {
        // 3π lands on the ±π seam; either end is the same heading
        let wrapped = normalize_angle(3.0 * PI);
        assert!((wrapped.abs() - PI).abs() < 1e-5);
        assert!((normalize_angle(3.0 * PI + 0.5) - (-PI + 0.5)).abs() < 1e-5);
        for angle in [3.0 * PI, 7.5, -7.5, 100.0] {
            let n = normalize_angle(angle);
            assert!((-PI..=PI).contains(&n));
        }
        assert!((normalize_angle(-FRAC_PI_2) + FRAC_PI_2).abs() < 1e-6);
        assert!((normalize_angle(2.0 * PI + 0.5) - 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_angle_delta_across_wrap() {
        // Just past -π and just below π are close together
        let d = angle_delta(-PI + 0.1, PI - 0.1);
        assert!((d - 0.2).abs() < 1e-4);
    }
}
