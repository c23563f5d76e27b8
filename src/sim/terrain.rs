//! Lunar Lander terrain
//!
//! A polyline of `TERRAIN_POINTS` heights spanning the canvas, with one
//! flattened run holding the landing pad. Heights are screen-space y values
//! (larger is lower on screen).

use std::f32::consts::TAU;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::collision::lerp;
use crate::consts::{CANVAS_HEIGHT, CANVAS_WIDTH};

pub const TERRAIN_POINTS: usize = 61;
pub const SEGMENT_WIDTH: f32 = CANVAS_WIDTH / (TERRAIN_POINTS - 1) as f32;

/// Pad width at score 0, in segment widths
pub const PAD_MAX_SEGMENTS: f32 = 6.0;
/// Pad width once difficulty saturates, in segment widths
pub const PAD_MIN_SEGMENTS: f32 = 1.6;
/// Score at which the pad stops shrinking
pub const DIFFICULTY_MAX_SCORE: u32 = 2000;
/// The pad never starts within this many points of either edge
pub const PAD_EDGE_MARGIN: usize = 5;

/// Terrain baseline and shaping
const BASE_Y: f32 = 230.0;
const MIN_GROUND_Y: f32 = 150.0;
const MAX_GROUND_Y: f32 = CANVAS_HEIGHT - 10.0;
const JITTER: f32 = 8.0;

/// Pad width in pixels for a cumulative score. Linear from the max width
/// at 0 to the min width at `DIFFICULTY_MAX_SCORE`, flat after.
pub fn pad_width_for_score(score: u32) -> f32 {
    pad_segments_for_score(score) * SEGMENT_WIDTH
}

/// Pad width in segment widths
pub fn pad_segments_for_score(score: u32) -> f32 {
    let t = (score as f32 / DIFFICULTY_MAX_SCORE as f32).min(1.0);
    lerp(PAD_MAX_SEGMENTS, PAD_MIN_SEGMENTS, t)
}

/// The flat landing zone
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LandingPad {
    pub x: f32,
    pub width: f32,
    pub y: f32,
}

impl LandingPad {
    /// Inclusive at both edges
    pub fn contains_x(&self, x: f32) -> bool {
        x >= self.x && x <= self.x + self.width
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Terrain {
    /// Screen y for each point, evenly spaced by `SEGMENT_WIDTH`
    pub heights: Vec<f32>,
    pub pad: LandingPad,
    /// First and last flattened point indices (inclusive)
    pub pad_start: usize,
    pub pad_end: usize,
}

impl Terrain {
    /// Generate terrain whose pad width reflects `score`
    pub fn generate<R: Rng>(rng: &mut R, score: u32) -> Self {
        let phase = rng.random_range(0.0..TAU);
        let mut heights: Vec<f32> = (0..TERRAIN_POINTS)
            .map(|i| {
                let i = i as f32;
                let wave = (i * 0.25 + phase).sin() * 25.0 + (i * 0.6 + phase * 0.5).sin() * 12.0;
                let jitter = rng.random_range(-JITTER..JITTER);
                (BASE_Y + wave + jitter).clamp(MIN_GROUND_Y, MAX_GROUND_Y)
            })
            .collect();

        let segments = pad_segments_for_score(score);
        let width = segments * SEGMENT_WIDTH;
        let span = segments.ceil() as usize;
        let last_start = TERRAIN_POINTS - 1 - PAD_EDGE_MARGIN - span;
        let pad_start = rng.random_range(PAD_EDGE_MARGIN..=last_start);
        let pad_end = pad_start + span;

        let pad_y = heights[pad_start];
        for h in &mut heights[pad_start..=pad_end] {
            *h = pad_y;
        }

        Self {
            heights,
            pad: LandingPad {
                x: point_x(pad_start),
                width,
                y: pad_y,
            },
            pad_start,
            pad_end,
        }
    }

    /// Ground y under `x`, linearly interpolated between the two
    /// surrounding points. `x` is clamped to the canvas.
    pub fn ground_y(&self, x: f32) -> f32 {
        let x = x.clamp(0.0, CANVAS_WIDTH);
        let i = ((x / SEGMENT_WIDTH).floor() as usize).min(TERRAIN_POINTS - 2);
        let t = (x - point_x(i)) / SEGMENT_WIDTH;
        lerp(self.heights[i], self.heights[i + 1], t)
    }

    /// Polyline points for rendering
    pub fn points(&self) -> impl Iterator<Item = (f32, f32)> + '_ {
        self.heights.iter().enumerate().map(|(i, &h)| (point_x(i), h))
    }
}

/// x coordinate of terrain point `i`
#[inline]
pub fn point_x(i: usize) -> f32 {
    i as f32 * SEGMENT_WIDTH
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_pad_width_bounds() {
        assert!((pad_width_for_score(0) - SEGMENT_WIDTH * 6.0).abs() < 1e-4);
        assert!((pad_width_for_score(DIFFICULTY_MAX_SCORE) - SEGMENT_WIDTH * 1.6).abs() < 1e-4);
        assert_eq!(
            pad_width_for_score(DIFFICULTY_MAX_SCORE),
            pad_width_for_score(DIFFICULTY_MAX_SCORE * 10)
        );
        // Halfway is halfway
        let mid = pad_width_for_score(DIFFICULTY_MAX_SCORE / 2);
        assert!((mid - SEGMENT_WIDTH * 3.8).abs() < 1e-3);
    }

    #[test]
    fn test_generate_shape() {
        let mut rng = Pcg32::seed_from_u64(7);
        let terrain = Terrain::generate(&mut rng, 0);
        assert_eq!(terrain.heights.len(), TERRAIN_POINTS);
        assert!(terrain.pad_start >= PAD_EDGE_MARGIN);
        assert!(terrain.pad_end <= TERRAIN_POINTS - 1 - PAD_EDGE_MARGIN);
        assert_eq!(terrain.pad_end - terrain.pad_start, 6);
        assert!((terrain.pad.width - SEGMENT_WIDTH * 6.0).abs() < 1e-3);
        assert_eq!(terrain.pad.x, point_x(terrain.pad_start));
    }

    #[test]
    fn test_pad_is_flat() {
        for seed in 0..50 {
            let mut rng = Pcg32::seed_from_u64(seed);
            let terrain = Terrain::generate(&mut rng, seed as u32 * 97);
            for h in &terrain.heights[terrain.pad_start..=terrain.pad_end] {
                assert_eq!(*h, terrain.pad.y);
            }
            // The pad fits inside the flattened run
            assert!(terrain.pad.x + terrain.pad.width <= point_x(terrain.pad_end) + 1e-3);
            // Ground under the pad is the pad
            let mid = terrain.pad.x + terrain.pad.width / 2.0;
            assert!((terrain.ground_y(mid) - terrain.pad.y).abs() < 1e-4);
        }
    }

    #[test]
    fn test_ground_interpolates() {
        let mut heights = vec![200.0; TERRAIN_POINTS];
        heights[1] = 100.0;
        let terrain = Terrain {
            heights,
            pad: LandingPad { x: 0.0, width: 1.0, y: 200.0 },
            pad_start: 0,
            pad_end: 0,
        };
        assert_eq!(terrain.ground_y(0.0), 200.0);
        assert!((terrain.ground_y(SEGMENT_WIDTH / 2.0) - 150.0).abs() < 1e-3);
        assert!((terrain.ground_y(SEGMENT_WIDTH) - 100.0).abs() < 1e-3);
        // Far right edge and beyond
        assert_eq!(terrain.ground_y(CANVAS_WIDTH), 200.0);
        assert_eq!(terrain.ground_y(CANVAS_WIDTH + 50.0), 200.0);
    }

    #[test]
    fn test_pad_contains_inclusive() {
        let pad = LandingPad { x: 100.0, width: 50.0, y: 200.0 };
        assert!(pad.contains_x(100.0));
        assert!(pad.contains_x(150.0));
        assert!(!pad.contains_x(99.9));
        assert!(!pad.contains_x(150.1));
    }

    #[test]
    fn test_same_seed_same_terrain() {
        let a = Terrain::generate(&mut Pcg32::seed_from_u64(42), 300);
        let b = Terrain::generate(&mut Pcg32::seed_from_u64(42), 300);
        assert_eq!(a, b);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_pad_width_monotonic(a in 0u32..5000, b in 0u32..5000) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(pad_width_for_score(lo) >= pad_width_for_score(hi));
        }

        #[test]
        fn prop_pad_width_linear_below_threshold(score in 0u32..DIFFICULTY_MAX_SCORE) {
            let step = pad_width_for_score(score) - pad_width_for_score(score + 1);
            let expected = (PAD_MAX_SEGMENTS - PAD_MIN_SEGMENTS) * SEGMENT_WIDTH
                / DIFFICULTY_MAX_SCORE as f32;
            prop_assert!((step - expected).abs() < 1e-3);
        }
    }
}
