//! Collision helpers shared by the engines
//!
//! Everything here is swept against the previous position so a fast ball
//! cannot tunnel through a 10px paddle in a single tick.

use glam::Vec2;

/// An axis-aligned rectangle, top-left origin
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    /// Whether the vertical span `[top, top + height]` touches this rect's
    pub fn overlaps_y(&self, top: f32, height: f32) -> bool {
        ranges_overlap(top, top + height, self.y, self.bottom())
    }
}

/// Closed-interval overlap test
#[inline]
pub fn ranges_overlap(a_min: f32, a_max: f32, b_min: f32, b_max: f32) -> bool {
    a_min <= b_max && a_max >= b_min
}

#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Fraction of a step at which an edge moving from `prev` to `next` reached
/// the vertical plane at `plane`, moving toward smaller x. `None` if the
/// edge started past the plane or never reached it.
pub fn crossed_leftward(prev: f32, next: f32, plane: f32) -> Option<f32> {
    if prev < plane || next > plane {
        return None;
    }
    let travel = prev - next;
    if travel <= 0.0 {
        // Resting exactly on the plane
        return Some(0.0);
    }
    Some(((prev - plane) / travel).clamp(0.0, 1.0))
}

/// Mirror of [`crossed_leftward`] for edges moving toward larger x
pub fn crossed_rightward(prev: f32, next: f32, plane: f32) -> Option<f32> {
    crossed_leftward(-prev, -next, -plane)
}

/// Keep a box of `size` inside `[min, max]` on one axis, bouncing `vel`
/// away from whichever wall was hit. Returns true on a bounce.
pub fn bounce_within(pos: &mut f32, vel: &mut f32, size: f32, min: f32, max: f32) -> bool {
    if *pos <= min {
        *pos = min;
        *vel = vel.abs();
        true
    } else if *pos + size >= max {
        *pos = max - size;
        *vel = -vel.abs();
        true
    } else {
        false
    }
}
