//! Pong: player vs AI paddle volley
//!
//! The game never ends on its own; it accumulates score until the player
//! leaves (Escape, close button, or losing pointer lock).

use std::collections::VecDeque;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::{Rect, bounce_within, crossed_leftward, crossed_rightward, lerp};
use crate::consts::{CANVAS_HEIGHT, CANVAS_WIDTH};
use crate::platform::InputState;
use crate::settings::PongPreset;

pub const PADDLE_WIDTH: f32 = 10.0;
pub const PADDLE_HEIGHT: f32 = 60.0;
/// Left edge of the player paddle
pub const PLAYER_X: f32 = 20.0;
/// Left edge of the AI paddle (its face)
pub const AI_X: f32 = CANVAS_WIDTH - 30.0;
pub const BALL_SIZE: f32 = 10.0;

pub const BALL_START: Vec2 = Vec2::new(400.0, 150.0);
pub const BALL_START_VX: f32 = 5.0;
pub const BALL_START_VY: f32 = 3.0;
/// Vertical speed cap so accumulated spin stays playable
pub const BALL_MAX_VY: f32 = 10.0;

/// Vertical velocity added per pixel of contact offset from paddle center
pub const SPIN_FACTOR: f32 = 0.1;
/// AI holds still while the ball center is within this many pixels
pub const AI_DEAD_ZONE: f32 = 20.0;
/// Arrow-key paddle speed, pixels per reference frame
pub const KEYBOARD_SPEED: f32 = 7.0;
/// Points won or lost per rally (Arcade preset)
pub const RALLY_POINTS: u32 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PongPhase {
    /// Title screen, simulation frozen
    Idle,
    Playing,
}

/// Which side won a rally
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Player,
    Ai,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Paddle {
    pub y: f32,
}

impl Paddle {
    fn centered() -> Self {
        Self {
            y: (CANVAS_HEIGHT - PADDLE_HEIGHT) / 2.0,
        }
    }

    pub fn rect(&self, x: f32) -> Rect {
        Rect::new(x, self.y, PADDLE_WIDTH, PADDLE_HEIGHT)
    }

    pub fn center_y(&self) -> f32 {
        self.y + PADDLE_HEIGHT / 2.0
    }
}

/// Clamp a paddle top into the canvas
#[inline]
pub fn clamp_paddle_y(y: f32) -> f32 {
    y.clamp(0.0, CANVAS_HEIGHT - PADDLE_HEIGHT)
}

/// The ball, as a `BALL_SIZE` square with a top-left `pos`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ball {
    pub pos: Vec2,
    pub vel: Vec2,
}

impl Ball {
    pub fn serve() -> Self {
        Self {
            pos: BALL_START,
            vel: Vec2::new(BALL_START_VX, BALL_START_VY),
        }
    }

    /// Serve from center after a point; the ball heads away from the wall
    /// it just left
    pub fn serve_after(exited: Side) -> Self {
        let vx = match exited {
            Side::Player => BALL_START_VX,
            Side::Ai => -BALL_START_VX,
        };
        Self {
            pos: BALL_START,
            vel: Vec2::new(vx, BALL_START_VY),
        }
    }

    pub fn center(&self) -> Vec2 {
        self.pos + Vec2::splat(BALL_SIZE / 2.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Score {
    pub player: u32,
    pub ai: u32,
}

/// Trail point for ball rendering
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrailPoint {
    pub pos: Vec2,
    /// 1.0 when recorded, fades toward 0
    pub life: f32,
}

/// Tracks which pointer samples the paddle has already consumed
#[derive(Debug, Clone, Default)]
struct PointerCursor {
    samples: u64,
    movement: Vec2,
    skip_next: bool,
}

/// Complete Pong state
#[derive(Debug, Clone)]
pub struct PongGame {
    pub phase: PongPhase,
    pub preset: PongPreset,
    pub player: Paddle,
    pub ai: Paddle,
    pub ball: Ball,
    pub score: Score,
    /// Rally points (+50 / -50, floored at zero) when the preset awards them
    pub points: u32,
    /// Oldest first, newest last
    pub trail: VecDeque<TrailPoint>,
    /// Where the player wants the paddle; mouse and keys both move this
    target_y: f32,
    cursor: PointerCursor,
    low_quality: bool,
}

impl PongGame {
    pub fn new(preset: PongPreset) -> Self {
        let player = Paddle::centered();
        Self {
            phase: PongPhase::Idle,
            preset,
            player,
            ai: Paddle::centered(),
            ball: Ball::serve(),
            score: Score::default(),
            points: 0,
            trail: VecDeque::with_capacity(preset.trail_length()),
            target_y: player.y,
            cursor: PointerCursor::default(),
            low_quality: false,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.phase == PongPhase::Playing
    }

    /// Idle -> Playing. The first pointer sample after this is ignored so a
    /// stale cursor position cannot yank the paddle.
    pub fn start(&mut self, input: &InputState) -> bool {
        if self.phase == PongPhase::Playing {
            return false;
        }
        let pointer = input.pointer();
        self.cursor = PointerCursor {
            samples: pointer.samples,
            movement: pointer.movement,
            skip_next: true,
        };
        self.target_y = self.player.y;
        self.phase = PongPhase::Playing;
        log::debug!("Pong: Idle -> Playing");
        true
    }

    /// Playing -> Idle (pointer lock lost, explicit stop)
    pub fn stop(&mut self) -> bool {
        if self.phase == PongPhase::Idle {
            return false;
        }
        self.phase = PongPhase::Idle;
        log::debug!("Pong: Playing -> Idle");
        true
    }

    /// Back to a fresh match
    pub fn reset(&mut self) {
        *self = Self {
            low_quality: self.low_quality,
            ..Self::new(self.preset)
        };
    }

    pub fn set_low_quality(&mut self, low_quality: bool) {
        self.low_quality = low_quality;
        if low_quality {
            self.trail.clear();
        }
    }

    /// Score fed to the high-score table
    pub fn high_score_value(&self) -> u32 {
        if self.preset.awards_points() {
            self.points
        } else {
            self.score.player
        }
    }

    /// Advance one tick. Returns the winner of the rally if a point was
    /// scored this tick.
    pub fn tick(&mut self, input: &InputState, time_scale: f32) -> Option<Side> {
        if self.phase != PongPhase::Playing {
            return None;
        }

        self.track_pointer(input);
        if input.is_held("ArrowUp") {
            self.target_y -= KEYBOARD_SPEED * time_scale;
        }
        if input.is_held("ArrowDown") {
            self.target_y += KEYBOARD_SPEED * time_scale;
        }
        self.target_y = clamp_paddle_y(self.target_y);
        self.player.y = self.target_y;

        self.move_ai(time_scale);
        let scored = step_ball(&mut self.ball, &self.player, &self.ai, time_scale);
        if let Some(winner) = scored {
            self.award(winner);
        }
        self.update_trail(time_scale);
        scored
    }

    fn track_pointer(&mut self, input: &InputState) {
        let pointer = input.pointer();
        if pointer.samples == self.cursor.samples {
            return;
        }
        let moved = pointer.movement - self.cursor.movement;
        self.cursor.samples = pointer.samples;
        self.cursor.movement = pointer.movement;
        if self.cursor.skip_next {
            self.cursor.skip_next = false;
            return;
        }

        if pointer.locked {
            self.target_y += moved.y;
        } else if let Some(position) = pointer.position {
            self.target_y = position.y - PADDLE_HEIGHT / 2.0;
        }
    }

    fn move_ai(&mut self, time_scale: f32) {
        let ball_y = self.ball.center().y;
        let paddle_y = self.ai.center_y();
        let speed = self.preset.ai_speed() * time_scale;
        if ball_y < paddle_y - AI_DEAD_ZONE {
            self.ai.y -= speed;
        } else if ball_y > paddle_y + AI_DEAD_ZONE {
            self.ai.y += speed;
        }
        self.ai.y = clamp_paddle_y(self.ai.y);
    }

    fn award(&mut self, winner: Side) {
        match winner {
            Side::Player => {
                self.score.player += 1;
                if self.preset.awards_points() {
                    self.points += RALLY_POINTS;
                }
            }
            Side::Ai => {
                self.score.ai += 1;
                if self.preset.awards_points() {
                    self.points = self.points.saturating_sub(RALLY_POINTS);
                }
            }
        }
        // A trail across the reset would streak over the whole court
        self.trail.clear();
    }

    fn update_trail(&mut self, time_scale: f32) {
        if self.low_quality {
            self.trail.clear();
            return;
        }
        let max = self.preset.trail_length();
        let fade = time_scale / max as f32;
        for point in self.trail.iter_mut() {
            point.life = (point.life - fade).max(0.0);
        }
        self.trail.push_back(TrailPoint {
            pos: self.ball.pos,
            life: 1.0,
        });
        while self.trail.len() > max {
            self.trail.pop_front();
        }
    }
}

/// Move the ball one tick: integrate, bounce off top/bottom, resolve
/// paddle hits, then check for a point. Returns the rally winner.
pub fn step_ball(ball: &mut Ball, player: &Paddle, ai: &Paddle, time_scale: f32) -> Option<Side> {
    let prev = ball.pos;
    ball.pos += ball.vel * time_scale;
    bounce_within(&mut ball.pos.y, &mut ball.vel.y, BALL_SIZE, 0.0, CANVAS_HEIGHT);

    if ball.vel.x < 0.0 {
        let paddle = player.rect(PLAYER_X);
        if let Some(t) = crossed_leftward(prev.x, ball.pos.x, paddle.right()) {
            if hit_paddle(ball, prev, t, &paddle) {
                ball.pos.x = paddle.right();
            }
        }
    } else if ball.vel.x > 0.0 {
        let paddle = ai.rect(AI_X);
        if let Some(t) = crossed_rightward(prev.x + BALL_SIZE, ball.pos.x + BALL_SIZE, paddle.x) {
            if hit_paddle(ball, prev, t, &paddle) {
                ball.pos.x = paddle.x - BALL_SIZE;
            }
        }
    }

    if ball.pos.x < 0.0 {
        *ball = Ball::serve_after(Side::Player);
        Some(Side::Ai)
    } else if ball.pos.x + BALL_SIZE > CANVAS_WIDTH {
        *ball = Ball::serve_after(Side::Ai);
        Some(Side::Player)
    } else {
        None
    }
}

/// Reflect off `paddle` if the ball was level with it when it crossed the
/// face at fraction `t` of this tick
fn hit_paddle(ball: &mut Ball, prev: Vec2, t: f32, paddle: &Rect) -> bool {
    let y_at = lerp(prev.y, ball.pos.y, t).clamp(0.0, CANVAS_HEIGHT - BALL_SIZE);
    if !paddle.overlaps_y(y_at, BALL_SIZE) {
        return false;
    }
    ball.vel.x = -ball.vel.x;
    let offset = (y_at + BALL_SIZE / 2.0) - paddle.center().y;
    ball.vel.y = (ball.vel.y + offset * SPIN_FACTOR).clamp(-BALL_MAX_VY, BALL_MAX_VY);
    true
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_ball_stays_inside_vertically(
            x in 40.0f32..760.0,
            y in 0.0f32..290.0,
            vx in -40.0f32..40.0,
            vy in -300.0f32..300.0,
            player_y in 0.0f32..240.0,
            ai_y in 0.0f32..240.0,
            time_scale in 0.0f32..6.0,
        ) {
            let mut ball = Ball { pos: Vec2::new(x, y), vel: Vec2::new(vx, vy) };
            step_ball(&mut ball, &Paddle { y: player_y }, &Paddle { y: ai_y }, time_scale);
            prop_assert!(ball.pos.y >= 0.0);
            prop_assert!(ball.pos.y <= CANVAS_HEIGHT - BALL_SIZE);
        }

        #[test]
        fn prop_single_reflection_per_approach(
            speed in 1.0f32..800.0,
            y in 0.0f32..290.0,
            player_y in 0.0f32..240.0,
        ) {
            // Ball approaching the player paddle from mid-court
            let player = Paddle { y: player_y };
            let ai = Paddle { y: 0.0 };
            let mut ball = Ball { pos: Vec2::new(400.0, y), vel: Vec2::new(-speed, 0.0) };

            let mut reflections = 0;
            for _ in 0..1000 {
                let before = ball.vel.x;
                if step_ball(&mut ball, &player, &ai, 1.0).is_some() {
                    break;
                }
                if before < 0.0 && ball.vel.x > 0.0 {
                    reflections += 1;
                }
                if ball.vel.x > 0.0 {
                    break;
                }
            }

            let lined_up = player.rect(PLAYER_X).overlaps_y(y, BALL_SIZE);
            prop_assert_eq!(reflections, if lined_up { 1 } else { 0 });
        }

        #[test]
        fn prop_score_always_resets_to_serve(
            y in 0.0f32..290.0,
            vy in -5.0f32..5.0,
            leftward in any::<bool>(),
        ) {
            // Paddles parked at the opposite edge so nothing intercepts
            let player = Paddle { y: if y > 150.0 { 0.0 } else { 240.0 } };
            let ai = Paddle { y: if y > 150.0 { 0.0 } else { 240.0 } };
            let (x, vx) = if leftward { (35.0, -50.0) } else { (755.0, 50.0) };
            let mut ball = Ball { pos: Vec2::new(x, y), vel: Vec2::new(vx, vy) };
            let scored = step_ball(&mut ball, &player, &ai, 1.0);
            if let Some(winner) = scored {
                prop_assert_eq!(ball.pos, BALL_START);
                prop_assert_eq!(ball.vel.x.abs(), BALL_START_VX);
                prop_assert_eq!(ball.vel.y, BALL_START_VY);
                // Serve heads toward the rally winner
                let toward_winner = match winner {
                    Side::Ai => ball.vel.x > 0.0,
                    Side::Player => ball.vel.x < 0.0,
                };
                prop_assert!(toward_winner);
            }
        }
    }
}
