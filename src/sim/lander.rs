//! Lunar Lander engine
//!
//! Continuous physics scaled by the frame time scale. The craft sits frozen
//! on a fresh board until the first control key, then falls under gravity
//! until it leaves the screen or touches the ground.

use std::f32::consts::FRAC_PI_2;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::terrain::{LandingPad, Terrain};
use crate::angle_delta;
use crate::consts::CANVAS_WIDTH;
use crate::platform::input::{Direction, InputState, KeyAction};

pub const GRAVITY: f32 = 0.05;
pub const THRUST: f32 = 0.12;
/// Radians per reference frame
pub const ROTATION_SPEED: f32 = 0.05;
pub const MAX_FUEL: f32 = 100.0;
/// Fuel per reference frame of thrust
pub const FUEL_BURN: f32 = 0.3;
/// Half the craft's extent; its lower edge is `y + LANDER_HALF_SIZE`
pub const LANDER_HALF_SIZE: f32 = 8.0;

/// Each velocity component must be strictly under this to land
pub const SAFE_SPEED: f32 = 2.5;
/// Allowed deviation from upright, inclusive
pub const ANGLE_TOLERANCE: f32 = 0.3;
/// Nose pointing up the screen
pub const UPRIGHT: f32 = -FRAC_PI_2;
/// Slack on the tilt limit so a craft exactly at the tolerance still lands
const ANGLE_EPSILON: f32 = 1e-5;
pub const LANDING_BONUS: u32 = 100;

pub const START_POS: Vec2 = Vec2::new(50.0, 50.0);
pub const START_VEL: Vec2 = Vec2::new(0.5, 0.0);

pub const PARTICLES_PER_TICK: usize = 2;
pub const PARTICLE_DECAY: f32 = 0.04;
const EXHAUST_SPEED: f32 = 2.0;
const EXHAUST_JITTER: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CrashReason {
    /// Left the screen sideways or over the top
    OutOfBounds,
    MissedPad,
    TooFast,
    BadAngle,
}

impl CrashReason {
    pub fn message(&self) -> &'static str {
        match self {
            Self::OutOfBounds => "LOST IN SPACE",
            Self::MissedPad => "MISSED THE PAD",
            Self::TooFast => "TOO FAST",
            Self::BadAngle => "BAD ANGLE",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LanderPhase {
    Idle,
    /// Board is ready, physics frozen until the first control key
    WaitingForFirstInput,
    Playing,
    Crashed(CrashReason),
    Landed { bonus: u32 },
}

impl LanderPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::WaitingForFirstInput => "waiting",
            Self::Playing => "playing",
            Self::Crashed(_) => "crashed",
            Self::Landed { .. } => "landed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Lander {
    /// Center of the craft
    pub pos: Vec2,
    pub vel: Vec2,
    /// Heading in radians; thrust pushes along it
    pub angle: f32,
    pub thrusting: bool,
}

impl Lander {
    pub fn spawn() -> Self {
        Self {
            pos: START_POS,
            vel: START_VEL,
            angle: UPRIGHT,
            thrusting: false,
        }
    }

    pub fn heading(&self) -> Vec2 {
        Vec2::from_angle(self.angle)
    }

    /// Screen y of the craft's lower edge
    pub fn bottom(&self) -> f32 {
        self.pos.y + LANDER_HALF_SIZE
    }
}

/// Exhaust particle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    /// 1.0 at birth, removed at 0
    pub life: f32,
}

/// Judge a touchdown. Every condition must hold; the first failure names
/// the crash.
pub fn landing_verdict(x: f32, vel: Vec2, angle: f32, pad: &LandingPad) -> Result<(), CrashReason> {
    if !pad.contains_x(x) {
        return Err(CrashReason::MissedPad);
    }
    if vel.x.abs() >= SAFE_SPEED || vel.y.abs() >= SAFE_SPEED {
        return Err(CrashReason::TooFast);
    }
    if angle_delta(angle, UPRIGHT).abs() > ANGLE_TOLERANCE + ANGLE_EPSILON {
        return Err(CrashReason::BadAngle);
    }
    Ok(())
}

/// Landing score for a successful touchdown
pub fn landing_bonus(fuel: f32) -> u32 {
    LANDING_BONUS + fuel.max(0.0).floor() as u32
}

#[derive(Debug, Clone)]
pub struct LanderGame {
    phase: LanderPhase,
    lander: Lander,
    terrain: Terrain,
    fuel: f32,
    /// Cumulative across successful landings
    score: u32,
    particles: Vec<Particle>,
    low_quality: bool,
    rng: Pcg32,
}

impl LanderGame {
    pub fn new(seed: u64) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let terrain = Terrain::generate(&mut rng, 0);
        Self {
            phase: LanderPhase::Idle,
            lander: Lander::spawn(),
            terrain,
            fuel: MAX_FUEL,
            score: 0,
            particles: Vec::new(),
            low_quality: false,
            rng,
        }
    }

    /// New terrain for the current score, craft back at the start
    pub fn init_game(&mut self) {
        self.terrain = Terrain::generate(&mut self.rng, self.score);
        self.lander = Lander::spawn();
        self.fuel = MAX_FUEL;
        self.particles.clear();
        log::debug!(
            "Lander terrain: pad x={:.1} width={:.1} at score {}",
            self.terrain.pad.x,
            self.terrain.pad.width,
            self.score
        );
    }

    /// Leave the title screen
    pub fn start(&mut self) -> bool {
        if self.phase != LanderPhase::Idle {
            return false;
        }
        self.score = 0;
        self.init_game();
        self.phase = LanderPhase::WaitingForFirstInput;
        log::info!("Lander started");
        true
    }

    /// Next board after a landing or crash. A landing keeps the score.
    pub fn retry(&mut self) -> bool {
        match self.phase {
            LanderPhase::Landed { .. } => {}
            LanderPhase::Crashed(_) => self.score = 0,
            _ => return false,
        }
        self.init_game();
        self.phase = LanderPhase::WaitingForFirstInput;
        true
    }

    pub fn stop(&mut self) {
        self.phase = LanderPhase::Idle;
        self.lander.thrusting = false;
        self.particles.clear();
    }

    /// Route a freshly pressed key. Returns true if it changed the phase.
    pub fn key_pressed(&mut self, action: KeyAction) -> bool {
        match self.phase {
            LanderPhase::Idle => {
                matches!(action, KeyAction::Space | KeyAction::Confirm) && self.start()
            }
            LanderPhase::WaitingForFirstInput => {
                if is_control(action) {
                    self.phase = LanderPhase::Playing;
                    true
                } else {
                    false
                }
            }
            LanderPhase::Crashed(_) | LanderPhase::Landed { .. } => {
                matches!(action, KeyAction::Space | KeyAction::Confirm) && self.retry()
            }
            LanderPhase::Playing => false,
        }
    }

    pub fn set_low_quality(&mut self, low_quality: bool) {
        self.low_quality = low_quality;
        if low_quality {
            self.particles.clear();
        }
    }

    /// Advance one frame. Returns the new phase if the flight ended.
    pub fn tick(&mut self, input: &InputState, time_scale: f32) -> Option<LanderPhase> {
        self.update_particles(time_scale);
        if self.phase != LanderPhase::Playing {
            self.lander.thrusting = false;
            return None;
        }

        if input.direction_held(Direction::Left) {
            self.lander.angle -= ROTATION_SPEED * time_scale;
        }
        if input.direction_held(Direction::Right) {
            self.lander.angle += ROTATION_SPEED * time_scale;
        }

        let wants_thrust =
            input.direction_held(Direction::Up) || input.action_held(KeyAction::Space);
        self.lander.thrusting = wants_thrust && self.fuel > 0.0;
        if self.lander.thrusting {
            self.lander.vel += self.lander.heading() * THRUST * time_scale;
            self.fuel = (self.fuel - FUEL_BURN * time_scale).max(0.0);
            if !self.low_quality {
                self.emit_exhaust();
            }
        }

        self.lander.vel.y += GRAVITY * time_scale;
        self.lander.pos += self.lander.vel * time_scale;

        let outcome = self.resolve_contact()?;
        self.phase = outcome;
        self.lander.thrusting = false;
        match outcome {
            LanderPhase::Landed { bonus } => {
                log::info!("Landed, +{} (total {})", bonus, self.score)
            }
            LanderPhase::Crashed(reason) => log::info!("Crashed: {:?}", reason),
            _ => {}
        }
        Some(outcome)
    }

    /// Bounds first, then ground contact
    fn resolve_contact(&mut self) -> Option<LanderPhase> {
        let pos = self.lander.pos;
        if pos.x < 0.0 || pos.x > CANVAS_WIDTH || pos.y < 0.0 {
            return Some(LanderPhase::Crashed(CrashReason::OutOfBounds));
        }

        let ground = self.terrain.ground_y(pos.x);
        if self.lander.bottom() < ground {
            return None;
        }

        match landing_verdict(pos.x, self.lander.vel, self.lander.angle, &self.terrain.pad) {
            Ok(()) => {
                let bonus = landing_bonus(self.fuel);
                self.score += bonus;
                self.lander.pos.y = ground - LANDER_HALF_SIZE;
                self.lander.vel = Vec2::ZERO;
                Some(LanderPhase::Landed { bonus })
            }
            Err(reason) => Some(LanderPhase::Crashed(reason)),
        }
    }

    fn emit_exhaust(&mut self) {
        let heading = self.lander.heading();
        let nozzle = self.lander.pos - heading * LANDER_HALF_SIZE;
        for _ in 0..PARTICLES_PER_TICK {
            let jitter = Vec2::new(
                self.rng.random_range(-EXHAUST_JITTER..EXHAUST_JITTER),
                self.rng.random_range(-EXHAUST_JITTER..EXHAUST_JITTER),
            );
            self.particles.push(Particle {
                pos: nozzle,
                vel: self.lander.vel - heading * EXHAUST_SPEED + jitter,
                life: 1.0,
            });
        }
    }

    fn update_particles(&mut self, time_scale: f32) {
        for p in &mut self.particles {
            p.pos += p.vel * time_scale;
            p.life -= PARTICLE_DECAY * time_scale;
        }
        self.particles.retain(|p| p.life > 0.0);
    }

    pub fn phase(&self) -> LanderPhase {
        self.phase
    }

    /// Whether the game wants keyboard focus
    pub fn is_active(&self) -> bool {
        matches!(
            self.phase,
            LanderPhase::WaitingForFirstInput | LanderPhase::Playing
        )
    }

    pub fn lander(&self) -> &Lander {
        &self.lander
    }

    pub fn terrain(&self) -> &Terrain {
        &self.terrain
    }

    pub fn fuel(&self) -> f32 {
        self.fuel
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }
}

/// Keys that wake the craft from its frozen start
fn is_control(action: KeyAction) -> bool {
    matches!(
        action,
        KeyAction::Space
            | KeyAction::Move(Direction::Left | Direction::Right | Direction::Up)
    )
}
