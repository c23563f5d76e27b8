//! Game simulation
//!
//! All gameplay logic lives here:
//! - Time enters only as a frame time scale or elapsed milliseconds
//! - Seeded RNG only
//! - No rendering or DOM access

pub mod collision;
pub mod lander;
pub mod pong;
pub mod snake;
pub mod terrain;

pub use collision::Rect;
pub use lander::{CrashReason, Lander, LanderGame, LanderPhase, Particle, landing_verdict};
pub use pong::{Ball, Paddle, PongGame, PongPhase, Side};
pub use snake::{DeathCause, SnakeGame, SnakePhase, StepOutcome};
pub use terrain::{LandingPad, Terrain, pad_width_for_score};
