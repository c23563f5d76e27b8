//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Time/ticks (frame clock, performance monitor)
//! - Input events (held keys, pointer, key layouts)
//! - Storage (LocalStorage on web, in-memory elsewhere)

pub mod input;
pub mod storage;
pub mod time;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use input::{Direction, InputState, KeyAction, PointerState};
pub use storage::{KeyValueStore, MemoryStore};
#[cfg(target_arch = "wasm32")]
pub use storage::LocalStore;
pub use time::{FrameClock, FrameTime, PerfMonitor};
