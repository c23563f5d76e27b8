//! Per-game high scores
//!
//! One integer per game, each under its own fixed LocalStorage key.

use serde::{Deserialize, Serialize};

use crate::arcade::GameKind;
use crate::platform::KeyValueStore;

/// Best score for each game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct HighScores {
    pub pong: u32,
    pub snake: u32,
    pub lander: u32,
}

impl HighScores {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, kind: GameKind) -> u32 {
        match kind {
            GameKind::Pong => self.pong,
            GameKind::Snake => self.snake,
            GameKind::Lander => self.lander,
        }
    }

    fn slot(&mut self, kind: GameKind) -> &mut u32 {
        match kind {
            GameKind::Pong => &mut self.pong,
            GameKind::Snake => &mut self.snake,
            GameKind::Lander => &mut self.lander,
        }
    }

    /// Read a single game's score. Anything unreadable counts as zero.
    pub fn read(store: &dyn KeyValueStore, kind: GameKind) -> u32 {
        let key = kind.storage_key();
        match store.get_item(key) {
            Some(raw) => match serde_json::from_str::<u32>(raw.trim()) {
                Ok(score) => score,
                Err(e) => {
                    log::warn!("High score under {} unreadable ({}), using 0", key, e);
                    0
                }
            },
            None => 0,
        }
    }

    /// Re-read one game's score, e.g. when it is mounted
    pub fn reload(&mut self, store: &dyn KeyValueStore, kind: GameKind) -> u32 {
        let score = Self::read(store, kind);
        *self.slot(kind) = score;
        score
    }

    /// Load all games' scores
    pub fn load_from(store: &dyn KeyValueStore) -> Self {
        let scores = Self {
            pong: Self::read(store, GameKind::Pong),
            snake: Self::read(store, GameKind::Snake),
            lander: Self::read(store, GameKind::Lander),
        };
        log::info!(
            "Loaded high scores: pong={} snake={} lander={}",
            scores.pong,
            scores.snake,
            scores.lander
        );
        scores
    }

    /// Record a running score. Persists and returns true only when it beats
    /// the stored value.
    pub fn submit(&mut self, kind: GameKind, score: u32, store: &mut dyn KeyValueStore) -> bool {
        let best = self.slot(kind);
        if score <= *best {
            return false;
        }
        *best = score;
        if !store.set_item(kind.storage_key(), &score.to_string()) {
            log::warn!("Could not persist {} high score", kind.as_str());
        }
        true
    }
}
