//! Arcade settings and preferences
//!
//! Persisted separately from high scores in LocalStorage.

use serde::{Deserialize, Serialize};

use crate::consts::DEFAULT_ACCENT;
use crate::platform::KeyValueStore;

/// Keyboard layout used for letter bindings. Arrow keys work in both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum KeyLayout {
    /// Arrows + WASD
    #[default]
    Qwerty,
    /// Arrows + ZQSD
    Azerty,
}

impl KeyLayout {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyLayout::Qwerty => "qwerty",
            KeyLayout::Azerty => "azerty",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "qwerty" | "wasd" => Some(KeyLayout::Qwerty),
            "azerty" | "zqsd" => Some(KeyLayout::Azerty),
            _ => None,
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            KeyLayout::Qwerty => KeyLayout::Azerty,
            KeyLayout::Azerty => KeyLayout::Qwerty,
        }
    }
}

/// The two Pong tunings that ship side by side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum PongPreset {
    /// Short trail, sharp AI, rally points (+50 / -50)
    #[default]
    Arcade,
    /// Long trail, lazy AI, rally score only
    Casual,
}

impl PongPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            PongPreset::Arcade => "arcade",
            PongPreset::Casual => "casual",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "arcade" => Some(PongPreset::Arcade),
            "casual" => Some(PongPreset::Casual),
            _ => None,
        }
    }

    /// Maximum trail points kept behind the ball
    pub fn trail_length(&self) -> usize {
        match self {
            PongPreset::Arcade => 15,
            PongPreset::Casual => 30,
        }
    }

    /// AI paddle speed in pixels per reference frame
    pub fn ai_speed(&self) -> f32 {
        match self {
            PongPreset::Arcade => 6.0,
            PongPreset::Casual => 1.2,
        }
    }

    /// Whether rallies move the separate points counter
    pub fn awards_points(&self) -> bool {
        matches!(self, PongPreset::Arcade)
    }
}

/// Preferences shared by every game in the arcade
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Letter bindings for Snake and Lunar Lander
    pub key_layout: KeyLayout,
    /// Pong tuning
    pub pong_preset: PongPreset,
    /// CSS accent color handed to Snake and Lunar Lander
    pub accent: String,
    /// Draw the frame-rate overlay
    pub show_fps: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            key_layout: KeyLayout::Qwerty,
            pong_preset: PongPreset::Arcade,
            accent: DEFAULT_ACCENT.to_string(),
            show_fps: false,
        }
    }
}

impl Settings {
    /// LocalStorage key
    pub const STORAGE_KEY: &'static str = "phosphor_arcade_settings";

    /// Load settings, falling back to defaults on missing or corrupt data
    pub fn load_from(store: &dyn KeyValueStore) -> Self {
        match store.get_item(Self::STORAGE_KEY) {
            Some(json) => match serde_json::from_str(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from storage");
                    settings
                }
                Err(e) => {
                    log::warn!("Ignoring corrupt settings: {}", e);
                    Self::default()
                }
            },
            None => {
                log::info!("No stored settings, starting from defaults");
                Self::default()
            }
        }
    }

    pub fn save_to(&self, store: &mut dyn KeyValueStore) {
        match serde_json::to_string(self) {
            Ok(json) => {
                if store.set_item(Self::STORAGE_KEY, &json) {
                    log::debug!("Stored settings under {}", Self::STORAGE_KEY);
                } else {
                    log::warn!("Settings could not be written");
                }
            }
            Err(e) => log::warn!("Settings could not be serialized: {}", e),
        }
    }

    /// Read from the browser's LocalStorage
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        Self::load_from(&crate::platform::LocalStore)
    }

    /// Write to the browser's LocalStorage
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        self.save_to(&mut crate::platform::LocalStore);
    }

    /// Off the web there is nowhere to persist, so every run starts fresh
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::MemoryStore;

    #[test]
    fn test_layout_parse_and_toggle() {
        assert_eq!(KeyLayout::from_str("ZQSD"), Some(KeyLayout::Azerty));
        assert_eq!(KeyLayout::from_str("qwerty"), Some(KeyLayout::Qwerty));
        assert_eq!(KeyLayout::from_str("dvorak"), None);
        assert_eq!(KeyLayout::Qwerty.toggled(), KeyLayout::Azerty);
    }

    #[test]
    fn test_pong_presets_differ() {
        assert_eq!(PongPreset::Arcade.trail_length(), 15);
        assert_eq!(PongPreset::Casual.trail_length(), 30);
        assert_eq!(PongPreset::Arcade.ai_speed(), 6.0);
        assert_eq!(PongPreset::Casual.ai_speed(), 1.2);
        assert!(PongPreset::Arcade.awards_points());
        assert!(!PongPreset::Casual.awards_points());
    }

    #[test]
    fn test_settings_persist() {
        let mut store = MemoryStore::new();
        let settings = Settings {
            key_layout: KeyLayout::Azerty,
            pong_preset: PongPreset::Casual,
            accent: "#ff00ff".into(),
            show_fps: true,
        };
        settings.save_to(&mut store);
        assert_eq!(Settings::load_from(&store), settings);
    }

    #[test]
    fn test_corrupt_settings_fall_back() {
        let mut store = MemoryStore::new();
        store.set_item(Settings::STORAGE_KEY, "{not json");
        assert_eq!(Settings::load_from(&store), Settings::default());
    }

    #[test]
    fn test_partial_settings_fill_defaults() {
        let mut store = MemoryStore::new();
        store.set_item(Settings::STORAGE_KEY, r#"{"key_layout":"Azerty"}"#);
        let settings = Settings::load_from(&store);
        assert_eq!(settings.key_layout, KeyLayout::Azerty);
        assert_eq!(settings.accent, DEFAULT_ACCENT);
    }
}
