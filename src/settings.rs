//! Player settings and preferences
//!
//! Persisted separately from progress under [`Settings::STORAGE_KEY`].

use serde::{Deserialize, Serialize};

use crate::consts::DEFAULT_VIEW_SECONDS;
use crate::platform::storage::KeyValueStore;

/// Placement mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PlayMode {
    /// Drop targets are outlined in their expected shape's color
    #[default]
    Guided,
    /// No outlines
    Free,
}

impl PlayMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlayMode::Guided => "guided",
            PlayMode::Free => "free",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "guided" => Some(PlayMode::Guided),
            "free" => Some(PlayMode::Free),
            _ => None,
        }
    }
}

/// Player settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Grid size used when picking the next pattern
    pub grid: u32,
    pub mode: PlayMode,
    /// How long the pattern is shown before placement starts
    pub view_seconds: u32,
    pub sound_on: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            grid: 3,
            mode: PlayMode::Guided,
            view_seconds: DEFAULT_VIEW_SECONDS,
            sound_on: true,
        }
    }
}

impl Settings {
    /// Storage key
    pub const STORAGE_KEY: &'static str = "tangram_settings";

    /// Load settings, falling back to defaults
    pub fn load(storage: &dyn KeyValueStore) -> Self {
        if let Ok(Some(json)) = storage.get(Self::STORAGE_KEY) {
            if let Ok(mut settings) = serde_json::from_str::<Settings>(&json) {
                settings.grid = settings.grid.max(1);
                log::info!("Loaded settings");
                return settings;
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings (best effort)
    pub fn save(&self, storage: &mut dyn KeyValueStore) {
        if let Ok(json) = serde_json::to_string(self) {
            match storage.set(Self::STORAGE_KEY, &json) {
                Ok(()) => log::info!("Settings saved"),
                Err(e) => log::warn!("Failed to save settings: {e}"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::storage::MemoryStore;

    #[test]
    fn test_mode_parsing() {
        assert_eq!(PlayMode::from_str("Guided"), Some(PlayMode::Guided));
        assert_eq!(PlayMode::from_str("FREE"), Some(PlayMode::Free));
        assert_eq!(PlayMode::from_str("hard"), None);
        assert_eq!(PlayMode::Free.as_str(), "free");
    }

    #[test]
    fn test_defaults() {
        let s = Settings::default();
        assert_eq!(s.grid, 3);
        assert_eq!(s.mode, PlayMode::Guided);
        assert_eq!(s.view_seconds, 5);
        assert!(s.sound_on);
    }

    #[test]
    fn test_round_trip_and_partial_json() {
        let mut storage = MemoryStore::new();
        assert_eq!(Settings::load(&storage), Settings::default());

        let custom = Settings {
            grid: 5,
            mode: PlayMode::Free,
            view_seconds: 2,
            sound_on: false,
        };
        custom.save(&mut storage);
        assert_eq!(Settings::load(&storage), custom);

        storage.set(Settings::STORAGE_KEY, r#"{"mode": "free", "grid": 0}"#).unwrap();
        let loaded = Settings::load(&storage);
        assert_eq!(loaded.mode, PlayMode::Free);
        assert_eq!(loaded.grid, 1);
        assert_eq!(loaded.view_seconds, 5);
    }
}
