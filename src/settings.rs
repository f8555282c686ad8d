//! Game settings and preferences
//!
//! Persisted separately from the high score.

use serde::{Deserialize, Serialize};

use crate::persistence::{self, Storage};

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === HUD ===
    /// Show FPS counter
    pub show_fps: bool,

    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    /// Music volume (0.0 - 1.0)
    pub music_volume: f32,
    /// Mute when window loses focus
    pub mute_on_blur: bool,

    // === Accessibility ===
    /// Reduced motion (no background color cycling)
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            show_fps: false,

            master_volume: 0.8,
            sfx_volume: 1.0,
            music_volume: 0.5,
            mute_on_blur: true,

            reduced_motion: false,
        }
    }
}

impl Settings {
    /// Storage key
    const STORAGE_KEY: &'static str = "duet_settings";

    /// Effective background cycling (respects reduced_motion)
    pub fn background_cycling(&self) -> bool {
        !self.reduced_motion
    }

    /// Clamp volumes into range (hand-edited files)
    pub fn sanitized(mut self) -> Self {
        self.master_volume = self.master_volume.clamp(0.0, 1.0);
        self.sfx_volume = self.sfx_volume.clamp(0.0, 1.0);
        self.music_volume = self.music_volume.clamp(0.0, 1.0);
        self
    }

    /// Load settings (defaults if missing/corrupt)
    pub fn load(storage: &dyn Storage) -> Self {
        let settings: Self = persistence::load_or_default(storage, Self::STORAGE_KEY);
        settings.sanitized()
    }

    /// Save settings
    pub fn save(&self, storage: &mut dyn Storage) {
        if persistence::save(storage, Self::STORAGE_KEY, self) {
            log::info!("Settings saved");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStorage;

    #[test]
    fn test_partial_settings_fill_defaults() {
        let mut storage = MemoryStorage::new();
        storage
            .set("duet_settings", r#"{"reduced_motion": true, "master_volume": 4.0}"#)
            .unwrap();
        let s = Settings::load(&storage);
        assert!(s.reduced_motion);
        assert!(!s.background_cycling());
        assert_eq!(s.master_volume, 1.0);
        assert_eq!(s.sfx_volume, 1.0);
    }

    #[test]
    fn test_roundtrip() {
        let mut storage = MemoryStorage::new();
        let s = Settings {
            show_fps: true,
            ..Default::default()
        };
        s.save(&mut storage);
        assert_eq!(Settings::load(&storage), s);
    }
}
