//! Game settings and preferences
//!
//! Persisted as JSON next to the other save data.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::RESPAWN_DELAY;
use crate::music::GroupVolumes;

/// Game settings/preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    // === Audio ===
    /// Melody track volume (0.0 - 1.0)
    pub main_volume: f32,
    /// Accompaniment volume (0.0 - 1.0)
    pub background_volume: f32,
    /// Bass track volume (0.0 - 1.0)
    pub bass_volume: f32,
    /// Mute all audio output
    pub muted: bool,

    // === Gameplay ===
    /// Seconds before the player respawns after dying
    pub respawn_delay: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            main_volume: 0.8,
            background_volume: 0.5,
            bass_volume: 0.6,
            muted: false,
            respawn_delay: RESPAWN_DELAY,
        }
    }
}

impl Settings {
    /// Group volumes for the scheduler, honoring the mute switch
    pub fn group_volumes(&self) -> GroupVolumes {
        if self.muted {
            GroupVolumes {
                main: 0.0,
                background: 0.0,
                bass: 0.0,
            }
        } else {
            GroupVolumes {
                main: self.main_volume,
                background: self.background_volume,
                bass: self.bass_volume,
            }
        }
    }

    /// Load settings from a JSON file, falling back to defaults
    pub fn load(path: impl AsRef<Path>) -> Self {
        match fs::read_to_string(path.as_ref()) {
            Ok(json) => match serde_json::from_str(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from {}", path.as_ref().display());
                    settings
                }
                Err(err) => {
                    log::warn!("Ignoring malformed settings file: {err}");
                    Self::default()
                }
            },
            Err(_) => {
                log::info!("Using default settings");
                Self::default()
            }
        }
    }

    /// Save settings to a JSON file
    pub fn save(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        fs::write(path, json)
    }
}
