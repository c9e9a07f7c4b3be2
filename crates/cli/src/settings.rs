use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use signspeak_core::shared::constants::{APP_DIR_NAME, DEFAULT_FPS, DEFAULT_MARKER_RADIUS};

/// Persistent defaults read from `settings.json`. Every field is optional in
/// the file; command-line flags take precedence over all of them.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Loop rate used when the stream reports none.
    pub fps: f64,
    pub confidence: f64,
    pub mirror: bool,
    pub announce_unknown: bool,
    pub marker_radius: u32,
    pub speech_command: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            fps: DEFAULT_FPS,
            confidence: 0.5,
            mirror: true,
            announce_unknown: true,
            marker_radius: DEFAULT_MARKER_RADIUS,
            speech_command: None,
        }
    }
}

impl Settings {
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(APP_DIR_NAME).join("settings.json"))
    }

    /// Loads the user's settings file, or defaults if there is none.
    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Self::default(),
        }
    }

    /// Missing or unreadable files fall back to defaults with a warning.
    pub fn load_from(path: &Path) -> Self {
        let json = match fs::read_to_string(path) {
            Ok(json) => json,
            Err(e) => {
                log::warn!("Cannot read settings {}: {e}", path.display());
                return Self::default();
            }
        };
        match serde_json::from_str(&json) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("Ignoring invalid settings {}: {e}", path.display());
                Self::default()
            }
        }
    }
}
