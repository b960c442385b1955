//! User preferences, persisted as JSON next to the high score.

use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Start with sound off
    pub muted: bool,
    /// Effect volume (0.0 - 1.0)
    pub volume: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            muted: false,
            volume: 0.6,
        }
    }
}

impl Settings {
    /// Read settings from `path`, falling back to defaults.
    pub fn load_from(path: &Path) -> Self {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Self::default(),
            Err(err) => {
                log::warn!("failed to read settings from {}: {err}", path.display());
                return Self::default();
            }
        };
        match serde_json::from_str::<Settings>(&text) {
            Ok(settings) => settings.sanitized(),
            Err(err) => {
                log::warn!("ignoring malformed settings in {}: {err}", path.display());
                Self::default()
            }
        }
    }

    pub fn save_to(&self, path: &Path) -> io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)
    }

    fn sanitized(mut self) -> Self {
        self.volume = if self.volume.is_finite() {
            self.volume.clamp(0.0, 1.0)
        } else {
            Self::default().volume
        };
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("term-rex-settings-{}-{name}.json", std::process::id()))
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let path = temp_path("missing");
        let _ = fs::remove_file(&path);
        assert_eq!(Settings::load_from(&path), Settings::default());
    }

    #[test]
    fn test_save_and_load() {
        let path = temp_path("roundtrip");
        let settings = Settings {
            muted: true,
            volume: 0.25,
        };
        settings.save_to(&path).unwrap();
        assert_eq!(Settings::load_from(&path), settings);
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_partial_file_fills_in_defaults() {
        let path = temp_path("partial");
        fs::write(&path, r#"{ "muted": true }"#).unwrap();
        let settings = Settings::load_from(&path);
        assert!(settings.muted);
        assert_eq!(settings.volume, Settings::default().volume);
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_malformed_file_gives_defaults() {
        let path = temp_path("malformed");
        fs::write(&path, "{ muted: yes").unwrap();
        assert_eq!(Settings::load_from(&path), Settings::default());
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_volume_is_clamped() {
        let path = temp_path("loud");
        fs::write(&path, r#"{ "volume": 7.5 }"#).unwrap();
        assert_eq!(Settings::load_from(&path).volume, 1.0);
        fs::remove_file(&path).unwrap();
    }
}
