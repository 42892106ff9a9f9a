//! Persistent display preferences, stored as JSON.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverlayPosition {
    pub x: i32,
    pub y: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Remembered name for the "you" token.
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default = "default_debug_mode")]
    pub debug_mode: bool,
    #[serde(default)]
    pub overlay_position: Option<OverlayPosition>,
}

const fn default_debug_mode() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            username: None,
            debug_mode: default_debug_mode(),
            overlay_position: None,
        }
    }
}

impl Settings {
    /// Load settings; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("no settings at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read settings {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse settings {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .with_context(|| format!("failed to write settings {}", path.display()))?;
        log::info!("settings saved to {}", path.display());
        Ok(())
    }

    /// Remember `name` as the viewing player. Blank names clear it.
    pub fn remember_username(&mut self, name: &str) {
        let name = name.trim();
        self.username = (!name.is_empty()).then(|| name.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let path = std::env::temp_dir().join("catan-ledger-no-such-settings.json");
        let _ = std::fs::remove_file(&path);
        let settings = Settings::load(&path).unwrap();
        assert_eq!(settings, Settings::default());
        assert!(settings.debug_mode);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"username":"Ann"}"#).unwrap();
        assert_eq!(settings.username.as_deref(), Some("Ann"));
        assert!(settings.debug_mode);
        assert_eq!(settings.overlay_position, None);
    }

    #[test]
    fn saved_settings_load_back() {
        let path = std::env::temp_dir()
            .join("catan-ledger-settings-test")
            .join("settings.json");
        let mut settings = Settings {
            debug_mode: false,
            overlay_position: Some(OverlayPosition { x: 40, y: -12 }),
            ..Settings::default()
        };
        settings.remember_username("  Ben ");
        settings.save(&path).unwrap();
        assert_eq!(Settings::load(&path).unwrap(), settings);

        settings.remember_username("   ");
        assert_eq!(settings.username, None);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let path = std::env::temp_dir().join("catan-ledger-bad-settings.json");
        std::fs::write(&path, "{ nope").unwrap();
        let err = Settings::load(&path).unwrap_err();
        assert!(err.to_string().contains("failed to parse settings"));
    }
}
