//! Application settings structs, defaults and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files and shared across tasks.
//! Every field carries a serde default, so a partial `settings.toml` only
//! needs the keys the user actually changed.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::AppPaths;

// ---------------------------------------------------------------------------
// ServiceConfig
// ---------------------------------------------------------------------------

/// Connection settings for the external recipe service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Base URL that the `/recipes…` paths are appended to.
    pub base_url: String,
    /// Per-request timeout in seconds.  `0` disables the timeout, in which
    /// case a request that never answers leaves its branch loading forever.
    pub timeout_secs: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".into(),
            timeout_secs: 30,
        }
    }
}

// ---------------------------------------------------------------------------
// VoiceConfig
// ---------------------------------------------------------------------------

/// Speech input settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceConfig {
    /// Master switch for voice capture.
    pub enabled: bool,
    /// External speech-to-text program, e.g. `"whisper-stream --stdout"`.
    ///
    /// Every line it prints is taken as one finished utterance.  `None`
    /// means the host has no speech capability.
    pub command: Option<String>,
    /// BCP-47 language tag handed to the command via `SPEECH_LANG`.
    pub language: String,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            command: None,
            language: "en-US".into(),
        }
    }
}

impl VoiceConfig {
    /// The command to run when voice is both enabled and configured.
    pub fn active_command(&self) -> Option<&str> {
        if !self.enabled {
            return None;
        }
        self.command
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
    }
}

// ---------------------------------------------------------------------------
// DisplayConfig
// ---------------------------------------------------------------------------

/// Terminal rendering settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// How many recommended recipes are shown in the first row.
    pub recommended_limit: usize,
    /// Print the time / cost / rating indicators next to each recipe.
    pub show_indicators: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            recommended_limit: 10,
            show_indicators: true,
        }
    }
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level application configuration, serialised as `settings.toml`.
///
/// # Persistence
///
/// ```rust,no_run
/// use recipe_finder::config::AppConfig;
///
/// // Load (returns Default when file is missing)
/// let mut config = AppConfig::load().unwrap();
///
/// // Modify and save
/// config.display.recommended_limit = 5;
/// config.save_to(std::path::Path::new("settings.toml")).unwrap();
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Recipe service connection.
    pub service: ServiceConfig,
    /// Speech input.
    pub voice: VoiceConfig,
    /// Terminal output.
    pub display: DisplayConfig,
}

impl AppConfig {
    /// Load configuration from the platform-appropriate `settings.toml`.
    ///
    /// Returns `Ok(AppConfig::default())` when the file does not exist yet
    /// so callers never need to special-case a missing file.
    pub fn load() -> Result<Self> {
        Self::load_from(&AppPaths::new().settings_file)
    }

    /// Load from an explicit path (also used by `--config`).
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save to `path`, creating parent directories as needed.
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn load_missing_returns_default() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("nonexistent.toml");

        let config = AppConfig::load_from(&path).expect("should not error");
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn default_values() {
        let cfg = AppConfig::default();

        assert_eq!(cfg.service.base_url, "http://localhost:8000");
        assert_eq!(cfg.service.timeout_secs, 30);
        assert!(cfg.voice.enabled);
        assert!(cfg.voice.command.is_none());
        assert_eq!(cfg.voice.language, "en-US");
        assert_eq!(cfg.display.recommended_limit, 10);
        assert!(cfg.display.show_indicators);
    }

    #[test]
    fn round_trip_modified_values() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("nested").join("settings.toml");

        let mut cfg = AppConfig::default();
        cfg.service.base_url = "https://recipes.example.com/api".into();
        cfg.service.timeout_secs = 5;
        cfg.voice.command = Some("whisper-stream --stdout".into());
        cfg.voice.language = "de-DE".into();
        cfg.display.recommended_limit = 4;

        cfg.save_to(&path).expect("save");
        let loaded = AppConfig::load_from(&path).expect("load");

        assert_eq!(loaded, cfg);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("settings.toml");
        std::fs::write(&path, "[service]\nbase_url = \"http://10.0.0.2:9000\"\n").unwrap();

        let loaded = AppConfig::load_from(&path).expect("load");
        assert_eq!(loaded.service.base_url, "http://10.0.0.2:9000");
        assert_eq!(loaded.service.timeout_secs, 30);
        assert_eq!(loaded.display, DisplayConfig::default());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("settings.toml");
        std::fs::write(&path, "[service\nbase_url = ").unwrap();

        assert!(AppConfig::load_from(&path).is_err());
    }

    #[test]
    fn active_command_requires_enabled_and_non_blank() {
        let mut voice = VoiceConfig::default();
        assert_eq!(voice.active_command(), None);

        voice.command = Some("   ".into());
        assert_eq!(voice.active_command(), None);

        voice.command = Some(" listen --stdout ".into());
        assert_eq!(voice.active_command(), Some("listen --stdout"));

        voice.enabled = false;
        assert_eq!(voice.active_command(), None);
    }
}
