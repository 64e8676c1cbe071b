//! Configuration file support for the editor.
//!
//! A single versioned JSON document carries user preferences, the commit
//! thresholds, the history size, keybindings and the class list.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::history::HistoryConfig;
use crate::keybindings::KeyBindings;
use crate::model::{AnnotationClass, CommitRules, default_classes};

/// Log level setting for the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Show only errors
    Error,
    /// Show errors and warnings
    Warn,
    /// Show errors, warnings, and info messages
    #[default]
    Info,
    /// Show debug-level logging
    Debug,
    /// Show all log messages including trace
    Trace,
}

impl LogLevel {
    /// Convert to log crate's LevelFilter.
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Current configuration file format version.
/// Increment this when making breaking changes to the config format.
pub const CONFIG_VERSION: u32 = 1;

/// Editor configuration that can be exported and imported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditorConfig {
    /// Version of the configuration file format
    pub version: u32,

    /// Application name (for identification)
    #[serde(default = "default_app_name")]
    pub app_name: String,

    /// User preferences
    #[serde(default)]
    pub preferences: UserPreferences,

    /// Thresholds applied when a drawing is committed
    #[serde(default)]
    pub commit: CommitRules,

    /// Undo history settings
    #[serde(default)]
    pub history: HistoryConfig,

    /// Keybinding configuration
    #[serde(default)]
    pub keybindings: KeyBindings,

    /// Class definitions
    #[serde(default = "default_classes")]
    pub classes: Vec<AnnotationClass>,
}

fn default_app_name() -> String {
    "labelkit".to_string()
}

/// User preferences section of the config.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPreferences {
    /// Log verbosity level
    #[serde(default)]
    pub log_level: LogLevel,
}

impl EditorConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self {
            version: CONFIG_VERSION,
            app_name: default_app_name(),
            preferences: UserPreferences::default(),
            commit: CommitRules::default(),
            history: HistoryConfig::default(),
            keybindings: KeyBindings::default(),
            classes: default_classes(),
        }
    }

    /// Serialize the configuration to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;

        // Validate version compatibility
        if config.version > CONFIG_VERSION {
            return Err(ConfigError::VersionTooNew {
                file_version: config.version,
                supported_version: CONFIG_VERSION,
            });
        }

        Ok(config)
    }

    /// Read configuration from a file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Write configuration to a file, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_json()?)?;
        log::info!("Saved configuration to {:?}", path);
        Ok(())
    }

    /// Get the default filename for the config file.
    pub fn default_filename() -> &'static str {
        "labelkit-config.json"
    }

    /// Get the default config file path.
    pub fn default_path() -> Option<PathBuf> {
        // Try to use XDG config directory, fall back to home directory
        if let Some(config_dir) = dirs::config_dir() {
            Some(config_dir.join("labelkit").join(Self::default_filename()))
        } else {
            dirs::home_dir().map(|home| {
                home.join(".config")
                    .join("labelkit")
                    .join(Self::default_filename())
            })
        }
    }

    /// Try to load configuration from the default path.
    /// Returns None if the file doesn't exist or can't be used.
    pub fn load_from_default_path() -> Option<Self> {
        let path = Self::default_path()?;
        if !path.exists() {
            log::debug!("No config file found at {:?}", path);
            return None;
        }

        match Self::load(&path) {
            Ok(config) => Some(config),
            Err(e) => {
                log::warn!("Ignoring config file {:?}: {}", path, e);
                None
            }
        }
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// JSON parsing error
    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] serde_json::Error),

    /// Configuration version is newer than supported
    #[error(
        "Configuration file version {file_version} is newer than supported version {supported_version}"
    )]
    VersionTooNew {
        file_version: u32,
        supported_version: u32,
    },

    /// I/O error when reading/writing config
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keybindings::KeyCode;
    use crate::tool::Tool;

    #[test]
    fn test_defaults() {
        let config = EditorConfig::new();
        assert_eq!(config.version, CONFIG_VERSION);
        assert_eq!(config.commit.min_bbox_size, 5.0);
        assert_eq!(config.commit.min_polygon_points, 3);
        assert_eq!(config.history.max_history, 100);
        assert_eq!(config.classes.len(), 2);
        assert_eq!(config.preferences.log_level.to_level_filter(), log::LevelFilter::Info);
    }

    #[test]
    fn test_json_roundtrip() {
        let mut config = EditorConfig::new();
        config.preferences.log_level = LogLevel::Debug;
        config.history.max_history = 10;
        config.keybindings.set_tool_key(Some(Tool::Polygon), KeyCode::G);

        let parsed = EditorConfig::from_json(&config.to_json().unwrap()).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_minimal_json_fills_defaults() {
        let config = EditorConfig::from_json(r#"{"version": 1, "commit": {"min_bbox_size": 12.5}}"#)
            .unwrap();
        assert_eq!(config.commit.min_bbox_size, 12.5);
        assert_eq!(config.commit.min_polygon_points, 3);
        assert_eq!(config.app_name, "labelkit");
        assert_eq!(config.keybindings, KeyBindings::default());
        assert_eq!(config.classes, default_classes());
    }

    #[test]
    fn test_version_too_new() {
        let err = EditorConfig::from_json(r#"{"version": 99}"#).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::VersionTooNew {
                file_version: 99,
                supported_version: CONFIG_VERSION
            }
        ));
    }

    #[test]
    fn test_parse_error() {
        let err = EditorConfig::from_json("not json").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
        assert!(err.to_string().starts_with("Failed to parse configuration"));
    }

    #[test]
    fn test_save_and_load() {
        let dir = std::env::temp_dir().join(format!("labelkit-config-{}", std::process::id()));
        let path = dir.join("nested").join("config.json");

        let config = EditorConfig::new();
        config.save(&path).unwrap();
        assert_eq!(EditorConfig::load(&path).unwrap(), config);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = EditorConfig::load(Path::new("/nonexistent/labelkit.json")).unwrap_err();
        assert!(matches!(err, ConfigError::IoError(_)));
    }
}
