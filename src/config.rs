//! Configuration file support.
//!
//! Settings are stored as JSON in the user's config directory and loaded at
//! startup. Missing fields fall back to defaults, so older files keep working.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::constants::{APP_DIR_NAME, DEFAULT_HIT_TOLERANCE};
use crate::keybindings::KeyBindings;
use crate::scene::Key;

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

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Version of the configuration file format
    pub version: u32,

    /// Application name (for identification)
    #[serde(default = "default_app_name")]
    pub app_name: String,

    /// User preferences
    #[serde(default)]
    pub preferences: UserPreferences,

    /// Keybinding configuration
    #[serde(default)]
    pub keybindings: KeyBindingsConfig,
}

fn default_app_name() -> String {
    "ROI Annotator".to_string()
}

/// User preferences section of the config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserPreferences {
    /// Log verbosity level
    #[serde(default)]
    pub log_level: LogLevel,

    /// Class list file opened at startup, if any
    #[serde(default)]
    pub class_file: Option<PathBuf>,

    /// Folder annotation files are saved to by default
    #[serde(default)]
    pub annotation_folder: Option<PathBuf>,

    /// Hit radius for lines and thin shapes, in image pixels
    #[serde(default = "default_hit_tolerance")]
    pub hit_tolerance: f64,
}

fn default_hit_tolerance() -> f64 {
    DEFAULT_HIT_TOLERANCE
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            log_level: LogLevel::default(),
            class_file: None,
            annotation_folder: None,
            hit_tolerance: default_hit_tolerance(),
        }
    }
}

/// Keybinding configuration section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyBindingsConfig {
    /// Hotkey for the Select tool
    pub tool_select: Key,
    /// Hotkey for the Line tool
    pub tool_line: Key,
    /// Hotkey for the Rectangle tool
    pub tool_rectangle: Key,
    /// Hotkey for the Trapezoid tool
    pub tool_trapezoid: Key,
    /// Hotkey for the Polygon tool
    pub tool_polygon: Key,
    /// Hotkey for the Rotate tool
    pub tool_rotate: Key,
    /// Modifier held while editing a shape
    pub edit_modifier: Key,
    /// Deletes the selection
    pub delete: Key,
}

impl Default for KeyBindingsConfig {
    fn default() -> Self {
        Self::from(&KeyBindings::default())
    }
}

impl From<&KeyBindings> for KeyBindingsConfig {
    fn from(bindings: &KeyBindings) -> Self {
        Self {
            tool_select: bindings.tool_select,
            tool_line: bindings.tool_line,
            tool_rectangle: bindings.tool_rectangle,
            tool_trapezoid: bindings.tool_trapezoid,
            tool_polygon: bindings.tool_polygon,
            tool_rotate: bindings.tool_rotate,
            edit_modifier: bindings.edit_modifier,
            delete: bindings.delete,
        }
    }
}

impl KeyBindingsConfig {
    /// Convert back to KeyBindings.
    pub fn to_keybindings(&self) -> KeyBindings {
        KeyBindings {
            tool_select: self.tool_select,
            tool_line: self.tool_line,
            tool_rectangle: self.tool_rectangle,
            tool_trapezoid: self.tool_trapezoid,
            tool_polygon: self.tool_polygon,
            tool_rotate: self.tool_rotate,
            edit_modifier: self.edit_modifier,
            delete: self.delete,
        }
    }
}

impl AppConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self {
            version: CONFIG_VERSION,
            app_name: default_app_name(),
            preferences: UserPreferences::default(),
            keybindings: KeyBindingsConfig::default(),
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

    /// Get the default config filename.
    pub fn default_filename() -> &'static str {
        "config.json"
    }

    /// Get the default config file path for auto-load/save.
    pub fn default_path() -> Option<PathBuf> {
        // Try to use XDG config directory, fall back to home directory
        if let Some(config_dir) = dirs::config_dir() {
            Some(config_dir.join(APP_DIR_NAME).join(Self::default_filename()))
        } else {
            dirs::home_dir().map(|home_dir| {
                home_dir
                    .join(".config")
                    .join(APP_DIR_NAME)
                    .join(Self::default_filename())
            })
        }
    }

    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Save configuration to a file, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = self.to_json()?;
        crate::persist::write_atomic(path, json.as_bytes())?;
        log::info!("Saved configuration to {:?}", path);
        Ok(())
    }

    /// Try to load configuration from the default path.
    /// Returns None if the file doesn't exist or can't be read.
    pub fn load_from_default_path() -> Option<Self> {
        let path = Self::default_path()?;
        if !path.exists() {
            log::debug!("No config file found at {:?}", path);
            return None;
        }

        match Self::load(&path) {
            Ok(config) => Some(config),
            Err(e) => {
                log::warn!("Failed to load config file {:?}: {}", path, e);
                None
            }
        }
    }

    /// Save configuration to the default path.
    pub fn save_to_default_path(&self) -> Result<(), ConfigError> {
        let path = Self::default_path().ok_or_else(|| {
            ConfigError::IoError(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "Could not determine config directory",
            ))
        })?;
        self.save(&path)
    }
}

impl Default for AppConfig {
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
