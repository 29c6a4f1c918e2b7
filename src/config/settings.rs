//! Capture settings with XDG Base Directory compliance.
//!
//! This module loads the error-capture configuration (log markers, overlay
//! labels, logging filter, demo endpoint) from the user's config directory.

use std::{
    env::var,
    fs::{create_dir_all, read_to_string, write},
    io::Error as StdError,
    path::PathBuf,
};

use {
    parking_lot::{RwLock, RwLockReadGuard},
    serde::{Deserialize, Serialize},
    serde_json::{Error as SerdeJsonError, from_str, to_string_pretty},
    thiserror::Error,
    tracing::{debug, warn},
};

/// Error type for settings operations.
#[derive(Error, Debug)]
pub enum SettingsError {
    /// Failed to read or write settings file.
    #[error("IO error: {0}")]
    IoError(#[from] StdError),
    /// Failed to serialize or deserialize settings.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] SerdeJsonError),
    /// Invalid settings value.
    #[error("Invalid settings value: {reason}")]
    InvalidValue { reason: String },
}

/// Serializable capture settings with default values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureSettings {
    /// Substrings that promote an error-level log write to the overlay.
    pub log_markers: Vec<String>,
    /// Heading shown on the overlay.
    pub overlay_heading: String,
    /// Label of the overlay's reload action.
    pub reload_label: String,
    /// Whether the overlay also offers a dismiss action.
    pub allow_dismiss: bool,
    /// Base URL of the posts service used by the lookup form.
    pub posts_base_url: String,
    /// Default `tracing` filter when `RUST_LOG` is unset.
    pub log_filter: String,
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            log_markers: vec!["SyntaxError".to_string(), "fatal".to_string()],
            overlay_heading: "Error Detected".to_string(),
            reload_label: "Reload App".to_string(),
            allow_dismiss: false,
            posts_base_url: "https://jsonplaceholder.typicode.com".to_string(),
            log_filter: "info".to_string(),
        }
    }
}

impl CaptureSettings {
    /// Checks values that would silently break interception or the demo.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError::InvalidValue` for an empty log marker or a
    /// posts URL without an http(s) scheme.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.log_markers.iter().any(|marker| marker.is_empty()) {
            return Err(SettingsError::InvalidValue {
                reason: "log markers must not be empty".to_string(),
            });
        }

        if !(self.posts_base_url.starts_with("http://")
            || self.posts_base_url.starts_with("https://"))
        {
            return Err(SettingsError::InvalidValue {
                reason: format!("posts_base_url has no http(s) scheme: {}", self.posts_base_url),
            });
        }

        Ok(())
    }
}

/// Handles loading and persisting of the capture settings.
#[derive(Debug)]
pub struct SettingsManager {
    /// Thread-safe settings storage.
    settings: RwLock<CaptureSettings>,
    /// Path to the configuration file on disk.
    config_path: PathBuf,
}

impl SettingsManager {
    /// Creates a new settings manager with the default config path.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError` if settings cannot be loaded from disk.
    pub fn new() -> Result<Self, SettingsError> {
        Self::with_config_path(get_config_path())
    }

    /// Creates a new settings manager with a custom config path.
    ///
    /// A missing file is created with default values.
    ///
    /// # Arguments
    ///
    /// * `config_path` - Custom path for the settings file
    ///
    /// # Errors
    ///
    /// Returns `SettingsError` if the file cannot be read, parsed, or holds
    /// invalid values.
    pub fn with_config_path(config_path: PathBuf) -> Result<Self, SettingsError> {
        if let Some(parent) = config_path.parent() {
            create_dir_all(parent)?;
        }

        let settings = if config_path.exists() {
            debug!("Loading settings from existing file: {:?}", config_path);
            let contents = read_to_string(&config_path)?;
            from_str::<CaptureSettings>(&contents)?
        } else {
            debug!("Creating new default settings file: {:?}", config_path);
            let defaults = CaptureSettings::default();
            if let Err(e) = write(&config_path, to_string_pretty(&defaults)?) {
                warn!("Could not write default settings to {:?}: {}", config_path, e);
            }
            defaults
        };
        settings.validate()?;

        Ok(SettingsManager {
            settings: RwLock::new(settings),
            config_path,
        })
    }

    /// Gets the current settings.
    pub fn get_settings(&self) -> RwLockReadGuard<'_, CaptureSettings> {
        self.settings.read()
    }

    /// Gets the configuration file path.
    pub fn get_config_path(&self) -> &PathBuf {
        &self.config_path
    }
}

/// Path of the settings file under the XDG config home.
#[must_use]
pub fn get_config_path() -> PathBuf {
    let mut config_dir = get_xdg_config_home();
    config_dir.push("faultveil");
    config_dir.push("settings.json");
    config_dir
}

/// Gets the XDG config home directory following XDG Base Directory specification.
///
/// Uses `XDG_CONFIG_HOME` environment variable if set, otherwise defaults to $HOME/.config
fn get_xdg_config_home() -> PathBuf {
    if let Ok(config_home) = var("XDG_CONFIG_HOME")
        && !config_home.is_empty()
    {
        return PathBuf::from(config_home);
    }

    if let Ok(home) = var("HOME") {
        let mut path = PathBuf::from(home);
        path.push(".config");
        return path;
    }

    PathBuf::from(".")
}

#[cfg(test)]
mod tests {
    use std::fs::{read_to_string, write};

    use {
        serde_json::{from_str, to_string},
        tempfile::tempdir,
    };

    use crate::config::settings::{CaptureSettings, SettingsError, SettingsManager};

    #[test]
    fn test_capture_settings_default() {
        let settings = CaptureSettings::default();
        assert_eq!(settings.log_markers, vec!["SyntaxError", "fatal"]);
        assert_eq!(settings.overlay_heading, "Error Detected");
        assert!(!settings.allow_dismiss);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_capture_settings_serialization() {
        let settings = CaptureSettings {
            log_markers: vec!["panic".to_string()],
            allow_dismiss: true,
            posts_base_url: "http://localhost:8080".to_string(),
            ..CaptureSettings::default()
        };

        let serialized = to_string(&settings).unwrap();
        let deserialized: CaptureSettings = from_str(&serialized).unwrap();
        assert_eq!(settings, deserialized);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let settings: CaptureSettings = from_str(r#"{ "allow_dismiss": true }"#).unwrap();
        assert!(settings.allow_dismiss);
        assert_eq!(settings.reload_label, "Reload App");
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let empty_marker = CaptureSettings {
            log_markers: vec![String::new()],
            ..CaptureSettings::default()
        };
        assert!(matches!(
            empty_marker.validate(),
            Err(SettingsError::InvalidValue { .. })
        ));

        let bad_url = CaptureSettings {
            posts_base_url: "ftp://example.com".to_string(),
            ..CaptureSettings::default()
        };
        assert!(bad_url.validate().is_err());
    }

    #[test]
    fn test_manager_writes_defaults_on_first_run() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");

        let manager = SettingsManager::with_config_path(path.clone()).unwrap();
        assert_eq!(*manager.get_settings(), CaptureSettings::default());
        assert_eq!(manager.get_config_path(), &path);

        let on_disk: CaptureSettings = from_str(&read_to_string(&path).unwrap()).unwrap();
        assert_eq!(on_disk, CaptureSettings::default());
    }

    #[test]
    fn test_manager_loads_existing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        write(&path, r#"{ "log_markers": ["boom"], "log_filter": "debug" }"#).unwrap();

        let manager = SettingsManager::with_config_path(path).unwrap();
        let settings = manager.get_settings();
        assert_eq!(settings.log_markers, vec!["boom"]);
        assert_eq!(settings.log_filter, "debug");
    }

    #[test]
    fn test_manager_rejects_invalid_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        write(&path, "not json").unwrap();
        assert!(matches!(
            SettingsManager::with_config_path(path),
            Err(SettingsError::SerializationError(_))
        ));
    }
}
