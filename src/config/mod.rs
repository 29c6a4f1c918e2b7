//! Capture configuration with XDG Base Directory compliance.

pub mod settings;

pub use settings::{CaptureSettings, SettingsError, SettingsManager, get_config_path};
