//! Faultveil - layered error capture demo
//!
//! Loads the capture settings, installs the process-wide interceptors and
//! runs the Libadwaita application.

use {
    faultveil::{CaptureSettings, FaultveilApplication, GlobalInterceptors, SettingsManager},
    tracing::warn,
};

/// Main entry point for the Faultveil application.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (settings, settings_error) = match SettingsManager::new() {
        Ok(manager) => (manager.get_settings().clone(), None),
        Err(e) => (CaptureSettings::default(), Some(e)),
    };

    // Interceptors go in before anything else can fail.
    let interceptors = GlobalInterceptors::install(&settings);
    if let Some(e) = settings_error {
        warn!("Failed to load settings, using defaults: {e}");
    }

    // Initialize GTK and Libadwaita
    libadwaita::gtk::init()?;
    let _ = libadwaita::init();

    let app = FaultveilApplication::new(interceptors, settings)?;
    app.run();

    Ok(())
}
