//! Global `tracing` subscriber setup.
//!
//! Log output goes to stderr through a fmt layer carrying the level filter.
//! The logging tap sits beneath it unfiltered, so marked error events reach
//! the overlay even when output is silenced.

use std::io::stderr;

use tracing_subscriber::{
    EnvFilter, Layer, fmt,
    layer::SubscriberExt,
    registry::{LookupSpan, Registry},
    util::SubscriberInitExt,
};

use crate::{config::CaptureSettings, error::operational::ErrorReporter, intercept::log_tap::LogTap};

/// Builds the subscriber stack with `filter` applied to log output only.
///
/// # Arguments
///
/// * `settings` - Capture settings providing the log markers
/// * `reporter` - Destination of marked error events
/// * `filter` - Level filter for the stderr output
///
/// # Returns
///
/// A subscriber ready to be installed globally or scoped with `with_default`.
pub fn build_subscriber(
    settings: &CaptureSettings,
    reporter: ErrorReporter,
    filter: EnvFilter,
) -> impl tracing::Subscriber + for<'a> LookupSpan<'a> + Send + Sync + 'static {
    let output = fmt::layer()
        .with_target(true)
        .with_level(true)
        .with_thread_ids(true)
        .with_writer(stderr)
        .with_filter(filter);

    Registry::default()
        .with(LogTap::new(settings.log_markers.clone(), reporter))
        .with(output)
}

/// Installs the global subscriber.
///
/// The filter comes from `RUST_LOG`, falling back to the configured
/// `log_filter`.
///
/// # Returns
///
/// `false` when another global subscriber was already set; it is left in place.
pub fn init_tracing(settings: &CaptureSettings, reporter: ErrorReporter) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.log_filter));

    build_subscriber(settings, reporter, filter).try_init().is_ok()
}

#[cfg(test)]
mod tests {
    use {
        tracing::{error, subscriber::with_default},
        tracing_subscriber::EnvFilter,
    };

    use crate::{config::CaptureSettings, error::operational::ErrorReporter, tracing_setup::build_subscriber};

    #[test]
    fn test_silenced_output_still_feeds_overlay() {
        let (reporter, feed) = ErrorReporter::channel();
        let subscriber =
            build_subscriber(&CaptureSettings::default(), reporter, EnvFilter::new("off"));

        with_default(subscriber, || {
            error!("fatal: settings file is corrupt");
        });

        assert_eq!(feed.try_recv().unwrap(), "fatal: settings file is corrupt");
    }
}
