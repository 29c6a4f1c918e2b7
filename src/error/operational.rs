//! Operational error context propagation and the global reporting channel.
//!
//! This module provides the extension traits used to add context to errors
//! and the `ErrorReporter`, the single entry point through which every error
//! source reaches the blocking overlay.

use std::{
    error::Error as StdError,
    fmt::Display,
    sync::LazyLock,
};

use {
    anyhow::{Context, Error, Result as AnyhowResult},
    async_channel::{Receiver, Sender, bounded},
    tracing::debug,
};

use crate::error::normalize::{ErrorNormalizer, NormalizedError, UNEXPECTED_ERROR_MESSAGE};

/// Number of undelivered reports a feed holds before the oldest is dropped.
pub const OVERLAY_FEED_CAPACITY: usize = 64;

/// Process-wide overlay feed, drained by the overlay controller on the UI thread.
static OVERLAY_FEED: LazyLock<(Sender<String>, Receiver<String>)> =
    LazyLock::new(|| bounded(OVERLAY_FEED_CAPACITY));

/// Extension trait for enhanced error context.
///
/// This trait provides methods to add contextual information to errors
/// and to route them to the overlay when the caller cannot recover.
pub trait ResultExt<T, E> {
    /// Adds context to an error with a static string.
    fn add_context(self, context: &'static str) -> AnyhowResult<T>
    where
        E: StdError + Send + Sync + 'static;

    /// Adds context to an error with a formatted string.
    fn add_contextf(self, format: impl Display) -> AnyhowResult<T>
    where
        E: StdError + Send + Sync + 'static;

    /// Reports an error to the overlay as `"{context}: {message}"`.
    ///
    /// # Returns
    ///
    /// The success value, or `None` when the error was reported.
    fn or_report(self, reporter: &ErrorReporter, context: &str) -> Option<T>
    where
        E: StdError + Send + Sync + 'static;
}

impl<T, E> ResultExt<T, E> for Result<T, E> {
    fn add_context(self, context: &'static str) -> AnyhowResult<T>
    where
        E: StdError + Send + Sync + 'static,
    {
        self.context(context)
    }

    fn add_contextf(self, format: impl Display) -> AnyhowResult<T>
    where
        E: StdError + Send + Sync + 'static,
    {
        self.context(format.to_string())
    }

    fn or_report(self, reporter: &ErrorReporter, context: &str) -> Option<T>
    where
        E: StdError + Send + Sync + 'static,
    {
        match self {
            Ok(value) => Some(value),
            Err(error) => {
                let normalized = ErrorNormalizer::normalize(Error::new(error));
                reporter.report(format!("{context}: {}", normalized.message));
                None
            }
        }
    }
}

/// Handle for forwarding messages to the blocking overlay.
///
/// Reporting never blocks and may happen from any thread. Messages are
/// queued and applied in order on the UI thread, so the last report wins.
/// A full feed drops its oldest message to make room, which keeps memory
/// bounded when nothing drains it.
#[derive(Debug, Clone)]
pub struct ErrorReporter {
    /// Sending half of the overlay feed.
    sender: Sender<String>,
}

impl ErrorReporter {
    /// Creates a reporter writing into the given feed.
    pub fn new(sender: Sender<String>) -> Self {
        Self { sender }
    }

    /// Creates a reporter with its own private feed.
    ///
    /// # Returns
    ///
    /// The reporter and the receiving half of its feed.
    pub fn channel() -> (Self, Receiver<String>) {
        let (sender, receiver) = bounded(OVERLAY_FEED_CAPACITY);
        (Self::new(sender), receiver)
    }

    /// Returns a reporter writing into the process-wide overlay feed.
    pub fn global() -> Self {
        Self::new(OVERLAY_FEED.0.clone())
    }

    /// Forwards a message to the overlay.
    ///
    /// Empty messages are replaced by a generic fallback so the overlay
    /// never shows a blank message region.
    pub fn report(&self, message: impl Into<String>) {
        let mut message = message.into();
        if message.trim().is_empty() {
            message = UNEXPECTED_ERROR_MESSAGE.to_string();
        }

        match self.sender.force_send(message) {
            Ok(Some(_)) => debug!("Overlay feed full, dropped oldest report"),
            Ok(None) => {}
            Err(_) => debug!("Overlay feed closed, dropping report"),
        }
    }

    /// Forwards a normalized error's message to the overlay.
    pub fn report_error(&self, error: &NormalizedError) {
        self.report(error.message.clone());
    }
}

/// Receiving half of the process-wide overlay feed.
///
/// The feed holds at most `OVERLAY_FEED_CAPACITY` undelivered reports. Hand
/// it to `OverlayController::attach_feed` on the UI thread; until something
/// drains it, only the newest reports are retained.
pub fn overlay_feed() -> Receiver<String> {
    OVERLAY_FEED.1.clone()
}

/// Ensures the overlay is visible with `message`.
///
/// This is the reporting entry point for any collaborator that hits a
/// failure it cannot handle locally.
pub fn report_global_error(message: impl Into<String>) {
    ErrorReporter::global().report(message);
}
