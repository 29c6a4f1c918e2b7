//! Per-call-site inline error state.

use crate::error::normalize::NormalizedError;

/// Message shown when the reported error has no usable text.
pub const INLINE_FALLBACK_MESSAGE: &str = "Something went wrong";

/// Transient, dismissable error owned by one call site.
///
/// `Idle` while `error` is `None`, `Showing` otherwise.
#[derive(Debug, Clone, Default)]
pub struct InlinePanelState {
    error: Option<NormalizedError>,
}

impl InlinePanelState {
    /// Creates an idle panel state.
    pub fn new() -> Self {
        Self::default()
    }

    /// The error currently shown, if any.
    #[must_use]
    pub fn error(&self) -> Option<&NormalizedError> {
        self.error.as_ref()
    }

    /// Shows `error`, or clears the panel with `None`.
    pub fn set_error(&mut self, error: Option<NormalizedError>) {
        self.error = error;
    }

    /// Clears the panel.
    pub fn dismiss(&mut self) {
        self.error = None;
    }

    /// Whether an error is shown.
    #[must_use]
    pub fn is_showing(&self) -> bool {
        self.error.is_some()
    }

    /// Text for the panel's message line.
    #[must_use]
    pub fn display_message(&self) -> Option<&str> {
        self.error.as_ref().map(|error| {
            if error.message.is_empty() {
                INLINE_FALLBACK_MESSAGE
            } else {
                error.message.as_str()
            }
        })
    }
}
