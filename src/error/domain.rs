//! Domain-specific error types using `thiserror`.
//!
//! This module defines the error enums for the transport layer used by the
//! post lookup, the lookup itself, and UI operations.

use std::io::Error as IoError;

use {reqwest::Error as ReqwestError, thiserror::Error};

/// Failures of a remote call.
///
/// The two interesting shapes are a call that was answered with a
/// non-success status and a call that was sent but never answered.
#[derive(Error, Debug)]
pub enum TransportError {
    /// The server answered with a non-success status.
    #[error("Error {status}: {status_text}")]
    Response {
        /// HTTP status code.
        status: u16,
        /// Canonical reason phrase for the status.
        status_text: String,
        /// Message embedded in the response body, if any.
        message: Option<String>,
    },
    /// The request was sent but no response arrived.
    #[error("No response from {url}: {reason}")]
    NoResponse {
        /// Requested URL.
        url: String,
        /// Lower-level reason reported by the client.
        reason: String,
    },
    /// Any other client failure (body decoding, builder errors).
    #[error("Transport error: {0}")]
    Other(#[source] ReqwestError),
}

impl From<ReqwestError> for TransportError {
    fn from(error: ReqwestError) -> Self {
        if let Some(status) = error.status() {
            TransportError::Response {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or_default().to_string(),
                message: None,
            }
        } else if error.is_connect() || error.is_timeout() || error.is_request() {
            TransportError::NoResponse {
                url: error.url().map(ToString::to_string).unwrap_or_default(),
                reason: error.to_string(),
            }
        } else {
            TransportError::Other(error)
        }
    }
}

/// Post lookup errors.
#[derive(Error, Debug)]
pub enum LookupError {
    /// No post id was entered.
    #[error("Post ID cannot be empty.")]
    EmptyId,
    /// The entered post id is not an unsigned integer.
    #[error("Post ID must be a number")]
    NotANumber { input: String },
    /// The remote call failed.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl LookupError {
    /// Whether the error was raised by input validation before any request.
    #[must_use]
    pub fn is_caller_signaled(&self) -> bool {
        matches!(self, LookupError::EmptyId | LookupError::NotANumber { .. })
    }
}

/// UI-related errors.
#[derive(Error, Debug)]
pub enum UiError {
    /// GTK/Libadwaita initialization error.
    #[error("UI initialization error: {0}")]
    InitializationError(String),
    /// The application could not be relaunched.
    #[error("Relaunch error: {0}")]
    RelaunchError(#[from] IoError),
}
