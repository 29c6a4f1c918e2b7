//! Conversion of heterogeneous failure shapes into display-ready records.
//!
//! Every error source in the application (transport failures, `anyhow`
//! chains, panic payloads, plain values) is funneled through the
//! `ErrorNormalizer` before it is shown inline or forwarded to the overlay.

use std::{
    any::Any,
    error::Error as StdError,
    fmt::{Debug, Formatter, Result as FmtResult},
    sync::Arc,
};

use {anyhow::Error as AnyhowError, reqwest::Error as ReqwestError};

use crate::error::domain::TransportError;

/// Fixed message for a request that was sent but never answered.
pub const NETWORK_ERROR_MESSAGE: &str = "Network error - no response from server";

/// Default fallback when a failure carries no usable message.
pub const UNKNOWN_ERROR_MESSAGE: &str = "Unknown error";

/// Fallback used by call sites that report without a specific message.
pub const UNEXPECTED_ERROR_MESSAGE: &str = "An unexpected error occurred";

/// Uniform display record every failure is converted into.
///
/// `message` is never empty. `cause` keeps the original error value when
/// there was one, for logging and debugging.
#[derive(Clone)]
pub struct NormalizedError {
    /// Human-readable message shown to the user.
    pub message: String,
    /// The original error value, if the failure was error-shaped.
    pub cause: Option<Arc<dyn StdError + Send + Sync>>,
}

impl NormalizedError {
    /// Creates a record from a message without an underlying cause.
    ///
    /// Empty or whitespace-only messages are replaced by the default fallback.
    pub fn from_message(message: impl Into<String>) -> Self {
        Self {
            message: non_empty_or(message.into(), UNKNOWN_ERROR_MESSAGE),
            cause: None,
        }
    }
}

impl Debug for NormalizedError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("NormalizedError")
            .field("message", &self.message)
            .field("cause", &self.cause.as_ref().map(ToString::to_string))
            .finish()
    }
}

/// The failure shapes the normalizer understands.
pub enum RawFailure {
    /// A transport-level failure (answered with an error or never answered).
    Transport(TransportError),
    /// Any other error value, possibly carrying a context chain.
    Error(AnyhowError),
    /// A non-error value such as a string or number.
    Value(String),
    /// No value at all.
    Missing,
}

impl From<TransportError> for RawFailure {
    fn from(error: TransportError) -> Self {
        RawFailure::Transport(error)
    }
}

impl From<AnyhowError> for RawFailure {
    fn from(error: AnyhowError) -> Self {
        RawFailure::Error(error)
    }
}

impl From<ReqwestError> for RawFailure {
    fn from(error: ReqwestError) -> Self {
        RawFailure::Transport(TransportError::from(error))
    }
}

impl From<String> for RawFailure {
    fn from(value: String) -> Self {
        RawFailure::Value(value)
    }
}

impl From<&str> for RawFailure {
    fn from(value: &str) -> Self {
        RawFailure::Value(value.to_string())
    }
}

/// Stateless converter from `RawFailure` to `NormalizedError`.
pub struct ErrorNormalizer;

impl ErrorNormalizer {
    /// Normalizes a failure with the default `"Unknown error"` fallback.
    pub fn normalize(raw: impl Into<RawFailure>) -> NormalizedError {
        Self::normalize_with_fallback(raw, UNKNOWN_ERROR_MESSAGE)
    }

    /// Normalizes a failure, using `fallback` when no message can be found.
    ///
    /// # Arguments
    ///
    /// * `raw` - The failure to convert.
    /// * `fallback` - Message used when the failure carries none.
    ///
    /// # Returns
    ///
    /// A `NormalizedError` whose message is never empty.
    pub fn normalize_with_fallback(raw: impl Into<RawFailure>, fallback: &str) -> NormalizedError {
        match raw.into() {
            RawFailure::Transport(error) => {
                let message = transport_message(&error, fallback);
                NormalizedError {
                    message,
                    cause: Some(Arc::new(error)),
                }
            }
            RawFailure::Error(error) => {
                let message = match find_transport(&error) {
                    Some(transport) => transport_message(transport, fallback),
                    None => non_empty_or(format!("{error:#}"), fallback),
                };
                let cause: Box<dyn StdError + Send + Sync> = error.into();
                NormalizedError {
                    message,
                    cause: Some(Arc::from(cause)),
                }
            }
            RawFailure::Value(value) => NormalizedError {
                message: non_empty_or(value, fallback),
                cause: None,
            },
            RawFailure::Missing => NormalizedError {
                message: fallback.to_string(),
                cause: None,
            },
        }
    }

    /// Normalizes a panic payload as produced by `catch_unwind` or a join error.
    pub fn from_panic_payload(payload: &(dyn Any + Send)) -> NormalizedError {
        match panic_message(payload) {
            Some(message) => Self::normalize(RawFailure::Value(message)),
            None => Self::normalize(RawFailure::Missing),
        }
    }
}

/// Extracts the message of a panic payload when it is a string.
pub fn panic_message(payload: &(dyn Any + Send)) -> Option<String> {
    if let Some(message) = payload.downcast_ref::<&str>() {
        Some((*message).to_string())
    } else {
        payload.downcast_ref::<String>().cloned()
    }
}

fn transport_message(error: &TransportError, fallback: &str) -> String {
    match error {
        TransportError::Response {
            status,
            status_text,
            message,
        } => match message.as_deref().map(str::trim) {
            Some(embedded) if !embedded.is_empty() => embedded.to_string(),
            _ => format!("Error {status}: {status_text}"),
        },
        TransportError::NoResponse { .. } => NETWORK_ERROR_MESSAGE.to_string(),
        TransportError::Other(source) => non_empty_or(source.to_string(), fallback),
    }
}

/// Walks an `anyhow` chain looking for a transport-shaped error.
fn find_transport(error: &AnyhowError) -> Option<&TransportError> {
    error
        .chain()
        .find_map(|cause| cause.downcast_ref::<TransportError>())
}

fn non_empty_or(message: String, fallback: &str) -> String {
    if message.trim().is_empty() {
        fallback.to_string()
    } else {
        message
    }
}

#[cfg(test)]
mod tests {
    use std::panic::catch_unwind;

    use anyhow::{Context, anyhow};

    use crate::error::{
        domain::TransportError,
        normalize::{
            ErrorNormalizer, NETWORK_ERROR_MESSAGE, NormalizedError, RawFailure,
            UNEXPECTED_ERROR_MESSAGE, UNKNOWN_ERROR_MESSAGE,
        },
    };

    fn not_found(message: Option<&str>) -> TransportError {
        TransportError::Response {
            status: 404,
            status_text: "Not Found".to_string(),
            message: message.map(str::to_string),
        }
    }

    #[test]
    fn test_response_without_embedded_message() {
        let normalized = ErrorNormalizer::normalize(not_found(None));
        assert_eq!(normalized.message, "Error 404: Not Found");
        assert!(normalized.cause.is_some());
    }

    #[test]
    fn test_response_prefers_embedded_message() {
        let normalized = ErrorNormalizer::normalize(not_found(Some("Post 999 does not exist")));
        assert_eq!(normalized.message, "Post 999 does not exist");

        let blank = ErrorNormalizer::normalize(not_found(Some("   ")));
        assert_eq!(blank.message, "Error 404: Not Found");
    }

    #[test]
    fn test_unanswered_request_uses_network_message() {
        let first = ErrorNormalizer::normalize(TransportError::NoResponse {
            url: "https://example.invalid/posts/1".to_string(),
            reason: "connection refused".to_string(),
        });
        let second = ErrorNormalizer::normalize(TransportError::NoResponse {
            url: String::new(),
            reason: String::new(),
        });
        assert_eq!(first.message, NETWORK_ERROR_MESSAGE);
        assert_eq!(second.message, NETWORK_ERROR_MESSAGE);
    }

    #[test]
    fn test_transport_error_found_inside_anyhow_chain() {
        let error = Err::<(), _>(not_found(None))
            .context("Fetching post 404")
            .unwrap_err();
        let normalized = ErrorNormalizer::normalize(error);
        assert_eq!(normalized.message, "Error 404: Not Found");
    }

    #[test]
    fn test_plain_error_keeps_context_chain() {
        let error = anyhow!("disk full").context("saving draft");
        let normalized = ErrorNormalizer::normalize(error);
        assert_eq!(normalized.message, "saving draft: disk full");
    }

    #[test]
    fn test_fallbacks_for_missing_messages() {
        assert_eq!(
            ErrorNormalizer::normalize(RawFailure::Missing).message,
            UNKNOWN_ERROR_MESSAGE
        );
        assert_eq!(
            ErrorNormalizer::normalize("").message,
            UNKNOWN_ERROR_MESSAGE
        );
        assert_eq!(
            ErrorNormalizer::normalize_with_fallback(RawFailure::Missing, UNEXPECTED_ERROR_MESSAGE)
                .message,
            UNEXPECTED_ERROR_MESSAGE
        );
        assert_eq!(NormalizedError::from_message(" ").message, UNKNOWN_ERROR_MESSAGE);
    }

    #[test]
    fn test_non_error_values_coerce_to_strings() {
        assert_eq!(ErrorNormalizer::normalize(42.to_string()).message, "42");
        assert_eq!(ErrorNormalizer::normalize("boom").message, "boom");
    }

    #[test]
    fn test_panic_payloads() {
        let payload = catch_unwind(|| panic!("exploded at {}", 3)).unwrap_err();
        assert_eq!(
            ErrorNormalizer::from_panic_payload(payload.as_ref()).message,
            "exploded at 3"
        );

        let payload = catch_unwind(|| std::panic::panic_any(17_u8)).unwrap_err();
        assert_eq!(
            ErrorNormalizer::from_panic_payload(payload.as_ref()).message,
            UNKNOWN_ERROR_MESSAGE
        );
    }
}
