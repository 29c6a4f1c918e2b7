//! Validation and fetch flow behind the post lookup form.

use {
    serde_json::{Value, from_str},
    tracing::{info, warn},
};

use crate::{
    error::{
        domain::LookupError,
        normalize::{ErrorNormalizer, NormalizedError, UNEXPECTED_ERROR_MESSAGE},
        operational::{ErrorReporter, ResultExt},
    },
    posts::{client::PostSource, models::Post},
};

/// Result of one lookup attempt.
#[derive(Debug)]
pub enum LookupOutcome {
    /// The post was fetched.
    Found(Post),
    /// The input was rejected before any request; already reported globally.
    Rejected(LookupError),
    /// The request failed; meant for the inline panel.
    Failed(NormalizedError),
}

/// Parses the post id typed by the user.
///
/// # Errors
///
/// Returns `LookupError::EmptyId` for blank input and
/// `LookupError::NotANumber` for anything that is not an unsigned integer.
pub fn validate_post_id(input: &str) -> Result<u64, LookupError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(LookupError::EmptyId);
    }

    trimmed.parse::<u64>().map_err(|_| LookupError::NotANumber {
        input: trimmed.to_string(),
    })
}

/// Validates input, fetches from a `PostSource`, and routes failures.
pub struct PostLookup<S> {
    source: S,
    reporter: ErrorReporter,
}

impl<S: PostSource> PostLookup<S> {
    /// Creates a lookup over `source`, reporting caller errors to `reporter`.
    pub fn new(source: S, reporter: ErrorReporter) -> Self {
        Self { source, reporter }
    }

    /// Runs one lookup for the raw form input.
    ///
    /// Validation failures are reported to the overlay and never reach the
    /// source; transport failures are normalized and returned.
    pub async fn lookup(&self, input: &str) -> LookupOutcome {
        let id = match validate_post_id(input) {
            Ok(id) => id,
            Err(error) => {
                self.reporter.report(error.to_string());
                return LookupOutcome::Rejected(error);
            }
        };

        match self.source.fetch_post(id).await {
            Ok(post) => {
                info!(id, "Fetched post");
                LookupOutcome::Found(post)
            }
            Err(error) => {
                let normalized = ErrorNormalizer::normalize_with_fallback(error, UNEXPECTED_ERROR_MESSAGE);
                warn!(id, "Post lookup failed: {}", normalized.message);
                LookupOutcome::Failed(normalized)
            }
        }
    }
}

/// Parses a malformed snippet and reports the parser failure globally.
pub fn trigger_syntax_error(reporter: &ErrorReporter) {
    let _ = from_str::<Value>("foo syntaxerror").or_report(reporter, "Syntax Error");
}
