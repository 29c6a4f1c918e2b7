//! Network access to the posts service.

use std::{future::Future, time::Duration};

use {
    reqwest::Client,
    serde::Deserialize,
    serde_json::from_str,
    tracing::debug,
};

use crate::{error::domain::TransportError, posts::models::Post};

/// Source of posts.
pub trait PostSource {
    /// Fetches the post with `id`.
    fn fetch_post(&self, id: u64) -> impl Future<Output = Result<Post, TransportError>> + Send;
}

/// Error body some services send along with a failure status.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// `PostSource` backed by the posts HTTP API.
#[derive(Debug, Clone)]
pub struct HttpPostSource {
    client: Client,
    base_url: String,
}

impl HttpPostSource {
    /// Creates a source for the API rooted at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns `TransportError` if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(15))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    /// URL of the post with `id`.
    #[must_use]
    pub fn post_url(&self, id: u64) -> String {
        format!("{}/posts/{id}", self.base_url.trim_end_matches('/'))
    }
}

impl PostSource for HttpPostSource {
    async fn fetch_post(&self, id: u64) -> Result<Post, TransportError> {
        let url = self.post_url(id);
        debug!(%url, "Fetching post");

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::Response {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or_default().to_string(),
                message: embedded_message(&body),
            });
        }

        Ok(response.json::<Post>().await?)
    }
}

/// Extracts a non-empty `message` field from an error response body.
fn embedded_message(body: &str) -> Option<String> {
    from_str::<ErrorBody>(body)
        .ok()
        .and_then(|body| body.message)
        .filter(|message| !message.trim().is_empty())
}
