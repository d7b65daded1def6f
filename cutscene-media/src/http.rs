//! Shared HTTP client construction.

use std::time::Duration;

use crate::error::{MediaError, Result};

/// Builds a `reqwest` client with the given request timeout.
pub(crate) fn build_client(timeout_seconds: u64) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_seconds))
        .build()
        .map_err(|e| MediaError::Http(format!("failed to build HTTP client: {e}")))
}

/// Truncates a response body for inclusion in error messages.
pub(crate) fn body_snippet(body: &str) -> &str {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}
