//! Access token acquisition for the realtime voice service.
//!
//! The voice endpoint authenticates WebSocket connections with a short-lived
//! token obtained through a client-credentials grant: API key and secret key
//! go in a Basic authorization header, the token comes back as JSON.

use base64::Engine as _;
use std::time::Duration;

use crate::config::VoiceConfig;
use crate::error::{AssistantError, Result};

/// Fetches an access token using the configured credentials.
///
/// # Errors
///
/// Returns a config error when credentials are missing and an auth error
/// when the token endpoint rejects the request or returns no token.
pub async fn fetch_access_token(voice: &VoiceConfig) -> Result<String> {
    let (api_key, secret_key) = voice.resolve_credentials()?;

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(voice.auth_timeout_seconds))
        .build()
        .map_err(|e| AssistantError::Auth(format!("failed to build HTTP client: {e}")))?;

    let url = format!(
        "{}/oauth2-cc/token",
        voice.auth_base_url.trim_end_matches('/')
    );
    tracing::debug!("fetching access token");

    let response = client
        .post(&url)
        .header(
            "Authorization",
            format!("Basic {}", basic_credentials(&api_key, &secret_key)),
        )
        .form(&[("grant_type", "client_credentials")])
        .send()
        .await
        .map_err(|e| AssistantError::Auth(format!("token request failed: {e}")))?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| AssistantError::Auth(format!("token response read failed: {e}")))?;

    if !status.is_success() {
        return Err(AssistantError::Auth(format!(
            "token endpoint returned {status}"
        )));
    }

    parse_token_response(&body)
}

/// Encodes the key pair for a Basic authorization header.
pub(crate) fn basic_credentials(api_key: &str, secret_key: &str) -> String {
    base64::engine::general_purpose::STANDARD.encode(format!("{api_key}:{secret_key}"))
}

/// Parses a token endpoint response body.
pub(crate) fn parse_token_response(body: &str) -> Result<String> {
    let value: serde_json::Value = serde_json::from_str(body)
        .map_err(|e| AssistantError::Auth(format!("token response is not valid JSON: {e}")))?;
    match value["access_token"].as_str() {
        Some(token) if !token.is_empty() => Ok(token.to_owned()),
        _ => Err(AssistantError::Auth(
            "token response carried no access_token".to_owned(),
        )),
    }
}
