//! Video generation client.
//!
//! Same task-array endpoint as image generation, with a `videoInference`
//! task instead. Video renders are slow, so the configured timeout is
//! much longer than for images.

use serde_json::Value;
use uuid::Uuid;

use crate::config::VideoApiConfig;
use crate::error::{MediaError, Result};
use crate::http;
use crate::inference;
use crate::types::{GenerationOutcome, VideoRequest};

/// Longest clip the generation service will render.
pub const MAX_DURATION_SECONDS: u32 = 60;

/// Client for the video generation service.
pub struct VideoClient {
    config: VideoApiConfig,
    http: reqwest::Client,
}

impl VideoClient {
    /// Creates a client from the given configuration.
    pub fn new(config: VideoApiConfig) -> Result<Self> {
        let http = http::build_client(config.timeout_seconds)?;
        Ok(Self { config, http })
    }

    /// Generates a video clip, reporting expected failures in the outcome.
    ///
    /// Rejected input, API-level errors and empty results come back as an
    /// unsuccessful [`GenerationOutcome`]; `Err` is reserved for transport
    /// and decoding faults.
    pub async fn generate(&self, request: &VideoRequest) -> Result<GenerationOutcome> {
        if let Some(reason) = validate_video_request(request) {
            return Ok(GenerationOutcome::failed(reason));
        }
        if self.config.api_key.trim().is_empty() {
            return Err(MediaError::Config("video.api_key is not set".into()));
        }

        let width = request.width.unwrap_or(self.config.default_width);
        let height = request.height.unwrap_or(self.config.default_height);

        tracing::debug!(
            duration = request.duration,
            width,
            height,
            "requesting video generation"
        );

        let url = format!("{}/v1", self.config.base_url.trim_end_matches('/'));
        let tasks = build_video_tasks(&self.config.api_key, &self.config.model, request, width, height);

        let response = self
            .http
            .post(&url)
            .json(&tasks)
            .send()
            .await
            .map_err(|e| MediaError::Http(format!("video request failed: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| MediaError::Http(format!("video response read failed: {e}")))?;

        if !status.is_success() {
            tracing::warn!(%status, "video service returned an error status");
            return Ok(GenerationOutcome::failed(format!(
                "video service returned {status}: {}",
                http::body_snippet(&body)
            )));
        }

        parse_video_response(&body)
    }
}

/// Checks request fields, returning a rejection message for bad input.
pub(crate) fn validate_video_request(request: &VideoRequest) -> Option<String> {
    if request.prompt.trim().is_empty() {
        return Some("Prompt is required and must be a valid string".to_owned());
    }
    if request.duration == 0 {
        return Some("Duration must be a positive number".to_owned());
    }
    if request.duration > MAX_DURATION_SECONDS {
        return Some(format!(
            "Duration cannot exceed {MAX_DURATION_SECONDS} seconds"
        ));
    }
    None
}

/// Builds the task array for a video generation request.
pub(crate) fn build_video_tasks(
    api_key: &str,
    model: &str,
    request: &VideoRequest,
    width: u32,
    height: u32,
) -> Value {
    Value::Array(vec![
        inference::authentication_task(api_key),
        serde_json::json!({
            "taskType": "videoInference",
            "taskUUID": Uuid::new_v4().to_string(),
            "positivePrompt": request.prompt,
            "duration": request.duration,
            "width": width,
            "height": height,
            "model": model,
            "numberResults": 1,
        }),
    ])
}

/// Parses a generation response body into an outcome.
pub(crate) fn parse_video_response(body: &str) -> Result<GenerationOutcome> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| MediaError::Parse(format!("video response is not valid JSON: {e}")))?;

    if let Some(message) = inference::error_message(&value) {
        return Ok(GenerationOutcome::failed(message));
    }

    match inference::first_result_url(&value, "videoURL") {
        Some(url) => Ok(GenerationOutcome::succeeded(url)),
        None => Ok(GenerationOutcome::failed("No video generated")),
    }
}
