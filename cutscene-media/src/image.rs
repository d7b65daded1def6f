//! Image generation client.
//!
//! Talks to a task-based inference API: a single POST carrying an
//! authentication task plus an `imageInference` task, answered with a
//! `data` array of generated images or an `errors` array.

use serde_json::Value;
use uuid::Uuid;

use crate::config::ImageApiConfig;
use crate::error::{MediaError, Result};
use crate::http;
use crate::inference;
use crate::types::{GenerationOutcome, ImageRequest};

/// Client for the image generation service.
pub struct ImageClient {
    config: ImageApiConfig,
    http: reqwest::Client,
}

impl ImageClient {
    /// Creates a client from the given configuration.
    pub fn new(config: ImageApiConfig) -> Result<Self> {
        let http = http::build_client(config.timeout_seconds)?;
        Ok(Self { config, http })
    }

    /// Generates an image, reporting expected failures in the outcome.
    ///
    /// Rejected input, API-level errors and empty results come back as an
    /// unsuccessful [`GenerationOutcome`]; `Err` is reserved for transport
    /// and decoding faults.
    pub async fn generate(&self, request: &ImageRequest) -> Result<GenerationOutcome> {
        if let Some(reason) = validate_image_request(request) {
            return Ok(GenerationOutcome::failed(reason));
        }
        if self.config.api_key.trim().is_empty() {
            return Err(MediaError::Config("image.api_key is not set".into()));
        }

        tracing::debug!(
            width = request.width,
            height = request.height,
            "requesting image generation"
        );

        let url = format!("{}/v1", self.config.base_url.trim_end_matches('/'));
        let tasks = build_image_tasks(&self.config.api_key, &self.config.model, request);

        let response = self
            .http
            .post(&url)
            .json(&tasks)
            .send()
            .await
            .map_err(|e| MediaError::Http(format!("image request failed: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| MediaError::Http(format!("image response read failed: {e}")))?;

        if !status.is_success() {
            tracing::warn!(%status, "image service returned an error status");
            return Ok(GenerationOutcome::failed(format!(
                "image service returned {status}: {}",
                http::body_snippet(&body)
            )));
        }

        parse_image_response(&body)
    }
}

/// Checks request fields, returning a rejection message for bad input.
pub(crate) fn validate_image_request(request: &ImageRequest) -> Option<String> {
    if request.prompt.trim().is_empty() {
        return Some("Prompt is required and must be a valid string".to_owned());
    }
    if request.width == 0 {
        return Some("Width must be a positive number".to_owned());
    }
    if request.height == 0 {
        return Some("Height must be a positive number".to_owned());
    }
    None
}

/// Builds the task array for an image generation request.
pub(crate) fn build_image_tasks(api_key: &str, model: &str, request: &ImageRequest) -> Value {
    Value::Array(vec![
        inference::authentication_task(api_key),
        serde_json::json!({
            "taskType": "imageInference",
            "taskUUID": Uuid::new_v4().to_string(),
            "positivePrompt": request.prompt,
            "width": request.width,
            "height": request.height,
            "model": model,
            "numberResults": 1,
        }),
    ])
}

/// Parses a generation response body into an outcome.
///
/// Extracted as a separate function for testability with fixture JSON.
pub(crate) fn parse_image_response(body: &str) -> Result<GenerationOutcome> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| MediaError::Parse(format!("image response is not valid JSON: {e}")))?;

    if let Some(message) = inference::error_message(&value) {
        return Ok(GenerationOutcome::failed(message));
    }

    match inference::first_result_url(&value, "imageURL") {
        Some(url) => Ok(GenerationOutcome::succeeded(url)),
        None => Ok(GenerationOutcome::failed("No image generated")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MOCK_IMAGE_RESPONSE: &str = r#"{
        "data": [
            {
                "taskType": "imageInference",
                "taskUUID": "a7f3b2c1-0000-4000-8000-000000000001",
                "imageUUID": "b8e4c3d2-0000-4000-8000-000000000002",
                "imageURL": "https://im.example/generated/a7f3b2c1.png",
                "cost": 0.0013
            }
        ]
    }"#;

    const MOCK_ERROR_RESPONSE: &str = r#"{
        "errors": [
            {
                "code": "invalidModel",
                "message": "Model not found: runware:999@9",
                "taskType": "imageInference"
            }
        ]
    }"#;

    fn request() -> ImageRequest {
        ImageRequest {
            prompt: "a lighthouse at dusk".to_owned(),
            width: 1024,
            height: 768,
        }
    }

    #[test]
    fn valid_request_passes_validation() {
        assert!(validate_image_request(&request()).is_none());
    }

    #[test]
    fn empty_prompt_rejected() {
        let mut req = request();
        req.prompt = "   ".to_owned();
        let reason = validate_image_request(&req);
        assert_eq!(
            reason.as_deref(),
            Some("Prompt is required and must be a valid string")
        );
    }

    #[test]
    fn zero_width_rejected() {
        let mut req = request();
        req.width = 0;
        assert_eq!(
            validate_image_request(&req).as_deref(),
            Some("Width must be a positive number")
        );
    }

    #[test]
    fn zero_height_rejected() {
        let mut req = request();
        req.height = 0;
        assert_eq!(
            validate_image_request(&req).as_deref(),
            Some("Height must be a positive number")
        );
    }

    #[test]
    fn task_array_has_auth_then_inference() {
        let tasks = build_image_tasks("sk-test", "runware:101@1", &request());
        let tasks = tasks.as_array().expect("should be an array");
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0]["taskType"], "authentication");
        assert_eq!(tasks[0]["apiKey"], "sk-test");
        assert_eq!(tasks[1]["taskType"], "imageInference");
        assert_eq!(tasks[1]["positivePrompt"], "a lighthouse at dusk");
        assert_eq!(tasks[1]["width"], 1024);
        assert_eq!(tasks[1]["height"], 768);
        assert_eq!(tasks[1]["model"], "runware:101@1");
        assert_eq!(tasks[1]["numberResults"], 1);
    }

    #[test]
    fn task_uuid_is_unique_per_request() {
        let a = build_image_tasks("k", "m", &request());
        let b = build_image_tasks("k", "m", &request());
        assert_ne!(a[1]["taskUUID"], b[1]["taskUUID"]);
    }

    #[test]
    fn parse_success_returns_url() {
        let outcome = parse_image_response(MOCK_IMAGE_RESPONSE).expect("should parse");
        assert!(outcome.success);
        assert_eq!(
            outcome.resource_url.as_deref(),
            Some("https://im.example/generated/a7f3b2c1.png")
        );
    }

    #[test]
    fn parse_api_error_returns_failed_outcome() {
        let outcome = parse_image_response(MOCK_ERROR_RESPONSE).expect("should parse");
        assert!(!outcome.success);
        assert_eq!(
            outcome.error.as_deref(),
            Some("Model not found: runware:999@9")
        );
    }

    #[test]
    fn parse_empty_data_reports_no_image() {
        let outcome = parse_image_response(r#"{"data": []}"#).expect("should parse");
        assert!(!outcome.success);
        assert_eq!(outcome.error.as_deref(), Some("No image generated"));
    }

    #[test]
    fn parse_garbage_is_a_parse_error() {
        let result = parse_image_response("<html>bad gateway</html>");
        assert!(matches!(result, Err(MediaError::Parse(_))));
    }

    #[tokio::test]
    async fn missing_api_key_is_a_config_error() {
        let client = ImageClient::new(ImageApiConfig::default()).expect("client should build");
        let result = client.generate(&request()).await;
        assert!(matches!(result, Err(MediaError::Config(_))));
    }

    #[tokio::test]
    async fn invalid_request_short_circuits_before_any_io() {
        let client = ImageClient::new(ImageApiConfig::default()).expect("client should build");
        let mut req = request();
        req.prompt = String::new();
        let outcome = client.generate(&req).await.expect("should not error");
        assert!(!outcome.success);
    }

    #[test]
    fn is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ImageClient>();
    }
}
