//! Dispatches tool calls from the voice model to the media backends.
//!
//! Dispatch is infallible: parameter problems, backend rejections and
//! unexpected faults all come back as a [`ToolOutcome::Failure`] so the
//! model always receives an answer it can react to.

use std::sync::Arc;

use serde_json::{json, Value};
use tokio::sync::broadcast;

use cutscene_media::types::{ImageRequest, VideoQueryRequest, VideoRequest};

use crate::events::{AssistantEvent, MediaKind};
use crate::media::MediaBackends;
use crate::tools::types::{FailureCode, Severity, ToolInvocation, ToolOutcome};

/// Routes tool invocations by name.
pub struct ToolRouter {
    backends: Arc<dyn MediaBackends>,
    events: broadcast::Sender<AssistantEvent>,
}

impl ToolRouter {
    pub fn new(
        backends: Arc<dyn MediaBackends>,
        events: broadcast::Sender<AssistantEvent>,
    ) -> Self {
        Self { backends, events }
    }

    /// Runs one tool call to completion and reports the outcome.
    pub async fn dispatch(&self, invocation: &ToolInvocation) -> ToolOutcome {
        let params: Value = match serde_json::from_str(&invocation.parameters) {
            Ok(value) => value,
            Err(e) => {
                return ToolOutcome::failure(
                    FailureCode::ParseError,
                    Severity::Error,
                    format!("Failed to parse tool parameters: {e}"),
                );
            }
        };
        match invocation.name.as_str() {
            "generate_image" => self.generate_image(&params).await,
            "generate_video" => self.generate_video(&params).await,
            "query_video" => self.query_video(&params).await,
            other => ToolOutcome::failure(
                FailureCode::ToolNotFound,
                Severity::Error,
                format!(
                    "Tool '{other}' is not supported. Supported tools: \
                     generate_image, generate_video, query_video."
                ),
            ),
        }
    }

    async fn generate_image(&self, params: &Value) -> ToolOutcome {
        let Some(prompt) = str_param(params, "prompt") else {
            return ToolOutcome::failure(
                FailureCode::MissingParam,
                Severity::Warn,
                "A prompt is required to generate an image.",
            );
        };
        let (Some(width), Some(height)) = (
            positive_number(params, "width"),
            positive_number(params, "height"),
        ) else {
            return ToolOutcome::failure(
                FailureCode::MissingParams,
                Severity::Warn,
                "Both width and height are required to generate an image.",
            );
        };

        let request = ImageRequest {
            prompt: prompt.to_owned(),
            width,
            height,
        };
        match self.backends.generate_image(&request).await {
            Ok(outcome) => match outcome.resource_url.filter(|_| outcome.success) {
                Some(url) => {
                    self.publish_media(MediaKind::Image, &url);
                    let message = format!(
                        "Successfully generated a {width}x{height} image. \
                         You can view it at: {url}"
                    );
                    ToolOutcome::Success {
                        payload: json!({
                            "success": true,
                            "url": url,
                            "message": message,
                        }),
                        message,
                    }
                }
                None => ToolOutcome::failure(
                    FailureCode::GenerationFailed,
                    Severity::Error,
                    outcome
                        .error
                        .unwrap_or_else(|| "Image generation failed.".to_owned()),
                ),
            },
            Err(e) => ToolOutcome::failure(
                FailureCode::UnexpectedError,
                Severity::Error,
                format!("Unexpected error while generating the image: {e}"),
            ),
        }
    }

    async fn generate_video(&self, params: &Value) -> ToolOutcome {
        let Some(prompt) = str_param(params, "prompt") else {
            return ToolOutcome::failure(
                FailureCode::MissingParam,
                Severity::Warn,
                "A prompt is required to generate a video.",
            );
        };
        let Some(duration) = positive_number(params, "duration") else {
            return ToolOutcome::failure(
                FailureCode::MissingParams,
                Severity::Warn,
                "A duration in seconds is required to generate a video.",
            );
        };

        let request = VideoRequest {
            prompt: prompt.to_owned(),
            duration,
            width: positive_number(params, "width"),
            height: positive_number(params, "height"),
        };
        match self.backends.generate_video(&request).await {
            Ok(outcome) => match outcome.resource_url.filter(|_| outcome.success) {
                Some(url) => {
                    self.publish_media(MediaKind::Video, &url);
                    let message = format!(
                        "Successfully generated a {duration} second video. \
                         You can view it at: {url}"
                    );
                    ToolOutcome::Success {
                        payload: json!({
                            "success": true,
                            "url": url,
                            "message": message,
                        }),
                        message,
                    }
                }
                None => ToolOutcome::failure(
                    FailureCode::GenerationFailed,
                    Severity::Error,
                    outcome
                        .error
                        .unwrap_or_else(|| "Video generation failed.".to_owned()),
                ),
            },
            Err(e) => ToolOutcome::failure(
                FailureCode::UnexpectedError,
                Severity::Error,
                format!("Unexpected error while generating the video: {e}"),
            ),
        }
    }

    async fn query_video(&self, params: &Value) -> ToolOutcome {
        let Some(prompt) = str_param(params, "prompt") else {
            return ToolOutcome::failure(
                FailureCode::MissingParam,
                Severity::Warn,
                "A prompt is required to query video content.",
            );
        };
        let video_nos = video_nos_param(params);
        if video_nos.is_empty() {
            return ToolOutcome::failure(
                FailureCode::MissingParam,
                Severity::Warn,
                "At least one video number is required to query video content.",
            );
        }

        let request = VideoQueryRequest {
            video_nos,
            prompt: prompt.to_owned(),
            session_id: str_param(params, "sessionId").map(str::to_owned),
            unique_id: str_param(params, "uniqueId").map(str::to_owned),
        };
        match self.backends.query_videos(&request).await {
            Ok(outcome) if outcome.success => {
                let message = outcome
                    .content
                    .clone()
                    .filter(|c| !c.trim().is_empty())
                    .unwrap_or_else(|| "The video query completed.".to_owned());
                let payload = serde_json::to_value(&outcome)
                    .unwrap_or_else(|_| json!({ "content": message.clone() }));
                ToolOutcome::Success { payload, message }
            }
            Ok(outcome) => ToolOutcome::failure(
                FailureCode::QueryFailed,
                Severity::Error,
                outcome
                    .error
                    .unwrap_or_else(|| "Video query failed.".to_owned()),
            ),
            Err(e) => ToolOutcome::failure(
                FailureCode::UnexpectedError,
                Severity::Error,
                format!("Unexpected error while querying the video: {e}"),
            ),
        }
    }

    fn publish_media(&self, kind: MediaKind, url: &str) {
        let _ = self.events.send(AssistantEvent::MediaReady {
            kind,
            url: url.to_owned(),
        });
    }
}

/// A non-blank string parameter.
fn str_param<'a>(params: &'a Value, key: &str) -> Option<&'a str> {
    params
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// A positive numeric parameter. Models sometimes send integral floats,
/// so any number above zero is accepted and truncated.
fn positive_number(params: &Value, key: &str) -> Option<u32> {
    params
        .get(key)
        .and_then(Value::as_f64)
        .filter(|n| *n > 0.0)
        .map(|n| n as u32)
}

/// Video identifiers, accepted as an array or a single string.
fn video_nos_param(params: &Value) -> Vec<String> {
    match params.get("videoNos") {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_owned)
            .collect(),
        Some(Value::String(single)) => {
            let trimmed = single.trim();
            if trimmed.is_empty() {
                Vec::new()
            } else {
                vec![trimmed.to_owned()]
            }
        }
        _ => Vec::new(),
    }
}
