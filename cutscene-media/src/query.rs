//! Semantic video query and indexing client.
//!
//! The query service answers natural-language questions about previously
//! indexed footage. Three calls matter here: `chat` scoped to a set of
//! video identifiers, `scraper_url` to index videos from public URLs,
//! and `get_video_ids_by_task_id` to poll what an indexing task produced.
//! Authentication is the raw API key in the `Authorization` header.

use serde::{Deserialize, Serialize};

use crate::config::QueryApiConfig;
use crate::error::{MediaError, Result};
use crate::http;
use crate::types::{
    IndexedVideo, QueryOutcome, QueryThinking, ReferenceSegment, VideoQueryRequest, VideoReference,
};

/// Client for the video query and indexing service.
pub struct VideoQueryClient {
    config: QueryApiConfig,
    http: reqwest::Client,
}

impl VideoQueryClient {
    /// Creates a client from the given configuration.
    pub fn new(config: QueryApiConfig) -> Result<Self> {
        let http = http::build_client(config.timeout_seconds)?;
        Ok(Self { config, http })
    }

    /// Asks a question about the given videos.
    ///
    /// Rejected input, API-level errors and empty answers come back as an
    /// unsuccessful [`QueryOutcome`]; `Err` is reserved for transport and
    /// decoding faults.
    pub async fn query(&self, request: &VideoQueryRequest) -> Result<QueryOutcome> {
        if request.prompt.trim().is_empty() {
            return Ok(QueryOutcome::failed(
                "Prompt is required and must be a valid string",
            ));
        }
        if request.video_nos.is_empty() {
            return Ok(QueryOutcome::failed(
                "At least one video identifier is required",
            ));
        }
        if self.config.api_key.trim().is_empty() {
            return Err(MediaError::Config("query.api_key is not set".into()));
        }

        let unique_id = request
            .unique_id
            .as_deref()
            .unwrap_or(&self.config.unique_id);
        let body = ChatRequestBody {
            video_nos: &request.video_nos,
            prompt: &request.prompt,
            session_id: request.session_id.as_deref(),
            unique_id,
        };

        tracing::debug!(
            videos = request.video_nos.len(),
            continuing = request.session_id.is_some(),
            "querying indexed videos"
        );

        let url = format!(
            "{}/serve/api/v1/chat",
            self.config.base_url.trim_end_matches('/')
        );
        let response = self
            .http
            .post(&url)
            .header("Authorization", &self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| MediaError::Http(format!("query request failed: {e}")))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| MediaError::Http(format!("query response read failed: {e}")))?;

        if !status.is_success() {
            tracing::warn!(%status, "query service returned an error status");
            return Ok(QueryOutcome::failed(format!(
                "query service returned {status}: {}",
                http::body_snippet(&text)
            )));
        }

        parse_chat_response(&text)
    }

    /// Submits public video URLs for indexing, returning the task id.
    pub async fn index_videos(&self, video_urls: &[String]) -> Result<String> {
        if video_urls.is_empty() {
            return Err(MediaError::InvalidRequest(
                "at least one video URL is required".into(),
            ));
        }
        if self.config.api_key.trim().is_empty() {
            return Err(MediaError::Config("query.api_key is not set".into()));
        }

        let encoded_urls = serde_json::to_string(video_urls)
            .map_err(|e| MediaError::Parse(format!("failed to encode video URLs: {e}")))?;
        let mut params: Vec<(&str, String)> = vec![
            ("video_urls", encoded_urls),
            ("unique_id", self.config.unique_id.clone()),
        ];
        if let Some(callback) = &self.config.callback_url {
            params.push(("callback_url", callback.clone()));
        }
        params.push(("quality", self.config.quality.to_string()));

        tracing::info!(count = video_urls.len(), "submitting videos for indexing");

        let url = format!(
            "{}/serve/api/v1/scraper_url",
            self.config.base_url.trim_end_matches('/')
        );
        let response = self
            .http
            .post(&url)
            .query(&params)
            .header("Authorization", &self.config.api_key)
            .json(&serde_json::json!({ "video_urls": video_urls }))
            .send()
            .await
            .map_err(|e| MediaError::Http(format!("indexing request failed: {e}")))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| MediaError::Http(format!("indexing response read failed: {e}")))?;

        if !status.is_success() {
            return Err(MediaError::Api(format!(
                "indexing service returned {status}: {}",
                http::body_snippet(&text)
            )));
        }

        parse_task_response(&text)
    }

    /// Lists the videos an indexing task has produced so far.
    pub async fn videos_by_task(&self, task_id: &str) -> Result<Vec<IndexedVideo>> {
        if task_id.trim().is_empty() {
            return Err(MediaError::InvalidRequest("task id must not be empty".into()));
        }
        if self.config.api_key.trim().is_empty() {
            return Err(MediaError::Config("query.api_key is not set".into()));
        }

        let url = format!(
            "{}/serve/api/v1/get_video_ids_by_task_id",
            self.config.base_url.trim_end_matches('/')
        );
        let response = self
            .http
            .get(&url)
            .query(&[("task_id", task_id), ("unique_id", &self.config.unique_id)])
            .header("Authorization", &self.config.api_key)
            .send()
            .await
            .map_err(|e| MediaError::Http(format!("task lookup failed: {e}")))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| MediaError::Http(format!("task lookup read failed: {e}")))?;

        if !status.is_success() {
            return Err(MediaError::Api(format!(
                "task lookup returned {status}: {}",
                http::body_snippet(&text)
            )));
        }

        parse_videos_response(&text)
    }
}

#[derive(Serialize)]
struct ChatRequestBody<'a> {
    video_nos: &'a [String],
    prompt: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    session_id: Option<&'a str>,
    unique_id: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatEnvelope {
    #[serde(default)]
    msg: String,
    data: Option<ChatData>,
    session_id: Option<String>,
    success: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct ChatData {
    content: Option<String>,
    #[serde(default)]
    refs: Vec<ChatRef>,
    #[serde(default)]
    thinkings: Vec<ChatThinking>,
}

#[derive(Debug, Deserialize)]
struct ChatRef {
    video: RefVideo,
    #[serde(default, rename = "refItems")]
    ref_items: Vec<RefItem>,
}

#[derive(Debug, Deserialize)]
struct RefVideo {
    video_no: String,
    #[serde(default)]
    video_name: String,
    #[serde(default)]
    duration: String,
}

/// Segment entries use camelCase on the wire, unlike the rest of the envelope.
#[derive(Debug, Deserialize)]
struct RefItem {
    #[serde(default, rename = "type")]
    kind: String,
    #[serde(default, rename = "startTime")]
    start_time: f64,
    #[serde(default, rename = "endTime")]
    end_time: f64,
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct ChatThinking {
    #[serde(default)]
    title: String,
    #[serde(default)]
    content: String,
}

#[derive(Debug, Deserialize)]
struct TaskEnvelope {
    #[serde(default)]
    msg: String,
    data: Option<TaskData>,
    success: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct TaskData {
    #[serde(rename = "taskId")]
    task_id: String,
}

#[derive(Debug, Deserialize)]
struct VideosEnvelope {
    #[serde(default)]
    msg: String,
    data: Option<VideosData>,
    success: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct VideosData {
    #[serde(default)]
    videos: Vec<WireVideo>,
}

#[derive(Debug, Deserialize)]
struct WireVideo {
    video_no: String,
    #[serde(default)]
    video_name: String,
    #[serde(default)]
    duration: String,
    #[serde(default)]
    status: String,
    #[serde(default)]
    video_url: String,
}

/// Parses a chat response body into an outcome.
///
/// Extracted as a separate function for testability with fixture JSON.
pub(crate) fn parse_chat_response(body: &str) -> Result<QueryOutcome> {
    let envelope: ChatEnvelope = serde_json::from_str(body)
        .map_err(|e| MediaError::Parse(format!("chat response is not valid JSON: {e}")))?;

    if envelope.success == Some(false) {
        let msg = if envelope.msg.is_empty() {
            "query rejected by service".to_owned()
        } else {
            envelope.msg
        };
        return Ok(QueryOutcome::failed(msg));
    }

    let data = match envelope.data {
        Some(data) => data,
        None => return Ok(QueryOutcome::failed("No answer produced")),
    };
    let content = match data.content {
        Some(content) if !content.trim().is_empty() => content,
        _ => return Ok(QueryOutcome::failed("No answer produced")),
    };

    let references = data
        .refs
        .into_iter()
        .map(|r| VideoReference {
            video_no: r.video.video_no,
            video_name: r.video.video_name,
            duration: r.video.duration,
            segments: r
                .ref_items
                .into_iter()
                .map(|item| ReferenceSegment {
                    kind: item.kind,
                    start_time: item.start_time,
                    end_time: item.end_time,
                    text: item.text,
                })
                .collect(),
        })
        .collect();
    let thinkings = data
        .thinkings
        .into_iter()
        .map(|t| QueryThinking {
            title: t.title,
            content: t.content,
        })
        .collect();

    Ok(QueryOutcome {
        success: true,
        content: Some(content),
        references,
        thinkings,
        session_id: envelope.session_id,
        error: None,
    })
}

/// Parses an indexing submission response into the task id.
pub(crate) fn parse_task_response(body: &str) -> Result<String> {
    let envelope: TaskEnvelope = serde_json::from_str(body)
        .map_err(|e| MediaError::Parse(format!("indexing response is not valid JSON: {e}")))?;

    if envelope.success == Some(false) {
        return Err(MediaError::Api(format!(
            "indexing rejected: {}",
            envelope.msg
        )));
    }
    match envelope.data {
        Some(data) if !data.task_id.is_empty() => Ok(data.task_id),
        _ => Err(MediaError::Api("indexing response carried no task id".into())),
    }
}

/// Parses a task lookup response into the indexed video list.
pub(crate) fn parse_videos_response(body: &str) -> Result<Vec<IndexedVideo>> {
    let envelope: VideosEnvelope = serde_json::from_str(body)
        .map_err(|e| MediaError::Parse(format!("task lookup response is not valid JSON: {e}")))?;

    if envelope.success == Some(false) {
        return Err(MediaError::Api(format!(
            "task lookup rejected: {}",
            envelope.msg
        )));
    }
    let videos = envelope.data.map(|d| d.videos).unwrap_or_default();
    Ok(videos
        .into_iter()
        .map(|v| IndexedVideo {
            video_no: v.video_no,
            video_name: v.video_name,
            duration: v.duration,
            status: v.status,
            video_url: v.video_url,
        })
        .collect())
}
