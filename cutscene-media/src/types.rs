//! Request and outcome types shared by the media clients.

use serde::{Deserialize, Serialize};

/// An image generation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRequest {
    /// Text prompt describing the image.
    pub prompt: String,
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
}

/// A video generation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoRequest {
    /// Text prompt describing the video.
    pub prompt: String,
    /// Clip length in seconds.
    pub duration: u32,
    /// Output width in pixels, or the configured default.
    pub width: Option<u32>,
    /// Output height in pixels, or the configured default.
    pub height: Option<u32>,
}

/// The result of a generation call.
///
/// Expected failures (rejected input, API errors, empty results) are reported
/// here with `success == false` rather than as a transport error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationOutcome {
    /// Whether a resource was produced.
    pub success: bool,
    /// URL of the generated resource when successful.
    pub resource_url: Option<String>,
    /// Human-readable failure description when unsuccessful.
    pub error: Option<String>,
}

impl GenerationOutcome {
    /// A successful outcome carrying the resource URL.
    pub fn succeeded(url: impl Into<String>) -> Self {
        Self {
            success: true,
            resource_url: Some(url.into()),
            error: None,
        }
    }

    /// A failed outcome with a description of what went wrong.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            resource_url: None,
            error: Some(message.into()),
        }
    }
}

/// A semantic query over previously indexed videos.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoQueryRequest {
    /// Identifiers of the videos to query.
    pub video_nos: Vec<String>,
    /// Natural-language question about the footage.
    pub prompt: String,
    /// Existing conversation to continue, if any.
    pub session_id: Option<String>,
    /// Library namespace override. Falls back to the configured value.
    pub unique_id: Option<String>,
}

/// A timestamped excerpt backing a query answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceSegment {
    /// Segment kind as reported by the service.
    #[serde(rename = "type")]
    pub kind: String,
    /// Segment start in seconds.
    pub start_time: f64,
    /// Segment end in seconds.
    pub end_time: f64,
    /// Transcript or description of the segment.
    pub text: String,
}

/// A video cited by a query answer, with the segments that matched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoReference {
    /// Identifier of the cited video.
    pub video_no: String,
    /// Display name of the cited video.
    pub video_name: String,
    /// Video length as reported by the service.
    pub duration: String,
    /// Matching segments within the video.
    pub segments: Vec<ReferenceSegment>,
}

/// An intermediate reasoning step attached to a query answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryThinking {
    pub title: String,
    pub content: String,
}

/// The result of a semantic video query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryOutcome {
    /// Whether the service produced an answer.
    pub success: bool,
    /// Answer text when successful.
    pub content: Option<String>,
    /// Videos and segments the answer is grounded in.
    pub references: Vec<VideoReference>,
    /// Reasoning steps, when the service reports them.
    pub thinkings: Vec<QueryThinking>,
    /// Conversation identifier for follow-up queries.
    pub session_id: Option<String>,
    /// Human-readable failure description when unsuccessful.
    pub error: Option<String>,
}

impl QueryOutcome {
    /// A failed outcome with a description of what went wrong.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            content: None,
            references: Vec::new(),
            thinkings: Vec::new(),
            session_id: None,
            error: Some(message.into()),
        }
    }
}

/// A video known to the indexing service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexedVideo {
    /// Identifier used to query the video.
    pub video_no: String,
    /// Display name.
    pub video_name: String,
    /// Video length as reported by the service.
    pub duration: String,
    /// Indexing status, e.g. `PARSE` or `FINISH`.
    pub status: String,
    /// Source URL the video was indexed from.
    pub video_url: String,
}

/// A file stored by the upload service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadedFile {
    /// Public URL of the stored file.
    pub url: String,
    /// Stored filename.
    pub filename: String,
    /// Size in bytes.
    pub size: u64,
    /// MIME type of the stored file.
    #[serde(rename = "type")]
    pub mimetype: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn succeeded_outcome_carries_url() {
        let outcome = GenerationOutcome::succeeded("https://cdn.example/img.png");
        assert!(outcome.success);
        assert_eq!(
            outcome.resource_url.as_deref(),
            Some("https://cdn.example/img.png")
        );
        assert!(outcome.error.is_none());
    }

    #[test]
    fn failed_outcome_carries_message() {
        let outcome = GenerationOutcome::failed("No image generated");
        assert!(!outcome.success);
        assert!(outcome.resource_url.is_none());
        assert_eq!(outcome.error.as_deref(), Some("No image generated"));
    }

    #[test]
    fn failed_query_outcome_is_empty() {
        let outcome = QueryOutcome::failed("boom");
        assert!(!outcome.success);
        assert!(outcome.references.is_empty());
        assert!(outcome.thinkings.is_empty());
        assert!(outcome.session_id.is_none());
    }

    #[test]
    fn segment_kind_serializes_as_type() {
        let segment = ReferenceSegment {
            kind: "video".to_owned(),
            start_time: 1.5,
            end_time: 4.0,
            text: "a dog runs past".to_owned(),
        };
        let json = serde_json::to_value(&segment).unwrap_or_default();
        assert_eq!(json["type"], "video");
        assert!(json.get("kind").is_none());
    }

    #[test]
    fn uploaded_file_mimetype_serializes_as_type() {
        let file = UploadedFile {
            url: "https://cdn.example/f".to_owned(),
            filename: "clip.mp4".to_owned(),
            size: 1024,
            mimetype: "video/mp4".to_owned(),
        };
        let json = serde_json::to_value(&file).unwrap_or_default();
        assert_eq!(json["type"], "video/mp4");
    }
}
