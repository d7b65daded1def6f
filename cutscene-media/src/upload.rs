//! File storage upload client.
//!
//! Stores raw bytes via the storage service's S3-backed store endpoint
//! and returns the public URL of the stored file. The API key travels as
//! a query parameter, the payload as the raw request body.

use crate::config::UploadApiConfig;
use crate::error::{MediaError, Result};
use crate::http;
use crate::types::UploadedFile;

/// Client for the file storage service.
pub struct UploadClient {
    config: UploadApiConfig,
    http: reqwest::Client,
}

impl UploadClient {
    /// Creates a client from the given configuration.
    pub fn new(config: UploadApiConfig) -> Result<Self> {
        let http = http::build_client(config.timeout_seconds)?;
        Ok(Self { config, http })
    }

    /// Stores a file and returns its public URL and metadata.
    pub async fn store(
        &self,
        filename: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<UploadedFile> {
        if filename.trim().is_empty() {
            return Err(MediaError::InvalidRequest("filename must not be empty".into()));
        }
        if bytes.is_empty() {
            return Err(MediaError::InvalidRequest("upload body must not be empty".into()));
        }
        if self.config.api_key.trim().is_empty() {
            return Err(MediaError::Config("upload.api_key is not set".into()));
        }

        tracing::info!(filename, size = bytes.len(), "uploading file");

        let url = format!(
            "{}/api/store/S3",
            self.config.base_url.trim_end_matches('/')
        );
        let response = self
            .http
            .post(&url)
            .query(&[("key", self.config.api_key.as_str()), ("filename", filename)])
            .header("Content-Type", content_type)
            .body(bytes)
            .send()
            .await
            .map_err(|e| MediaError::Http(format!("upload request failed: {e}")))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| MediaError::Http(format!("upload response read failed: {e}")))?;

        if !status.is_success() {
            return Err(MediaError::Api(format!(
                "upload service returned {status}: {}",
                http::body_snippet(&text)
            )));
        }

        parse_store_response(&text)
    }
}

/// Parses a store response body into the uploaded file record.
pub(crate) fn parse_store_response(body: &str) -> Result<UploadedFile> {
    serde_json::from_str(body)
        .map_err(|e| MediaError::Parse(format!("upload response is not valid JSON: {e}")))
}
