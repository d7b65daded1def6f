//! Error types for the cutscene-media crate.
//!
//! All errors use stable string messages suitable for display to users
//! and programmatic handling. API keys never appear in error messages.

/// Errors that can occur when calling a media backend.
#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    /// An HTTP request to a backend service failed.
    #[error("HTTP error: {0}")]
    Http(String),

    /// The backend accepted the request but reported an API-level failure.
    #[error("API error: {0}")]
    Api(String),

    /// Failed to parse a backend response.
    #[error("parse error: {0}")]
    Parse(String),

    /// A request was rejected before sending (invalid field values).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Invalid client configuration.
    #[error("config error: {0}")]
    Config(String),
}

/// Convenience type alias for cutscene-media results.
pub type Result<T> = std::result::Result<T, MediaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_http() {
        let err = MediaError::Http("connection refused".into());
        assert_eq!(err.to_string(), "HTTP error: connection refused");
    }

    #[test]
    fn display_api() {
        let err = MediaError::Api("task rejected".into());
        assert_eq!(err.to_string(), "API error: task rejected");
    }

    #[test]
    fn display_parse() {
        let err = MediaError::Parse("unexpected response shape".into());
        assert_eq!(err.to_string(), "parse error: unexpected response shape");
    }

    #[test]
    fn display_invalid_request() {
        let err = MediaError::InvalidRequest("quality out of range".into());
        assert_eq!(err.to_string(), "invalid request: quality out of range");
    }

    #[test]
    fn display_config() {
        let err = MediaError::Config("timeout_seconds must be > 0".into());
        assert_eq!(err.to_string(), "config error: timeout_seconds must be > 0");
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<MediaError>();
    }
}
