//! Error types for the voice assistant.

/// Top-level error type for the assistant.
#[derive(Debug, thiserror::Error)]
pub enum AssistantError {
    /// Voice transport (WebSocket) error.
    #[error("transport error: {0}")]
    Transport(String),

    /// Session lifecycle violation.
    #[error("session error: {0}")]
    Session(String),

    /// Access token acquisition error.
    #[error("auth error: {0}")]
    Auth(String),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// Media backend client error.
    #[error("media error: {0}")]
    Media(#[from] cutscene_media::MediaError),

    /// Channel send/receive error.
    #[error("channel error: {0}")]
    Channel(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, AssistantError>;
