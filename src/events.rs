//! Events published to the embedding application.
//!
//! Delivered over a broadcast channel; the host binary serializes them as
//! NDJSON on stdout. Serialization is part of the contract, so every
//! variant derives `Serialize` with a stable tag.

use serde::Serialize;

use crate::session::Presence;

/// Kind of media produced by a generation tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Image,
    Video,
}

/// Notification from the assistant to the embedding application.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AssistantEvent {
    /// The presence indicator changed.
    Presence { presence: Presence },
    /// A generation tool produced a media asset.
    MediaReady { kind: MediaKind, url: String },
    /// A tool call arrived from the voice transport.
    ToolCall { id: String, name: String },
    /// A tool call finished, successfully or not.
    ToolResult { id: String, name: String, success: bool },
    /// A connect attempt failed.
    ConnectionFailed { message: String },
}
