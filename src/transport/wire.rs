//! Wire protocol for the realtime voice service.
//!
//! Frames are JSON objects tagged by a `type` field. Only the frames this
//! crate acts on are modelled; the pump ignores anything it cannot parse,
//! so audio and transcript frames pass through without a type here.

use serde::{Deserialize, Serialize};

/// Context block attached to a `session_settings` frame.
#[derive(Debug, Clone, Serialize)]
pub struct SessionContext {
    pub text: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl SessionContext {
    /// Context that stays in scope for the rest of the session.
    pub fn persistent(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: "persistent".to_owned(),
        }
    }
}

/// Frame sent from this crate to the voice service.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientEvent {
    /// Update session configuration; used to deliver context.
    SessionSettings { context: SessionContext },
    /// Plain text input, as if the user had typed it.
    UserInput { text: String },
    /// Successful result for a tool call.
    ToolResponse {
        tool_call_id: String,
        content: String,
    },
    /// Failed result for a tool call.
    ToolError {
        tool_call_id: String,
        error: String,
        code: String,
        level: String,
        content: String,
    },
}

/// Frame received from the voice service that this crate acts on.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    /// Session identifiers, sent once shortly after the socket opens.
    ChatMetadata {
        #[serde(default)]
        chat_id: Option<String>,
        #[serde(default)]
        chat_group_id: Option<String>,
    },
    /// The model wants a tool invoked. `parameters` is a JSON document
    /// encoded as a string.
    ToolCall {
        tool_call_id: String,
        name: String,
        parameters: String,
        #[serde(default)]
        response_required: bool,
    },
    /// Error reported by the service.
    Error {
        #[serde(default)]
        message: String,
    },
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;

    #[test]
    fn session_settings_carries_persistent_context() {
        let event = ClientEvent::SessionSettings {
            context: SessionContext::persistent("Video number: VID-9."),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"session_settings\""));
        assert!(json.contains("\"text\":\"Video number: VID-9.\""));
        assert!(json.contains("\"type\":\"persistent\""));
    }

    #[test]
    fn user_input_serializes() {
        let event = ClientEvent::UserInput {
            text: "hello".to_owned(),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(json, r#"{"type":"user_input","text":"hello"}"#);
    }

    #[test]
    fn tool_response_serializes() {
        let event = ClientEvent::ToolResponse {
            tool_call_id: "call-3".to_owned(),
            content: "{\"success\":true}".to_owned(),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"tool_response\""));
        assert!(json.contains("\"tool_call_id\":\"call-3\""));
    }

    #[test]
    fn tool_error_serializes() {
        let event = ClientEvent::ToolError {
            tool_call_id: "call-4".to_owned(),
            error: "Width must be a positive number".to_owned(),
            code: "MISSING_PARAMS".to_owned(),
            level: "warn".to_owned(),
            content: "Width must be a positive number".to_owned(),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"tool_error\""));
        assert!(json.contains("\"code\":\"MISSING_PARAMS\""));
        assert!(json.contains("\"level\":\"warn\""));
    }

    #[test]
    fn parse_chat_metadata() {
        let frame = r#"{"type":"chat_metadata","chat_id":"chat-1","chat_group_id":"grp-1"}"#;
        let event: ServerEvent = serde_json::from_str(frame).unwrap();
        match event {
            ServerEvent::ChatMetadata { chat_id, chat_group_id } => {
                assert_eq!(chat_id.as_deref(), Some("chat-1"));
                assert_eq!(chat_group_id.as_deref(), Some("grp-1"));
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn parse_tool_call_with_string_parameters() {
        let frame = r#"{"type":"tool_call","tool_call_id":"call-7","name":"generate_image","parameters":"{\"prompt\":\"a cat\",\"width\":512,\"height\":512}","response_required":true}"#;
        let event: ServerEvent = serde_json::from_str(frame).unwrap();
        match event {
            ServerEvent::ToolCall {
                tool_call_id,
                name,
                parameters,
                response_required,
            } => {
                assert_eq!(tool_call_id, "call-7");
                assert_eq!(name, "generate_image");
                assert!(parameters.contains("a cat"));
                assert!(response_required);
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn parse_error_frame_without_message() {
        let event: ServerEvent = serde_json::from_str(r#"{"type":"error"}"#).unwrap();
        match event {
            ServerEvent::Error { message } => assert!(message.is_empty()),
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn audio_frames_do_not_parse() {
        // The pump drops frames with no counterpart here.
        let result: std::result::Result<ServerEvent, _> =
            serde_json::from_str(r#"{"type":"audio_output","data":"AAAA"}"#);
        assert!(result.is_err());
    }
}
