//! Cutscene: realtime voice assistant for a video editor.
//!
//! Bridges a realtime voice conversation with slow media backends: the
//! voice model calls tools to generate images and video clips and to
//! answer questions about footage indexed by a video understanding
//! service.
//!
//! # Architecture
//!
//! Four layers connected by async channels:
//! - **Transport**: WebSocket connection to the voice service
//! - **Session**: connect/disconnect state machine and presence
//! - **Context**: debounced injection of the loaded video into the session
//! - **Tools**: dispatch of model tool calls to the media backends
//!
//! The media clients themselves live in the `cutscene-media` crate; this
//! crate orchestrates them around a voice session.

pub mod assistant;
pub mod auth;
pub mod config;
pub mod context;
pub mod error;
pub mod events;
pub mod media;
pub mod session;
pub mod tools;
pub mod transport;

pub use assistant::Assistant;
pub use config::AssistantConfig;
pub use error::{AssistantError, Result};
pub use events::{AssistantEvent, MediaKind};
pub use media::{LiveMediaBackends, MediaBackends};
pub use session::controller::ConnectRequest;
pub use session::{Presence, SessionController, SessionState, SharedSession, VideoContext};
pub use tools::{FailureCode, Severity, ToolInvocation, ToolOutcome, ToolRouter};
pub use transport::{ConnectOptions, RealtimeVoiceClient, TransportEvent, VoiceTransport};
