//! Voice transport abstraction.
//!
//! [`VoiceTransport`] is the seam between session orchestration and the
//! realtime service: the controller, context injector and assistant loop
//! depend only on the trait, so tests swap in an in-process stub.

pub mod realtime;
pub mod wire;

use async_trait::async_trait;

use crate::Result;
use wire::ClientEvent;

pub use realtime::RealtimeVoiceClient;

/// Parameters for one connect attempt.
#[derive(Debug, Clone, Default)]
pub struct ConnectOptions {
    /// Short-lived access token appended to the connection URL.
    pub access_token: String,
    /// Service-side assistant configuration to use, when set.
    pub config_id: Option<String>,
    /// Context note delivered in the same breath as the connection,
    /// before any conversation turn.
    pub inline_context: Option<String>,
}

/// Tool call received from the voice service.
#[derive(Debug, Clone)]
pub struct ToolCallEvent {
    pub id: String,
    pub name: String,
    /// JSON document encoded as a string, parsed by the tool router.
    pub parameters: String,
}

/// Event surfaced by a transport to the assistant run loop.
#[derive(Debug, Clone)]
pub enum TransportEvent {
    /// The service acknowledged the session and reported its identifiers.
    SessionStarted { chat_session_id: Option<String> },
    /// The model requested a tool invocation.
    ToolCall(ToolCallEvent),
    /// The connection closed from the remote side.
    Closed { reason: String },
    /// The connection failed mid-session.
    Error { message: String },
}

/// Bidirectional connection to the realtime voice service.
#[async_trait]
pub trait VoiceTransport: Send + Sync {
    /// Opens the connection. Resolves once the socket is established;
    /// delivery of server frames happens out of band.
    async fn connect(&self, options: &ConnectOptions) -> Result<()>;

    /// Closes the connection. Safe to call when not connected.
    async fn disconnect(&self) -> Result<()>;

    /// Sends one frame to the service.
    async fn send(&self, event: ClientEvent) -> Result<()>;
}
