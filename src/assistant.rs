//! The assistant run loop.
//!
//! Consumes transport events, dispatches tool calls serially in arrival
//! order and reports each outcome back over the voice connection. The
//! voice service holds the conversation open while a tool runs, so there
//! is no concurrency to manage here.

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};
use tokio_util::sync::CancellationToken;

use crate::events::AssistantEvent;
use crate::session::SessionController;
use crate::tools::{ToolInvocation, ToolOutcome, ToolRouter};
use crate::transport::wire::ClientEvent;
use crate::transport::{ToolCallEvent, TransportEvent, VoiceTransport};

/// Buffer for events flowing from the transport pump to the run loop.
pub const TRANSPORT_EVENT_CAPACITY: usize = 64;
/// Buffer for events published to the embedding application.
pub const ASSISTANT_EVENT_CAPACITY: usize = 32;

/// Connects the transport event stream to the tool router.
pub struct Assistant {
    controller: Arc<SessionController>,
    router: ToolRouter,
    transport: Arc<dyn VoiceTransport>,
    events: broadcast::Sender<AssistantEvent>,
}

impl Assistant {
    pub fn new(
        controller: Arc<SessionController>,
        router: ToolRouter,
        transport: Arc<dyn VoiceTransport>,
        events: broadcast::Sender<AssistantEvent>,
    ) -> Self {
        Self {
            controller,
            router,
            transport,
            events,
        }
    }

    /// Processes transport events until cancelled or the transport side of
    /// the channel is dropped.
    pub async fn run(
        &self,
        mut transport_events: mpsc::Receiver<TransportEvent>,
        cancel: CancellationToken,
    ) {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                event = transport_events.recv() => match event {
                    Some(event) => self.handle_event(event).await,
                    None => break,
                },
            }
        }
    }

    async fn handle_event(&self, event: TransportEvent) {
        match event {
            TransportEvent::SessionStarted { chat_session_id } => {
                tracing::info!(?chat_session_id, "voice session acknowledged");
            }
            TransportEvent::ToolCall(call) => self.handle_tool_call(call).await,
            TransportEvent::Closed { reason } => {
                self.controller.handle_transport_closed(&reason);
            }
            TransportEvent::Error { message } => {
                tracing::warn!("voice transport error: {message}");
                self.controller.handle_transport_closed(&message);
            }
        }
    }

    async fn handle_tool_call(&self, call: ToolCallEvent) {
        let _ = self.events.send(AssistantEvent::ToolCall {
            id: call.id.clone(),
            name: call.name.clone(),
        });

        let invocation = ToolInvocation {
            id: call.id.clone(),
            name: call.name.clone(),
            parameters: call.parameters,
        };
        let outcome = self.router.dispatch(&invocation).await;
        let success = outcome.is_success();
        if let ToolOutcome::Failure { code, message, .. } = &outcome {
            tracing::warn!(tool = %call.name, code = code.as_str(), "tool call failed: {message}");
        }

        let frame = response_frame(&invocation.id, outcome);
        if let Err(e) = self.transport.send(frame).await {
            tracing::warn!("failed to deliver tool result: {e}");
        }

        let _ = self.events.send(AssistantEvent::ToolResult {
            id: call.id,
            name: call.name,
            success,
        });
    }
}

/// Maps a tool outcome onto the wire frame the voice service expects.
pub(crate) fn response_frame(tool_call_id: &str, outcome: ToolOutcome) -> ClientEvent {
    match outcome {
        ToolOutcome::Success { payload, .. } => ClientEvent::ToolResponse {
            tool_call_id: tool_call_id.to_owned(),
            content: payload.to_string(),
        },
        ToolOutcome::Failure {
            code,
            level,
            message,
        } => ClientEvent::ToolError {
            tool_call_id: tool_call_id.to_owned(),
            error: message.clone(),
            code: code.as_str().to_owned(),
            level: level.as_str().to_owned(),
            content: message,
        },
    }
}
