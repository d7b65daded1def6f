//! WebSocket client for the realtime voice service.
//!
//! One task pumps the socket: inbound frames are decoded into
//! [`TransportEvent`]s, outbound frames arrive over an in-process channel.
//! Frames the crate does not model (audio, transcripts) fail to parse and
//! are dropped with a debug log.

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::error::{AssistantError, Result};
use crate::transport::wire::{ClientEvent, ServerEvent, SessionContext};
use crate::transport::{ConnectOptions, ToolCallEvent, TransportEvent, VoiceTransport};

/// Live connection handles, present only while a socket is open.
struct ActiveConnection {
    outbound: mpsc::UnboundedSender<String>,
    cancel: CancellationToken,
}

/// Voice transport backed by a WebSocket connection.
///
/// A failed or closed connection is reported through the event channel and
/// not retried; reconnecting is the caller's decision, since a new
/// connection needs a fresh access token and fresh context.
pub struct RealtimeVoiceClient {
    endpoint_url: String,
    events: mpsc::Sender<TransportEvent>,
    inner: Arc<Mutex<Option<ActiveConnection>>>,
}

impl RealtimeVoiceClient {
    pub fn new(endpoint_url: impl Into<String>, events: mpsc::Sender<TransportEvent>) -> Self {
        Self {
            endpoint_url: endpoint_url.into(),
            events,
            inner: Arc::new(Mutex::new(None)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<ActiveConnection>> {
        lock_slot(&self.inner)
    }
}

fn lock_slot(slot: &Mutex<Option<ActiveConnection>>) -> MutexGuard<'_, Option<ActiveConnection>> {
    match slot.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Builds the connection URL with auth and configuration query parameters.
///
/// Extracted as a separate function for testability.
pub(crate) fn build_connect_url(endpoint_url: &str, options: &ConnectOptions) -> Result<String> {
    let mut url = Url::parse(endpoint_url)
        .map_err(|e| AssistantError::Transport(format!("invalid endpoint URL: {e}")))?;
    {
        let mut pairs = url.query_pairs_mut();
        pairs.append_pair("access_token", &options.access_token);
        if let Some(config_id) = &options.config_id {
            pairs.append_pair("config_id", config_id);
        }
    }
    Ok(url.into())
}

#[async_trait]
impl VoiceTransport for RealtimeVoiceClient {
    async fn connect(&self, options: &ConnectOptions) -> Result<()> {
        if self.lock().is_some() {
            return Err(AssistantError::Transport(
                "already connected".to_owned(),
            ));
        }

        let url = build_connect_url(&self.endpoint_url, options)?;
        let (stream, _response) = connect_async(&url)
            .await
            .map_err(|e| AssistantError::Transport(format!("connection failed: {e}")))?;
        let (mut write, mut read) = stream.split();

        // Inline context goes out before any conversation turn. A failure
        // here tears the fresh socket down again.
        if let Some(note) = &options.inline_context {
            let frame = ClientEvent::SessionSettings {
                context: SessionContext::persistent(note.clone()),
            };
            let json = serde_json::to_string(&frame).map_err(|e| {
                AssistantError::Transport(format!("failed to encode session settings: {e}"))
            })?;
            write
                .send(Message::Text(json))
                .await
                .map_err(|e| {
                    AssistantError::Transport(format!("failed to send inline context: {e}"))
                })?;
        }

        let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<String>();
        let cancel = CancellationToken::new();
        *self.lock() = Some(ActiveConnection {
            outbound: outbound_tx,
            cancel: cancel.clone(),
        });

        let events = self.events.clone();
        let slot = Arc::clone(&self.inner);
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        let _ = write.send(Message::Close(None)).await;
                        break;
                    }
                    frame = read.next() => match frame {
                        Some(Ok(Message::Text(text))) => {
                            handle_server_frame(&text, &events).await;
                        }
                        Some(Ok(Message::Close(close))) => {
                            let reason = close
                                .map(|f| f.reason.to_string())
                                .filter(|r| !r.is_empty())
                                .unwrap_or_else(|| "connection closed".to_owned());
                            let _ = events.send(TransportEvent::Closed { reason }).await;
                            break;
                        }
                        Some(Ok(_)) => {}
                        Some(Err(e)) => {
                            let _ = events
                                .send(TransportEvent::Error { message: e.to_string() })
                                .await;
                            break;
                        }
                        None => {
                            let _ = events
                                .send(TransportEvent::Closed {
                                    reason: "stream ended".to_owned(),
                                })
                                .await;
                            break;
                        }
                    },
                    outgoing = outbound_rx.recv() => match outgoing {
                        Some(text) => {
                            if let Err(e) = write.send(Message::Text(text)).await {
                                let _ = events
                                    .send(TransportEvent::Error { message: e.to_string() })
                                    .await;
                                break;
                            }
                        }
                        None => break,
                    },
                }
            }
            *lock_slot(&slot) = None;
        });

        Ok(())
    }

    async fn disconnect(&self) -> Result<()> {
        if let Some(connection) = self.lock().take() {
            connection.cancel.cancel();
        }
        Ok(())
    }

    async fn send(&self, event: ClientEvent) -> Result<()> {
        let json = serde_json::to_string(&event)
            .map_err(|e| AssistantError::Transport(format!("failed to encode frame: {e}")))?;
        match &*self.lock() {
            Some(connection) => connection
                .outbound
                .send(json)
                .map_err(|_| AssistantError::Channel("transport send channel closed".to_owned())),
            None => Err(AssistantError::Transport("not connected".to_owned())),
        }
    }
}

/// Decodes one inbound frame and forwards it to the assistant loop.
async fn handle_server_frame(text: &str, events: &mpsc::Sender<TransportEvent>) {
    let event = match serde_json::from_str::<ServerEvent>(text) {
        Ok(event) => event,
        Err(_) => {
            tracing::debug!("ignoring unhandled frame: {}", frame_kind(text));
            return;
        }
    };
    let forwarded = match event {
        ServerEvent::ChatMetadata { chat_id, chat_group_id } => {
            tracing::info!(?chat_id, ?chat_group_id, "voice session started");
            TransportEvent::SessionStarted {
                chat_session_id: chat_id,
            }
        }
        ServerEvent::ToolCall {
            tool_call_id,
            name,
            parameters,
            response_required,
        } => {
            tracing::debug!(%tool_call_id, %name, response_required, "tool call received");
            TransportEvent::ToolCall(ToolCallEvent {
                id: tool_call_id,
                name,
                parameters,
            })
        }
        ServerEvent::Error { message } => TransportEvent::Error { message },
    };
    let _ = events.send(forwarded).await;
}

/// The `type` tag of a frame, for log lines about frames we drop.
fn frame_kind(text: &str) -> String {
    serde_json::from_str::<serde_json::Value>(text)
        .ok()
        .and_then(|v| v.get("type").and_then(|t| t.as_str()).map(str::to_owned))
        .unwrap_or_else(|| "unparseable".to_owned())
}
