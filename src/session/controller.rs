//! Session lifecycle orchestration.
//!
//! The controller owns the connect/disconnect choreography: state
//! transitions, presence publication, context scheduling and the cleanup
//! that keeps a failed connect from leaking a half-open session.

use std::sync::Arc;

use tokio::sync::broadcast;

use crate::context::{compose_context_note, ContextInjector};
use crate::error::{AssistantError, Result};
use crate::events::AssistantEvent;
use crate::session::{SessionState, SharedSession, VideoContext};
use crate::transport::{ConnectOptions, VoiceTransport};

/// Parameters for one connect request from the embedding application.
#[derive(Debug, Clone, Default)]
pub struct ConnectRequest {
    /// Short-lived access token for the voice service.
    pub access_token: String,
    /// Service-side assistant configuration to use, when set.
    pub config_id: Option<String>,
    /// Video the assistant should reason about, when one is loaded.
    pub video: Option<VideoContext>,
    /// Query conversation to resume for follow-up questions.
    pub chat_session_id: Option<String>,
}

/// Drives the session state machine over a [`VoiceTransport`].
pub struct SessionController {
    session: SharedSession,
    transport: Arc<dyn VoiceTransport>,
    events: broadcast::Sender<AssistantEvent>,
    injector: ContextInjector,
    inline_context: bool,
}

impl SessionController {
    pub fn new(
        session: SharedSession,
        transport: Arc<dyn VoiceTransport>,
        events: broadcast::Sender<AssistantEvent>,
        injector: ContextInjector,
        inline_context: bool,
    ) -> Self {
        Self {
            session,
            transport,
            events,
            injector,
            inline_context,
        }
    }

    /// The shared session this controller drives.
    pub fn session(&self) -> &SharedSession {
        &self.session
    }

    /// Opens a voice session.
    ///
    /// Rejected without side effects when a session is already connecting
    /// or open. On transport failure the session returns to Idle and a
    /// `ConnectionFailed` event is published before the error propagates.
    pub async fn connect(&self, request: ConnectRequest) -> Result<()> {
        if !self
            .session
            .begin_connect(request.video, request.chat_session_id)
        {
            return Err(AssistantError::Session(
                "connect rejected: session is not idle".to_owned(),
            ));
        }
        self.publish_presence();

        let inline_note = if self.inline_context {
            self.session
                .video()
                .filter(|v| !v.video_no.trim().is_empty())
                .map(|v| compose_context_note(&v, self.session.chat_session_id().as_deref()))
        } else {
            None
        };

        let options = ConnectOptions {
            access_token: request.access_token,
            config_id: request.config_id,
            inline_context: inline_note.clone(),
        };
        match self.transport.connect(&options).await {
            Ok(()) => {
                self.session.mark_open(inline_note.is_some());
                self.publish_presence();
                if inline_note.is_none() {
                    self.injector.schedule();
                }
                Ok(())
            }
            Err(e) => {
                self.session.mark_idle();
                self.publish_presence();
                let _ = self.events.send(AssistantEvent::ConnectionFailed {
                    message: e.to_string(),
                });
                Err(e)
            }
        }
    }

    /// Closes the voice session. A no-op when nothing is connected.
    pub async fn disconnect(&self) -> Result<()> {
        if !self.session.begin_disconnect() {
            return Ok(());
        }
        self.publish_presence();
        self.injector.cancel();
        let result = self.transport.disconnect().await;
        self.session.mark_idle();
        self.publish_presence();
        result
    }

    /// Handles a close or error reported by the transport itself.
    ///
    /// A locally initiated disconnect is already mid-transition and is
    /// left to finish on its own.
    pub fn handle_transport_closed(&self, reason: &str) {
        match self.session.state() {
            SessionState::Open | SessionState::Connecting => {
                tracing::info!(reason, "voice session closed by remote");
                self.injector.cancel();
                self.session.mark_idle();
                self.publish_presence();
            }
            SessionState::Idle | SessionState::Disconnecting => {}
        }
    }

    fn publish_presence(&self) {
        let _ = self.events.send(AssistantEvent::Presence {
            presence: self.session.presence(),
        });
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;
    use crate::session::Presence;
    use crate::transport::wire::ClientEvent;

    #[derive(Default)]
    struct StubTransport {
        connects: Mutex<Vec<ConnectOptions>>,
        disconnects: Mutex<usize>,
        sent: Mutex<Vec<ClientEvent>>,
        fail_connect: bool,
    }

    impl StubTransport {
        fn failing() -> Self {
            Self {
                fail_connect: true,
                ..Self::default()
            }
        }

        fn connect_count(&self) -> usize {
            self.connects.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl VoiceTransport for StubTransport {
        async fn connect(&self, options: &ConnectOptions) -> Result<()> {
            self.connects.lock().unwrap().push(options.clone());
            if self.fail_connect {
                return Err(AssistantError::Transport("refused".to_owned()));
            }
            Ok(())
        }

        async fn disconnect(&self) -> Result<()> {
            *self.disconnects.lock().unwrap() += 1;
            Ok(())
        }

        async fn send(&self, event: ClientEvent) -> Result<()> {
            self.sent.lock().unwrap().push(event);
            Ok(())
        }
    }

    struct Harness {
        controller: SessionController,
        transport: Arc<StubTransport>,
        events: broadcast::Receiver<AssistantEvent>,
    }

    fn harness(transport: StubTransport, inline_context: bool) -> Harness {
        let transport = Arc::new(transport);
        let session = SharedSession::new();
        let (tx, rx) = broadcast::channel(32);
        let injector = ContextInjector::new(
            session.clone(),
            transport.clone(),
            Duration::from_millis(10),
        );
        let controller =
            SessionController::new(session, transport.clone(), tx, injector, inline_context);
        Harness {
            controller,
            transport,
            events: rx,
        }
    }

    fn drain(rx: &mut broadcast::Receiver<AssistantEvent>) -> Vec<AssistantEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    fn presences(events: &[AssistantEvent]) -> Vec<Presence> {
        events
            .iter()
            .filter_map(|e| match e {
                AssistantEvent::Presence { presence } => Some(*presence),
                _ => None,
            })
            .collect()
    }

    fn request_with_video() -> ConnectRequest {
        ConnectRequest {
            access_token: "tok-1".to_owned(),
            config_id: None,
            video: Some(VideoContext {
                video_no: "VID-42".to_owned(),
                video_url: Some("https://videos.example/42.mp4".to_owned()),
            }),
            chat_session_id: None,
        }
    }

    #[tokio::test]
    async fn connect_opens_the_session() {
        let mut h = harness(StubTransport::default(), false);
        h.controller.connect(request_with_video()).await.unwrap();

        assert_eq!(h.controller.session().state(), SessionState::Open);
        assert_eq!(h.transport.connect_count(), 1);
        let options = h.transport.connects.lock().unwrap()[0].clone();
        assert_eq!(options.access_token, "tok-1");
        assert!(options.inline_context.is_none());

        let events = drain(&mut h.events);
        assert_eq!(
            presences(&events),
            vec![Presence::Thinking, Presence::Listening]
        );
    }

    #[tokio::test]
    async fn second_connect_is_rejected_without_side_effects() {
        let mut h = harness(StubTransport::default(), false);
        h.controller.connect(request_with_video()).await.unwrap();
        drain(&mut h.events);

        let result = h.controller.connect(request_with_video()).await;
        assert!(result.is_err());
        assert_eq!(h.transport.connect_count(), 1);
        assert_eq!(h.controller.session().state(), SessionState::Open);
        assert!(drain(&mut h.events).is_empty());
    }

    #[tokio::test]
    async fn connect_failure_returns_to_idle_and_reports() {
        let mut h = harness(StubTransport::failing(), false);
        let result = h.controller.connect(request_with_video()).await;
        assert!(result.is_err());
        assert_eq!(h.controller.session().state(), SessionState::Idle);

        let events = drain(&mut h.events);
        assert_eq!(presences(&events), vec![Presence::Thinking, Presence::Hidden]);
        assert!(events
            .iter()
            .any(|e| matches!(e, AssistantEvent::ConnectionFailed { message } if message.contains("refused"))));

        // Idle again, so a retry is allowed.
        let retry = h.controller.connect(request_with_video()).await;
        assert!(retry.is_err());
        assert_eq!(h.transport.connect_count(), 2);
    }

    #[tokio::test]
    async fn scheduled_injection_runs_after_connect() {
        let h = harness(StubTransport::default(), false);
        h.controller.connect(request_with_video()).await.unwrap();

        tokio::time::sleep(Duration::from_millis(60)).await;
        let sent = h.transport.sent.lock().unwrap().clone();
        assert_eq!(sent.len(), 1);
        match &sent[0] {
            ClientEvent::SessionSettings { context } => {
                assert!(context.text.contains("VID-42"));
            }
            other => panic!("unexpected frame: {other:?}"),
        }
        assert!(h.controller.session().context_injected());
    }

    #[tokio::test]
    async fn inline_context_rides_the_connect_and_skips_the_schedule() {
        let h = harness(StubTransport::default(), true);
        h.controller.connect(request_with_video()).await.unwrap();

        let options = h.transport.connects.lock().unwrap()[0].clone();
        let note = options.inline_context.expect("inline context");
        assert!(note.contains("VID-42"));
        assert!(h.controller.session().context_injected());

        // No second delivery through the debounced path.
        tokio::time::sleep(Duration::from_millis(60)).await;
        assert!(h.transport.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn inline_mode_without_video_falls_back_to_nothing() {
        let h = harness(StubTransport::default(), true);
        let request = ConnectRequest {
            access_token: "tok-1".to_owned(),
            ..ConnectRequest::default()
        };
        h.controller.connect(request).await.unwrap();

        let options = h.transport.connects.lock().unwrap()[0].clone();
        assert!(options.inline_context.is_none());
        assert!(!h.controller.session().context_injected());
    }

    #[tokio::test]
    async fn disconnect_is_idempotent_and_resets_state() {
        let mut h = harness(StubTransport::default(), false);
        h.controller.connect(request_with_video()).await.unwrap();
        drain(&mut h.events);

        h.controller.disconnect().await.unwrap();
        assert_eq!(h.controller.session().state(), SessionState::Idle);
        assert!(!h.controller.session().context_injected());
        assert_eq!(*h.transport.disconnects.lock().unwrap(), 1);
        let events = drain(&mut h.events);
        assert_eq!(presences(&events), vec![Presence::Hidden, Presence::Hidden]);

        // Second disconnect does not touch the transport again.
        h.controller.disconnect().await.unwrap();
        assert_eq!(*h.transport.disconnects.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn remote_close_returns_the_session_to_idle() {
        let mut h = harness(StubTransport::default(), false);
        h.controller.connect(request_with_video()).await.unwrap();
        drain(&mut h.events);

        h.controller.handle_transport_closed("peer went away");
        assert_eq!(h.controller.session().state(), SessionState::Idle);
        let events = drain(&mut h.events);
        assert_eq!(presences(&events), vec![Presence::Hidden]);

        // Already idle, so a second report changes nothing.
        h.controller.handle_transport_closed("peer went away");
        assert!(drain(&mut h.events).is_empty());
    }
}
