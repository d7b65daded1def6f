//! Debounced delivery of video context into a freshly opened session.
//!
//! The note tells the model which video is loaded in the editor so it can
//! answer questions about it without being told the identifier. Delivery
//! is debounced so a session that opens and immediately drops never sends,
//! and re-checked after the delay so only a still-open, not-yet-served
//! session receives it.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::session::{SessionState, SharedSession, VideoContext};
use crate::transport::wire::{ClientEvent, SessionContext};
use crate::transport::VoiceTransport;

/// Schedules one context injection per connection.
pub struct ContextInjector {
    session: SharedSession,
    transport: Arc<dyn VoiceTransport>,
    delay: Duration,
    pending: Mutex<Option<CancellationToken>>,
}

impl ContextInjector {
    pub fn new(
        session: SharedSession,
        transport: Arc<dyn VoiceTransport>,
        delay: Duration,
    ) -> Self {
        Self {
            session,
            transport,
            delay,
            pending: Mutex::new(None),
        }
    }

    fn lock_pending(&self) -> MutexGuard<'_, Option<CancellationToken>> {
        match self.pending.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Schedules injection after the debounce delay, replacing any pending
    /// schedule. Does nothing when there is no video to describe or the
    /// current connection has already been served.
    pub fn schedule(&self) {
        let Some(video) = self.session.video() else {
            return;
        };
        if video.video_no.trim().is_empty() || self.session.context_injected() {
            return;
        }

        let token = CancellationToken::new();
        if let Some(previous) = self.lock_pending().replace(token.clone()) {
            previous.cancel();
        }

        let session = self.session.clone();
        let transport = Arc::clone(&self.transport);
        let delay = self.delay;
        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {}
                _ = tokio::time::sleep(delay) => {
                    inject(&session, transport.as_ref()).await;
                }
            }
        });
    }

    /// Cancels any pending injection.
    pub fn cancel(&self) {
        if let Some(token) = self.lock_pending().take() {
            token.cancel();
        }
    }
}

/// Re-checks the trigger and delivers the note.
///
/// The session may have closed or been served during the debounce window,
/// so every condition is checked again here.
async fn inject(session: &SharedSession, transport: &dyn VoiceTransport) {
    if session.state() != SessionState::Open || session.context_injected() {
        return;
    }
    let Some(video) = session.video() else {
        return;
    };
    if video.video_no.trim().is_empty() {
        return;
    }

    let note = compose_context_note(&video, session.chat_session_id().as_deref());
    let frame = ClientEvent::SessionSettings {
        context: SessionContext::persistent(note.clone()),
    };
    match transport.send(frame).await {
        Ok(()) => {
            if session.mark_context_injected() {
                tracing::info!(video_no = %video.video_no, "session context delivered");
            }
        }
        Err(e) => {
            tracing::warn!("session settings rejected, falling back to user input: {e}");
            match transport.send(ClientEvent::UserInput { text: note }).await {
                Ok(()) => {
                    if session.mark_context_injected() {
                        tracing::info!(
                            video_no = %video.video_no,
                            "session context delivered as user input"
                        );
                    }
                }
                Err(e) => tracing::warn!("context injection failed: {e}"),
            }
        }
    }
}

/// Builds the context note describing the loaded video.
///
/// Extracted as a separate function for testability.
pub(crate) fn compose_context_note(
    video: &VideoContext,
    chat_session_id: Option<&str>,
) -> String {
    let mut note = format!(
        "The user is working with a video in the editor. Video number: {}.",
        video.video_no
    );
    if let Some(url) = video.video_url.as_deref().filter(|u| !u.trim().is_empty()) {
        note.push_str(&format!(" Video URL: {url}."));
    }
    note.push_str(
        " When the user asks about this video's content, call the query_video tool \
         with this video number.",
    );
    if let Some(session) = chat_session_id.filter(|s| !s.trim().is_empty()) {
        note.push_str(&format!(" Reuse query session {session} for follow-up questions."));
    }
    note
}
