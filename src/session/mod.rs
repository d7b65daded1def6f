//! Voice session lifecycle: state, presence and the shared session value.
//!
//! One [`SharedSession`] is shared between the lifecycle controller, the
//! context injector and the assistant run loop. All mutations go through
//! its transition methods so the state machine invariants hold in one
//! place.

pub mod controller;

use std::sync::{Arc, Mutex, MutexGuard};

use serde::Serialize;

pub use controller::SessionController;

/// Connection state of the voice session.
///
/// Cyclic: Idle → Connecting → Open → Disconnecting → Idle. There is no
/// terminal state; a failed or closed connection returns to Idle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No connection and none in progress.
    Idle,
    /// A connect attempt is in flight.
    Connecting,
    /// The voice session is live.
    Open,
    /// A disconnect is in flight.
    Disconnecting,
}

/// Presence indicator shown to the user, derived from the session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Presence {
    /// No indicator (Idle, Disconnecting).
    Hidden,
    /// Connecting spinner.
    Thinking,
    /// Live and listening.
    Listening,
}

impl SessionState {
    /// Presence shown to the user for this state.
    pub fn presence(self) -> Presence {
        match self {
            Self::Idle | Self::Disconnecting => Presence::Hidden,
            Self::Connecting => Presence::Thinking,
            Self::Open => Presence::Listening,
        }
    }
}

/// The video the assistant should reason about.
///
/// Supplied by the embedding application per connection attempt and read
/// by the context injector; never mutated while the connection lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoContext {
    /// Identifier of the indexed video.
    pub video_no: String,
    /// Source URL of the video, when known.
    pub video_url: Option<String>,
}

/// State behind the shared mutex.
struct SessionShared {
    state: SessionState,
    context_injected: bool,
    video: Option<VideoContext>,
    chat_session_id: Option<String>,
}

/// Shared session state. Cheap to clone; all clones see the same session.
#[derive(Clone)]
pub struct SharedSession {
    inner: Arc<Mutex<SessionShared>>,
}

impl Default for SharedSession {
    fn default() -> Self {
        Self::new()
    }
}

impl SharedSession {
    /// A fresh session in the Idle state.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(SessionShared {
                state: SessionState::Idle,
                context_injected: false,
                video: None,
                chat_session_id: None,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SessionShared> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Current connection state.
    pub fn state(&self) -> SessionState {
        self.lock().state
    }

    /// Presence derived from the current state.
    pub fn presence(&self) -> Presence {
        self.lock().state.presence()
    }

    /// Whether context has been delivered for the current connection.
    pub fn context_injected(&self) -> bool {
        self.lock().context_injected
    }

    /// Video snapshot for the current connection attempt.
    pub fn video(&self) -> Option<VideoContext> {
        self.lock().video.clone()
    }

    /// Externally supplied query conversation id, if any.
    pub fn chat_session_id(&self) -> Option<String> {
        self.lock().chat_session_id.clone()
    }

    /// Idle → Connecting, storing the context snapshot for this attempt.
    ///
    /// Returns `false` without side effects when the session is not Idle,
    /// so a second connect can never race the first.
    pub(crate) fn begin_connect(
        &self,
        video: Option<VideoContext>,
        chat_session_id: Option<String>,
    ) -> bool {
        let mut shared = self.lock();
        if shared.state != SessionState::Idle {
            return false;
        }
        shared.state = SessionState::Connecting;
        shared.context_injected = false;
        shared.video = video;
        shared.chat_session_id = chat_session_id;
        true
    }

    /// Connecting → Open.
    ///
    /// `context_pre_satisfied` marks inline-at-connect context delivery, in
    /// which case the post-connect injection must not fire.
    pub(crate) fn mark_open(&self, context_pre_satisfied: bool) {
        let mut shared = self.lock();
        shared.state = SessionState::Open;
        shared.context_injected = context_pre_satisfied;
    }

    /// Connecting/Open → Disconnecting.
    ///
    /// Returns `false` when there is nothing to disconnect, making
    /// disconnect idempotent.
    pub(crate) fn begin_disconnect(&self) -> bool {
        let mut shared = self.lock();
        match shared.state {
            SessionState::Connecting | SessionState::Open => {
                shared.state = SessionState::Disconnecting;
                true
            }
            SessionState::Idle | SessionState::Disconnecting => false,
        }
    }

    /// Any state → Idle, clearing the per-connection context flag.
    pub(crate) fn mark_idle(&self) {
        let mut shared = self.lock();
        shared.state = SessionState::Idle;
        shared.context_injected = false;
    }

    /// Records that context was delivered, if still applicable.
    ///
    /// Compare-and-set: returns `true` only when the session is Open and
    /// context has not already been delivered for this connection.
    pub(crate) fn mark_context_injected(&self) -> bool {
        let mut shared = self.lock();
        if shared.state == SessionState::Open && !shared.context_injected {
            shared.context_injected = true;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn video() -> VideoContext {
        VideoContext {
            video_no: "VID-1".to_owned(),
            video_url: Some("https://videos.example/1.mp4".to_owned()),
        }
    }

    #[test]
    fn presence_follows_state() {
        assert_eq!(SessionState::Idle.presence(), Presence::Hidden);
        assert_eq!(SessionState::Connecting.presence(), Presence::Thinking);
        assert_eq!(SessionState::Open.presence(), Presence::Listening);
        assert_eq!(SessionState::Disconnecting.presence(), Presence::Hidden);
    }

    #[test]
    fn new_session_is_idle() {
        let session = SharedSession::new();
        assert_eq!(session.state(), SessionState::Idle);
        assert!(!session.context_injected());
        assert!(session.video().is_none());
    }

    #[test]
    fn begin_connect_only_from_idle() {
        let session = SharedSession::new();
        assert!(session.begin_connect(Some(video()), None));
        assert_eq!(session.state(), SessionState::Connecting);
        // Second connect while the first is in flight is rejected.
        assert!(!session.begin_connect(Some(video()), None));

        session.mark_open(false);
        assert!(!session.begin_connect(None, None));
    }

    #[test]
    fn begin_connect_stores_snapshot() {
        let session = SharedSession::new();
        session.begin_connect(Some(video()), Some("sess-4".to_owned()));
        assert_eq!(session.video(), Some(video()));
        assert_eq!(session.chat_session_id().as_deref(), Some("sess-4"));
    }

    #[test]
    fn inline_context_marks_open_pre_satisfied() {
        let session = SharedSession::new();
        session.begin_connect(Some(video()), None);
        session.mark_open(true);
        assert!(session.context_injected());
        // The post-connect path must not fire again.
        assert!(!session.mark_context_injected());
    }

    #[test]
    fn context_injection_is_once_per_connection() {
        let session = SharedSession::new();
        session.begin_connect(Some(video()), None);
        session.mark_open(false);
        assert!(session.mark_context_injected());
        assert!(!session.mark_context_injected());
    }

    #[test]
    fn context_injection_requires_open() {
        let session = SharedSession::new();
        assert!(!session.mark_context_injected());
        session.begin_connect(Some(video()), None);
        assert!(!session.mark_context_injected());
    }

    #[test]
    fn disconnect_is_idempotent() {
        let session = SharedSession::new();
        assert!(!session.begin_disconnect());

        session.begin_connect(Some(video()), None);
        session.mark_open(false);
        assert!(session.begin_disconnect());
        assert_eq!(session.state(), SessionState::Disconnecting);
        assert!(!session.begin_disconnect());

        session.mark_idle();
        assert!(!session.begin_disconnect());
    }

    #[test]
    fn mark_idle_clears_context_flag() {
        let session = SharedSession::new();
        session.begin_connect(Some(video()), None);
        session.mark_open(false);
        session.mark_context_injected();

        session.mark_idle();
        assert_eq!(session.state(), SessionState::Idle);
        assert!(!session.context_injected());

        // A fresh connection starts with the flag cleared.
        session.begin_connect(Some(video()), None);
        session.mark_open(false);
        assert!(session.mark_context_injected());
    }
}
