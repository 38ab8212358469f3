/// RTSP session lifecycle state (RFC 2326 §A.1).
///
/// ```text
/// Init ──SETUP──▶ Ready ──PLAY──▶ Playing ──PAUSE──▶ Paused
///                   ▲                                  │
///                   └────────────── PLAY ◀─────────────┘
/// any ──TEARDOWN / disconnect──▶ Closed (terminal)
/// ```
///
/// The transition methods are total: a method that does not apply in the
/// current state leaves the state unchanged. The session still answers
/// such requests with 200 (matching the permissive behaviour of common
/// embedded RTSP servers), but `Playing` is only reachable through a
/// completed SETUP, so media producers gating on
/// [`is_active`](Self::is_active) never observe a session with
/// unnegotiated ports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Created, transport not yet negotiated.
    Init,
    /// SETUP completed; client ports are known.
    Ready,
    /// Media is being delivered.
    Playing,
    /// Delivery suspended; PLAY resumes.
    Paused,
    /// TEARDOWN processed or peer disconnected. Terminal.
    Closed,
}

impl SessionState {
    /// SETUP: record transport and become Ready. Only meaningful before
    /// playback starts; a repeated SETUP while Ready re-negotiates ports.
    pub fn on_setup(self) -> SessionState {
        match self {
            SessionState::Init | SessionState::Ready => SessionState::Ready,
            other => other,
        }
    }

    /// PLAY: start or resume delivery.
    pub fn on_play(self) -> SessionState {
        match self {
            SessionState::Ready | SessionState::Paused => SessionState::Playing,
            other => other,
        }
    }

    /// PAUSE: suspend delivery.
    pub fn on_pause(self) -> SessionState {
        match self {
            SessionState::Playing => SessionState::Paused,
            other => other,
        }
    }

    /// TEARDOWN or disconnect: terminal from every state.
    pub fn on_teardown(self) -> SessionState {
        SessionState::Closed
    }

    /// Whether media should be flowing to the client.
    pub fn is_active(self) -> bool {
        self == SessionState::Playing
    }

    /// Whether the session has reached its terminal state.
    pub fn is_closed(self) -> bool {
        self == SessionState::Closed
    }
}
