//! Error types for the MJPEG RTSP library.

use std::fmt;

/// Errors that can occur across the library.
///
/// Variants map to specific failure modes:
///
/// - **Protocol**: [`Parse`](Self::Parse) — malformed RTSP messages,
///   answered with 400 Bad Request; [`UnsupportedTransport`](Self::UnsupportedTransport)
///   — interleaved TCP requested during SETUP, answered with 461.
/// - **Transport**: [`Io`](Self::Io) — socket/network failures. On the
///   control stream this is fatal to the session; on the media path it is
///   reported to the caller and the session is unaffected.
/// - **Session**: [`TransportNotConfigured`](Self::TransportNotConfigured)
///   — a media send before SETUP negotiated the client ports.
/// - **Server**: [`NotStarted`](Self::NotStarted),
///   [`AlreadyRunning`](Self::AlreadyRunning),
///   [`InvalidBindAddress`](Self::InvalidBindAddress).
/// - **Media**: [`InvalidJpeg`](Self::InvalidJpeg) — a frame the JPEG
///   scanner could not interpret.
#[derive(Debug, thiserror::Error)]
pub enum RtspError {
    /// Underlying I/O or socket error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse an RTSP request message (RFC 2326 §6).
    #[error("RTSP parse error: {kind}")]
    Parse { kind: ParseErrorKind },

    /// SETUP asked for `RTP/AVP/TCP` interleaved transport, which this
    /// server does not speak (RFC 2326 §12.39). Answered with 461.
    #[error("interleaved TCP transport is not supported")]
    UnsupportedTransport,

    /// SETUP has not completed for this session (no client ports negotiated).
    #[error("transport not configured for session {0}")]
    TransportNotConfigured(u32),

    /// [`Server::start`](crate::Server::start) has not been called yet.
    #[error("server not started")]
    NotStarted,

    /// [`Server::start`](crate::Server::start) was called while already running.
    #[error("server already running")]
    AlreadyRunning,

    /// The configured bind address could not be resolved.
    #[error("invalid bind address: {0}")]
    InvalidBindAddress(String),

    /// The supplied buffer is not a baseline JPEG this library can packetize.
    #[error("invalid JPEG data: {0}")]
    InvalidJpeg(&'static str),
}

/// Specific kind of RTSP parse failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// The receive buffer was not valid UTF-8.
    InvalidUtf8,
    /// Request line did not have the `METHOD SP PATH SP VERSION CR LF` shape.
    InvalidRequestLine,
    /// No `CSeq: ` header in the request.
    MissingCseq,
    /// A `CSeq: ` header was present but its value was not an integer.
    InvalidCseq,
    /// No `Transport: ` header in a SETUP request.
    MissingTransport,
    /// The `Transport: ` header had no parseable `client_port=N-M` pair.
    InvalidClientPorts,
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidUtf8 => write!(f, "request is not valid UTF-8"),
            Self::InvalidRequestLine => write!(f, "invalid request line"),
            Self::MissingCseq => write!(f, "missing CSeq header"),
            Self::InvalidCseq => write!(f, "invalid CSeq value"),
            Self::MissingTransport => write!(f, "missing Transport header"),
            Self::InvalidClientPorts => write!(f, "invalid client_port parameter"),
        }
    }
}

impl RtspError {
    pub(crate) fn parse(kind: ParseErrorKind) -> Self {
        RtspError::Parse { kind }
    }
}

/// Convenience alias for `Result<T, RtspError>`.
pub type Result<T> = std::result::Result<T, RtspError>;
