//! # mjpeg-rtsp — MJPEG streaming over RTSP
//!
//! A Rust library for serving live Motion-JPEG video over the Real-Time
//! Streaming Protocol, with RTP/RTCP delivery over UDP.
//!
//! ## Protocol references
//!
//! | RFC | Topic | How this crate uses it |
//! |-----|-------|----------------------|
//! | [RFC 2326](https://tools.ietf.org/html/rfc2326) | RTSP 1.0 | Request/response parsing, session lifecycle, transport negotiation |
//! | [RFC 3550](https://tools.ietf.org/html/rfc3550) | RTP/RTCP | Packet header format, SSRC generation, sender reports |
//! | [RFC 4566](https://tools.ietf.org/html/rfc4566) | SDP | Session description generation for DESCRIBE responses |
//! | [RFC 2435](https://tools.ietf.org/html/rfc2435) | JPEG RTP payload | Payload type 26, fragment headers, in-band quantization tables |
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────┐
//! │  Server    — accept loop, frame fan-out  │
//! ├──────────────────────────────────────────┤
//! │  Session   — per-client state machine,   │
//! │              control reader thread       │
//! ├──────────────────────────────────────────┤
//! │  Protocol  — RTSP parsing, SDP           │
//! │  Media     — JPEG scan, RTP/RTCP packets │
//! ├──────────────────────────────────────────┤
//! │  Transport — TCP signaling, UDP data     │
//! └──────────────────────────────────────────┘
//! ```
//!
//! Each accepted control connection becomes a [`Session`] with a dedicated
//! reader thread driving OPTIONS → DESCRIBE → SETUP → PLAY/PAUSE →
//! TEARDOWN. While a session is in the Playing state, frame producers
//! deliver RTP packets to the client's negotiated UDP ports — either
//! through [`Server::send_frame`], which packetizes and fans out, or
//! directly via [`Session::send_rtp`] / [`Session::send_rtcp`].
//!
//! ## Quick start
//!
//! ```no_run
//! use mjpeg_rtsp::{Server, ServerConfig};
//! use mjpeg_rtsp::media::JpegFrame;
//!
//! let mut server = Server::new(ServerConfig {
//!     server_address: "192.168.1.10".to_string(),
//!     port: 8554,
//!     path: "mjpeg/1".to_string(),
//! });
//! server.start().unwrap();
//!
//! let data = std::fs::read("frame.jpg").unwrap();
//! let frame = JpegFrame::parse(&data).unwrap();
//! server.send_frame(&frame, 9000).unwrap();
//! ```
//!
//! ## Crate layout
//!
//! - [`server`] — [`Server`] orchestrator: accept loop and frame fan-out.
//! - [`session`] — [`Session`]: control reader, state machine, media sends.
//! - [`protocol`] — RTSP request/response parsing and SDP generation.
//! - [`media`] — JPEG scanning, RFC 2435 packetization, RTCP reports.
//! - [`transport`] — TCP accept loop, UDP endpoints.
//! - [`error`] — [`RtspError`] enum and [`Result`] alias.

pub mod error;
pub mod media;
pub mod protocol;
pub mod server;
pub mod session;
pub mod transport;

pub use error::{Result, RtspError};
pub use server::{Server, ServerConfig};
pub use session::{Session, SessionConfig, SessionState};
