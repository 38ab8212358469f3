//! Network transport layer.
//!
//! RTSP uses a split transport model:
//!
//! - **TCP** ([`tcp`]): carries RTSP request/response signaling. Each
//!   accepted connection becomes a [`Session`](crate::Session) with its
//!   own reader thread.
//!
//! - **UDP** ([`udp`]): carries RTP media and RTCP reports. Every session
//!   owns two ephemeral endpoints, one per channel.
//!
//! Interleaved TCP transport (RFC 2326 §10.12) is deliberately absent;
//! SETUP requests asking for it are answered 461.

pub mod tcp;
pub mod udp;

pub use udp::UdpTransport;
