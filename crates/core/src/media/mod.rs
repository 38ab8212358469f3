//! Media plane: RTP/RTCP packet construction for MJPEG.
//!
//! The session treats media as opaque byte slices; everything
//! payload-aware lives here.
//!
//! - [`rtp`] — RFC 3550 fixed-header builder (sequence, timestamp, SSRC).
//! - [`jpeg`] — minimal baseline-JPEG scanner: dimensions, quantization
//!   tables, entropy-coded scan.
//! - [`mjpeg`] — RFC 2435 packetizer producing payload-type-26 RTP
//!   packets from a [`jpeg::JpegFrame`].
//! - [`rtcp`] — RFC 3550 §6.4.1 sender reports for the RTCP channel.

pub mod jpeg;
pub mod mjpeg;
pub mod rtcp;
pub mod rtp;

pub use jpeg::JpegFrame;
pub use mjpeg::MjpegPacketizer;
pub use rtcp::SenderReport;
pub use rtp::RtpHeader;
