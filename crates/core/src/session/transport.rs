use crate::error::{ParseErrorKind, Result, RtspError};

/// Client-side transport parameters negotiated during SETUP
/// (RFC 2326 §12.39).
///
/// ## Wire format example
///
/// ```text
/// Client → Server:
///   Transport: RTP/AVP;unicast;client_port=5000-5001
///
/// Server → Client:
///   Transport: RTP/AVP;unicast;client_port=5000-5001
/// ```
///
/// The server sends RTP to `client_ip:client_rtp_port` and RTCP to
/// `client_ip:client_rtcp_port`. Interleaved TCP (`RTP/AVP/TCP`) is
/// rejected with 461 Unsupported Transport; multicast is not offered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransportHeader {
    /// Client's RTP receive port.
    pub client_rtp_port: u16,
    /// Client's RTCP receive port (typically `client_rtp_port + 1`).
    pub client_rtcp_port: u16,
}

impl TransportHeader {
    /// Parse the `Transport` header value (RFC 2326 §12.39).
    ///
    /// Returns [`RtspError::UnsupportedTransport`] when the client asks
    /// for interleaved TCP, and a parse error when no usable
    /// `client_port=N-M` pair is present.
    ///
    /// ```
    /// use mjpeg_rtsp::session::transport::TransportHeader;
    ///
    /// let th = TransportHeader::parse("RTP/AVP;unicast;client_port=8000-8001").unwrap();
    /// assert_eq!(th.client_rtp_port, 8000);
    /// assert_eq!(th.client_rtcp_port, 8001);
    ///
    /// assert!(TransportHeader::parse("RTP/AVP;unicast").is_err());
    /// ```
    pub fn parse(header: &str) -> Result<Self> {
        if header.contains("RTP/AVP/TCP") {
            return Err(RtspError::UnsupportedTransport);
        }

        for part in header.split(';') {
            if let Some(ports) = part.trim().strip_prefix("client_port=") {
                let (rtp, rtcp) = ports
                    .split_once('-')
                    .ok_or(RtspError::parse(ParseErrorKind::InvalidClientPorts))?;
                let rtp = rtp
                    .parse()
                    .map_err(|_| RtspError::parse(ParseErrorKind::InvalidClientPorts))?;
                let rtcp = rtcp
                    .parse()
                    .map_err(|_| RtspError::parse(ParseErrorKind::InvalidClientPorts))?;
                return Ok(TransportHeader {
                    client_rtp_port: rtp,
                    client_rtcp_port: rtcp,
                });
            }
        }
        Err(RtspError::parse(ParseErrorKind::InvalidClientPorts))
    }

    /// Format the `Transport` response header value, echoing the
    /// negotiated client ports.
    pub fn response_value(&self) -> String {
        format!(
            "RTP/AVP;unicast;client_port={}-{}",
            self.client_rtp_port, self.client_rtcp_port
        )
    }
}
