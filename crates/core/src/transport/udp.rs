use std::net::{SocketAddr, UdpSocket};

use crate::error::Result;

/// Outbound datagram endpoint for one media channel.
///
/// Each session owns two of these, bound to ephemeral local ports — one
/// for RTP payloads, one for RTCP reports. The endpoint is address-only:
/// it knows nothing about sessions or packet contents, and the caller
/// resolves the client's negotiated port before each send.
pub struct UdpTransport {
    socket: UdpSocket,
}

impl UdpTransport {
    /// Bind an ephemeral local UDP socket.
    pub fn bind() -> Result<Self> {
        let socket = UdpSocket::bind("0.0.0.0:0")?;
        Ok(Self { socket })
    }

    /// Send one datagram to the given address. Returns the byte count on
    /// success; a failure is local to this packet.
    pub fn send_to(&self, payload: &[u8], addr: SocketAddr) -> Result<usize> {
        Ok(self.socket.send_to(payload, addr)?)
    }

    /// The ephemeral local address this endpoint is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.socket.local_addr()?)
    }
}
