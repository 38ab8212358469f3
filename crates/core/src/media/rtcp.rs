/// RTCP packet type for sender reports (RFC 3550 §12.1).
pub const PT_SENDER_REPORT: u8 = 200;

/// An RTCP sender report with no reception report blocks
/// (RFC 3550 §6.4.1).
///
/// ```text
/// |V=2|P|   RC=0  |    PT=200     |           length=6            |
/// |                         SSRC of sender                        |
/// |              NTP timestamp, most significant word             |
/// |              NTP timestamp, least significant word            |
/// |                         RTP timestamp                         |
/// |                     sender's packet count                     |
/// |                      sender's octet count                     |
/// ```
///
/// The server emits one periodically on the RTCP channel so receivers can
/// map RTP timestamps to wall-clock time and track loss. This server only
/// sends; reception reports from clients are not read.
#[derive(Debug, Clone, Copy)]
pub struct SenderReport {
    pub ssrc: u32,
    /// Seconds since 1900-01-01 (NTP era 0).
    pub ntp_seconds: u32,
    /// Fractional second in 1/2^32 units.
    pub ntp_fraction: u32,
    /// Media clock value corresponding to the NTP timestamp.
    pub rtp_timestamp: u32,
    pub packet_count: u32,
    pub octet_count: u32,
}

impl SenderReport {
    /// Serialize to the 28-byte wire form.
    pub fn serialize(&self) -> [u8; 28] {
        let mut buf = [0u8; 28];
        buf[0] = 2 << 6; // V=2, P=0, RC=0
        buf[1] = PT_SENDER_REPORT;
        // Length in 32-bit words minus one.
        buf[2..4].copy_from_slice(&6u16.to_be_bytes());
        buf[4..8].copy_from_slice(&self.ssrc.to_be_bytes());
        buf[8..12].copy_from_slice(&self.ntp_seconds.to_be_bytes());
        buf[12..16].copy_from_slice(&self.ntp_fraction.to_be_bytes());
        buf[16..20].copy_from_slice(&self.rtp_timestamp.to_be_bytes());
        buf[20..24].copy_from_slice(&self.packet_count.to_be_bytes());
        buf[24..28].copy_from_slice(&self.octet_count.to_be_bytes());
        buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_layout() {
        let sr = SenderReport {
            ssrc: 0xAABBCCDD,
            ntp_seconds: 0x0102_0304,
            ntp_fraction: 0x0506_0708,
            rtp_timestamp: 90_000,
            packet_count: 42,
            octet_count: 65_000,
        };
        let buf = sr.serialize();
        assert_eq!(buf[0] >> 6, 2);
        assert_eq!(buf[0] & 0x1f, 0);
        assert_eq!(buf[1], PT_SENDER_REPORT);
        assert_eq!(u16::from_be_bytes([buf[2], buf[3]]), 6);
        assert_eq!(u32::from_be_bytes([buf[4], buf[5], buf[6], buf[7]]), 0xAABBCCDD);
        assert_eq!(u32::from_be_bytes([buf[16], buf[17], buf[18], buf[19]]), 90_000);
        assert_eq!(u32::from_be_bytes([buf[20], buf[21], buf[22], buf[23]]), 42);
        assert_eq!(u32::from_be_bytes([buf[24], buf[25], buf[26], buf[27]]), 65_000);
    }
}
