use super::jpeg::JpegFrame;
use super::rtp::RtpHeader;

/// Static RTP payload type for JPEG video (RFC 3551 table 5).
pub const MJPEG_PAYLOAD_TYPE: u8 = 26;

const RTP_HEADER_LEN: usize = 12;
const JPEG_HEADER_LEN: usize = 8;
const DEFAULT_MTU: usize = 1400;

/// MJPEG RTP packetizer — RFC 2435.
///
/// Each JPEG frame becomes one or more RTP packets at payload type 26.
/// Every payload starts with the 8-byte JPEG header:
///
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// | Type-specific |              Fragment Offset                  |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |      Type     |       Q       |     Width     |     Height    |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
///
/// The frame's quantization tables ride in-band (Q = 255) in a
/// quantization-table header on the first fragment, so receivers need no
/// out-of-band table agreement. Fragmentation is MTU-bounded with the
/// 24-bit fragment offset counting scan bytes; the RTP marker is set on
/// the last fragment of each frame.
///
/// Width and height are carried in 8-pixel units in one byte each, so
/// frames beyond 2040 pixels per side are not representable.
#[derive(Debug)]
pub struct MjpegPacketizer {
    header: RtpHeader,
    mtu: usize,
    packet_count: u32,
    octet_count: u32,
}

impl MjpegPacketizer {
    pub fn new(ssrc: u32) -> Self {
        Self {
            header: RtpHeader::new(MJPEG_PAYLOAD_TYPE, ssrc),
            mtu: DEFAULT_MTU,
            packet_count: 0,
            octet_count: 0,
        }
    }

    pub fn with_random_ssrc() -> Self {
        Self {
            header: RtpHeader::with_random_ssrc(MJPEG_PAYLOAD_TYPE),
            mtu: DEFAULT_MTU,
            packet_count: 0,
            octet_count: 0,
        }
    }

    /// Packetize one frame. Advances the RTP timestamp by
    /// `timestamp_increment` afterwards (`90000 / fps` at the 90 kHz
    /// video clock).
    pub fn packetize(&mut self, frame: &JpegFrame<'_>, timestamp_increment: u32) -> Vec<Vec<u8>> {
        let scan = frame.scan();
        let tables: Vec<u8> = frame.quant_tables().concat();
        let width = (frame.width() / 8).min(255) as u8;
        let height = (frame.height() / 8).min(255) as u8;
        // Q >= 128 signals in-band tables on the first fragment; without
        // tables fall back to a static-table Q value.
        let q = if tables.is_empty() { 99 } else { 255 };

        let mut packets = Vec::new();
        let mut offset = 0usize;
        while offset < scan.len() {
            let first = offset == 0;
            let qtable_len = if first && !tables.is_empty() {
                4 + tables.len()
            } else {
                0
            };
            let budget = self.mtu - RTP_HEADER_LEN - JPEG_HEADER_LEN - qtable_len;
            let chunk = budget.min(scan.len() - offset);
            let last = offset + chunk == scan.len();

            let mut packet =
                Vec::with_capacity(RTP_HEADER_LEN + JPEG_HEADER_LEN + qtable_len + chunk);
            packet.extend_from_slice(&self.header.write(last));
            packet.push(0); // type-specific
            packet.extend_from_slice(&(offset as u32).to_be_bytes()[1..4]);
            packet.push(1); // type: 4:2:0 chroma subsampling
            packet.push(q);
            packet.push(width);
            packet.push(height);
            if qtable_len > 0 {
                packet.push(0); // MBZ
                packet.push(0); // precision: all tables 8-bit
                packet.extend_from_slice(&(tables.len() as u16).to_be_bytes());
                packet.extend_from_slice(&tables);
            }
            packet.extend_from_slice(&scan[offset..offset + chunk]);

            self.packet_count = self.packet_count.wrapping_add(1);
            self.octet_count = self
                .octet_count
                .wrapping_add((packet.len() - RTP_HEADER_LEN) as u32);
            packets.push(packet);
            offset += chunk;
        }

        self.header.advance_timestamp(timestamp_increment);

        tracing::trace!(
            scan_len = scan.len(),
            packets = packets.len(),
            "packetized JPEG frame"
        );
        packets
    }

    pub fn ssrc(&self) -> u32 {
        self.header.ssrc()
    }

    /// Current RTP timestamp, for sender reports.
    pub fn rtp_timestamp(&self) -> u32 {
        self.header.timestamp()
    }

    /// Packets emitted since stream start (wrapping, RFC 3550 §6.4.1).
    pub fn packet_count(&self) -> u32 {
        self.packet_count
    }

    /// Payload octets emitted since stream start (wrapping).
    pub fn octet_count(&self) -> u32 {
        self.octet_count
    }
}
