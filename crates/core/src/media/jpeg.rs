use crate::error::{Result, RtspError};

/// A parsed baseline JPEG frame, borrowed from the encoder's buffer.
///
/// The RFC 2435 payload carries the entropy-coded scan without the JFIF
/// envelope; the receiver reconstructs the headers from the RTP payload
/// header and the in-band quantization tables. This scanner pulls the
/// three pieces the packetizer needs out of a JFIF byte stream:
///
/// - frame dimensions from the `SOF0` segment,
/// - 8-bit quantization tables from `DQT` segments,
/// - the scan data between `SOS` and `EOI`.
///
/// Only sequential baseline JPEG is handled — progressive frames
/// (`SOF2`) and 16-bit quantization tables are rejected.
#[derive(Debug)]
pub struct JpegFrame<'a> {
    width: u16,
    height: u16,
    quant_tables: Vec<&'a [u8]>,
    scan: &'a [u8],
}

const MARKER_SOF0: u8 = 0xc0;
const MARKER_SOF2: u8 = 0xc2;
const MARKER_DQT: u8 = 0xdb;
const MARKER_SOI: u8 = 0xd8;
const MARKER_EOI: u8 = 0xd9;
const MARKER_SOS: u8 = 0xda;

impl<'a> JpegFrame<'a> {
    /// Scan a JFIF byte stream.
    pub fn parse(data: &'a [u8]) -> Result<Self> {
        if data.len() < 4 || data[0] != 0xff || data[1] != MARKER_SOI {
            return Err(RtspError::InvalidJpeg("missing SOI marker"));
        }

        let mut width = 0u16;
        let mut height = 0u16;
        let mut quant_tables = Vec::new();
        let mut scan: &[u8] = &[];

        let mut pos = 2;
        while pos + 1 < data.len() {
            if data[pos] != 0xff {
                return Err(RtspError::InvalidJpeg("expected marker"));
            }
            let marker = data[pos + 1];
            pos += 2;

            match marker {
                // Standalone markers carry no length field.
                0xd0..=0xd7 | 0x01 => continue,
                MARKER_EOI => break,
                MARKER_SOF2 => {
                    return Err(RtspError::InvalidJpeg("progressive JPEG not supported"));
                }
                _ => {}
            }

            let segment = segment_body(data, pos)?;
            pos += 2 + segment.len();

            match marker {
                MARKER_SOF0 => {
                    if segment.len() < 5 {
                        return Err(RtspError::InvalidJpeg("truncated SOF0 segment"));
                    }
                    height = u16::from_be_bytes([segment[1], segment[2]]);
                    width = u16::from_be_bytes([segment[3], segment[4]]);
                }
                MARKER_DQT => {
                    let mut offset = 0;
                    while offset < segment.len() {
                        if segment[offset] >> 4 != 0 {
                            return Err(RtspError::InvalidJpeg(
                                "16-bit quantization tables not supported",
                            ));
                        }
                        let table = segment
                            .get(offset + 1..offset + 65)
                            .ok_or(RtspError::InvalidJpeg("truncated quantization table"))?;
                        quant_tables.push(table);
                        offset += 65;
                    }
                }
                MARKER_SOS => {
                    // Scan data runs from here to the closing EOI.
                    let rest = &data[pos..];
                    let end = find_eoi(rest).unwrap_or(rest.len());
                    scan = &rest[..end];
                    break;
                }
                _ => {}
            }
        }

        if width == 0 || height == 0 {
            return Err(RtspError::InvalidJpeg("missing SOF0 segment"));
        }
        if scan.is_empty() {
            return Err(RtspError::InvalidJpeg("missing scan data"));
        }

        Ok(JpegFrame {
            width,
            height,
            quant_tables,
            scan,
        })
    }

    /// Frame width in pixels.
    pub fn width(&self) -> u16 {
        self.width
    }

    /// Frame height in pixels.
    pub fn height(&self) -> u16 {
        self.height
    }

    /// The 64-byte quantization tables, in order of appearance.
    pub fn quant_tables(&self) -> &[&'a [u8]] {
        &self.quant_tables
    }

    /// Entropy-coded scan data (everything between SOS and EOI).
    pub fn scan(&self) -> &'a [u8] {
        self.scan
    }
}

/// Body of a length-prefixed segment starting at `pos`. The length field
/// counts its own two bytes.
fn segment_body(data: &[u8], pos: usize) -> Result<&[u8]> {
    let len = data
        .get(pos..pos + 2)
        .map(|b| u16::from_be_bytes([b[0], b[1]]) as usize)
        .ok_or(RtspError::InvalidJpeg("truncated segment length"))?;
    if len < 2 {
        return Err(RtspError::InvalidJpeg("invalid segment length"));
    }
    data.get(pos + 2..pos + len)
        .ok_or(RtspError::InvalidJpeg("truncated segment"))
}

/// Offset of the trailing EOI marker, searched from the end — the scan's
/// entropy-coded bytes escape `0xff` as `0xff 0x00`, so a forward search
/// could stop early only on corrupt input, while the real EOI is last.
fn find_eoi(scan: &[u8]) -> Option<usize> {
    (0..scan.len().saturating_sub(1))
        .rev()
        .find(|&i| scan[i] == 0xff && scan[i + 1] == MARKER_EOI)
}

#[cfg(test)]
pub(crate) fn synthetic_jpeg(width: u16, height: u16, scan: &[u8]) -> Vec<u8> {
    let mut data = vec![0xff, MARKER_SOI];
    // DQT: one 8-bit luma table.
    data.extend_from_slice(&[0xff, MARKER_DQT, 0x00, 0x43, 0x00]);
    data.extend_from_slice(&[16u8; 64]);
    // SOF0: 8-bit precision, three components.
    data.extend_from_slice(&[0xff, MARKER_SOF0, 0x00, 0x11, 0x08]);
    data.extend_from_slice(&height.to_be_bytes());
    data.extend_from_slice(&width.to_be_bytes());
    data.extend_from_slice(&[0x03, 0x01, 0x22, 0x00, 0x02, 0x11, 0x01, 0x03, 0x11, 0x01]);
    // SOS followed by the scan and EOI.
    data.extend_from_slice(&[
        0xff, MARKER_SOS, 0x00, 0x0c, 0x03, 0x01, 0x00, 0x02, 0x11, 0x03, 0x11, 0x00, 0x3f, 0x00,
    ]);
    data.extend_from_slice(scan);
    data.extend_from_slice(&[0xff, MARKER_EOI]);
    data
}
