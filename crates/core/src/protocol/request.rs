use crate::error::{ParseErrorKind, Result, RtspError};

/// A parsed RTSP request line (RFC 2326 §6).
///
/// Requests arrive as text with `CR LF` line endings:
///
/// ```text
/// Method SP Request-URI SP RTSP-Version CRLF
/// *(Header: Value CRLF)
/// CRLF
/// ```
///
/// All fields borrow from the receive buffer — no allocation happens on
/// the request hot path. `body` is everything after the request line
/// (headers included); the header accessors below search it directly.
#[derive(Debug)]
pub struct Request<'a> {
    /// RTSP method (OPTIONS, DESCRIBE, SETUP, PLAY, PAUSE, TEARDOWN).
    pub method: &'a str,
    /// Request-URI (e.g. `rtsp://host:port/stream`). Not validated against
    /// the session's configured path.
    pub path: &'a str,
    /// Protocol version as sent by the client (expected: `RTSP/1.0`).
    pub version: &'a str,
    /// The rest of the request after the first `CR LF`.
    pub body: &'a str,
}

impl<'a> Request<'a> {
    /// Parse a request from a receive buffer.
    ///
    /// Locates the first two spaces and the first `CR` by forward search,
    /// matching the wire shape `METHOD SP PATH SP VERSION CR LF`. Any
    /// missing delimiter is an [`RtspError::Parse`], which the session
    /// answers with 400 Bad Request (no CSeq echo, since the request may
    /// not carry a usable one).
    pub fn parse(buf: &'a [u8]) -> Result<Self> {
        let text = std::str::from_utf8(buf)
            .map_err(|_| RtspError::parse(ParseErrorKind::InvalidUtf8))?;

        let first_space = text
            .find(' ')
            .ok_or(RtspError::parse(ParseErrorKind::InvalidRequestLine))?;
        let second_space = text[first_space + 1..]
            .find(' ')
            .map(|i| i + first_space + 1)
            .ok_or(RtspError::parse(ParseErrorKind::InvalidRequestLine))?;
        let end_of_line = text
            .find('\r')
            .ok_or(RtspError::parse(ParseErrorKind::InvalidRequestLine))?;
        if second_space > end_of_line {
            // The second "space" came from a header line, so the request
            // line itself is missing a field.
            return Err(RtspError::parse(ParseErrorKind::InvalidRequestLine));
        }

        Ok(Request {
            method: &text[..first_space],
            path: &text[first_space + 1..second_space],
            version: &text[second_space + 1..end_of_line],
            body: text.get(end_of_line + 2..).unwrap_or(""),
        })
    }

    /// Returns the CSeq value, which numbers request/response pairs
    /// (RFC 2326 §12.17). Every response must echo it.
    ///
    /// Header matching is case-sensitive (`CSeq: `), as in the wire
    /// traffic of every client this server targets.
    pub fn cseq(&self) -> Result<u32> {
        parse_cseq(self.body)
    }

    /// Returns the raw value of the `Transport: ` header, up to the line's
    /// `CR`. Present only in SETUP requests.
    pub fn transport_line(&self) -> Result<&'a str> {
        header_value(self.body, "Transport: ")
            .ok_or(RtspError::parse(ParseErrorKind::MissingTransport))
    }
}

/// Parse the CSeq header out of a request body.
///
/// Searches for the literal `CSeq: `, then reads up to the next `CR`.
pub fn parse_cseq(body: &str) -> Result<u32> {
    let value = header_value(body, "CSeq: ")
        .ok_or(RtspError::parse(ParseErrorKind::MissingCseq))?;
    value
        .parse()
        .map_err(|_| RtspError::parse(ParseErrorKind::InvalidCseq))
}

/// Forward search for `name` (which includes the `: ` separator) and
/// return the slice up to the terminating `CR`.
fn header_value<'a>(body: &'a str, name: &str) -> Option<&'a str> {
    let start = body.find(name)? + name.len();
    let rest = &body[start..];
    let end = rest.find('\r')?;
    Some(&rest[..end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ParseErrorKind;

    fn parse_err_kind(result: Result<Request<'_>>) -> ParseErrorKind {
        match result.unwrap_err() {
            RtspError::Parse { kind } => kind,
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn parse_options_request() {
        let raw = b"OPTIONS rtsp://localhost:8554/stream RTSP/1.0\r\nCSeq: 1\r\n\r\n";
        let req = Request::parse(raw).unwrap();
        assert_eq!(req.method, "OPTIONS");
        assert_eq!(req.path, "rtsp://localhost:8554/stream");
        assert_eq!(req.version, "RTSP/1.0");
        assert_eq!(req.cseq().unwrap(), 1);
    }

    #[test]
    fn parse_setup_with_transport() {
        let raw = b"SETUP rtsp://localhost:8554/stream RTSP/1.0\r\n\
                    CSeq: 3\r\n\
                    Transport: RTP/AVP;unicast;client_port=8000-8001\r\n\r\n";
        let req = Request::parse(raw).unwrap();
        assert_eq!(req.method, "SETUP");
        assert_eq!(req.cseq().unwrap(), 3);
        assert_eq!(
            req.transport_line().unwrap(),
            "RTP/AVP;unicast;client_port=8000-8001"
        );
    }

    #[test]
    fn parse_missing_cr_is_invalid() {
        let kind = parse_err_kind(Request::parse(b"OPTIONS rtsp://host/s RTSP/1.0"));
        assert_eq!(kind, ParseErrorKind::InvalidRequestLine);
    }

    #[test]
    fn parse_one_space_is_invalid() {
        // The second space found belongs to a header, past the request
        // line's CR.
        let kind = parse_err_kind(Request::parse(b"OPTIONS\r\nCSeq: 1\r\n\r\n"));
        assert_eq!(kind, ParseErrorKind::InvalidRequestLine);

        let kind = parse_err_kind(Request::parse(b"OPTIONS rtsp://host/s\r\nCSeq: 1\r\n\r\n"));
        assert_eq!(kind, ParseErrorKind::InvalidRequestLine);
    }

    #[test]
    fn parse_empty_request() {
        assert!(Request::parse(b"").is_err());
    }

    #[test]
    fn parse_non_utf8() {
        let kind = parse_err_kind(Request::parse(&[0xff, 0xfe, b' ', b' ', b'\r']));
        assert_eq!(kind, ParseErrorKind::InvalidUtf8);
    }

    #[test]
    fn cseq_absent() {
        let req = Request::parse(b"OPTIONS rtsp://host/s RTSP/1.0\r\nAccept: x\r\n\r\n").unwrap();
        match req.cseq().unwrap_err() {
            RtspError::Parse { kind } => assert_eq!(kind, ParseErrorKind::MissingCseq),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn cseq_not_a_number() {
        let req = Request::parse(b"OPTIONS rtsp://host/s RTSP/1.0\r\nCSeq: abc\r\n\r\n").unwrap();
        match req.cseq().unwrap_err() {
            RtspError::Parse { kind } => assert_eq!(kind, ParseErrorKind::InvalidCseq),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn cseq_is_case_sensitive() {
        let req = Request::parse(b"OPTIONS rtsp://host/s RTSP/1.0\r\ncseq: 7\r\n\r\n").unwrap();
        assert!(req.cseq().is_err());
    }

    #[test]
    fn transport_line_absent() {
        let req = Request::parse(b"SETUP rtsp://host/s RTSP/1.0\r\nCSeq: 3\r\n\r\n").unwrap();
        match req.transport_line().unwrap_err() {
            RtspError::Parse { kind } => assert_eq!(kind, ParseErrorKind::MissingTransport),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn body_borrows_from_buffer() {
        let raw = b"PLAY rtsp://host/s RTSP/1.0\r\nCSeq: 4\r\n\r\n";
        let req = Request::parse(raw).unwrap();
        assert_eq!(req.body, "CSeq: 4\r\n\r\n");
    }
}
