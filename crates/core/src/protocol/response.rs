/// An RTSP response (RFC 2326 §7).
///
/// Serializes to the standard text format:
///
/// ```text
/// RTSP/1.0 200 OK\r\n
/// CSeq: 1\r\n
/// Content-Type: application/sdp\r\n
/// Content-Length: 142\r\n
/// \r\n
/// v=0\r\n...
/// ```
///
/// Uses a builder pattern — chain [`with_cseq`](Self::with_cseq),
/// [`header`](Self::header) and [`with_body`](Self::with_body), then call
/// [`serialize`](Self::serialize). The CSeq line, when present, is always
/// emitted directly after the status line; `Content-Length` is computed
/// automatically when a body is present, and a response without a body is
/// terminated by a lone blank line.
#[must_use]
pub struct Response {
    pub status_code: u16,
    pub status_text: String,
    cseq: Option<u32>,
    headers: Vec<(String, String)>,
    body: Option<String>,
}

impl Response {
    pub fn new(status_code: u16, status_text: &str) -> Self {
        Response {
            status_code,
            status_text: status_text.to_string(),
            cseq: None,
            headers: Vec::new(),
            body: None,
        }
    }

    /// 200 OK — success (RFC 2326 §7.1.1).
    pub fn ok() -> Self {
        Self::new(200, "OK")
    }

    /// 400 Bad Request — malformed request line or headers.
    pub fn bad_request() -> Self {
        Self::new(400, "Bad Request")
    }

    /// 461 Unsupported Transport — SETUP asked for interleaved TCP.
    pub fn unsupported_transport() -> Self {
        Self::new(461, "Unsupported Transport")
    }

    /// Echo the request's CSeq (RFC 2326 §12.17).
    pub fn with_cseq(mut self, cseq: u32) -> Self {
        self.cseq = Some(cseq);
        self
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn with_body(mut self, body: String) -> Self {
        self.body = Some(body);
        self
    }

    /// Serialize to the RTSP text wire format.
    ///
    /// If a body is present, `Content-Length` is appended after the other
    /// headers (RFC 2326 §12.14), followed by the blank-line separator and
    /// the body.
    pub fn serialize(&self) -> String {
        let mut response = format!("RTSP/1.0 {} {}\r\n", self.status_code, self.status_text);

        if let Some(cseq) = self.cseq {
            response.push_str(&format!("CSeq: {}\r\n", cseq));
        }
        for (name, value) in &self.headers {
            response.push_str(&format!("{}: {}\r\n", name, value));
        }

        if let Some(body) = &self.body {
            response.push_str(&format!("Content-Length: {}\r\n", body.len()));
            response.push_str("\r\n");
            response.push_str(body);
        } else {
            response.push_str("\r\n");
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialize_options_response() {
        let resp = Response::ok()
            .with_cseq(1)
            .header("Public", "DESCRIBE, SETUP, TEARDOWN, PLAY, PAUSE");
        assert_eq!(
            resp.serialize(),
            "RTSP/1.0 200 OK\r\nCSeq: 1\r\nPublic: DESCRIBE, SETUP, TEARDOWN, PLAY, PAUSE\r\n\r\n"
        );
    }

    #[test]
    fn serialize_with_body() {
        let resp = Response::ok().with_cseq(2).with_body("v=0\r\n".to_string());
        let s = resp.serialize();
        assert!(s.starts_with("RTSP/1.0 200 OK\r\nCSeq: 2\r\n"));
        assert!(s.contains("Content-Length: 5\r\n\r\n"));
        assert!(s.ends_with("v=0\r\n"));
    }

    #[test]
    fn serialize_without_cseq() {
        // Unparseable requests are answered without a CSeq echo.
        assert_eq!(
            Response::bad_request().serialize(),
            "RTSP/1.0 400 Bad Request\r\n\r\n"
        );
        assert_eq!(
            Response::unsupported_transport().serialize(),
            "RTSP/1.0 461 Unsupported Transport\r\n\r\n"
        );
    }

    #[test]
    fn cseq_precedes_other_headers() {
        let s = Response::ok().header("Session", "42").with_cseq(9).serialize();
        let cseq_idx = s.find("CSeq:").unwrap();
        let session_idx = s.find("Session:").unwrap();
        assert!(cseq_idx < session_idx);
    }
}
