//! SDP (Session Description Protocol) generation (RFC 4566).
//!
//! Produces the session description returned by DESCRIBE. The stream is
//! always a single MJPEG video track at RTP payload type 26 (RFC 2435),
//! delivered over unicast UDP to the client's negotiated ports:
//!
//! ```text
//! v=0                                          ← protocol version
//! o=- <sid> 1 IN IP4 <addr>                    ← origin: session id + server address
//! s=MJPEG Stream                               ← session name
//! i=MJPEG Stream                               ← session info
//! t=0 0                                        ← timing (live stream)
//! a=control:<url>                              ← aggregate control URL
//! a=mimetype:string;"video/x-motion-jpeg"      ← MIME type
//! m=video 0 RTP/AVP 26                         ← MJPEG media description
//! c=IN IP4 0.0.0.0                             ← client uses the RTSP address
//! b=AS:256                                     ← 256 kbps bandwidth hint
//! a=control:<url>                              ← track control URL
//! a=udp-only                                   ← no interleaved fallback
//! ```
//!
//! Lines are `CR LF` separated, trailing `CR LF` included. The DESCRIBE
//! response carries this body with `Content-Type: application/sdp` and
//! `Content-Base` set to the control URL.

/// The RTSP URL clients use to control the stream:
/// `rtsp://<server_address>/<rtsp_path>`.
///
/// A leading slash on the configured path is dropped so the join never
/// doubles it.
pub fn control_url(server_address: &str, rtsp_path: &str) -> String {
    format!(
        "rtsp://{}/{}",
        server_address,
        rtsp_path.trim_start_matches('/')
    )
}

/// Generate the SDP session description for a session.
pub fn session_description(session_id: u32, server_address: &str, control_url: &str) -> String {
    let lines = [
        "v=0".to_string(),
        format!("o=- {} 1 IN IP4 {}", session_id, server_address),
        "s=MJPEG Stream".to_string(),
        "i=MJPEG Stream".to_string(),
        "t=0 0".to_string(),
        format!("a=control:{}", control_url),
        "a=mimetype:string;\"video/x-motion-jpeg\"".to_string(),
        "m=video 0 RTP/AVP 26".to_string(),
        "c=IN IP4 0.0.0.0".to_string(),
        "b=AS:256".to_string(),
        format!("a=control:{}", control_url),
        "a=udp-only".to_string(),
    ];

    format!("{}\r\n", lines.join("\r\n"))
}
