//! End-to-end tests: a real TCP client drives a session through the full
//! RTSP lifecycle OPTIONS → DESCRIBE → SETUP → PLAY/PAUSE → TEARDOWN,
//! asserting on the literal wire text, and UDP sockets verify media
//! delivery to the negotiated ports.

use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream, UdpSocket};
use std::time::{Duration, Instant};

use mjpeg_rtsp::session::{Session, SessionConfig};
use mjpeg_rtsp::{RtspError, Server, ServerConfig};

/// Accept one loopback connection and wrap it in a session.
fn connect() -> (Session, TcpStream) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind listener");
    let addr = listener.local_addr().unwrap();
    let client = TcpStream::connect(addr).expect("connect");
    client
        .set_read_timeout(Some(Duration::from_secs(2)))
        .unwrap();
    let (stream, _) = listener.accept().expect("accept");
    let session = Session::new(
        stream,
        SessionConfig {
            server_address: "127.0.0.1".to_string(),
            rtsp_path: "stream".to_string(),
        },
    )
    .expect("session");
    (session, client)
}

/// Read one response: headers up to the blank line, then the body if a
/// Content-Length is present.
fn read_response(stream: &mut TcpStream) -> String {
    let mut reader = BufReader::new(stream);
    let mut response = String::new();
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line).expect("read response") == 0 {
            break;
        }
        response.push_str(&line);
        if line == "\r\n" {
            break;
        }
    }

    if let Some(len) = response
        .lines()
        .find(|l| l.starts_with("Content-Length:"))
        .and_then(|l| l.split(':').nth(1))
        .and_then(|v| v.trim().parse::<usize>().ok())
    {
        if len > 0 {
            let mut body = vec![0u8; len];
            reader.read_exact(&mut body).expect("read body");
            response.push_str(&String::from_utf8_lossy(&body));
        }
    }
    response
}

fn rtsp_request(stream: &mut TcpStream, request: &str) -> String {
    stream.write_all(request.as_bytes()).expect("write request");
    read_response(stream)
}

fn wait_until(timeout: Duration, cond: impl Fn() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    cond()
}

/// Minimal baseline JPEG: SOI, one DQT, SOF0, SOS, scan, EOI.
fn synthetic_jpeg(width: u16, height: u16, scan: &[u8]) -> Vec<u8> {
    let mut data = vec![0xff, 0xd8];
    data.extend_from_slice(&[0xff, 0xdb, 0x00, 0x43, 0x00]);
    data.extend_from_slice(&[16u8; 64]);
    data.extend_from_slice(&[0xff, 0xc0, 0x00, 0x11, 0x08]);
    data.extend_from_slice(&height.to_be_bytes());
    data.extend_from_slice(&width.to_be_bytes());
    data.extend_from_slice(&[0x03, 0x01, 0x22, 0x00, 0x02, 0x11, 0x01, 0x03, 0x11, 0x01]);
    data.extend_from_slice(&[
        0xff, 0xda, 0x00, 0x0c, 0x03, 0x01, 0x00, 0x02, 0x11, 0x03, 0x11, 0x00, 0x3f, 0x00,
    ]);
    data.extend_from_slice(scan);
    data.extend_from_slice(&[0xff, 0xd9]);
    data
}

#[test]
fn options_echoes_cseq_and_is_idempotent() {
    let (_session, mut client) = connect();

    let resp = rtsp_request(
        &mut client,
        "OPTIONS rtsp://127.0.0.1/stream RTSP/1.0\r\nCSeq: 1\r\n\r\n",
    );
    assert_eq!(
        resp,
        "RTSP/1.0 200 OK\r\nCSeq: 1\r\nPublic: DESCRIBE, SETUP, TEARDOWN, PLAY, PAUSE\r\n\r\n"
    );

    let resp = rtsp_request(
        &mut client,
        "OPTIONS rtsp://127.0.0.1/stream RTSP/1.0\r\nCSeq: 2\r\n\r\n",
    );
    assert_eq!(
        resp,
        "RTSP/1.0 200 OK\r\nCSeq: 2\r\nPublic: DESCRIBE, SETUP, TEARDOWN, PLAY, PAUSE\r\n\r\n"
    );
}

#[test]
fn describe_returns_exact_sdp() {
    let (session, mut client) = connect();

    let expected_sdp = format!(
        "v=0\r\n\
         o=- {sid} 1 IN IP4 127.0.0.1\r\n\
         s=MJPEG Stream\r\n\
         i=MJPEG Stream\r\n\
         t=0 0\r\n\
         a=control:rtsp://127.0.0.1/stream\r\n\
         a=mimetype:string;\"video/x-motion-jpeg\"\r\n\
         m=video 0 RTP/AVP 26\r\n\
         c=IN IP4 0.0.0.0\r\n\
         b=AS:256\r\n\
         a=control:rtsp://127.0.0.1/stream\r\n\
         a=udp-only\r\n",
        sid = session.session_id()
    );

    let resp = rtsp_request(
        &mut client,
        "DESCRIBE rtsp://127.0.0.1/stream RTSP/1.0\r\nCSeq: 2\r\n\r\n",
    );
    assert_eq!(
        resp,
        format!(
            "RTSP/1.0 200 OK\r\n\
             CSeq: 2\r\n\
             Content-Type: application/sdp\r\n\
             Content-Base: rtsp://127.0.0.1/stream\r\n\
             Content-Length: {}\r\n\
             \r\n\
             {}",
            expected_sdp.len(),
            expected_sdp
        )
    );
}

#[test]
fn full_lifecycle_setup_play_pause_teardown() {
    let (session, mut client) = connect();
    let sid = session.session_id();

    assert!(!session.is_closed());
    assert!(!session.is_active());
    assert!(session.is_connected());

    let resp = rtsp_request(
        &mut client,
        "SETUP rtsp://127.0.0.1/stream RTSP/1.0\r\nCSeq: 3\r\n\
         Transport: RTP/AVP;unicast;client_port=5000-5001\r\n\r\n",
    );
    assert_eq!(
        resp,
        format!(
            "RTSP/1.0 200 OK\r\nCSeq: 3\r\nSession: {sid}\r\n\
             Transport: RTP/AVP;unicast;client_port=5000-5001\r\n\r\n"
        )
    );
    assert!(!session.is_active());

    let resp = rtsp_request(
        &mut client,
        "PLAY rtsp://127.0.0.1/stream RTSP/1.0\r\nCSeq: 4\r\n\r\n",
    );
    assert_eq!(
        resp,
        format!("RTSP/1.0 200 OK\r\nCSeq: 4\r\nSession: {sid}\r\nRange: npt=0.000-\r\n\r\n")
    );
    assert!(session.is_active());

    let resp = rtsp_request(
        &mut client,
        "PAUSE rtsp://127.0.0.1/stream RTSP/1.0\r\nCSeq: 5\r\n\r\n",
    );
    assert_eq!(
        resp,
        format!("RTSP/1.0 200 OK\r\nCSeq: 5\r\nSession: {sid}\r\n\r\n")
    );
    assert!(!session.is_active());

    let resp = rtsp_request(
        &mut client,
        "PLAY rtsp://127.0.0.1/stream RTSP/1.0\r\nCSeq: 6\r\n\r\n",
    );
    assert!(resp.starts_with("RTSP/1.0 200 OK\r\nCSeq: 6\r\n"));
    assert!(session.is_active());

    let resp = rtsp_request(
        &mut client,
        "TEARDOWN rtsp://127.0.0.1/stream RTSP/1.0\r\nCSeq: 7\r\n\r\n",
    );
    assert_eq!(
        resp,
        format!("RTSP/1.0 200 OK\r\nCSeq: 7\r\nSession: {sid}\r\n\r\n")
    );

    assert!(wait_until(Duration::from_secs(2), || session.is_closed()));
    assert!(!session.is_active());
}

#[test]
fn setup_with_tcp_transport_rejected() {
    let (session, mut client) = connect();

    let resp = rtsp_request(
        &mut client,
        "SETUP rtsp://127.0.0.1/stream RTSP/1.0\r\nCSeq: 3\r\n\
         Transport: RTP/AVP/TCP;unicast;interleaved=0-1\r\n\r\n",
    );
    assert_eq!(resp, "RTSP/1.0 461 Unsupported Transport\r\n\r\n");

    // No transport was negotiated, so the session is still in Init:
    // media sends fail and a subsequent UDP SETUP succeeds normally.
    assert!(matches!(
        session.send_rtp(b"too early"),
        Err(RtspError::TransportNotConfigured(_))
    ));

    let resp = rtsp_request(
        &mut client,
        "SETUP rtsp://127.0.0.1/stream RTSP/1.0\r\nCSeq: 4\r\n\
         Transport: RTP/AVP;unicast;client_port=5000-5001\r\n\r\n",
    );
    assert!(resp.starts_with("RTSP/1.0 200 OK\r\nCSeq: 4\r\n"));
}

#[test]
fn malformed_request_answered_400_without_cseq() {
    let (_session, mut client) = connect();

    // No CR anywhere in the buffer.
    client.write_all(b"garbage without a carriage return").unwrap();
    assert_eq!(read_response(&mut client), "RTSP/1.0 400 Bad Request\r\n\r\n");

    // Well-formed line but no CSeq header.
    let resp = rtsp_request(
        &mut client,
        "OPTIONS rtsp://127.0.0.1/stream RTSP/1.0\r\nAccept: application/sdp\r\n\r\n",
    );
    assert_eq!(resp, "RTSP/1.0 400 Bad Request\r\n\r\n");
}

#[test]
fn unknown_method_answered_400_with_cseq() {
    let (session, mut client) = connect();

    let resp = rtsp_request(
        &mut client,
        "RECORD rtsp://127.0.0.1/stream RTSP/1.0\r\nCSeq: 9\r\n\r\n",
    );
    assert_eq!(resp, "RTSP/1.0 400 Bad Request\r\nCSeq: 9\r\n\r\n");

    // A bad request does not kill the session.
    assert!(!session.is_closed());
    let resp = rtsp_request(
        &mut client,
        "OPTIONS rtsp://127.0.0.1/stream RTSP/1.0\r\nCSeq: 10\r\n\r\n",
    );
    assert!(resp.starts_with("RTSP/1.0 200 OK\r\nCSeq: 10\r\n"));
}

#[test]
fn media_reaches_negotiated_ports() {
    let (session, mut client) = connect();

    let rtp_receiver = UdpSocket::bind("127.0.0.1:0").unwrap();
    let rtcp_receiver = UdpSocket::bind("127.0.0.1:0").unwrap();
    rtp_receiver
        .set_read_timeout(Some(Duration::from_secs(2)))
        .unwrap();
    rtcp_receiver
        .set_read_timeout(Some(Duration::from_secs(2)))
        .unwrap();
    let rtp_port = rtp_receiver.local_addr().unwrap().port();
    let rtcp_port = rtcp_receiver.local_addr().unwrap().port();

    let resp = rtsp_request(
        &mut client,
        &format!(
            "SETUP rtsp://127.0.0.1/stream RTSP/1.0\r\nCSeq: 3\r\n\
             Transport: RTP/AVP;unicast;client_port={rtp_port}-{rtcp_port}\r\n\r\n"
        ),
    );
    assert!(resp.contains(&format!("client_port={rtp_port}-{rtcp_port}")));

    rtsp_request(
        &mut client,
        "PLAY rtsp://127.0.0.1/stream RTSP/1.0\r\nCSeq: 4\r\n\r\n",
    );
    assert!(session.is_active());

    assert_eq!(session.send_rtp(b"rtp payload").unwrap(), 11);
    let mut buf = [0u8; 64];
    let (n, _) = rtp_receiver.recv_from(&mut buf).unwrap();
    assert_eq!(&buf[..n], b"rtp payload");

    assert_eq!(session.send_rtcp(b"rtcp report").unwrap(), 11);
    let (n, _) = rtcp_receiver.recv_from(&mut buf).unwrap();
    assert_eq!(&buf[..n], b"rtcp report");
}

#[test]
fn send_before_setup_is_rejected() {
    let (session, _client) = connect();
    assert!(matches!(
        session.send_rtp(b"x"),
        Err(RtspError::TransportNotConfigured(_))
    ));
    assert!(matches!(
        session.send_rtcp(b"x"),
        Err(RtspError::TransportNotConfigured(_))
    ));
}

#[test]
fn peer_disconnect_closes_session() {
    let (session, client) = connect();
    assert!(session.is_connected());

    drop(client);

    assert!(wait_until(Duration::from_secs(2), || session.is_closed()));
    assert!(!session.is_connected());
    assert!(!session.is_active());
}

#[test]
fn owner_teardown_is_terminal() {
    let (session, _client) = connect();
    session.teardown();
    assert!(session.is_closed());

    // play() after teardown must not reactivate the session.
    session.play();
    assert!(!session.is_active());
    assert!(session.is_closed());
}

#[test]
fn drop_joins_reader_while_blocked() {
    let (session, _client) = connect();
    let start = Instant::now();
    drop(session);
    // The reader is blocked in receive; drop must still return promptly.
    assert!(start.elapsed() < Duration::from_secs(2));
}

#[test]
fn server_streams_frames_to_playing_client() {
    let mut server = Server::new(ServerConfig {
        server_address: "127.0.0.1".to_string(),
        port: 18554,
        path: "mjpeg/1".to_string(),
    });
    server.start().expect("server start");

    let mut client = TcpStream::connect("127.0.0.1:18554").expect("connect");
    client
        .set_read_timeout(Some(Duration::from_secs(2)))
        .unwrap();

    let rtp_receiver = UdpSocket::bind("127.0.0.1:0").unwrap();
    rtp_receiver
        .set_read_timeout(Some(Duration::from_secs(2)))
        .unwrap();
    let rtp_port = rtp_receiver.local_addr().unwrap().port();

    let resp = rtsp_request(
        &mut client,
        "DESCRIBE rtsp://127.0.0.1/mjpeg/1 RTSP/1.0\r\nCSeq: 1\r\n\r\n",
    );
    assert!(resp.contains("m=video 0 RTP/AVP 26\r\n"));

    let resp = rtsp_request(
        &mut client,
        &format!(
            "SETUP rtsp://127.0.0.1/mjpeg/1 RTSP/1.0\r\nCSeq: 2\r\n\
             Transport: RTP/AVP;unicast;client_port={rtp_port}-{}\r\n\r\n",
            rtp_port + 1
        ),
    );
    assert!(resp.starts_with("RTSP/1.0 200 OK\r\n"));

    let resp = rtsp_request(
        &mut client,
        "PLAY rtsp://127.0.0.1/mjpeg/1 RTSP/1.0\r\nCSeq: 3\r\n\r\n",
    );
    assert!(resp.starts_with("RTSP/1.0 200 OK\r\n"));

    let data = synthetic_jpeg(64, 48, &[0x11, 0x22, 0x33, 0x44]);
    let frame = mjpeg_rtsp::media::JpegFrame::parse(&data).unwrap();
    let delivered = server.send_frame(&frame, 9000).expect("send frame");
    assert_eq!(delivered, 1);

    let mut buf = [0u8; 2048];
    let (n, _) = rtp_receiver.recv_from(&mut buf).unwrap();
    // RTP fixed header: version 2, marker set on the frame's only
    // fragment, payload type 26.
    assert!(n > 12 + 8);
    assert_eq!(buf[0] >> 6, 2);
    assert_eq!(buf[1], 0x80 | 26);

    server.stop();
    assert_eq!(server.session_count(), 0);
}
