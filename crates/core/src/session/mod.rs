//! RTSP session handling.
//!
//! A [`Session`] owns one client's control plane: the TCP control stream,
//! two ephemeral UDP endpoints for RTP and RTCP, and a dedicated reader
//! thread that services RTSP requests until the peer tears down or
//! disconnects.
//!
//! ## Session lifecycle (RFC 2326 §A.1)
//!
//! ```text
//! SETUP          -> Ready    (client ports recorded)
//! PLAY           -> Playing  (media producers may send)
//! PAUSE          -> Paused   (from Playing)
//! PLAY           -> Playing  (from Paused)
//! TEARDOWN       -> Closed   (reader exits)
//! TCP disconnect -> Closed
//! ```
//!
//! ## Concurrency
//!
//! Two kinds of workers touch a session: the reader thread (request
//! handling, state transitions, port negotiation) and external media
//! producers calling [`send_rtp`](Session::send_rtp) /
//! [`send_rtcp`](Session::send_rtcp). The `closed` and `active` flags are
//! atomics with release/acquire ordering so producers observe transitions
//! without locking; the negotiated ports are written by the reader during
//! SETUP, before any producer can observe `is_active()`. The session does
//! not serialize concurrent producers — if several share one session they
//! coordinate among themselves.
//!
//! Dropping a session marks it Closed, unblocks the reader by shutting
//! down the control stream, joins the thread, and then releases all three
//! transports, in that order.

pub mod state;
pub mod transport;

use std::io::{Read, Write};
use std::net::{IpAddr, Shutdown, SocketAddr, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use parking_lot::RwLock;
use rand::Rng;

use crate::error::{Result, RtspError};
use crate::protocol::request::parse_cseq;
use crate::protocol::{sdp, Request, Response};
use crate::transport::UdpTransport;
pub use state::SessionState;
pub use transport::TransportHeader;

/// Upper bound on a single control-stream receive. One request is
/// expected per receive; pipelined requests within a segment are not
/// reassembled.
const MAX_REQUEST_SIZE: usize = 1024;

/// Configuration captured at session construction.
///
/// `server_address` and `rtsp_path` populate the SDP origin and the
/// `Content-Base`/`a=control` URLs of DESCRIBE responses. Log verbosity is
/// a process-wide concern of the `tracing` subscriber, not a per-session
/// setting.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Address clients use to reach this server (host or `host:port`).
    pub server_address: String,
    /// Path component of the stream's RTSP URL.
    pub rtsp_path: String,
}

/// One client's RTSP session.
///
/// Constructed from an already-connected control stream. The constructor
/// binds the UDP media endpoints, generates a random 32-bit session id,
/// and spawns the control reader thread; from then on the session answers
/// the client on its own until TEARDOWN, disconnect, or drop.
///
/// The handle is shared-state thin: every accessor is callable while the
/// reader runs.
pub struct Session {
    shared: Arc<SessionShared>,
    reader: Option<JoinHandle<()>>,
}

struct SessionShared {
    id: u32,
    server_address: String,
    rtsp_path: String,
    client_ip: IpAddr,
    control: TcpStream,
    rtp: UdpTransport,
    rtcp: UdpTransport,
    state: RwLock<SessionState>,
    transport: RwLock<Option<TransportHeader>>,
    /// Latched once the session reaches Closed.
    closed: AtomicBool,
    /// Mirrors `state == Playing` for lock-free producer reads.
    active: AtomicBool,
    /// Cleared when the control stream reports EOF or an error.
    connected: AtomicBool,
}

impl Session {
    /// Take ownership of a connected control stream and start servicing it.
    ///
    /// Binds the RTP and RTCP endpoints on ephemeral local ports and spawns
    /// the reader thread. Fails if the peer address cannot be read, a UDP
    /// bind fails, or the thread cannot be spawned.
    pub fn new(control: TcpStream, config: SessionConfig) -> Result<Session> {
        let client_ip = control.peer_addr()?.ip();
        let rtp = UdpTransport::bind()?;
        let rtcp = UdpTransport::bind()?;
        let id = rand::rng().random::<u32>();

        let shared = Arc::new(SessionShared {
            id,
            server_address: config.server_address,
            rtsp_path: config.rtsp_path,
            client_ip,
            control,
            rtp,
            rtcp,
            state: RwLock::new(SessionState::Init),
            transport: RwLock::new(None),
            closed: AtomicBool::new(false),
            active: AtomicBool::new(false),
            connected: AtomicBool::new(true),
        });

        let reader = std::thread::Builder::new()
            .name(format!("rtsp-session-{}", id))
            .spawn({
                let shared = shared.clone();
                move || shared.reader_loop()
            })
            .map_err(RtspError::Io)?;

        tracing::info!(session_id = id, client = %client_ip, "session created");

        Ok(Session {
            shared,
            reader: Some(reader),
        })
    }

    /// The 32-bit identifier echoed in `Session` response headers.
    pub fn session_id(&self) -> u32 {
        self.shared.id
    }

    /// True once TEARDOWN was processed or the peer disconnected.
    pub fn is_closed(&self) -> bool {
        self.shared.closed.load(Ordering::Acquire)
    }

    /// True while the control stream has not reported EOF or an error.
    pub fn is_connected(&self) -> bool {
        self.shared.connected.load(Ordering::Acquire)
    }

    /// True iff the session is in the Playing state. Media producers
    /// consult this before every send.
    pub fn is_active(&self) -> bool {
        self.shared.active.load(Ordering::Acquire)
    }

    /// Owner-initiated PLAY: resume delivery if SETUP has completed.
    pub fn play(&self) {
        self.shared.transition(SessionState::on_play);
    }

    /// Owner-initiated PAUSE: suspend delivery.
    pub fn pause(&self) {
        self.shared.transition(SessionState::on_pause);
    }

    /// Owner-initiated TEARDOWN: mark the session Closed. The reader
    /// observes the flag at the top of its loop, or drop unblocks it.
    pub fn teardown(&self) {
        self.shared.transition(SessionState::on_teardown);
    }

    /// Send an RTP packet to the client's negotiated RTP port.
    ///
    /// Thin transport: state is not checked here — callers gate on
    /// [`is_active`](Self::is_active). Fails with
    /// [`RtspError::TransportNotConfigured`] before SETUP completes.
    pub fn send_rtp(&self, packet: &[u8]) -> Result<usize> {
        let ports = self.shared.client_ports()?;
        tracing::trace!(session_id = self.shared.id, len = packet.len(), "sending RTP packet");
        self.shared
            .rtp
            .send_to(packet, SocketAddr::new(self.shared.client_ip, ports.client_rtp_port))
    }

    /// Send an RTCP packet to the client's negotiated RTCP port.
    pub fn send_rtcp(&self, packet: &[u8]) -> Result<usize> {
        let ports = self.shared.client_ports()?;
        tracing::trace!(session_id = self.shared.id, len = packet.len(), "sending RTCP packet");
        self.shared
            .rtcp
            .send_to(packet, SocketAddr::new(self.shared.client_ip, ports.client_rtcp_port))
    }
}

impl Drop for Session {
    /// Closed first, reader joined second, transports released last (the
    /// reader holds the other reference to the shared state, so the
    /// sockets die when the join returns and `shared` is dropped).
    fn drop(&mut self) {
        self.shared.transition(SessionState::on_teardown);
        let _ = self.shared.control.shutdown(Shutdown::Both);
        if let Some(reader) = self.reader.take() {
            let _ = reader.join();
        }
        tracing::debug!(session_id = self.shared.id, "session dropped");
    }
}

impl SessionShared {
    /// Control reader: one request per blocking receive, until the session
    /// closes or the stream dies.
    fn reader_loop(&self) {
        let mut buf = [0u8; MAX_REQUEST_SIZE];
        loop {
            if self.closed.load(Ordering::Acquire) {
                tracing::debug!(session_id = self.id, "session closed, reader exiting");
                break;
            }
            let n = match (&self.control).read(&mut buf) {
                Ok(0) => {
                    tracing::info!(session_id = self.id, "control stream closed by peer");
                    self.disconnect();
                    break;
                }
                Ok(n) => n,
                Err(e) => {
                    // Expected when drop shuts the stream down under us.
                    if !self.closed.load(Ordering::Acquire) {
                        tracing::warn!(session_id = self.id, error = %e, "control receive failed");
                    }
                    self.disconnect();
                    break;
                }
            };
            if let Err(e) = self.handle_request(&buf[..n]) {
                tracing::warn!(session_id = self.id, error = %e, "failed to handle request");
            }
        }
    }

    fn disconnect(&self) {
        self.connected.store(false, Ordering::Release);
        self.transition(SessionState::on_teardown);
    }

    /// Apply a transition to the state machine and republish the atomic
    /// flags, all under the state lock. `closed` is a latch: once set it
    /// is never cleared.
    fn transition(&self, f: impl FnOnce(SessionState) -> SessionState) -> SessionState {
        let mut state = self.state.write();
        let next = f(*state);
        if next != *state {
            tracing::debug!(session_id = self.id, from = ?*state, to = ?next, "state transition");
        }
        *state = next;
        self.active.store(next.is_active(), Ordering::Release);
        if next.is_closed() {
            self.closed.store(true, Ordering::Release);
        }
        next
    }

    fn client_ports(&self) -> Result<TransportHeader> {
        let ports: Option<TransportHeader> = *self.transport.read();
        ports.ok_or(RtspError::TransportNotConfigured(self.id))
    }

    /// Parse a received buffer as a single request and dispatch by method.
    fn handle_request(&self, buf: &[u8]) -> Result<()> {
        let request = match Request::parse(buf) {
            Ok(request) => request,
            Err(e) => {
                tracing::warn!(session_id = self.id, error = %e, "malformed request line");
                return self.send_response(Response::bad_request());
            }
        };
        tracing::debug!(
            session_id = self.id,
            method = request.method,
            path = request.path,
            version = request.version,
            "request"
        );

        match request.method {
            "OPTIONS" => self.handle_options(request.body),
            "DESCRIBE" => self.handle_describe(request.body),
            "SETUP" => self.handle_setup(&request),
            "PLAY" => self.handle_play(request.body),
            "PAUSE" => self.handle_pause(request.body),
            "TEARDOWN" => self.handle_teardown(request.body),
            _ => self.handle_invalid(request.body),
        }
    }

    fn handle_options(&self, body: &str) -> Result<()> {
        let cseq = match parse_cseq(body) {
            Ok(cseq) => cseq,
            Err(_) => return self.handle_invalid(body),
        };
        tracing::info!(session_id = self.id, cseq, "OPTIONS request");
        self.send_response(
            Response::ok()
                .with_cseq(cseq)
                .header("Public", "DESCRIBE, SETUP, TEARDOWN, PLAY, PAUSE"),
        )
    }

    fn handle_describe(&self, body: &str) -> Result<()> {
        let cseq = match parse_cseq(body) {
            Ok(cseq) => cseq,
            Err(_) => return self.handle_invalid(body),
        };
        tracing::info!(session_id = self.id, cseq, "DESCRIBE request");
        let url = sdp::control_url(&self.server_address, &self.rtsp_path);
        let description = sdp::session_description(self.id, &self.server_address, &url);
        self.send_response(
            Response::ok()
                .with_cseq(cseq)
                .header("Content-Type", "application/sdp")
                .header("Content-Base", &url)
                .with_body(description),
        )
    }

    fn handle_setup(&self, request: &Request<'_>) -> Result<()> {
        // Transport is vetted before CSeq so an interleaved-TCP ask is
        // rejected 461 even when the rest of the request is unusable.
        let line = match request.transport_line() {
            Ok(line) => line,
            Err(_) => return self.handle_invalid(request.body),
        };
        let ports = match TransportHeader::parse(line) {
            Ok(ports) => ports,
            Err(RtspError::UnsupportedTransport) => {
                tracing::warn!(session_id = self.id, transport = line, "TCP transport rejected");
                return self.send_response(Response::unsupported_transport());
            }
            Err(e) => {
                tracing::warn!(session_id = self.id, transport = line, error = %e, "bad Transport header");
                return self.handle_invalid(request.body);
            }
        };
        let cseq = match parse_cseq(request.body) {
            Ok(cseq) => cseq,
            Err(_) => return self.handle_invalid(request.body),
        };
        tracing::info!(
            session_id = self.id,
            cseq,
            rtp_port = ports.client_rtp_port,
            rtcp_port = ports.client_rtcp_port,
            "SETUP request"
        );

        *self.transport.write() = Some(ports);
        self.transition(SessionState::on_setup);

        self.send_response(
            Response::ok()
                .with_cseq(cseq)
                .header("Session", &self.id.to_string())
                .header("Transport", &ports.response_value()),
        )
    }

    fn handle_play(&self, body: &str) -> Result<()> {
        let cseq = match parse_cseq(body) {
            Ok(cseq) => cseq,
            Err(_) => return self.handle_invalid(body),
        };
        tracing::info!(session_id = self.id, cseq, "PLAY request");
        self.transition(SessionState::on_play);
        self.send_response(
            Response::ok()
                .with_cseq(cseq)
                .header("Session", &self.id.to_string())
                .header("Range", "npt=0.000-"),
        )
    }

    fn handle_pause(&self, body: &str) -> Result<()> {
        let cseq = match parse_cseq(body) {
            Ok(cseq) => cseq,
            Err(_) => return self.handle_invalid(body),
        };
        tracing::info!(session_id = self.id, cseq, "PAUSE request");
        self.transition(SessionState::on_pause);
        self.send_response(
            Response::ok()
                .with_cseq(cseq)
                .header("Session", &self.id.to_string()),
        )
    }

    fn handle_teardown(&self, body: &str) -> Result<()> {
        let cseq = match parse_cseq(body) {
            Ok(cseq) => cseq,
            Err(_) => return self.handle_invalid(body),
        };
        tracing::info!(session_id = self.id, cseq, "TEARDOWN request");
        self.transition(SessionState::on_teardown);
        self.send_response(
            Response::ok()
                .with_cseq(cseq)
                .header("Session", &self.id.to_string()),
        )
    }

    /// Unknown method or unusable CSeq: 400, echoing the CSeq only when it
    /// parsed.
    fn handle_invalid(&self, body: &str) -> Result<()> {
        tracing::info!(session_id = self.id, "invalid request");
        let response = match parse_cseq(body) {
            Ok(cseq) => Response::bad_request().with_cseq(cseq),
            Err(_) => Response::bad_request(),
        };
        self.send_response(response)
    }

    fn send_response(&self, response: Response) -> Result<()> {
        let text = response.serialize();
        tracing::debug!(session_id = self.id, status = response.status_code, "response");
        (&self.control).write_all(text.as_bytes())?;
        Ok(())
    }
}
