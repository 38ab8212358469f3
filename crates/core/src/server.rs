use std::net::TcpListener;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{SystemTime, UNIX_EPOCH};

use parking_lot::{Mutex, RwLock};

use crate::error::{Result, RtspError};
use crate::media::{JpegFrame, MjpegPacketizer, SenderReport};
use crate::session::{Session, SessionConfig};
use crate::transport::tcp;

/// A sender report rides the RTCP channel every this many frames.
const RTCP_FRAME_INTERVAL: u64 = 50;

/// Seconds between the NTP epoch (1900) and the Unix epoch (1970).
const NTP_UNIX_OFFSET: u64 = 2_208_988_800;

/// Server-level configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address advertised to clients in the SDP origin and control URLs
    /// (host or `host:port`).
    pub server_address: String,
    /// TCP port the RTSP listener binds on all interfaces.
    pub port: u16,
    /// Path component of the stream's RTSP URL.
    pub path: String,
}

/// MJPEG streaming server.
///
/// Owns the accept loop and the set of live [`Session`]s. Frame producers
/// push encoded JPEG frames through [`send_frame`](Self::send_frame); the
/// server packetizes once per frame and fans the RTP packets out to every
/// session currently in the Playing state, dropping sessions whose peers
/// have gone away.
///
/// ```no_run
/// use mjpeg_rtsp::{Server, ServerConfig};
/// use mjpeg_rtsp::media::JpegFrame;
///
/// let mut server = Server::new(ServerConfig {
///     server_address: "192.168.1.10".to_string(),
///     port: 8554,
///     path: "mjpeg/1".to_string(),
/// });
/// server.start().unwrap();
///
/// let data = std::fs::read("frame.jpg").unwrap();
/// let frame = JpegFrame::parse(&data).unwrap();
/// loop {
///     server.send_frame(&frame, 9000).unwrap();
///     std::thread::sleep(std::time::Duration::from_millis(100));
/// }
/// ```
pub struct Server {
    config: ServerConfig,
    sessions: Arc<RwLock<Vec<Session>>>,
    running: Arc<AtomicBool>,
    packetizer: Mutex<MjpegPacketizer>,
    frames_sent: AtomicU64,
}

impl Server {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config,
            sessions: Arc::new(RwLock::new(Vec::new())),
            running: Arc::new(AtomicBool::new(false)),
            packetizer: Mutex::new(MjpegPacketizer::with_random_ssrc()),
            frames_sent: AtomicU64::new(0),
        }
    }

    /// Bind the listener and start accepting control connections.
    pub fn start(&mut self) -> Result<()> {
        if self.running.load(Ordering::SeqCst) {
            return Err(RtspError::AlreadyRunning);
        }
        if self.config.port == 0 {
            return Err(RtspError::InvalidBindAddress(
                "port must be explicit (non-zero)".to_string(),
            ));
        }

        let listener = TcpListener::bind(("0.0.0.0", self.config.port))?;
        listener.set_nonblocking(true)?;

        self.running.store(true, Ordering::SeqCst);

        let sessions = self.sessions.clone();
        let running = self.running.clone();
        let session_config = SessionConfig {
            server_address: self.config.server_address.clone(),
            rtsp_path: self.config.path.clone(),
        };

        tracing::info!(
            port = self.config.port,
            path = %self.config.path,
            "RTSP server listening"
        );

        thread::spawn(move || {
            tcp::accept_loop(listener, sessions, session_config, running);
        });

        Ok(())
    }

    /// Stop accepting and drop every session (each drop joins that
    /// session's reader and releases its transports).
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        self.sessions.write().clear();
        tracing::info!("server stopped");
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Number of sessions currently held, closed ones included until the
    /// next [`send_frame`](Self::send_frame) reaps them.
    pub fn session_count(&self) -> usize {
        self.sessions.read().len()
    }

    /// Packetize one JPEG frame and deliver it to every active session.
    ///
    /// `timestamp_increment` advances the 90 kHz RTP clock (`90000 / fps`).
    /// Every 50th frame also emits a sender report on the RTCP channel.
    /// Returns the number of sessions the frame reached;
    /// a per-session send failure skips that session but does not fail the
    /// call.
    pub fn send_frame(&self, frame: &JpegFrame<'_>, timestamp_increment: u32) -> Result<usize> {
        if !self.running.load(Ordering::SeqCst) {
            return Err(RtspError::NotStarted);
        }

        let (packets, report) = {
            let mut packetizer = self.packetizer.lock();
            let packets = packetizer.packetize(frame, timestamp_increment);
            let frames = self.frames_sent.fetch_add(1, Ordering::Relaxed) + 1;
            let report =
                (frames % RTCP_FRAME_INTERVAL == 0).then(|| sender_report(&packetizer));
            (packets, report)
        };

        let mut sessions = self.sessions.write();
        sessions.retain(|session| !session.is_closed());

        let mut delivered = 0;
        for session in sessions.iter() {
            if !session.is_active() {
                continue;
            }
            let mut complete = true;
            for packet in &packets {
                if let Err(e) = session.send_rtp(packet) {
                    tracing::warn!(
                        session_id = session.session_id(),
                        error = %e,
                        "failed to send RTP packet"
                    );
                    complete = false;
                    break;
                }
            }
            if let Some(report) = report {
                if let Err(e) = session.send_rtcp(&report.serialize()) {
                    tracing::warn!(
                        session_id = session.session_id(),
                        error = %e,
                        "failed to send sender report"
                    );
                }
            }
            if complete {
                delivered += 1;
            }
        }
        Ok(delivered)
    }
}

/// Snapshot the packetizer's counters into a sender report stamped with
/// the current wall-clock NTP time.
fn sender_report(packetizer: &MjpegPacketizer) -> SenderReport {
    let since_unix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    let ntp_seconds = (since_unix.as_secs() + NTP_UNIX_OFFSET) as u32;
    let ntp_fraction = ((since_unix.subsec_nanos() as u64) << 32) / 1_000_000_000;

    SenderReport {
        ssrc: packetizer.ssrc(),
        ntp_seconds,
        ntp_fraction: ntp_fraction as u32,
        rtp_timestamp: packetizer.rtp_timestamp(),
        packet_count: packetizer.packet_count(),
        octet_count: packetizer.octet_count(),
    }
}
