use std::net::TcpListener;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use parking_lot::RwLock;

use crate::session::{Session, SessionConfig};

/// Non-blocking TCP accept loop.
///
/// Each accepted control connection becomes a [`Session`] (which spawns
/// its own reader thread) and is registered in the shared session list.
/// The `running` flag is checked between accepts with a 50ms poll interval
/// so that [`crate::Server::stop`] can terminate the loop promptly.
pub fn accept_loop(
    listener: TcpListener,
    sessions: Arc<RwLock<Vec<Session>>>,
    config: SessionConfig,
    running: Arc<AtomicBool>,
) {
    while running.load(Ordering::SeqCst) {
        match listener.accept() {
            Ok((stream, peer_addr)) => {
                if stream.set_nonblocking(false).is_err() {
                    continue;
                }
                tracing::info!(%peer_addr, "client connected");
                match Session::new(stream, config.clone()) {
                    Ok(session) => sessions.write().push(session),
                    Err(e) => {
                        tracing::warn!(%peer_addr, error = %e, "failed to create session");
                    }
                }
            }
            Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                thread::sleep(Duration::from_millis(50));
            }
            Err(e) => {
                if running.load(Ordering::SeqCst) {
                    tracing::warn!(error = %e, "TCP accept error");
                }
            }
        }
    }
    tracing::debug!("accept loop exited");
}
