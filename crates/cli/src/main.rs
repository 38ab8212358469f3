use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use mjpeg_rtsp::media::JpegFrame;
use mjpeg_rtsp::{Server, ServerConfig};

/// 90 kHz RTP video clock (RFC 2435 §3).
const RTP_CLOCK_RATE: u32 = 90_000;

#[derive(Parser)]
#[command(
    name = "mjpeg-rtsp-server",
    about = "RTSP server streaming a JPEG file as MJPEG on a loop"
)]
struct Args {
    /// JPEG file to stream.
    jpeg: PathBuf,

    /// Address advertised to clients in SDP and control URLs.
    #[arg(long, short, default_value = "127.0.0.1")]
    address: String,

    /// RTSP listening port.
    #[arg(long, short, default_value_t = 8554)]
    port: u16,

    /// Path component of the stream URL (rtsp://<address>/<path>).
    #[arg(long, default_value = "mjpeg/1")]
    path: String,

    /// Frames per second.
    #[arg(long, default_value_t = 10)]
    fps: u32,

    /// Log filter (e.g. "info", "mjpeg_rtsp=debug").
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_new(&args.log_level).unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let data = match std::fs::read(&args.jpeg) {
        Ok(data) => data,
        Err(e) => {
            eprintln!("Failed to read {}: {}", args.jpeg.display(), e);
            std::process::exit(1);
        }
    };
    let frame = match JpegFrame::parse(&data) {
        Ok(frame) => frame,
        Err(e) => {
            eprintln!("Failed to parse {}: {}", args.jpeg.display(), e);
            std::process::exit(1);
        }
    };
    tracing::info!(
        width = frame.width(),
        height = frame.height(),
        bytes = frame.scan().len(),
        "loaded JPEG frame"
    );

    let fps = args.fps.max(1);
    let mut server = Server::new(ServerConfig {
        server_address: args.address.clone(),
        port: args.port,
        path: args.path.clone(),
    });
    if let Err(e) = server.start() {
        eprintln!("Failed to start server: {}", e);
        std::process::exit(1);
    }

    println!(
        "Streaming rtsp://{}:{}/{} at {} fps",
        args.address, args.port, args.path, fps
    );

    let interval = Duration::from_secs(1) / fps;
    let timestamp_increment = RTP_CLOCK_RATE / fps;
    loop {
        if let Err(e) = server.send_frame(&frame, timestamp_increment) {
            tracing::warn!(error = %e, "frame delivery failed");
        }
        thread::sleep(interval);
    }
}
