//! Simple viewer demo
//!
//! Run with: cargo run --example simple_viewer [SERVER_ADDR] [FRAME_COUNT]
//!
//! Connects to a broadcast server, prints a line per received frame, then
//! sends DISCONNECT and exits. Rendering is out of scope; a real viewer
//! would hand each payload to an image decoder and a window.

use std::net::SocketAddr;

use screencast_rs::Viewer;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "screencast_rs=info".into()),
        )
        .init();

    let addr: SocketAddr = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "127.0.0.1:12345".to_string())
        .parse()?;
    let frame_count: u64 = std::env::args()
        .nth(2)
        .unwrap_or_else(|| "100".to_string())
        .parse()?;

    let mut viewer = Viewer::connect(addr).await?;
    println!("Connected to {}", addr);

    for n in 1..=frame_count {
        let frame = viewer.next_frame().await?;
        println!("frame {:>4}: {} bytes", n, frame.len());
    }

    viewer.disconnect().await?;
    println!("Disconnected after {} frames", frame_count);

    Ok(())
}
