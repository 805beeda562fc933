//! Simple broadcast server demo
//!
//! Run with: cargo run --example simple_server [BIND_ADDR]
//!
//! Examples:
//!   cargo run --example simple_server                  # binds to 0.0.0.0:12345
//!   cargo run --example simple_server 127.0.0.1:9000
//!
//! Real screen capture is an external collaborator, so this demo broadcasts
//! a synthetic animated pattern instead: each frame is a small byte grid that
//! shifts every capture. Point `simple_viewer` at it to watch the payload
//! sizes tick by, or plug in your own `FrameSource` for actual pixels.

use std::net::SocketAddr;
use std::time::Duration;

use bytes::{BufMut, BytesMut};
use screencast_rs::{BoxedSource, BroadcastServer, CaptureError, FrameSource, ServerConfig};

const WIDTH: usize = 64;
const HEIGHT: usize = 36;

/// Fake display: a scrolling gradient, "encoded" as raw bytes
struct SyntheticScreen {
    tick: u64,
}

impl FrameSource for SyntheticScreen {
    fn capture_frame(&mut self) -> Result<bytes::Bytes, CaptureError> {
        let mut buf = BytesMut::with_capacity(WIDTH * HEIGHT + 8);
        buf.put_u64(self.tick);
        for row in 0..HEIGHT {
            for col in 0..WIDTH {
                buf.put_u8(((row + col) as u64 + self.tick) as u8);
            }
        }
        self.tick = self.tick.wrapping_add(1);
        Ok(buf.freeze())
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "screencast_rs=info,simple_server=info".into()),
        )
        .init();

    let bind_addr: SocketAddr = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "0.0.0.0:12345".to_string())
        .parse()?;

    let config = ServerConfig::with_addr(bind_addr)
        // 30 fps cap so the synthetic source does not spin a core.
        .frame_interval(Duration::from_millis(33));

    let factory =
        || -> Result<BoxedSource, CaptureError> { Ok(Box::new(SyntheticScreen { tick: 0 })) };
    let server = BroadcastServer::new(config, factory);

    println!("Broadcasting on {} (Ctrl-C to stop)", bind_addr);

    let shutdown = async {
        let _ = tokio::signal::ctrl_c().await;
    };
    server.run_until(shutdown).await?;

    Ok(())
}
