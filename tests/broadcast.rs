//! End-to-end broadcast tests over real TCP
//!
//! These drive the public API only: a server with a synthetic frame source,
//! real viewer connections, and the registry observed from the outside.

use std::sync::Arc;
use std::time::Duration;

use bytes::{BufMut, Bytes, BytesMut};
use tokio::net::TcpListener;
use tokio_test::assert_ok;

use screencast_rs::{
    BoxedSource, BroadcastServer, CaptureError, Error, FrameSource, ServerConfig, Viewer,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "screencast_rs=debug".into()),
        )
        .with_test_writer()
        .try_init();
}

/// Synthetic "screen": every frame is a payload stamped with its sequence
/// number, so viewers can verify they receive whole, well-formed frames.
struct PatternSource {
    seq: u64,
}

impl FrameSource for PatternSource {
    fn capture_frame(&mut self) -> Result<Bytes, CaptureError> {
        let mut buf = BytesMut::with_capacity(64);
        buf.put_u64(self.seq);
        buf.put_slice(&[0xAB; 48]);
        self.seq += 1;
        Ok(buf.freeze())
    }
}

fn pattern_factory() -> impl Fn() -> Result<BoxedSource, CaptureError> + Send + Sync + 'static {
    || Ok(Box::new(PatternSource { seq: 0 }) as BoxedSource)
}

async fn start_server(config: ServerConfig) -> (Arc<BroadcastServer>, std::net::SocketAddr) {
    let server = Arc::new(BroadcastServer::new(config, pattern_factory()));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let srv = Arc::clone(&server);
    tokio::spawn(async move { srv.serve(listener).await });

    (server, addr)
}

async fn wait_for_session_count(server: &BroadcastServer, count: usize) {
    for _ in 0..500 {
        if server.registry().session_count().await == count {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!(
        "registry never reached {} sessions (now {})",
        count,
        server.registry().session_count().await
    );
}

fn assert_pattern_frame(payload: &Bytes) {
    assert_eq!(payload.len(), 56);
    assert!(payload[8..].iter().all(|&b| b == 0xAB));
}

#[tokio::test]
async fn test_frames_reach_all_viewers() {
    init_tracing();
    let config = ServerConfig::default().frame_interval(Duration::from_millis(5));
    let (server, addr) = start_server(config).await;

    let mut viewer_a = assert_ok!(Viewer::connect(addr).await);
    let mut viewer_b = assert_ok!(Viewer::connect(addr).await);
    wait_for_session_count(&server, 2).await;

    for _ in 0..5 {
        let frame = assert_ok!(viewer_a.next_frame().await);
        assert_pattern_frame(&frame);
    }
    for _ in 0..5 {
        let frame = assert_ok!(viewer_b.next_frame().await);
        assert_pattern_frame(&frame);
    }
}

#[tokio::test]
async fn test_capture_runs_only_while_viewers_exist() {
    init_tracing();
    let config = ServerConfig::default().frame_interval(Duration::from_millis(5));
    let (server, addr) = start_server(config).await;

    assert!(!server.registry().capture().is_running());

    let viewer = assert_ok!(Viewer::connect(addr).await);
    wait_for_session_count(&server, 1).await;
    assert!(server.registry().capture().is_running());

    assert_ok!(viewer.disconnect().await);
    wait_for_session_count(&server, 0).await;
    assert!(!server.registry().capture().is_running());
}

#[tokio::test]
async fn test_disconnect_leaves_other_viewers_untouched() {
    init_tracing();
    let config = ServerConfig::default().frame_interval(Duration::from_millis(5));
    let (server, addr) = start_server(config).await;

    let viewer_a = assert_ok!(Viewer::connect(addr).await);
    let mut viewer_b = assert_ok!(Viewer::connect(addr).await);
    wait_for_session_count(&server, 2).await;

    assert_ok!(viewer_a.disconnect().await);
    wait_for_session_count(&server, 1).await;
    assert!(server.registry().capture().is_running());

    // The remaining viewer keeps receiving frames.
    for _ in 0..5 {
        let frame = assert_ok!(viewer_b.next_frame().await);
        assert_pattern_frame(&frame);
    }
}

#[tokio::test]
async fn test_dead_viewer_is_removed_others_keep_streaming() {
    init_tracing();
    let config = ServerConfig::default().frame_interval(Duration::from_millis(5));
    let (server, addr) = start_server(config).await;

    let mut viewer_a = assert_ok!(Viewer::connect(addr).await);
    let viewer_b = assert_ok!(Viewer::connect(addr).await);
    let mut viewer_c = assert_ok!(Viewer::connect(addr).await);
    wait_for_session_count(&server, 3).await;

    // Viewer B dies without a DISCONNECT.
    drop(viewer_b);
    wait_for_session_count(&server, 2).await;

    let mut a_frames = 0;
    let mut c_frames = 0;
    for _ in 0..10 {
        assert_pattern_frame(&assert_ok!(viewer_a.next_frame().await));
        a_frames += 1;
        assert_pattern_frame(&assert_ok!(viewer_c.next_frame().await));
        c_frames += 1;
    }
    assert_eq!(a_frames, 10);
    assert_eq!(c_frames, 10);
    assert!(server.registry().capture().is_running());
}

#[tokio::test]
async fn test_unknown_commands_do_not_disturb_stream() {
    init_tracing();
    let config = ServerConfig::default().frame_interval(Duration::from_millis(5));
    let (server, addr) = start_server(config).await;

    // A raw socket is a session like any other; send it garbage commands.
    let mut raw = tokio::net::TcpStream::connect(addr).await.unwrap();
    let mut viewer = assert_ok!(Viewer::connect(addr).await);
    wait_for_session_count(&server, 2).await;

    tokio::io::AsyncWriteExt::write_all(&mut raw, b"PING\nQUALITY low\n")
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(30)).await;

    // Both sessions still live, frames still flowing.
    assert_eq!(server.registry().session_count().await, 2);
    assert_pattern_frame(&assert_ok!(viewer.next_frame().await));
}

#[tokio::test]
async fn test_capture_acquisition_failure_is_fatal() {
    init_tracing();

    let factory = || -> Result<BoxedSource, CaptureError> {
        Err(CaptureError::Acquire("display unavailable".into()))
    };
    let server = Arc::new(BroadcastServer::new(ServerConfig::default(), factory));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let srv = Arc::clone(&server);
    let handle = tokio::spawn(async move { srv.serve(listener).await });

    // First viewer triggers the capture start, which fails to acquire.
    let _viewer = assert_ok!(Viewer::connect(addr).await);

    let result = handle.await.unwrap();
    assert!(matches!(result, Err(Error::Capture(CaptureError::Acquire(_)))));
}

#[tokio::test]
async fn test_uncapped_interval_still_streams() {
    init_tracing();
    // Default config: frame_interval zero, loop runs flat out.
    let (server, addr) = start_server(ServerConfig::default()).await;

    let mut viewer = assert_ok!(Viewer::connect(addr).await);
    wait_for_session_count(&server, 1).await;

    for _ in 0..20 {
        assert_pattern_frame(&assert_ok!(viewer.next_frame().await));
    }

    assert_ok!(viewer.disconnect().await);
    wait_for_session_count(&server, 0).await;
}
