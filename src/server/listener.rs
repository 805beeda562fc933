//! Broadcast server listener
//!
//! Handles the TCP accept loop and wires each accepted connection into a
//! registered session with a running inbound reader.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::net::{TcpListener, TcpStream};

use crate::capture::{CaptureWorker, SourceFactory};
use crate::error::{Error, Result};
use crate::registry::SessionRegistry;
use crate::server::config::ServerConfig;
use crate::session::{reader, Session};

/// Screen broadcast server
pub struct BroadcastServer {
    config: ServerConfig,
    registry: Arc<SessionRegistry>,
    next_session_id: AtomicU64,
}

impl BroadcastServer {
    /// Create a new server with the given configuration and capture factory
    pub fn new(config: ServerConfig, factory: impl SourceFactory) -> Self {
        let capture = CaptureWorker::new(factory, config.frame_interval);
        Self {
            config,
            registry: Arc::new(SessionRegistry::new(capture)),
            next_session_id: AtomicU64::new(1),
        }
    }

    /// Get a reference to the session registry
    pub fn registry(&self) -> &Arc<SessionRegistry> {
        &self.registry
    }

    /// Get the configured bind address
    pub fn bind_addr(&self) -> SocketAddr {
        self.config.bind_addr
    }

    /// Run the server
    ///
    /// Blocks until a fatal error occurs: either the listener fails to bind
    /// or the capture device cannot be acquired when the first viewer joins.
    pub async fn run(&self) -> Result<()> {
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        tracing::info!(addr = %self.config.bind_addr, "Broadcast server listening");

        self.serve(listener).await
    }

    /// Run the server with graceful shutdown
    pub async fn run_until<F>(&self, shutdown: F) -> Result<()>
    where
        F: std::future::Future<Output = ()>,
    {
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        tracing::info!(addr = %self.config.bind_addr, "Broadcast server listening");

        tokio::select! {
            _ = shutdown => {
                tracing::info!("Shutdown signal received");
                self.registry.capture().stop();
                Ok(())
            }
            result = self.serve(listener) => result,
        }
    }

    /// Accept connections on a caller-provided listener
    ///
    /// A failed accept is logged and the loop continues; only a fatal
    /// capture-layer failure ends the loop, and it is the only error a
    /// single session can never cause.
    pub async fn serve(&self, listener: TcpListener) -> Result<()> {
        let mut fatal = self.registry.capture().fatal();

        loop {
            tokio::select! {
                accepted = listener.accept() => match accepted {
                    Ok((socket, peer_addr)) => {
                        self.handle_connection(socket, peer_addr).await;
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Failed to accept connection");
                    }
                },
                _ = fatal.changed() => {
                    if let Some(e) = fatal.borrow_and_update().clone() {
                        return Err(Error::Capture(e));
                    }
                }
            }
        }
    }

    async fn handle_connection(&self, socket: TcpStream, peer_addr: SocketAddr) {
        if self.config.tcp_nodelay {
            if let Err(e) = socket.set_nodelay(true) {
                tracing::warn!(peer = %peer_addr, error = %e, "Failed to set TCP_NODELAY");
            }
        }

        let session_id = self.next_session_id.fetch_add(1, Ordering::Relaxed);

        tracing::debug!(session_id = session_id, peer = %peer_addr, "New connection");

        let (read_half, write_half) = socket.into_split();
        let session = Arc::new(Session::new(
            session_id,
            peer_addr,
            write_half,
            Arc::clone(&self.registry),
            self.config.delivery_failure_limit,
        ));

        // Subscribe before registering: once registered, a delivery failure
        // could close the session, and the reader must observe that.
        let closed_rx = session.subscribe_close();
        self.registry.register(Arc::clone(&session)).await;
        reader::spawn(session, read_half, closed_rx);
    }
}
