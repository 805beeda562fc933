//! Session state and operations

use std::io;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;

use tokio::io::AsyncWriteExt;
use tokio::net::tcp::OwnedWriteHalf;
use tokio::sync::{watch, Mutex};

use super::delivery::{self, DeliveryOutcome};
use crate::registry::{Frame, SessionRegistry};
use crate::stats::{SessionCounters, SessionStats};

/// One accepted viewer connection
///
/// Owns the outbound half of the transport; the inbound half lives in the
/// session's reader task. Deliveries follow a bounded-staleness policy: a
/// frame arriving while a previous delivery is still in flight is dropped,
/// never queued, so a viewer only ever receives the most recent frame it is
/// ready for.
pub struct Session {
    /// Unique session id, monotonically increasing across the server
    id: u64,

    /// Remote peer address
    peer_addr: SocketAddr,

    /// Registry the session removes itself from on close
    registry: Arc<SessionRegistry>,

    /// Outbound transport; taken on close
    writer: Mutex<Option<OwnedWriteHalf>>,

    /// True while a delivery is in flight
    busy: AtomicBool,

    /// Consecutive delivery failures, reset on any success
    failures: AtomicU32,

    /// Failures in a row that force the session closed
    failure_limit: u32,

    /// Terminal flag; a closed session never reopens
    closed: AtomicBool,

    /// Wakes the inbound reader when the session closes
    closed_tx: watch::Sender<bool>,

    /// Delivery counters
    counters: SessionCounters,
}

impl Session {
    /// Create a session over an accepted connection's write half
    pub fn new(
        id: u64,
        peer_addr: SocketAddr,
        writer: OwnedWriteHalf,
        registry: Arc<SessionRegistry>,
        failure_limit: u32,
    ) -> Self {
        let (closed_tx, _) = watch::channel(false);
        Self {
            id,
            peer_addr,
            registry,
            writer: Mutex::new(Some(writer)),
            busy: AtomicBool::new(false),
            failures: AtomicU32::new(0),
            failure_limit,
            closed: AtomicBool::new(false),
            closed_tx,
            counters: SessionCounters::default(),
        }
    }

    /// Unique session id
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Remote peer address
    pub fn peer_addr(&self) -> SocketAddr {
        self.peer_addr
    }

    /// Whether the session has been closed
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Snapshot of this session's delivery statistics
    pub fn stats(&self) -> SessionStats {
        self.counters
            .snapshot(self.failures.load(Ordering::Acquire))
    }

    /// Receiver that flips to `true` when the session closes
    pub(crate) fn subscribe_close(&self) -> watch::Receiver<bool> {
        self.closed_tx.subscribe()
    }

    /// Try to deliver a frame to this viewer
    ///
    /// Returns immediately in every case. If the session is closed or a
    /// previous delivery is still in flight, the frame is dropped; otherwise
    /// a delivery task is spawned and the busy flag stays set until it
    /// finishes, successfully or not.
    pub fn deliver(self: &Arc<Self>, frame: Frame) {
        if self.is_closed() {
            self.counters.frame_dropped();
            return;
        }

        if self.busy.swap(true, Ordering::AcqRel) {
            self.counters.frame_dropped();
            tracing::trace!(
                session_id = self.id,
                seq = frame.seq,
                "Viewer busy, frame dropped"
            );
            return;
        }

        let session = Arc::clone(self);
        tokio::spawn(async move {
            session.run_delivery(frame).await;
            // Cleared regardless of outcome, including a threshold close.
            session.busy.store(false, Ordering::Release);
        });
    }

    async fn run_delivery(self: &Arc<Self>, frame: Frame) {
        let outcome = {
            let mut writer = self.writer.lock().await;
            delivery::send(writer.as_mut(), &frame).await
        };

        match outcome {
            DeliveryOutcome::Delivered { bytes } => {
                let recovered = self.note_success();
                if recovered > 0 {
                    tracing::info!(
                        session_id = self.id,
                        "Delivery succeeded, failure counter reset"
                    );
                }
                self.counters.frame_sent(bytes as u64);
                tracing::trace!(session_id = self.id, seq = frame.seq, bytes, "Frame delivered");
            }
            DeliveryOutcome::SessionClosed => {
                self.counters.frame_dropped();
            }
            DeliveryOutcome::Failed(e) => {
                let limit_reached = self.note_failure(&e);
                if limit_reached {
                    tracing::error!(
                        session_id = self.id,
                        limit = self.failure_limit,
                        "Consecutive delivery failures reached limit, closing session"
                    );
                    if let Err(close_err) = self.close().await {
                        tracing::warn!(
                            session_id = self.id,
                            error = %close_err,
                            "Transport shutdown failed while force-closing"
                        );
                    }
                }
            }
        }
    }

    /// Record a successful delivery; returns the failure streak it cleared
    fn note_success(&self) -> u32 {
        self.failures.swap(0, Ordering::AcqRel)
    }

    /// Record a failed delivery; returns true when the limit is reached
    fn note_failure(&self, error: &io::Error) -> bool {
        let failures = self.failures.fetch_add(1, Ordering::AcqRel) + 1;
        tracing::warn!(
            session_id = self.id,
            error = %error,
            failures = failures,
            limit = self.failure_limit,
            "Frame delivery failed"
        );
        failures >= self.failure_limit
    }

    /// Close the session
    ///
    /// Idempotent. Marks the session closed (no further deliveries), wakes
    /// the inbound reader, deregisters from the registry, and shuts the
    /// transport down. A shutdown failure is returned to the caller, but
    /// deregistration has already happened by then: a session is never left
    /// registered after a close attempt.
    pub async fn close(self: &Arc<Self>) -> io::Result<()> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }

        self.closed_tx.send_replace(true);
        self.registry.deregister(self.id).await;

        let result = {
            let mut writer = self.writer.lock().await;
            match writer.take() {
                Some(mut half) => half.shutdown().await,
                None => Ok(()),
            }
        };

        match &result {
            Ok(()) => {
                tracing::info!(session_id = self.id, peer = %self.peer_addr, "Session closed")
            }
            Err(e) => tracing::warn!(
                session_id = self.id,
                peer = %self.peer_addr,
                error = %e,
                "Session closed, transport shutdown failed"
            ),
        }

        result
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("peer_addr", &self.peer_addr)
            .field("closed", &self.is_closed())
            .finish()
    }
}
