//! Session registry implementation
//!
//! The central registry that tracks live viewer sessions, fans frames out to
//! them, and gates the capture worker on the active-session count.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::capture::CaptureWorker;
use crate::registry::frame::Frame;
use crate::session::Session;

/// Central registry for all live viewer sessions
///
/// Thread-safe via `RwLock`. Registrations, deregistrations, and fan-out
/// snapshots are mutually exclusive with respect to set mutation, but no
/// network call ever happens while the lock is held.
pub struct SessionRegistry {
    /// Map of session id to session
    sessions: RwLock<HashMap<u64, Arc<Session>>>,

    /// Capture worker, started and stopped on membership transitions
    capture: CaptureWorker,
}

impl SessionRegistry {
    /// Create a registry owning the given capture worker
    pub fn new(capture: CaptureWorker) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            capture,
        }
    }

    /// Get the capture worker
    pub fn capture(&self) -> &CaptureWorker {
        &self.capture
    }

    /// Add a session to the live set
    ///
    /// If this transitions the set from empty to non-empty, the capture
    /// worker is started. The transition happens under the set lock, so the
    /// membership decision and the worker state can never disagree: a
    /// racing deregister cannot slip a stale stop between them. `start` and
    /// `stop` are synchronous and never block, so nothing awaits while the
    /// lock is held.
    pub async fn register(self: &Arc<Self>, session: Arc<Session>) {
        let count = {
            let mut sessions = self.sessions.write().await;
            let was_empty = sessions.is_empty();
            sessions.insert(session.id(), Arc::clone(&session));
            if was_empty {
                self.capture.start(Arc::clone(self));
            }
            sessions.len()
        };

        tracing::info!(
            session_id = session.id(),
            peer = %session.peer_addr(),
            sessions = count,
            "Session registered"
        );
    }

    /// Remove a session from the live set
    ///
    /// If this transitions the set from non-empty to empty, the capture
    /// worker is stopped, under the set lock for the same reason `register`
    /// starts it there. Unknown ids are ignored (a session is only ever
    /// deregistered once, by its own close path).
    pub async fn deregister(&self, session_id: u64) {
        {
            let mut sessions = self.sessions.write().await;
            if sessions.remove(&session_id).is_none() {
                return;
            }
            if sessions.is_empty() {
                self.capture.stop();
            }
        }

        tracing::info!(session_id = session_id, "Session deregistered");
    }

    /// Deliver a frame to every currently-registered session
    ///
    /// The set is snapshotted under the lock and deliveries happen outside
    /// it, so a session added or removed mid-fan-out neither corrupts
    /// iteration nor blocks. `deliver` itself spawns and returns, so no
    /// individual viewer can stall the others or the capture loop.
    pub async fn fan_out(&self, frame: &Frame) {
        let sessions: Vec<Arc<Session>> =
            self.sessions.read().await.values().cloned().collect();

        tracing::trace!(seq = frame.seq, bytes = frame.len(), sessions = sessions.len(), "Fan-out");

        for session in sessions {
            session.deliver(frame.clone());
        }
    }

    /// Number of live sessions
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Whether a session id is currently registered
    pub async fn contains(&self, session_id: u64) -> bool {
        self.sessions.read().await.contains_key(&session_id)
    }
}
