//! Capture loop worker
//!
//! A single process-wide Idle → Running → Idle state machine. The worker is
//! started when the first session registers and stopped when the last one
//! deregisters; it carries no client-specific state. Start/stop transitions
//! are serialized by an internal mutex so concurrent registry notifications
//! can never produce two running cycles or a stop racing a start.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::watch;

use super::source::{CaptureError, SourceFactory};
use crate::registry::{Frame, SessionRegistry};

/// Runs the capture → encode → fan-out cycle while sessions exist
pub struct CaptureWorker {
    shared: Arc<Shared>,
}

struct Shared {
    factory: Box<dyn SourceFactory>,

    /// Delay between capture cycles; zero means run as fast as capture
    /// and encode permit
    frame_interval: Duration,

    /// Stop handle for the running cycle; `Some` while Running.
    /// Also serializes start/stop transitions.
    running: Mutex<Option<watch::Sender<bool>>>,

    /// Reports an unrecoverable acquisition failure to the server
    fatal_tx: watch::Sender<Option<CaptureError>>,
}

impl CaptureWorker {
    /// Create a worker; the capture device is acquired lazily on each start
    pub fn new(factory: impl SourceFactory, frame_interval: Duration) -> Self {
        let (fatal_tx, _) = watch::channel(None);
        Self {
            shared: Arc::new(Shared {
                factory: Box::new(factory),
                frame_interval,
                running: Mutex::new(None),
                fatal_tx,
            }),
        }
    }

    /// Start the capture cycle, fanning frames out through `registry`
    ///
    /// No-op if already running. Device acquisition happens inside the
    /// spawned task; if it fails, the failure is reported on the fatal
    /// channel and the worker returns to Idle.
    pub fn start(&self, registry: Arc<SessionRegistry>) {
        let mut running = self.shared.running.lock().unwrap();
        if running.is_some() {
            return;
        }

        let (stop_tx, stop_rx) = watch::channel(false);
        *running = Some(stop_tx);
        drop(running);

        tracing::info!("Starting capture loop");

        let shared = Arc::clone(&self.shared);
        tokio::spawn(async move {
            run_cycle(shared, registry, stop_rx).await;
        });
    }

    /// Signal the running cycle to terminate after its current iteration
    ///
    /// No-op if already idle. Does not wait for the cycle to finish; the
    /// stop signal is observed before the next capture begins.
    pub fn stop(&self) {
        let stop_tx = self.shared.running.lock().unwrap().take();
        if let Some(stop_tx) = stop_tx {
            let _ = stop_tx.send(true);
            tracing::info!("Stopping capture loop");
        }
    }

    /// Whether a capture cycle is currently running (or starting up)
    pub fn is_running(&self) -> bool {
        self.shared.running.lock().unwrap().is_some()
    }

    /// Subscribe to fatal capture-layer failures
    ///
    /// The value becomes `Some` at most once, when device acquisition fails
    /// at loop start. The server treats this as an unrecoverable error.
    pub fn fatal(&self) -> watch::Receiver<Option<CaptureError>> {
        self.shared.fatal_tx.subscribe()
    }
}

async fn run_cycle(
    shared: Arc<Shared>,
    registry: Arc<SessionRegistry>,
    mut stop_rx: watch::Receiver<bool>,
) {
    let mut source = match shared.factory.acquire() {
        Ok(source) => source,
        Err(e) => {
            tracing::error!(error = %e, "Capture device acquisition failed");
            {
                // A stop()+start() pair may have raced in during a slow
                // acquire; the slot then belongs to the newer cycle and
                // must be left alone.
                let mut running = shared.running.lock().unwrap();
                let owns_slot = running
                    .as_ref()
                    .map_or(false, |tx| stop_rx.same_channel(&tx.subscribe()));
                if owns_slot {
                    *running = None;
                }
            }
            let _ = shared.fatal_tx.send_replace(Some(e));
            return;
        }
    };

    tracing::info!("Capture loop running");

    let mut seq: u64 = 0;
    loop {
        if *stop_rx.borrow() {
            break;
        }

        match source.capture_frame() {
            Ok(data) => {
                let frame = Frame::new(seq, data);
                seq += 1;
                registry.fan_out(&frame).await;
            }
            Err(e) => {
                // One bad frame never takes the broadcast down.
                tracing::warn!(error = %e, "Capture failed, skipping frame");
            }
        }

        if shared.frame_interval.is_zero() {
            tokio::task::yield_now().await;
        } else {
            tokio::select! {
                _ = stop_rx.changed() => {}
                _ = tokio::time::sleep(shared.frame_interval) => {}
            }
        }
    }

    tracing::info!(frames = seq, "Capture loop stopped");
}
