//! Per-session delivery statistics

use std::sync::atomic::{AtomicU64, Ordering};

/// Snapshot of one session's delivery statistics
#[derive(Debug, Clone, Default)]
pub struct SessionStats {
    /// Frames written in full to the viewer
    pub frames_sent: u64,
    /// Frames dropped because the session was busy or closed
    pub frames_dropped: u64,
    /// Bytes put on the wire, length prefixes included
    pub bytes_sent: u64,
    /// Current consecutive delivery-failure streak
    pub consecutive_failures: u32,
}

/// Live counters behind a session's [`SessionStats`] snapshots
#[derive(Debug, Default)]
pub(crate) struct SessionCounters {
    frames_sent: AtomicU64,
    frames_dropped: AtomicU64,
    bytes_sent: AtomicU64,
}

impl SessionCounters {
    pub(crate) fn frame_sent(&self, bytes: u64) {
        self.frames_sent.fetch_add(1, Ordering::Relaxed);
        self.bytes_sent.fetch_add(bytes, Ordering::Relaxed);
    }

    pub(crate) fn frame_dropped(&self) {
        self.frames_dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self, consecutive_failures: u32) -> SessionStats {
        SessionStats {
            frames_sent: self.frames_sent.load(Ordering::Relaxed),
            frames_dropped: self.frames_dropped.load(Ordering::Relaxed),
            bytes_sent: self.bytes_sent.load(Ordering::Relaxed),
            consecutive_failures,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_snapshot() {
        let counters = SessionCounters::default();
        counters.frame_sent(100);
        counters.frame_sent(50);
        counters.frame_dropped();

        let stats = counters.snapshot(3);
        assert_eq!(stats.frames_sent, 2);
        assert_eq!(stats.frames_dropped, 1);
        assert_eq!(stats.bytes_sent, 150);
        assert_eq!(stats.consecutive_failures, 3);
    }
}
