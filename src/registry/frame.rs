//! Broadcast frame type

use bytes::Bytes;

/// One captured, encoded screen frame
///
/// Immutable after creation and cheap to clone: the payload is
/// reference-counted, so every concurrent delivery shares one allocation.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Capture sequence number within the current loop run
    pub seq: u64,
    /// Encoded image bytes
    pub data: Bytes,
}

impl Frame {
    /// Create a new frame
    pub fn new(seq: u64, data: impl Into<Bytes>) -> Self {
        Self {
            seq,
            data: data.into(),
        }
    }

    /// Payload size in bytes
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the payload is empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
