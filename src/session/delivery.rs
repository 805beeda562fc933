//! Outbound frame delivery
//!
//! One delivery is one attempt to write one frame to one session's
//! transport. The attempt collapses to a single outcome value consumed by
//! the session's bookkeeping; no outcome is ever silently discarded.

use std::io;

use tokio::net::tcp::OwnedWriteHalf;

use crate::protocol::framing;
use crate::registry::Frame;

/// Result of a single delivery attempt
#[derive(Debug)]
pub enum DeliveryOutcome {
    /// Frame written in full
    Delivered {
        /// Bytes put on the wire, including the length prefix
        bytes: usize,
    },
    /// Session closed before the write could start; the frame is dropped
    SessionClosed,
    /// The write failed
    Failed(io::Error),
}

/// Write one length-framed payload to the session's transport
pub(crate) async fn send(writer: Option<&mut OwnedWriteHalf>, frame: &Frame) -> DeliveryOutcome {
    let Some(writer) = writer else {
        return DeliveryOutcome::SessionClosed;
    };

    match framing::write_frame(writer, frame).await {
        Ok(()) => DeliveryOutcome::Delivered {
            bytes: framing::HEADER_LEN + frame.len(),
        },
        Err(e) => DeliveryOutcome::Failed(e),
    }
}
