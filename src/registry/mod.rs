//! Live session registry and frame fan-out
//!
//! The registry is the authoritative set of connected viewer sessions and
//! the single point where frames fan out to all of them. Membership changes
//! are the sole trigger for capture-loop start/stop decisions: the registry
//! is non-empty exactly while the capture loop is running (modulo the brief
//! window between the decision and the loop task reacting).
//!
//! # Fan-Out
//!
//! Fan-out snapshots the session set under the lock, then delivers outside
//! it. Individual deliveries are spawned tasks, so a slow viewer only drops
//! frames; it never holds up other viewers, registry mutation, or capture.

pub mod frame;
pub mod store;

pub use frame::Frame;
pub use store::SessionRegistry;
