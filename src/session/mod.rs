//! Viewer session lifecycle
//!
//! One [`Session`] exists per accepted connection and solely owns its
//! transport. Two tasks serve it: an inbound reader consuming newline
//! commands for the life of the session, and at most one in-flight outbound
//! delivery task at a time, guarded by the busy flag.
//!
//! Nothing a single session does (slow writes, write failures, a failing
//! close) ever propagates past it to the acceptor, the capture loop, or
//! other sessions.

pub mod delivery;
pub mod handle;
pub(crate) mod reader;

pub use delivery::DeliveryOutcome;
pub use handle::Session;
