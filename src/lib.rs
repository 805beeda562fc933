//! Live screen-broadcast server library
//!
//! One producer captures the host display and fans encoded frames out to any
//! number of connected viewers over TCP. A slow or dead viewer never stalls
//! capture or the other viewers: a session that still has a delivery in
//! flight simply drops the incoming frame, and a session that fails too many
//! deliveries in a row is disconnected.
//!
//! # Architecture
//!
//! ```text
//!   [Acceptor]──accept──► Session ──register──► Arc<SessionRegistry>
//!                            │                        │
//!                            │ inbound reader         │ empty ⇄ non-empty
//!                            │ (DISCONNECT / EOF)     ▼
//!                            │                  CaptureWorker
//!                            │                  capture_frame()
//!                            ▼                        │
//!                         close() ◄─threshold─┐       ▼
//!                                             │  registry.fan_out(frame)
//!                                             │       │
//!                                  Session::deliver ◄─┘ (one task per
//!                                  length-framed TCP write  session, busy
//!                                                           sessions drop)
//! ```
//!
//! # Zero-Copy Fan-Out
//!
//! Frame payloads are `bytes::Bytes`: every concurrent delivery task shares
//! the same reference-counted allocation, so fanning a frame out to N viewers
//! clones a handle, never the pixels.
//!
//! The capture loop runs only while at least one session is registered; the
//! first registration starts it and the last deregistration stops it.

pub mod capture;
pub mod client;
pub mod error;
pub mod protocol;
pub mod registry;
pub mod server;
pub mod session;
pub mod stats;

pub use capture::{BoxedSource, CaptureError, CaptureWorker, FrameSource, SourceFactory};
pub use client::Viewer;
pub use error::{Error, Result};
pub use registry::{Frame, SessionRegistry};
pub use server::{BroadcastServer, ServerConfig};
pub use session::Session;
pub use stats::SessionStats;
