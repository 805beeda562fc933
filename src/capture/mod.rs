//! Screen capture loop
//!
//! The capture+encode primitive itself is an external collaborator: anything
//! implementing [`FrameSource`] can feed the broadcast (a real screen
//! grabber, a test pattern, a video file). The [`CaptureWorker`] owns the
//! loop around it and runs only while at least one viewer session exists.

pub mod source;
pub mod worker;

pub use source::{BoxedSource, CaptureError, FrameSource, SourceFactory};
pub use worker::CaptureWorker;
