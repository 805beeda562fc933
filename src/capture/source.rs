//! Frame source abstraction
//!
//! A frame source is the opaque "capture a still image of the display and
//! encode it" step. The broadcast engine never looks inside the bytes it
//! produces; they go out to viewers exactly as returned.

use bytes::Bytes;

/// Error raised by the capture layer
///
/// The two variants have very different blast radii: an acquisition failure
/// at loop start is unrecoverable and takes the server down, while a
/// per-frame failure is logged and the iteration skipped.
#[derive(Debug, Clone)]
pub enum CaptureError {
    /// One-time capture-device acquisition failed
    Acquire(String),
    /// A single capture or encode attempt failed
    Frame(String),
}

impl std::fmt::Display for CaptureError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CaptureError::Acquire(msg) => write!(f, "failed to acquire capture device: {}", msg),
            CaptureError::Frame(msg) => write!(f, "failed to capture frame: {}", msg),
        }
    }
}

impl std::error::Error for CaptureError {}

/// An acquired capture device producing encoded frames on demand
pub trait FrameSource: Send {
    /// Capture one frame of the display and encode it
    fn capture_frame(&mut self) -> Result<Bytes, CaptureError>;
}

/// Boxed frame source, as handed out by a [`SourceFactory`]
pub type BoxedSource = Box<dyn FrameSource>;

/// Performs the one-time capture-device acquisition at loop start
///
/// The worker acquires a fresh source every time it transitions from Idle to
/// Running, so device handles are not held while nobody is watching.
/// Implemented for any matching closure.
pub trait SourceFactory: Send + Sync + 'static {
    /// Acquire the capture device
    fn acquire(&self) -> Result<BoxedSource, CaptureError>;
}

impl<F> SourceFactory for F
where
    F: Fn() -> Result<BoxedSource, CaptureError> + Send + Sync + 'static,
{
    fn acquire(&self) -> Result<BoxedSource, CaptureError> {
        self()
    }
}
