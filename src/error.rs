//! Crate-wide error type
//!
//! Only two things can take the server down: an I/O failure on the listener
//! itself and a capture-device acquisition failure at loop start. Everything
//! else (accept errors, per-frame capture errors, per-session delivery and
//! close errors) is recovered locally and surfaced through logging.

use crate::capture::CaptureError;

/// Error type for server-level operations
#[derive(Debug)]
pub enum Error {
    /// I/O error (binding or accepting on the listener)
    Io(std::io::Error),
    /// Capture-layer failure that the capture loop could not recover from
    Capture(CaptureError),
}

/// Result alias using the crate error type
pub type Result<T> = std::result::Result<T, Error>;

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Io(e) => write!(f, "I/O error: {}", e),
            Error::Capture(e) => write!(f, "capture error: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            Error::Capture(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<CaptureError> for Error {
    fn from(e: CaptureError) -> Self {
        Error::Capture(e)
    }
}
