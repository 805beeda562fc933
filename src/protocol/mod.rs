//! Wire protocol between server and viewers
//!
//! The two directions use different encodings over the same persistent TCP
//! connection:
//!
//! - Server → viewer: repeated frames, each a 4-byte big-endian length prefix
//!   followed by that many bytes of encoded image data. No acknowledgement.
//! - Viewer → server: newline-terminated ASCII text commands. The only
//!   recognized command is `DISCONNECT`; anything else is ignored so that
//!   future commands stay forward-compatible.

pub mod command;
pub mod framing;

pub use command::Command;
pub use framing::{read_frame, write_frame, HEADER_LEN, MAX_FRAME_LEN};
