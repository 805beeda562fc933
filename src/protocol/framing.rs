//! Length-delimited frame encoding
//!
//! Each frame on the wire is a 4-byte big-endian length prefix followed by
//! the encoded image bytes, so the receiver can find message boundaries
//! without parsing the image format.

use std::io;

use bytes::Bytes;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::registry::Frame;

/// Size of the length prefix in bytes
pub const HEADER_LEN: usize = 4;

/// Upper bound on a single frame payload
///
/// An encoded screen frame is at most a few megabytes; anything near this
/// limit on the read side means a corrupt or hostile stream.
pub const MAX_FRAME_LEN: usize = 64 * 1024 * 1024;

/// Write one length-prefixed frame to the transport
pub async fn write_frame<W>(writer: &mut W, frame: &Frame) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    if frame.data.len() > MAX_FRAME_LEN {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "frame exceeds maximum length",
        ));
    }

    writer.write_u32(frame.data.len() as u32).await?;
    writer.write_all(&frame.data).await?;
    writer.flush().await
}

/// Read one length-prefixed frame payload from the transport
pub async fn read_frame<R>(reader: &mut R) -> io::Result<Bytes>
where
    R: AsyncRead + Unpin,
{
    let len = reader.read_u32().await? as usize;

    if len > MAX_FRAME_LEN {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("declared frame length {} exceeds maximum", len),
        ));
    }

    let mut buf = vec![0u8; len];
    reader.read_exact(&mut buf).await?;
    Ok(Bytes::from(buf))
}
