//! Viewer-side protocol client
//!
//! A thin protocol-level client: connect, pull length-framed frames, send
//! commands. Rendering the frames is out of scope; callers hand the decoded
//! payloads to whatever displays them.

use std::io;

use bytes::Bytes;
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpStream, ToSocketAddrs};

use crate::protocol::{framing, Command};

/// Connection to a broadcast server, seen from the viewer side
pub struct Viewer {
    stream: TcpStream,
}

impl Viewer {
    /// Connect to a broadcast server
    pub async fn connect(addr: impl ToSocketAddrs) -> io::Result<Self> {
        let stream = TcpStream::connect(addr).await?;
        stream.set_nodelay(true)?;
        Ok(Self { stream })
    }

    /// Receive the next frame payload
    ///
    /// Blocks until a full frame arrives. An error (including EOF) means the
    /// session is over.
    pub async fn next_frame(&mut self) -> io::Result<Bytes> {
        framing::read_frame(&mut self.stream).await
    }

    /// Send a command line to the server
    pub async fn send_command(&mut self, command: Command) -> io::Result<()> {
        self.stream.write_all(command.as_str().as_bytes()).await?;
        self.stream.write_all(b"\n").await?;
        self.stream.flush().await
    }

    /// Politely end the session
    ///
    /// Sends `DISCONNECT` and shuts the connection down.
    pub async fn disconnect(mut self) -> io::Result<()> {
        self.send_command(Command::Disconnect).await?;
        self.stream.shutdown().await
    }
}

impl std::fmt::Debug for Viewer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Viewer")
            .field("peer", &self.stream.peer_addr().ok())
            .finish()
    }
}
