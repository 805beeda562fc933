//! Inbound command reader
//!
//! One reader task per session, alive for the session's whole life. It
//! consumes newline-terminated commands from the viewer; a `DISCONNECT`
//! command, a read error, or EOF all end the session. The task also watches
//! the session's close signal so a close initiated elsewhere (delivery
//! failure threshold) unblocks it immediately.

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::tcp::OwnedReadHalf;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::handle::Session;
use crate::protocol::Command;

pub(crate) fn spawn(
    session: Arc<Session>,
    read_half: OwnedReadHalf,
    mut closed_rx: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut lines = BufReader::new(read_half).lines();

        loop {
            tokio::select! {
                _ = closed_rx.changed() => {
                    // Session closed by another path; nothing left to read.
                    break;
                }
                line = lines.next_line() => match line {
                    Ok(Some(line)) => match Command::parse(&line) {
                        Some(Command::Disconnect) => {
                            tracing::info!(
                                session_id = session.id(),
                                "Viewer requested disconnect"
                            );
                            if let Err(e) = session.close().await {
                                tracing::warn!(
                                    session_id = session.id(),
                                    error = %e,
                                    "Transport shutdown failed on disconnect"
                                );
                            }
                            break;
                        }
                        None => {
                            tracing::trace!(
                                session_id = session.id(),
                                line = %line,
                                "Ignoring unrecognized command"
                            );
                        }
                    },
                    Ok(None) => {
                        tracing::debug!(session_id = session.id(), "Viewer connection ended");
                        if let Err(e) = session.close().await {
                            tracing::debug!(session_id = session.id(), error = %e, "Transport shutdown failed");
                        }
                        break;
                    }
                    Err(e) => {
                        tracing::debug!(
                            session_id = session.id(),
                            error = %e,
                            "Read failed, treating as disconnect"
                        );
                        if let Err(e) = session.close().await {
                            tracing::debug!(session_id = session.id(), error = %e, "Transport shutdown failed");
                        }
                        break;
                    }
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::io::AsyncWriteExt;
    use tokio::net::{TcpListener, TcpStream};

    use super::*;
    use crate::capture::{BoxedSource, CaptureError, CaptureWorker};
    use crate::registry::SessionRegistry;

    async fn reader_session() -> (Arc<SessionRegistry>, Arc<Session>, TcpStream, JoinHandle<()>) {
        let factory = || -> Result<BoxedSource, CaptureError> {
            Err(CaptureError::Acquire("no capture in reader tests".into()))
        };
        let registry = Arc::new(SessionRegistry::new(CaptureWorker::new(
            factory,
            Duration::from_secs(3600),
        )));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let viewer = TcpStream::connect(listener.local_addr().unwrap())
            .await
            .unwrap();
        let (socket, peer_addr) = listener.accept().await.unwrap();
        let (read_half, write_half) = socket.into_split();

        let session = Arc::new(Session::new(
            1,
            peer_addr,
            write_half,
            Arc::clone(&registry),
            10,
        ));
        let closed_rx = session.subscribe_close();
        registry.register(Arc::clone(&session)).await;
        let handle = spawn(Arc::clone(&session), read_half, closed_rx);

        (registry, session, viewer, handle)
    }

    #[tokio::test]
    async fn test_disconnect_command_closes_session() {
        let (registry, session, mut viewer, handle) = reader_session().await;

        viewer.write_all(b"DISCONNECT\n").await.unwrap();
        handle.await.unwrap();

        assert!(session.is_closed());
        assert!(!registry.contains(1).await);
    }

    #[tokio::test]
    async fn test_unknown_commands_are_ignored() {
        let (registry, session, mut viewer, handle) = reader_session().await;

        viewer.write_all(b"PING\nWHATEVER 1 2\n").await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!session.is_closed());
        assert!(registry.contains(1).await);

        viewer.write_all(b"DISCONNECT\n").await.unwrap();
        handle.await.unwrap();
        assert!(session.is_closed());
    }

    #[tokio::test]
    async fn test_eof_treated_as_disconnect() {
        let (registry, session, viewer, handle) = reader_session().await;

        drop(viewer);
        handle.await.unwrap();

        assert!(session.is_closed());
        assert!(!registry.contains(1).await);
    }

    #[tokio::test]
    async fn test_external_close_unblocks_reader() {
        let (_registry, session, _viewer, handle) = reader_session().await;

        // No inbound data at all; only the close signal can end the task.
        session.close().await.unwrap();
        handle.await.unwrap();
    }
}
