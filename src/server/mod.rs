//! Broadcast server
//!
//! Ties the pieces together: the acceptor loop turns inbound TCP connections
//! into registered sessions, and the registry gates the capture worker on
//! the number of live sessions.

pub mod config;
pub mod listener;

pub use config::ServerConfig;
pub use listener::BroadcastServer;
