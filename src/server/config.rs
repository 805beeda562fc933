//! Server configuration

use std::net::SocketAddr;
use std::time::Duration;

/// Consecutive delivery failures after which a session is disconnected
pub const DEFAULT_FAILURE_LIMIT: u32 = 10;

/// Server configuration options
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to
    pub bind_addr: SocketAddr,

    /// Enable TCP_NODELAY (disable Nagle's algorithm)
    pub tcp_nodelay: bool,

    /// Delay between capture cycles
    ///
    /// Zero (the default) runs the loop as fast as capture and encode
    /// permit. Setting an interval caps the frame rate; that cap is an
    /// enhancement, not a correctness requirement.
    pub frame_interval: Duration,

    /// Consecutive delivery failures before a session is force-closed
    pub delivery_failure_limit: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:12345".parse().unwrap(),
            tcp_nodelay: true, // Frames should not sit in Nagle buffers
            frame_interval: Duration::ZERO,
            delivery_failure_limit: DEFAULT_FAILURE_LIMIT,
        }
    }
}

impl ServerConfig {
    /// Create a new config with custom bind address
    pub fn with_addr(addr: SocketAddr) -> Self {
        Self {
            bind_addr: addr,
            ..Default::default()
        }
    }

    /// Set the bind address
    pub fn bind(mut self, addr: SocketAddr) -> Self {
        self.bind_addr = addr;
        self
    }

    /// Set the capture interval
    pub fn frame_interval(mut self, interval: Duration) -> Self {
        self.frame_interval = interval;
        self
    }

    /// Set the delivery failure limit (must be at least 1)
    pub fn delivery_failure_limit(mut self, limit: u32) -> Self {
        self.delivery_failure_limit = limit.max(1);
        self
    }

    /// Disable TCP_NODELAY
    pub fn disable_nodelay(mut self) -> Self {
        self.tcp_nodelay = false;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();

        assert_eq!(config.bind_addr.port(), 12345);
        assert!(config.tcp_nodelay);
        assert_eq!(config.frame_interval, Duration::ZERO);
        assert_eq!(config.delivery_failure_limit, DEFAULT_FAILURE_LIMIT);
    }

    #[test]
    fn test_with_addr() {
        let addr: SocketAddr = "127.0.0.1:9000".parse().unwrap();
        let config = ServerConfig::with_addr(addr);

        assert_eq!(config.bind_addr, addr);
    }

    #[test]
    fn test_failure_limit_floor() {
        let config = ServerConfig::default().delivery_failure_limit(0);

        assert_eq!(config.delivery_failure_limit, 1);
    }

    #[test]
    fn test_builder_chaining() {
        let addr: SocketAddr = "127.0.0.1:12346".parse().unwrap();
        let config = ServerConfig::default()
            .bind(addr)
            .frame_interval(Duration::from_millis(33))
            .delivery_failure_limit(5)
            .disable_nodelay();

        assert_eq!(config.bind_addr, addr);
        assert_eq!(config.frame_interval, Duration::from_millis(33));
        assert_eq!(config.delivery_failure_limit, 5);
        assert!(!config.tcp_nodelay);
    }
}
