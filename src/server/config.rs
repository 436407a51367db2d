//! Server configuration.

use std::net::{Ipv4Addr, SocketAddr};

/// HTTP server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// The address to bind to.
    pub addr: SocketAddr,
    /// The maximum number of concurrent connections.
    pub max_connections: usize,
    /// The read buffer size; one read of this size makes up a whole request.
    pub read_buffer_size: usize,
}

impl ServerConfig {
    /// Default configuration listening on `addr`.
    pub fn with_addr(addr: SocketAddr) -> Self {
        Self { addr, ..Self::default() }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from((Ipv4Addr::LOCALHOST, 5000)),
            max_connections: 1024,
            read_buffer_size: 8192,
        }
    }
}
