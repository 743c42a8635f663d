//! Configuration options for the relay transport

use std::net::SocketAddr;
use std::time::Duration;

/// Default port the bridge dials
pub const DEFAULT_PORT: u16 = 5511;

/// Largest response the bridge can forward: 256 data bytes plus SW1 SW2
pub const DEFAULT_MAX_RESPONSE_LEN: usize = 258;

/// Configuration options for the relay transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayConfig {
    /// Address the listener binds to
    pub bind: SocketAddr,

    /// Size of the buffer a response is read into
    pub max_response_len: usize,

    /// Read timeout on the bridge connection, none by default
    pub read_timeout: Option<Duration>,

    /// Write timeout on the bridge connection, none by default
    pub write_timeout: Option<Duration>,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)),
            max_response_len: DEFAULT_MAX_RESPONSE_LEN,
            read_timeout: None,
            write_timeout: None,
        }
    }
}

impl RelayConfig {
    /// Create a new default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the bind address
    pub const fn with_bind(mut self, bind: SocketAddr) -> Self {
        self.bind = bind;
        self
    }

    /// Set the response buffer size
    pub const fn with_max_response_len(mut self, len: usize) -> Self {
        self.max_response_len = len;
        self
    }

    /// Set the read timeout
    pub const fn with_read_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// Set the write timeout
    pub const fn with_write_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.write_timeout = timeout;
        self
    }
}
