//! Resolver configuration.

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

/// Where to send queries and how long to wait for them.
///
/// The nameserver is always given; nothing is read from the system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverConfig {
    /// The nameserver to query.
    server: SocketAddr,

    /// How long to wait for the response.
    timeout: Duration,

    /// The largest response we are willing to read.
    buffer_size: usize,

    /// Whether the server is asked to recurse for us.
    recursion_desired: bool,
}

impl ResolverConfig {
    /// The well-known DNS port.
    pub const DEFAULT_PORT: u16 = 53;

    /// How long to wait for a response unless told otherwise.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

    /// The default receive buffer size.
    pub const DEFAULT_BUFFER_SIZE: usize = 4096;

    /// The smallest receive buffer we allow; every DNS server may send this much over UDP.
    pub const MIN_BUFFER_SIZE: usize = 512;

    /// Query `server` on port 53 with the default settings.
    pub fn new(server: IpAddr) -> Self {
        Self::from(SocketAddr::new(server, Self::DEFAULT_PORT))
    }

    /// Use a different port on the same server.
    pub fn with_port(mut self, port: u16) -> Self {
        self.server.set_port(port);
        self
    }

    /// Wait this long for a response.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Read responses of up to `buffer_size` bytes, but never less than 512.
    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size.max(Self::MIN_BUFFER_SIZE);
        self
    }

    /// Ask the server to recurse on our behalf.
    ///
    /// Off by default, which makes for an iterative query.
    pub fn with_recursion_desired(mut self, recursion_desired: bool) -> Self {
        self.recursion_desired = recursion_desired;
        self
    }

    /// The nameserver to query.
    pub fn server(&self) -> SocketAddr {
        self.server
    }

    /// How long to wait for a response.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// The largest response we read.
    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }

    /// Whether recursion is requested.
    pub fn recursion_desired(&self) -> bool {
        self.recursion_desired
    }
}

impl From<SocketAddr> for ResolverConfig {
    fn from(server: SocketAddr) -> Self {
        Self {
            server,
            timeout: Self::DEFAULT_TIMEOUT,
            buffer_size: Self::DEFAULT_BUFFER_SIZE,
            recursion_desired: false,
        }
    }
}
