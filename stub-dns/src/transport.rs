//! Carrying a query to the nameserver and the response back.

use async_io::{Async, Timer};
use futures_lite::future;

use std::io;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr, UdpSocket};
use std::time::Duration;

/// The result of waiting for a packet on a fixed timeout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WaitResult {
    /// A datagram arrived.
    Packet(Vec<u8>),

    /// The timeout expired first.
    TimedOut,
}

/// A datagram transport that can carry one query and its response.
pub trait Transport {
    /// Send `bytes` to `dest`.
    fn send(&mut self, bytes: &[u8], dest: SocketAddr) -> io::Result<()>;

    /// Wait up to `timeout` for a datagram of at most `capacity` bytes.
    ///
    /// Datagrams longer than `capacity` are cut short.
    fn receive(&mut self, capacity: usize, timeout: Duration) -> io::Result<WaitResult>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn send(&mut self, bytes: &[u8], dest: SocketAddr) -> io::Result<()> {
        (**self).send(bytes, dest)
    }

    fn receive(&mut self, capacity: usize, timeout: Duration) -> io::Result<WaitResult> {
        (**self).receive(capacity, timeout)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn send(&mut self, bytes: &[u8], dest: SocketAddr) -> io::Result<()> {
        (**self).send(bytes, dest)
    }

    fn receive(&mut self, capacity: usize, timeout: Duration) -> io::Result<WaitResult> {
        (**self).receive(capacity, timeout)
    }
}

/// A UDP socket on an ephemeral local port.
///
/// The socket is closed when the transport is dropped.
#[derive(Debug)]
pub struct UdpTransport {
    socket: Async<UdpSocket>,
}

impl UdpTransport {
    /// Bind a socket that can reach `server`, on the unspecified address of the same family.
    pub fn bind_for(server: SocketAddr) -> io::Result<Self> {
        let local: SocketAddr = match server {
            SocketAddr::V4(_) => (Ipv4Addr::UNSPECIFIED, 0).into(),
            SocketAddr::V6(_) => (Ipv6Addr::UNSPECIFIED, 0).into(),
        };

        Self::bind(local)
    }

    /// Bind a socket to `local`.
    pub fn bind(local: SocketAddr) -> io::Result<Self> {
        Ok(Self {
            socket: Async::<UdpSocket>::bind(local)?,
        })
    }

    /// Get the address the socket is bound to.
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.get_ref().local_addr()
    }
}

impl Transport for UdpTransport {
    fn send(&mut self, bytes: &[u8], dest: SocketAddr) -> io::Result<()> {
        async_io::block_on(self.socket.send_to(bytes, dest)).map(drop)
    }

    fn receive(&mut self, capacity: usize, timeout: Duration) -> io::Result<WaitResult> {
        /// What happened first.
        enum Wait {
            Packet(usize),
            TimedOut,
        }

        let mut buf = vec![0; capacity];
        let socket = &self.socket;

        let wait = async_io::block_on(future::or(
            async { socket.recv_from(&mut buf).await.map(|(len, _)| Wait::Packet(len)) },
            async {
                Timer::after(timeout).await;
                Ok(Wait::TimedOut)
            },
        ))?;

        match wait {
            Wait::Packet(len) => {
                buf.truncate(len);
                Ok(WaitResult::Packet(buf))
            }
            Wait::TimedOut => Ok(WaitResult::TimedOut),
        }
    }
}
