// src/core/message_plane/udp.rs

//! Non-blocking UDP send/receive helpers, one per network interface
//! (management, cluster-host, pxeboot), plus a loopback receiver for
//! local process-monitor pulses. The engine never blocks on
//! an individual socket; callers drive these from the
//! `tokio::select!` in the engine's main loop rather than awaiting them in
//! isolation.

use crate::core::errors::MtceError;
use std::net::SocketAddr;
use tokio::net::UdpSocket;

/// Fixed header tags byte-compared against inbound datagrams on non-pulse
/// channels.
pub mod header_tag {
    pub const EVENT: &[u8] = b"mtce event:";
    pub const LOOPBACK: &[u8] = b"mtce loop:";
    pub const WORKER: &[u8] = b"mtce work:";
    pub const INFO: &[u8] = b"mtce info:";
}

pub struct IfaceSocket {
    pub name: &'static str,
    socket: UdpSocket,
}

impl IfaceSocket {
    pub async fn bind(name: &'static str, addr: SocketAddr) -> Result<Self, MtceError> {
        let socket = UdpSocket::bind(addr).await?;
        Ok(Self { name, socket })
    }

    /// Joins a multicast group on this interface (used by the agent side
    /// of the heartbeat pulse engine).
    pub fn join_multicast_v4(
        &self,
        multiaddr: std::net::Ipv4Addr,
        interface: std::net::Ipv4Addr,
    ) -> Result<(), MtceError> {
        self.socket
            .join_multicast_v4(multiaddr, interface)
            .map_err(MtceError::from)
    }

    pub async fn send_to(&self, buf: &[u8], target: SocketAddr) -> Result<usize, MtceError> {
        self.socket.send_to(buf, target).await.map_err(MtceError::from)
    }

    /// Non-blocking receive: returns `Ok(None)` immediately if nothing is
    /// pending rather than awaiting, so the engine's select loop stays the
    /// only suspension point.
    pub fn try_recv(&self, buf: &mut [u8]) -> Result<Option<(usize, SocketAddr)>, MtceError> {
        match self.socket.try_recv_from(buf) {
            Ok((n, from)) => Ok(Some((n, from))),
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => Ok(None),
            Err(e) => Err(MtceError::from(e)),
        }
    }

    /// Async receive, suitable for use as one arm of the engine's
    /// `tokio::select!` alongside the other interface sockets and timers.
    pub async fn recv(&self, buf: &mut [u8]) -> Result<(usize, SocketAddr), MtceError> {
        self.socket.recv_from(buf).await.map_err(MtceError::from)
    }
}
