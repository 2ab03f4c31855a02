// src/core/cluster/sm_reporter.rs

//! SM reporting: whenever a `change_reason` string is
//! non-empty, serialize the vault prefix and send it to SM via the SM
//! socket. Modeled as a fire-and-forget
//! send over a persistent connection with reconnect-on-failure), adapted
//! from Pub/Sub to a raw binary socket.

use super::vault::ClusterVault;
use crate::core::errors::MtceError;
use async_trait::async_trait;
use std::net::SocketAddr;
use tokio::net::UdpSocket;
use tracing::{debug, warn};

#[async_trait]
pub trait SmSocket: Send + Sync {
    async fn send(&self, payload: &[u8]) -> Result<(), MtceError>;
}

pub struct SmReporter<S: SmSocket> {
    socket: S,
}

impl<S: SmSocket> SmReporter<S> {
    pub fn new(socket: S) -> Self {
        Self { socket }
    }

    /// Sends the vault's valid-histories prefix if `change_reason` is
    /// non-empty. No-op otherwise.
    pub async fn report_if_changed(&self, vault: &ClusterVault, change_reason: &str) {
        if change_reason.is_empty() {
            return;
        }
        self.send_payload(&vault.serialize_prefix(), change_reason).await;
    }

    /// Same as `report_if_changed`, but takes an already-serialized
    /// payload. Lets a caller release the vault's lock before the socket
    /// `.await`, since a held `parking_lot::MutexGuard` would make the
    /// enclosing task's future non-`Send`.
    pub async fn send_payload(&self, payload: &[u8], change_reason: &str) {
        if change_reason.is_empty() {
            return;
        }
        debug!(
            "reporting cluster view to SM ({} bytes, reason: {})",
            payload.len(),
            change_reason
        );
        if let Err(e) = self.socket.send(payload).await {
            warn!("failed to deliver cluster view to SM: {}", e);
        }
    }
}

/// Production `SmSocket`: a UDP datagram fired at SM's loopback listener.
/// Fire-and-forget, matching the source's raw binary push — SM is expected
/// to re-request the vault on its own next heartbeat if a datagram is lost.
pub struct UdpSmSocket {
    socket: UdpSocket,
    target: SocketAddr,
}

impl UdpSmSocket {
    pub async fn bind(target: SocketAddr) -> Result<Self, MtceError> {
        let bind_addr: SocketAddr = if target.is_ipv4() {
            "0.0.0.0:0".parse().unwrap()
        } else {
            "[::]:0".parse().unwrap()
        };
        let socket = UdpSocket::bind(bind_addr).await?;
        Ok(Self { socket, target })
    }
}

#[async_trait]
impl SmSocket for UdpSmSocket {
    async fn send(&self, payload: &[u8]) -> Result<(), MtceError> {
        self.socket.send_to(payload, self.target).await?;
        Ok(())
    }
}
