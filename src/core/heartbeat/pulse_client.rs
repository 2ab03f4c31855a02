// src/core/heartbeat/pulse_client.rs

//! Client side of the multicast pulse protocol: answers inbound requests
//! with the host's own hostname and learned lookup-clue (RRI), and relays
//! a copy of the peer controller's cluster vault payload when it has one
//! cached.

use crate::core::cluster::ClusterVault;
use crate::core::protocol::pulse_frame::PulseKind;
use crate::core::protocol::PulseMessage;
use std::collections::HashMap;
use std::time::{Duration, Instant};

const PEER_PAYLOAD_STALE_AFTER: Duration = Duration::from_secs(20);

#[derive(Default)]
struct ControllerView {
    rri: u32,
    last_request_seen: Option<Instant>,
}

pub struct PulseClient {
    hostname: String,
    controllers: HashMap<u8, ControllerView>,
}

impl PulseClient {
    pub fn new(hostname: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
            controllers: HashMap::new(),
        }
    }

    /// Handles one inbound request, returning the reply to send back. A
    /// request not addressed to this host (multicast fan-out to the whole
    /// subnet) still updates the per-controller "last seen" clock used to
    /// decide whether to relay a cluster vault payload, but the learned
    /// RRI is only adopted when the request explicitly names this host.
    pub fn handle_request(
        &mut self,
        request: &PulseMessage,
        vault: &ClusterVault,
    ) -> Option<PulseMessage> {
        if request.kind != PulseKind::Request {
            return None;
        }
        let controller = ((request.flags >> crate::core::constants::CTRLX_BIT) & 0x1) as u8;
        let view = self.controllers.entry(controller).or_default();
        view.last_request_seen = Some(Instant::now());

        if !request.hostname.is_empty() && request.hostname != self.hostname {
            return None;
        }
        if request.rri != 0 {
            view.rri = request.rri;
        }
        let rri = view.rri;

        let payload = self.relay_payload(controller, vault);
        Some(PulseMessage {
            kind: PulseKind::Reply,
            hostname: self.hostname.clone(),
            sequence: request.sequence,
            rri,
            flags: request.flags,
            version: request.version,
            cluster_payload: payload,
        })
    }

    /// Relays the peer controller's cached vault bytes back over this
    /// controller's network, but only while that controller has been
    /// heard from recently enough that the bytes are still meaningful.
    fn relay_payload(&self, controller: u8, vault: &ClusterVault) -> Option<bytes::Bytes> {
        let peer = 1 - controller;
        let peer_view = self.controllers.get(&peer)?;
        let seen = peer_view.last_request_seen?;
        if seen.elapsed() > PEER_PAYLOAD_STALE_AFTER {
            return None;
        }
        Some(bytes::Bytes::from(vault.serialize_prefix()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::cluster::ClusterVault;

    #[test]
    fn replies_only_when_addressed_or_broadcast() {
        let mut client = PulseClient::new("compute-0");
        let vault = ClusterVault::new(100, true);
        let req = PulseMessage {
            kind: PulseKind::Request,
            hostname: "compute-1".into(),
            sequence: 1,
            rri: 7,
            flags: 0,
            version: 1,
            cluster_payload: None,
        };
        assert!(client.handle_request(&req, &vault).is_none());
    }

    #[test]
    fn learns_rri_and_echoes_it() {
        let mut client = PulseClient::new("compute-0");
        let vault = ClusterVault::new(100, true);
        let req = PulseMessage {
            kind: PulseKind::Request,
            hostname: "compute-0".into(),
            sequence: 1,
            rri: 99,
            flags: 0,
            version: 1,
            cluster_payload: None,
        };
        let reply = client.handle_request(&req, &vault).unwrap();
        assert_eq!(reply.rri, 99);

        let req2 = PulseMessage {
            rri: 0,
            ..req
        };
        let reply2 = client.handle_request(&req2, &vault).unwrap();
        assert_eq!(reply2.rri, 99);
    }
}
