// src/core/heartbeat/pulse_agent.rs

//! Agent side of the multicast pulse engine: per period,
//! multicast a request on a provisioned network, track which hosts
//! responded, and close the period by marking outstanding hosts
//! "not responding" and accumulating consecutive-miss counters. Miss counts
//! crossing minor/major/fail thresholds are reported as `MissEvent`s for
//! the Host FSM to consume — this module never touches a `HostRecord`
//! directly.
//!
//! Structurally this mirrors a `run_tick_loop`
//! (a fixed-cadence timer driving a sequence of per-entity checks) with the
//! DashMap-of-master pattern flattened to one `HashMap` per network, since
//! a single agent instance owns exactly one network's pulse state.

use crate::core::protocol::pulse_frame::PulseKind;
use crate::core::protocol::PulseMessage;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy)]
pub struct PulseThresholds {
    pub minor: u32,
    pub major: u32,
    pub fail: u32,
}

impl Default for PulseThresholds {
    fn default() -> Self {
        Self {
            minor: 1,
            major: 4,
            fail: 8,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissEvent {
    Minor,
    Major,
    Fail,
}

#[derive(Debug, Clone, Default)]
struct HostPulseState {
    pending: bool,
    miss_count: u32,
    /// The RRI (lookup clue) cached per controller for this host, learned
    /// from the host's own replies and echoed on the next request.
    rri_by_controller: HashMap<u8, u32>,
}

pub struct PulseAgent {
    pub network: &'static str,
    pub controller_index: u8,
    thresholds: PulseThresholds,
    hosts: HashMap<String, HostPulseState>,
    sequence: u32,
}

impl PulseAgent {
    pub fn new(network: &'static str, controller_index: u8, thresholds: PulseThresholds) -> Self {
        Self {
            network,
            controller_index,
            thresholds,
            hosts: HashMap::new(),
            sequence: 0,
        }
    }

    pub fn monitor(&mut self, hostname: &str) {
        self.hosts.entry(hostname.to_string()).or_default();
    }

    pub fn unmonitor(&mut self, hostname: &str) {
        self.hosts.remove(hostname);
    }

    /// Builds the multicast request for the current period and marks every
    /// monitored host pending. The caller is responsible for the actual
    /// multicast send via `core::message_plane`.
    pub fn begin_period(&mut self) -> PulseMessage {
        self.sequence = self.sequence.wrapping_add(1);
        for state in self.hosts.values_mut() {
            state.pending = true;
        }
        PulseMessage {
            kind: PulseKind::Request,
            hostname: String::new(), // multicast request is not host-addressed
            sequence: self.sequence,
            rri: 0,
            flags: (self.controller_index as u32) << crate::core::constants::CTRLX_BIT,
            version: 1,
            cluster_payload: None,
        }
    }

    /// Processes one reply datagram: clears the pending flag for the
    /// replying host and learns its RRI for this controller.
    pub fn handle_reply(&mut self, reply: &PulseMessage) {
        if reply.kind != PulseKind::Reply {
            return;
        }
        if let Some(state) = self.hosts.get_mut(&reply.hostname) {
            state.pending = false;
            state.miss_count = 0;
            state
                .rri_by_controller
                .insert(self.controller_index, reply.rri);
        }
    }

    pub fn rri_for(&self, hostname: &str) -> Option<u32> {
        self.hosts
            .get(hostname)
            .and_then(|s| s.rri_by_controller.get(&self.controller_index))
            .copied()
    }

    /// Closes the period: any host still pending didn't reply. Returns the
    /// list of (hostname, miss_event) crossings for the engine to act on.
    /// Hosts that keep missing without crossing a new threshold are not
    /// reported again until the next higher threshold is crossed, matching
    /// the "signals the corresponding host FSM transition" wording — a
    /// transition fires once per threshold crossing, not once per period.
    pub fn close_period(&mut self) -> Vec<(String, MissEvent)> {
        let mut events = Vec::new();
        for (hostname, state) in self.hosts.iter_mut() {
            if state.pending {
                let before = state.miss_count;
                state.miss_count += 1;
                let after = state.miss_count;
                if let Some(event) = crossing_event(before, after, &self.thresholds) {
                    events.push((hostname.clone(), event));
                }
            }
        }
        events
    }

    pub fn responding_count(&self) -> u16 {
        self.hosts.values().filter(|s| !s.pending).count() as u16
    }

    pub fn not_responding_count(&self) -> u16 {
        self.hosts.values().filter(|s| s.pending).count() as u16
    }

    pub fn monitored_count(&self) -> u16 {
        self.hosts.len() as u16
    }
}

fn crossing_event(before: u32, after: u32, thresholds: &PulseThresholds) -> Option<MissEvent> {
    if before < thresholds.fail && after >= thresholds.fail {
        Some(MissEvent::Fail)
    } else if before < thresholds.major && after >= thresholds.major {
        Some(MissEvent::Major)
    } else if before < thresholds.minor && after >= thresholds.minor {
        Some(MissEvent::Minor)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_miss_raises_minor_only() {
        let mut agent = PulseAgent::new("mgmt", 0, PulseThresholds::default());
        agent.monitor("compute-0");
        agent.begin_period();
        let events = agent.close_period();
        assert_eq!(events, vec![("compute-0".to_string(), MissEvent::Minor)]);
    }

    #[test]
    fn reply_clears_pending_and_resets_miss() {
        let mut agent = PulseAgent::new("mgmt", 0, PulseThresholds::default());
        agent.monitor("compute-0");
        agent.begin_period();
        agent.close_period(); // one miss
        agent.begin_period();
        agent.handle_reply(&PulseMessage {
            kind: PulseKind::Reply,
            hostname: "compute-0".into(),
            sequence: 1,
            rri: 42,
            flags: 0,
            version: 1,
            cluster_payload: None,
        });
        let events = agent.close_period();
        assert!(events.is_empty());
        assert_eq!(agent.rri_for("compute-0"), Some(42));
    }

    #[test]
    fn fail_threshold_reported_once() {
        let thresholds = PulseThresholds {
            minor: 1,
            major: 2,
            fail: 3,
        };
        let mut agent = PulseAgent::new("mgmt", 0, thresholds);
        agent.monitor("compute-0");
        let mut seen = Vec::new();
        for _ in 0..5 {
            agent.begin_period();
            seen.extend(agent.close_period());
        }
        let fails: Vec<_> = seen.iter().filter(|(_, e)| *e == MissEvent::Fail).collect();
        assert_eq!(fails.len(), 1);
    }
}
