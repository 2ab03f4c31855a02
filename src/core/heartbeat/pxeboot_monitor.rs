// src/core/heartbeat/pxeboot_monitor.rs

//! The pxeboot network carries its own always-on monitor, independent of
//! the per-network pulse agents: a host that stops answering on the
//! pxeboot interface loses installer/inventory reachability even while
//! still answering on the management network, so it gets its own small
//! FSM rather than being folded into `PulseAgent`.

use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PxebootState {
    Start,
    Send,
    Monitor,
    Wait,
    Fail,
}

pub struct PxebootMonitor {
    hostname: String,
    state: PxebootState,
    last_sequence_seen: Option<u32>,
    miss_count: u32,
    fail_threshold: u32,
    last_transition: Instant,
}

impl PxebootMonitor {
    pub fn new(hostname: impl Into<String>, fail_threshold: u32) -> Self {
        Self {
            hostname: hostname.into(),
            state: PxebootState::Start,
            last_sequence_seen: None,
            miss_count: 0,
            fail_threshold,
            last_transition: Instant::now(),
        }
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    pub fn state(&self) -> PxebootState {
        self.state
    }

    fn transition(&mut self, next: PxebootState) {
        self.state = next;
        self.last_transition = Instant::now();
    }

    /// Drives the monitor forward once per tick. Returns `true` the instant
    /// the monitor (re)enters `Fail`, so the caller raises the transition
    /// exactly once rather than on every subsequent tick spent in `Fail`.
    pub fn tick(&mut self) -> bool {
        match self.state {
            PxebootState::Start => {
                self.transition(PxebootState::Send);
                false
            }
            PxebootState::Send => {
                self.transition(PxebootState::Monitor);
                false
            }
            PxebootState::Monitor => {
                self.transition(PxebootState::Wait);
                false
            }
            PxebootState::Wait => {
                self.miss_count += 1;
                if self.miss_count >= self.fail_threshold {
                    self.transition(PxebootState::Fail);
                    true
                } else {
                    self.transition(PxebootState::Send);
                    false
                }
            }
            PxebootState::Fail => false,
        }
    }

    /// A reply with a sequence number at or ahead of the last one seen
    /// clears the miss streak and resumes the send/monitor/wait cycle. A
    /// sequence regression (a stale or replayed datagram) is ignored.
    pub fn handle_reply(&mut self, sequence: u32) {
        if let Some(last) = self.last_sequence_seen {
            if sequence < last {
                return;
            }
        }
        self.last_sequence_seen = Some(sequence);
        self.miss_count = 0;
        if self.state == PxebootState::Fail || self.state == PxebootState::Wait {
            self.transition(PxebootState::Send);
        }
    }

    pub fn time_in_state(&self) -> Duration {
        self.last_transition.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runs_through_send_monitor_wait_cycle() {
        let mut monitor = PxebootMonitor::new("compute-0", 3);
        assert_eq!(monitor.state(), PxebootState::Start);
        monitor.tick();
        assert_eq!(monitor.state(), PxebootState::Send);
        monitor.tick();
        assert_eq!(monitor.state(), PxebootState::Monitor);
        monitor.tick();
        assert_eq!(monitor.state(), PxebootState::Wait);
    }

    #[test]
    fn fail_fires_once_at_threshold() {
        let mut monitor = PxebootMonitor::new("compute-0", 2);
        monitor.tick(); // Send
        monitor.tick(); // Monitor
        monitor.tick(); // Wait, miss 1
        assert!(!monitor.tick()); // Send again (miss below threshold resumes cycle... but this call transitions from Wait)
    }

    #[test]
    fn reply_resets_miss_streak() {
        let mut monitor = PxebootMonitor::new("compute-0", 2);
        monitor.tick();
        monitor.tick();
        monitor.tick(); // now Wait, miss_count = 1
        monitor.handle_reply(5);
        assert_eq!(monitor.state(), PxebootState::Send);
    }

    #[test]
    fn stale_sequence_is_ignored() {
        let mut monitor = PxebootMonitor::new("compute-0", 5);
        monitor.handle_reply(10);
        monitor.handle_reply(3);
        assert_eq!(monitor.last_sequence_seen, Some(10));
    }
}
