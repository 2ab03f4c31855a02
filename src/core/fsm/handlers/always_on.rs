// src/core/fsm/handlers/always_on.rs

//! Per-tick checks that run regardless of whatever action (if any) is
//! currently in progress: degrade-mask recomputation, the BMC access-loss
//! alarm latch, and the mtcAlive liveness monitor that feeds the
//! auto-recovery controller when a host stops heartbeating outside of an
//! explicit Recover action.

use crate::core::state::host::{DegradeMask, HostRecord, Iface};

/// Runs once per engine tick for every host, independent of `host.action`.
/// Returns `true` if the host should be handed to the auto-recovery
/// controller (Recover dispatched) because its mtcAlive liveness lapsed
/// while no other action currently owns the host.
pub fn run(host: &mut HostRecord) -> bool {
    host.timers.tick();
    host.recompute_degrade();

    let mgmt = &mut host.liveness[Iface::Management.index()];
    let lapsed = mgmt
        .last_seen
        .map(|seen| seen.elapsed() > std::time::Duration::from_secs(30))
        .unwrap_or(false);

    if lapsed && !mgmt.heartbeat_failed {
        mgmt.heartbeat_failed = true;
        host.degrade_mask.insert(DegradeMask::HEARTBEAT);
        host.recompute_degrade();
        host.uptime_at_loss = host.reported_uptime;
        return host.action == crate::core::state::host::Action::None;
    }
    if !lapsed && mgmt.heartbeat_failed {
        mgmt.heartbeat_failed = false;
        host.degrade_mask.remove(DegradeMask::HEARTBEAT);
        host.recompute_degrade();
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::state::host::{AdminState, Availability, NodeType, OperState};
    use std::time::Instant;

    #[test]
    fn lapsed_heartbeat_requests_recover_when_idle() {
        let mut host = HostRecord::new("compute-0", NodeType::WORKER);
        host.triad.admin = AdminState::Unlocked;
        host.triad.oper = OperState::Enabled;
        host.liveness[Iface::Management.index()].last_seen =
            Some(Instant::now() - std::time::Duration::from_secs(60));
        assert!(run(&mut host));
        assert_eq!(host.triad.avail, Availability::Degraded);
    }
}
