// src/core/fsm/handlers/disable.rs

//! The Lock/Disable handler: stops host services and heartbeat
//! monitoring, then marks the host administratively locked and offline.
//! `ForceLock` skips the graceful services-stop wait and jumps straight to
//! the state change (the handler is shared; `force` only changes which
//! stage is entered first).

use crate::core::fsm::outcome::HandlerOutcome;
use crate::core::state::host::{AdminState, Availability, HostRecord, OperState, Stage};
use crate::core::state::TimerId;
use std::time::Duration;

const DISABLE_SERVICES_TIMEOUT: Duration = Duration::from_secs(60);

pub fn step(host: &mut HostRecord, force: bool) -> HandlerOutcome {
    match host.stage {
        Stage::Idle | Stage::Start => {
            if force {
                host.stage = Stage::HandleForceLock;
            } else {
                host.enqueue_work("heartbeat stop");
                host.stage = Stage::HeartbeatStopCmd;
            }
            HandlerOutcome::InProgress
        }
        Stage::HeartbeatStopCmd => {
            host.enqueue_work("disable host services");
            host.timers.arm(TimerId::MtcAction, DISABLE_SERVICES_TIMEOUT);
            host.stage = Stage::DisServicesWait;
            HandlerOutcome::InProgress
        }
        Stage::DisServicesWait => {
            if host.work_queue.is_empty() || host.timers.take_ring(TimerId::MtcAction) {
                host.timers.cancel(TimerId::MtcAction);
                host.stage = Stage::HandleForceLock;
            }
            HandlerOutcome::InProgress
        }
        Stage::HandleForceLock => {
            host.stage = Stage::StateChange;
            HandlerOutcome::InProgress
        }
        Stage::StateChange => {
            host.triad.admin = AdminState::Locked;
            host.triad.oper = OperState::Disabled;
            host.triad.avail = Availability::Offline;
            host.stage = Stage::Done;
            HandlerOutcome::Complete
        }
        _ => HandlerOutcome::Failed(format!("disable handler hit unexpected stage {:?}", host.stage)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::state::host::NodeType;

    #[test]
    fn force_lock_skips_services_drain() {
        let mut host = HostRecord::new("compute-0", NodeType::WORKER);
        host.stage = Stage::Start;
        step(&mut host, true);
        assert_eq!(host.stage, Stage::HandleForceLock);
        step(&mut host, true);
        assert_eq!(step(&mut host, true), HandlerOutcome::Complete);
        assert_eq!(host.triad.admin, AdminState::Locked);
        assert_eq!(host.triad.avail, Availability::Offline);
    }

    #[test]
    fn graceful_lock_drains_workqueue_first() {
        let mut host = HostRecord::new("compute-0", NodeType::WORKER);
        host.stage = Stage::Start;
        step(&mut host, false);
        assert_eq!(host.stage, Stage::HeartbeatStopCmd);
        step(&mut host, false);
        assert_eq!(host.stage, Stage::DisServicesWait);
        host.work_queue.clear();
        step(&mut host, false);
        assert_eq!(host.stage, Stage::HandleForceLock);
    }
}
