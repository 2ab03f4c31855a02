// src/core/fsm/handlers/reinstall.rs

//! The Reinstall handler: triggers a network reinstall via the BMC
//! (power-cycle to PXE), then waits for the reinstalled host to report
//! config-complete and pass its subfunction goenabled test before handing
//! back to Enable, mirroring the shared structure of `reset` one layer up
//! the reboot-and-revalidate hierarchy.

use crate::core::fsm::outcome::HandlerOutcome;
use crate::core::state::host::{Availability, HostRecord, Stage};
use crate::core::state::TimerId;
use std::time::Duration;

const REINSTALL_WAIT: Duration = Duration::from_secs(1800);
const SUBF_GOENABLED_TIMEOUT: Duration = Duration::from_secs(300);

pub fn step(host: &mut HostRecord) -> HandlerOutcome {
    match host.stage {
        Stage::Idle | Stage::Start => {
            host.enqueue_work("reinstall via network boot");
            host.triad.avail = Availability::Offline;
            host.timers.arm(TimerId::MtcAction, REINSTALL_WAIT);
            host.stage = Stage::ConfigCompleteWait;
            HandlerOutcome::InProgress
        }
        Stage::ConfigCompleteWait => {
            if host.health_signal == crate::core::state::host::HealthSignal::Healthy {
                host.timers.cancel(TimerId::MtcAction);
                host.timers.arm(TimerId::MtcAction, SUBF_GOENABLED_TIMEOUT);
                host.stage = Stage::SubfGoenabledTimer;
            } else if host.timers.take_ring(TimerId::MtcAction) {
                return HandlerOutcome::Failed("reinstall did not complete configuration in time".into());
            }
            HandlerOutcome::InProgress
        }
        Stage::SubfGoenabledTimer => {
            host.stage = Stage::SubfGoenabledWait;
            HandlerOutcome::InProgress
        }
        Stage::SubfGoenabledWait => {
            if host.done_queue.iter().any(|w| w.description == "goenabled test") {
                host.timers.cancel(TimerId::MtcAction);
                host.stage = Stage::Done;
                HandlerOutcome::Complete
            } else if host.timers.take_ring(TimerId::MtcAction) {
                HandlerOutcome::Failed("subfunction goenabled test timed out after reinstall".into())
            } else {
                HandlerOutcome::InProgress
            }
        }
        _ => HandlerOutcome::Failed(format!("reinstall handler hit unexpected stage {:?}", host.stage)),
    }
}
