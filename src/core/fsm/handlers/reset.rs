// src/core/fsm/handlers/reset.rs

//! The Reset handler: sends a hard-reset command (BMC or mtcAgent-issued),
//! waits for the command to be acknowledged, then waits out the reboot
//! before handing control back to the enable handler. Reset never leaves
//! the host enabled on its own; the engine re-enters the Enable action
//! once this handler reports `Complete`.

use crate::core::fsm::outcome::HandlerOutcome;
use crate::core::state::host::{Availability, HostRecord, Stage};
use crate::core::state::TimerId;
use std::time::Duration;

const RESET_ACK_TIMEOUT: Duration = Duration::from_secs(30);
const REBOOT_WAIT: Duration = Duration::from_secs(120);

pub fn step(host: &mut HostRecord) -> HandlerOutcome {
    match host.stage {
        Stage::Idle | Stage::Start => {
            host.enqueue_work("reset command");
            host.timers.arm(TimerId::MtcAction, RESET_ACK_TIMEOUT);
            host.stage = Stage::ResetSendWait;
            HandlerOutcome::InProgress
        }
        Stage::ResetSendWait => {
            if host.done_queue.iter().any(|w| w.description == "reset command") {
                host.timers.cancel(TimerId::MtcAction);
                host.stage = Stage::ResetRecvWait;
            } else if host.timers.take_ring(TimerId::MtcAction) {
                return HandlerOutcome::Failed("reset command not acknowledged".into());
            }
            HandlerOutcome::InProgress
        }
        Stage::ResetRecvWait => {
            host.triad.avail = Availability::Offline;
            host.timers.arm(TimerId::MtcAction, REBOOT_WAIT);
            host.stage = Stage::ResetProgression;
            HandlerOutcome::InProgress
        }
        Stage::ResetProgression => {
            if host.health_signal == crate::core::state::host::HealthSignal::Healthy {
                host.timers.cancel(TimerId::MtcAction);
                host.stage = Stage::ResetWait;
            } else if host.timers.take_ring(TimerId::MtcAction) {
                return HandlerOutcome::Failed("host did not come back up after reset".into());
            }
            HandlerOutcome::InProgress
        }
        Stage::ResetWait => {
            host.stage = Stage::Done;
            HandlerOutcome::Complete
        }
        _ => HandlerOutcome::Failed(format!("reset handler hit unexpected stage {:?}", host.stage)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::state::host::{HealthSignal, NodeType};

    #[test]
    fn happy_path_completes_after_healthy_signal() {
        let mut host = HostRecord::new("compute-0", NodeType::WORKER);
        host.stage = Stage::Start;
        step(&mut host);
        host.done_queue.push_back(crate::core::state::host::WorkItem {
            sequence: 0,
            description: "reset command".into(),
        });
        step(&mut host);
        assert_eq!(host.stage, Stage::ResetRecvWait);
        step(&mut host);
        assert_eq!(host.stage, Stage::ResetProgression);
        host.health_signal = HealthSignal::Healthy;
        step(&mut host);
        assert_eq!(host.stage, Stage::ResetWait);
        assert_eq!(step(&mut host), HandlerOutcome::Complete);
    }
}
