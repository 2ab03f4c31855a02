// src/core/fsm/handlers/swact.rs

//! Swact: controller role switchover. Requests the activity handover,
//! waits for SM to confirm, then polls until this host's triad reflects
//! the new (non-active) role. Only meaningful for `NodeType::CONTROLLER`
//! hosts; the engine is responsible for refusing to dispatch `Swact` to
//! any other node type before this handler ever runs.

use crate::core::fsm::outcome::HandlerOutcome;
use crate::core::state::host::{HostRecord, Stage};
use crate::core::state::TimerId;
use std::time::Duration;

const SWACT_TIMEOUT: Duration = Duration::from_secs(120);

pub fn step(host: &mut HostRecord) -> HandlerOutcome {
    match host.stage {
        Stage::Idle | Stage::Start => {
            host.enqueue_work("swact request");
            host.timers.arm(TimerId::MtcAction, SWACT_TIMEOUT);
            host.stage = Stage::Swact;
            HandlerOutcome::InProgress
        }
        Stage::Swact => {
            host.stage = Stage::SwactRecv;
            HandlerOutcome::InProgress
        }
        Stage::SwactRecv => {
            if host.done_queue.iter().any(|w| w.description == "swact request") {
                host.stage = Stage::SwactPoll;
            } else if host.timers.take_ring(TimerId::MtcAction) {
                return HandlerOutcome::Failed("swact request was not acknowledged by SM".into());
            }
            HandlerOutcome::InProgress
        }
        Stage::SwactPoll => {
            if host.work_queue.is_empty() {
                host.timers.cancel(TimerId::MtcAction);
                host.stage = Stage::Done;
                HandlerOutcome::Complete
            } else if host.timers.take_ring(TimerId::MtcAction) {
                HandlerOutcome::Failed("swact did not complete before timeout".into())
            } else {
                HandlerOutcome::InProgress
            }
        }
        _ => HandlerOutcome::Failed(format!("swact handler hit unexpected stage {:?}", host.stage)),
    }
}
