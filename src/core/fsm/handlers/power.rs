// src/core/fsm/handlers/power.rs

//! PowerOn / PowerOff: single BMC power-control commands with a bounded
//! wait for the commanded power state to be observed. Unlike `powercycle`
//! these never change admin/oper state — only `Availability` moves
//! between `Online`/`PoweredOff`.

use crate::core::fsm::outcome::HandlerOutcome;
use crate::core::state::host::{Availability, HostRecord, Stage};
use crate::core::state::TimerId;
use std::time::Duration;

const POWER_CMD_TIMEOUT: Duration = Duration::from_secs(60);

pub fn step_power_on(host: &mut HostRecord) -> HandlerOutcome {
    match host.stage {
        Stage::Idle | Stage::Start => {
            host.enqueue_work("bmc power on");
            host.timers.arm(TimerId::MtcAction, POWER_CMD_TIMEOUT);
            host.stage = Stage::HandlePoweronSend;
            HandlerOutcome::InProgress
        }
        Stage::HandlePoweronSend => {
            host.stage = Stage::HandlePoweronRecv;
            HandlerOutcome::InProgress
        }
        Stage::HandlePoweronRecv => {
            if host.done_queue.iter().any(|w| w.description == "bmc power on") {
                host.timers.cancel(TimerId::MtcAction);
                host.stage = Stage::PoweronVerify;
            } else if host.timers.take_ring(TimerId::MtcAction) {
                return HandlerOutcome::Failed("bmc power-on command timed out".into());
            }
            HandlerOutcome::InProgress
        }
        Stage::PoweronVerify => {
            host.timers.arm(TimerId::MtcAction, POWER_CMD_TIMEOUT);
            host.stage = Stage::PoweronVerifyWait;
            HandlerOutcome::InProgress
        }
        Stage::PoweronVerifyWait => {
            if host.bmc.learned.power_state == Some(crate::core::bmc::PowerState::On) {
                host.timers.cancel(TimerId::MtcAction);
                host.triad.avail = Availability::Online;
                host.stage = Stage::Done;
                HandlerOutcome::Complete
            } else if host.timers.take_ring(TimerId::MtcAction) {
                HandlerOutcome::Failed("bmc did not report power on within timeout".into())
            } else {
                HandlerOutcome::InProgress
            }
        }
        _ => HandlerOutcome::Failed(format!("power-on handler hit unexpected stage {:?}", host.stage)),
    }
}

pub fn step_power_off(host: &mut HostRecord) -> HandlerOutcome {
    match host.stage {
        Stage::Idle | Stage::Start => {
            host.enqueue_work("bmc power off");
            host.timers.arm(TimerId::MtcAction, POWER_CMD_TIMEOUT);
            host.stage = Stage::Poweroff;
            HandlerOutcome::InProgress
        }
        Stage::Poweroff => {
            host.stage = Stage::PoweroffCmndWait;
            HandlerOutcome::InProgress
        }
        Stage::PoweroffCmndWait => {
            if host.done_queue.iter().any(|w| w.description == "bmc power off") {
                host.timers.cancel(TimerId::MtcAction);
                host.timers.arm(TimerId::MtcAction, POWER_CMD_TIMEOUT);
                host.stage = Stage::PoweroffWait;
            } else if host.timers.take_ring(TimerId::MtcAction) {
                return HandlerOutcome::Failed("bmc power-off command timed out".into());
            }
            HandlerOutcome::InProgress
        }
        Stage::PoweroffWait => {
            if host.bmc.learned.power_state == Some(crate::core::bmc::PowerState::Off) {
                host.timers.cancel(TimerId::MtcAction);
                host.triad.avail = Availability::PoweredOff;
                host.stage = Stage::Done;
                HandlerOutcome::Complete
            } else if host.timers.take_ring(TimerId::MtcAction) {
                HandlerOutcome::Failed("bmc did not report power off within timeout".into())
            } else {
                HandlerOutcome::InProgress
            }
        }
        _ => HandlerOutcome::Failed(format!("power-off handler hit unexpected stage {:?}", host.stage)),
    }
}
