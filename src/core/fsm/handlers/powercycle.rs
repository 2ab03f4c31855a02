// src/core/fsm/handlers/powercycle.rs

//! PowerCycle: power off, a mandatory cool-off dwell so a hot BMC doesn't
//! bounce straight back on, then power back on. Composes the same stages
//! `power.rs` uses for its two halves so a single implementation can't
//! drift from the cycle built out of them.

use crate::core::fsm::handlers::power;
use crate::core::fsm::outcome::HandlerOutcome;
use crate::core::state::host::{HostRecord, Stage};
use crate::core::state::TimerId;
use std::time::Duration;

const COOLOFF_DWELL: Duration = Duration::from_secs(20);

pub fn step(host: &mut HostRecord) -> HandlerOutcome {
    match host.stage {
        Stage::Idle | Stage::Start => {
            host.stage = Stage::Poweroff;
            power::step_power_off(host)
        }
        Stage::Poweroff | Stage::PoweroffCmndWait => power::step_power_off(host),
        Stage::PoweroffWait => match power::step_power_off(host) {
            HandlerOutcome::Complete => {
                host.timers.arm(TimerId::MtcAction, COOLOFF_DWELL);
                host.stage = Stage::Cooloff;
                HandlerOutcome::InProgress
            }
            other => other,
        },
        Stage::Cooloff => {
            if host.timers.take_ring(TimerId::MtcAction) {
                host.stage = Stage::Holdoff;
            }
            HandlerOutcome::InProgress
        }
        Stage::Holdoff => {
            host.stage = Stage::Start; // re-enters through the power-on chain
            power::step_power_on(host)
        }
        Stage::HandlePoweronSend | Stage::HandlePoweronRecv | Stage::PoweronVerify | Stage::PoweronVerifyWait => {
            power::step_power_on(host)
        }
        _ => HandlerOutcome::Failed(format!("powercycle handler hit unexpected stage {:?}", host.stage)),
    }
}
