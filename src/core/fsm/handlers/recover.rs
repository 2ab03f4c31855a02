// src/core/fsm/handlers/recover.rs

//! Recover: the auto-recovery controller's own action, entered after a
//! heartbeat-loss or failure transition rather than by operator request.
//! It requests a fresh mtcAlive from the host without resetting it first
//! (distinguishing a transient miss from a real crash); if the host
//! answers healthy, control is hand off to Enable, otherwise the host is
//! declared failed and auto-recovery takes over the retry/disable policy.

use crate::core::auto_recovery::{ar_manage, Cause};
use crate::core::fsm::outcome::HandlerOutcome;
use crate::core::state::host::{Availability, HealthSignal, HostRecord, Stage};
use crate::core::state::TimerId;
use std::time::Duration;

const MTC_ALIVE_REQ_TIMEOUT: Duration = Duration::from_secs(15);
const RESET_RECV_TIMEOUT: Duration = Duration::from_secs(120);

/// Consecutive "host did not actually reset" recoveries tolerated before
/// escalating to a forced reset.
const GRACEFUL_RECOVERY_CAP: u32 = 2;

pub fn step(host: &mut HostRecord) -> HandlerOutcome {
    match host.stage {
        Stage::Idle | Stage::Start => {
            host.enqueue_work("request mtcAlive");
            host.timers.arm(TimerId::MtcAction, MTC_ALIVE_REQ_TIMEOUT);
            host.stage = Stage::ReqMtcAlive;
            HandlerOutcome::InProgress
        }
        Stage::ReqMtcAlive => {
            host.stage = Stage::ReqMtcAliveWait;
            HandlerOutcome::InProgress
        }
        Stage::ReqMtcAliveWait => {
            if host.health_signal == HealthSignal::Healthy {
                host.timers.cancel(TimerId::MtcAction);
                host.stage = Stage::MtcAliveTimer;
                HandlerOutcome::InProgress
            } else if host.timers.take_ring(TimerId::MtcAction) {
                host.stage = Stage::Failure;
                HandlerOutcome::InProgress
            } else {
                HandlerOutcome::InProgress
            }
        }
        Stage::MtcAliveTimer => {
            // Tie-break: a host that truly rebooted reports a fresh, lower
            // uptime than what was saved when the loss was declared. One
            // that didn't (e.g. only the heartbeat process restarted) keeps
            // counting from where it left off.
            let truly_rebooted = match (host.uptime_at_loss, host.reported_uptime) {
                (Some(saved), Some(now)) => now < saved,
                _ => true,
            };
            if truly_rebooted {
                host.graceful_recovery_counter = 0;
                host.uptime_at_loss = None;
                // Healthy: hand back to Enable by reporting completion with
                // the action slot left pointed at Enable by the engine.
                HandlerOutcome::Complete
            } else {
                host.graceful_recovery_counter += 1;
                tracing::warn!(
                    host = %host.hostname,
                    count = host.graceful_recovery_counter,
                    "recovered host did not actually reset"
                );
                if host.graceful_recovery_counter > GRACEFUL_RECOVERY_CAP {
                    host.enqueue_work("reset");
                    host.timers.arm(TimerId::MtcAction, RESET_RECV_TIMEOUT);
                    host.stage = Stage::ResetSendWait;
                    HandlerOutcome::InProgress
                } else {
                    HandlerOutcome::Complete
                }
            }
        }
        Stage::ResetSendWait => {
            host.stage = Stage::ResetRecvWait;
            HandlerOutcome::InProgress
        }
        Stage::ResetRecvWait => {
            if host.timers.take_ring(TimerId::MtcAction) {
                host.graceful_recovery_counter = 0;
                host.uptime_at_loss = None;
                // The forced reset stands in for Enable's own reboot wait;
                // hand off to Enable the same way the plain recovery path does.
                HandlerOutcome::Complete
            } else {
                HandlerOutcome::InProgress
            }
        }
        Stage::Failure => {
            host.triad.avail = Availability::Failed;
            let mut task = String::new();
            match ar_manage(&mut host.auto_recovery, Cause::Heartbeat, &mut task) {
                crate::core::auto_recovery::ArDecision::Retry => {
                    host.stage = Stage::FailureWait;
                    host.timers
                        .arm(TimerId::MtcAction, crate::core::auto_recovery::retry_interval(Cause::Heartbeat));
                    HandlerOutcome::InProgress
                }
                crate::core::auto_recovery::ArDecision::Disabled => HandlerOutcome::Failed(task),
            }
        }
        Stage::FailureWait => {
            if host.timers.take_ring(TimerId::MtcAction) {
                host.stage = Stage::Start;
            }
            HandlerOutcome::InProgress
        }
        _ => HandlerOutcome::Failed(format!("recover handler hit unexpected stage {:?}", host.stage)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::state::host::NodeType;

    fn host_awaiting_mtc_alive_timer() -> HostRecord {
        let mut host = HostRecord::new("compute-0", NodeType::WORKER);
        host.stage = Stage::Start;
        step(&mut host); // -> ReqMtcAlive
        step(&mut host); // -> ReqMtcAliveWait
        host.health_signal = HealthSignal::Healthy;
        step(&mut host); // -> MtcAliveTimer
        host
    }

    #[test]
    fn lower_reported_uptime_confirms_a_real_reboot() {
        let mut host = host_awaiting_mtc_alive_timer();
        host.uptime_at_loss = Some(5_000);
        host.reported_uptime = Some(3);
        assert_eq!(step(&mut host), HandlerOutcome::Complete);
        assert_eq!(host.graceful_recovery_counter, 0);
    }

    #[test]
    fn unchanged_uptime_escalates_to_a_forced_reset_after_the_cap() {
        let mut host = host_awaiting_mtc_alive_timer();
        host.uptime_at_loss = Some(5_000);
        host.reported_uptime = Some(5_200);

        for _ in 0..GRACEFUL_RECOVERY_CAP {
            assert_eq!(step(&mut host), HandlerOutcome::Complete);
            host.stage = Stage::MtcAliveTimer;
        }

        assert_eq!(step(&mut host), HandlerOutcome::InProgress);
        assert_eq!(host.stage, Stage::ResetSendWait);
        assert!(host.work_queue.iter().any(|w| w.description == "reset"));

        assert_eq!(step(&mut host), HandlerOutcome::InProgress); // -> ResetRecvWait
        host.timers.arm(TimerId::MtcAction, Duration::from_millis(0));
        std::thread::sleep(Duration::from_millis(2));
        host.timers.tick();
        assert_eq!(step(&mut host), HandlerOutcome::Complete);
        assert_eq!(host.graceful_recovery_counter, 0);
    }
}
