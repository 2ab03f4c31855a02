// src/core/fsm/handlers/enable.rs

//! The Enable handler: brings a host from offline/disabled to enabled.
//! Stops the old heartbeat, drives a reboot progression, re-acquires
//! mtcAlive, gates on goenabled, soaks the heartbeat, and drains the
//! workqueue before declaring the host enabled. Auto-recovery governs
//! every failure exit.

use crate::core::auto_recovery::{ar_manage, Cause};
use crate::core::fsm::outcome::HandlerOutcome;
use crate::core::state::host::{
    Availability, DegradeMask, HealthSignal, HeartbeatFailureAction, HostRecord, NodeType, OperState, Stage,
};
use crate::core::state::TimerId;
use std::time::Duration;

const RESET_ACK_TIMEOUT: Duration = Duration::from_secs(30);
const REBOOT_WAIT: Duration = Duration::from_secs(120);
const GOENABLED_TIMEOUT: Duration = Duration::from_secs(300);
const HEARTBEAT_SOAK: Duration = Duration::from_secs(10);

/// The mtcAlive wait timeout is node-type-dependent: a controller's
/// services come up faster than a compute's, so computes get twice the
/// wait before the enable is declared failed.
fn mtc_alive_timeout(node_type: NodeType) -> Duration {
    if node_type.contains(NodeType::CONTROLLER) {
        Duration::from_secs(30)
    } else {
        Duration::from_secs(60)
    }
}

pub fn step(host: &mut HostRecord) -> HandlerOutcome {
    match host.stage {
        Stage::Idle | Stage::Start => {
            host.triad.admin = crate::core::state::host::AdminState::Unlocked;
            host.timers.cancel(TimerId::MtcAction);
            // Rule 1: stop the old heartbeat and clear per-iface minor/failed
            // flags before the reboot, so a stale miss streak from before
            // the unlock doesn't immediately re-trip the post-enable soak.
            host.enqueue_work("heartbeat stop");
            for iface in &mut host.liveness {
                iface.heartbeat_failed = false;
                iface.miss_count = 0;
            }
            host.degrade_mask.remove(DegradeMask::HEARTBEAT);
            host.stage = Stage::HeartbeatStopCmd;
            HandlerOutcome::InProgress
        }
        Stage::HeartbeatStopCmd => {
            host.enqueue_work("reboot");
            host.timers.arm(TimerId::MtcAction, RESET_ACK_TIMEOUT);
            host.stage = Stage::ResetProgression;
            HandlerOutcome::InProgress
        }
        Stage::ResetProgression => {
            if host.done_queue.iter().any(|w| w.description == "reboot") {
                host.triad.avail = Availability::Offline;
                host.timers.cancel(TimerId::MtcAction);
                host.timers.arm(TimerId::MtcAction, REBOOT_WAIT);
                host.stage = Stage::ResetWait;
            } else if host.timers.take_ring(TimerId::MtcAction) {
                return recovery_exit(host, Cause::Config, "reboot command not acknowledged");
            }
            HandlerOutcome::InProgress
        }
        Stage::ResetWait => {
            // Reset progression success: the reboot handshake is done.
            // Rule 2: mtcAlive wait timeout is node-type-dependent and reset
            // to its configured value now that a fresh reboot is underway.
            host.timers.cancel(TimerId::MtcAction);
            host.stage = Stage::IntestStart;
            HandlerOutcome::InProgress
        }
        Stage::IntestStart => {
            host.enqueue_work("mtcAlive purge");
            host.timers.arm(TimerId::MtcAction, mtc_alive_timeout(host.node_type));
            host.stage = Stage::MtcAlivePurge;
            HandlerOutcome::InProgress
        }
        Stage::MtcAlivePurge => {
            host.stage = Stage::MtcAliveWait;
            HandlerOutcome::InProgress
        }
        Stage::MtcAliveWait => {
            // Rule 4: an mtcAlive carrying an uptime more than twice the
            // configured timeout didn't come from a host that just rebooted.
            let timeout = mtc_alive_timeout(host.node_type);
            if let Some(uptime) = host.reported_uptime
                && uptime > 2 * timeout.as_secs()
            {
                return recovery_exit(host, Cause::Config, "mtcAlive uptime indicates host did not reboot");
            }
            if host.health_signal == HealthSignal::Healthy && host.oob.configured {
                // Rule 3: first mtcAlive with healthy+configured flags moves
                // availability to intest, echoes the unlocked ACK, and
                // requests the goenabled test.
                host.timers.cancel(TimerId::MtcAction);
                host.triad.avail = Availability::Intest;
                host.enqueue_work("unlock ack");
                host.enqueue_work("goenabled test");
                host.timers.arm(TimerId::MtcAction, GOENABLED_TIMEOUT);
                host.stage = Stage::GoenabledTimer;
                HandlerOutcome::InProgress
            } else if host.timers.take_ring(TimerId::MtcAction) {
                recovery_exit(host, Cause::Heartbeat, "mtcAlive not received before enable")
            } else {
                HandlerOutcome::InProgress
            }
        }
        Stage::GoenabledTimer => {
            host.stage = Stage::GoenabledWait;
            HandlerOutcome::InProgress
        }
        Stage::GoenabledWait => {
            if host.done_queue.iter().any(|w| w.description == "goenabled test") {
                host.timers.cancel(TimerId::MtcAction);
                host.stage = Stage::HeartbeatStart;
                HandlerOutcome::InProgress
            } else if host.timers.take_ring(TimerId::MtcAction) {
                recovery_exit(host, Cause::Goenable, "goenabled test timed out")
            } else {
                HandlerOutcome::InProgress
            }
        }
        Stage::HeartbeatStart => {
            // Rule 5: when the configured heartbeat-failure action is
            // "none", nothing acts on a degraded heartbeat, so soaking it
            // here would only waste the soak interval.
            if host.heartbeat_failure_action == HeartbeatFailureAction::None {
                host.enqueue_work("heartbeat start");
                host.stage = Stage::WorkqueueWait;
            } else {
                host.enqueue_work("heartbeat start");
                host.timers.arm(TimerId::MtcAction, HEARTBEAT_SOAK);
                host.stage = Stage::HeartbeatWait;
            }
            HandlerOutcome::InProgress
        }
        Stage::HeartbeatWait => {
            if host.timers.take_ring(TimerId::MtcAction) {
                host.stage = Stage::HeartbeatSoak;
            }
            HandlerOutcome::InProgress
        }
        Stage::HeartbeatSoak => {
            if host.degrade_mask.contains(DegradeMask::HEARTBEAT) {
                recovery_exit(host, Cause::Heartbeat, "heartbeat failed during enable soak")
            } else {
                host.stage = Stage::WorkqueueWait;
                HandlerOutcome::InProgress
            }
        }
        Stage::WorkqueueWait => {
            if host.work_queue.is_empty() {
                host.stage = Stage::StateChange;
            }
            HandlerOutcome::InProgress
        }
        Stage::StateChange => {
            host.triad.oper = OperState::Enabled;
            host.recompute_degrade();
            host.auto_recovery.counts = Default::default();
            host.auto_recovery.ar_disabled = false;
            host.stage = Stage::Enabled;
            HandlerOutcome::Complete
        }
        _ => HandlerOutcome::Failed(format!("enable handler hit unexpected stage {:?}", host.stage)),
    }
}

fn recovery_exit(host: &mut HostRecord, cause: Cause, reason: &str) -> HandlerOutcome {
    let mut task = String::new();
    let decision = ar_manage(&mut host.auto_recovery, cause, &mut task);
    host.triad.avail = Availability::Failed;
    match decision {
        crate::core::auto_recovery::ArDecision::Retry => {
            tracing::warn!(host = %host.hostname, reason, "enable retrying");
            host.stage = Stage::RetryWait;
            host.timers
                .arm(TimerId::MtcAction, crate::core::auto_recovery::retry_interval(cause));
            HandlerOutcome::InProgress
        }
        crate::core::auto_recovery::ArDecision::Disabled => HandlerOutcome::Failed(task),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::protocol::OobFlags;
    use crate::core::state::host::NodeType;

    fn drive_to_mtc_alive_wait(host: &mut HostRecord) {
        host.stage = Stage::Start;
        assert_eq!(step(host), HandlerOutcome::InProgress); // -> HeartbeatStopCmd
        assert_eq!(step(host), HandlerOutcome::InProgress); // -> ResetProgression
        host.done_queue.push_back(crate::core::state::host::WorkItem {
            sequence: 0,
            description: "reboot".into(),
        });
        assert_eq!(step(host), HandlerOutcome::InProgress); // -> ResetWait
        assert_eq!(step(host), HandlerOutcome::InProgress); // -> IntestStart
        assert_eq!(step(host), HandlerOutcome::InProgress); // -> MtcAlivePurge
        assert_eq!(step(host), HandlerOutcome::InProgress); // -> MtcAliveWait
    }

    #[test]
    fn happy_path_reaches_enabled() {
        let mut host = HostRecord::new("compute-0", NodeType::WORKER);
        drive_to_mtc_alive_wait(&mut host);
        host.health_signal = HealthSignal::Healthy;
        host.oob = OobFlags {
            configured: true,
            ..Default::default()
        };
        assert_eq!(step(&mut host), HandlerOutcome::InProgress); // -> GoenabledTimer
        assert_eq!(host.triad.avail, Availability::Intest);
        assert_eq!(step(&mut host), HandlerOutcome::InProgress); // -> GoenabledWait
        host.done_queue.push_back(crate::core::state::host::WorkItem {
            sequence: 0,
            description: "goenabled test".into(),
        });
        assert_eq!(step(&mut host), HandlerOutcome::InProgress); // -> HeartbeatStart
        assert_eq!(step(&mut host), HandlerOutcome::InProgress); // -> HeartbeatWait
        host.timers.arm(TimerId::MtcAction, Duration::from_millis(0));
        std::thread::sleep(Duration::from_millis(2));
        host.timers.tick();
        assert_eq!(step(&mut host), HandlerOutcome::InProgress); // -> HeartbeatSoak
        assert_eq!(step(&mut host), HandlerOutcome::InProgress); // -> WorkqueueWait
        assert_eq!(step(&mut host), HandlerOutcome::InProgress); // -> StateChange
        assert_eq!(step(&mut host), HandlerOutcome::Complete);
        assert_eq!(host.triad.oper, OperState::Enabled);
    }

    #[test]
    fn healthy_but_unconfigured_does_not_yet_enter_intest() {
        let mut host = HostRecord::new("compute-0", NodeType::WORKER);
        drive_to_mtc_alive_wait(&mut host);
        host.health_signal = HealthSignal::Healthy;
        assert_eq!(step(&mut host), HandlerOutcome::InProgress);
        assert_eq!(host.stage, Stage::MtcAliveWait);
        assert_ne!(host.triad.avail, Availability::Intest);
    }

    #[test]
    fn controller_and_worker_get_different_mtc_alive_timeouts() {
        assert!(mtc_alive_timeout(NodeType::WORKER) > mtc_alive_timeout(NodeType::CONTROLLER));
    }

    #[test]
    fn stale_uptime_fails_the_enable_as_not_rebooted() {
        let mut host = HostRecord::new("compute-0", NodeType::WORKER);
        drive_to_mtc_alive_wait(&mut host);
        host.health_signal = HealthSignal::Healthy;
        host.oob = OobFlags {
            configured: true,
            ..Default::default()
        };
        host.reported_uptime = Some(mtc_alive_timeout(NodeType::WORKER).as_secs() * 3);
        let outcome = step(&mut host);
        assert_eq!(host.triad.avail, Availability::Failed);
        assert!(matches!(outcome, HandlerOutcome::InProgress | HandlerOutcome::Failed(_)));
    }

    #[test]
    fn heartbeat_failure_action_none_skips_the_soak() {
        let mut host = HostRecord::new("compute-0", NodeType::WORKER);
        host.heartbeat_failure_action = HeartbeatFailureAction::None;
        host.stage = Stage::HeartbeatStart;
        assert_eq!(step(&mut host), HandlerOutcome::InProgress);
        assert_eq!(host.stage, Stage::WorkqueueWait);
    }
}
