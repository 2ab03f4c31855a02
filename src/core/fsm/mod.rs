// src/core/fsm/mod.rs

//! The Host Maintenance FSM Engine: the single place that owns the host
//! registry and drives every action handler forward, one tick at a time.
//! Setup owns the state, a loop drives workers forward, and nothing
//! blocks inside the loop body.

pub mod handlers;
pub mod outcome;

use crate::core::auto_recovery::Cause;
use crate::core::errors::{MtceError, MtceResult};
use crate::core::heartbeat::MissEvent;
use crate::core::protocol::mtc_message::MtcAliveReport;
use crate::core::state::host::{Action, DegradeMask, HealthSignal, HostRecord, Iface, NodeType, Stage};
use crate::core::state::{HostRegistry, SharedHost};
use outcome::HandlerOutcome;
use std::sync::Arc;

pub struct Engine {
    pub registry: Arc<HostRegistry>,
}

impl Engine {
    pub fn new(registry: Arc<HostRegistry>) -> Self {
        Self { registry }
    }

    /// Admits a new action onto a host. Refuses if one is already active,
    /// enforcing the single-active-action-per-host invariant at the one
    /// entry point everything funnels through.
    pub fn set_action(&self, hostname: &str, action: Action) -> MtceResult<()> {
        let shared = self
            .registry
            .get(hostname)
            .ok_or_else(|| MtceError::HostNotFound(hostname.to_string()))?;
        let mut host = shared.lock();
        if host.action != Action::None {
            return Err(MtceError::ActionInFlight(hostname.to_string(), host.action));
        }
        if action == Action::Swact && !host.node_type.contains(NodeType::CONTROLLER) {
            return Err(MtceError::InvalidStage(
                hostname.to_string(),
                "swact only valid for controller node type".into(),
            ));
        }
        host.action = action;
        host.stage = Stage::Idle;
        Ok(())
    }

    /// Applies one mtcAlive report to its host's liveness bookkeeping. This
    /// is the only path by which `health_signal` and per-interface
    /// last-seen timestamps are updated.
    pub fn on_mtc_alive(&self, report: &MtcAliveReport) -> MtceResult<()> {
        let shared = self
            .registry
            .get(&report.header.hostname)
            .ok_or_else(|| MtceError::HostNotFound(report.header.hostname.clone()))?;
        let mut host = shared.lock();
        host.health_signal = match report.health {
            crate::core::protocol::mtc_message::HealthSignal::Healthy => HealthSignal::Healthy,
            crate::core::protocol::mtc_message::HealthSignal::Unhealthy => HealthSignal::Unhealthy,
            crate::core::protocol::mtc_message::HealthSignal::Unknown => HealthSignal::Unknown,
        };
        let mgmt = &mut host.liveness[crate::core::state::host::Iface::Management.index()];
        mgmt.last_seen = Some(std::time::Instant::now());
        mgmt.mtc_alive_seq_last_received = report.sequence;
        host.reported_uptime = Some(report.uptime);
        Ok(())
    }

    /// Applies one heartbeat pulse miss-threshold crossing to its host. A
    /// minor/major crossing only raises the degrade mask; a fail crossing
    /// additionally marks the management interface failed and, if no other
    /// action currently owns the host, hands it to the auto-recovery
    /// controller the same way `handlers::always_on` does for the raw
    /// liveness-lapse path.
    pub fn on_heartbeat_miss(&self, hostname: &str, event: MissEvent) -> MtceResult<()> {
        let shared = self
            .registry
            .get(hostname)
            .ok_or_else(|| MtceError::HostNotFound(hostname.to_string()))?;
        let mut host = shared.lock();
        host.degrade_mask.insert(DegradeMask::HEARTBEAT);
        host.recompute_degrade();
        if event == MissEvent::Fail {
            host.liveness[Iface::Management.index()].heartbeat_failed = true;
            if host.action == Action::None {
                host.uptime_at_loss = host.reported_uptime;
                host.action = Action::Recover;
                host.stage = Stage::Idle;
            }
        }
        Ok(())
    }

    /// Drives every host forward by one step. Called once per engine
    /// cadence from the server's main loop.
    pub fn tick(&self) {
        self.registry.for_each_in_order(|shared| {
            tick_host(shared);
        });
    }
}

fn tick_host(shared: &SharedHost) {
    let mut host = shared.lock();
    let wants_recover = handlers::always_on::run(&mut host);

    if host.action == Action::None {
        if wants_recover {
            host.action = Action::Recover;
            host.stage = Stage::Idle;
        } else {
            return;
        }
    }

    let outcome = dispatch(&mut host);
    match outcome {
        HandlerOutcome::InProgress => {}
        HandlerOutcome::Complete => {
            let finished_action = host.action;
            host.action = Action::None;
            host.stage = Stage::Idle;
            if finished_action == Action::Recover {
                host.action = Action::Enable;
                host.stage = Stage::Start;
            }
        }
        HandlerOutcome::Failed(reason) => {
            host.task = reason;
            host.action = Action::None;
            host.stage = Stage::Idle;
        }
    }
}

fn dispatch(host: &mut HostRecord) -> HandlerOutcome {
    match host.action {
        Action::None => HandlerOutcome::Complete,
        Action::Unlock | Action::Enable | Action::EnableSubf => handlers::enable::step(host),
        Action::Lock => handlers::disable::step(host, false),
        Action::ForceLock => handlers::disable::step(host, true),
        Action::Reset => handlers::reset::step(host),
        Action::Reinstall => handlers::reinstall::step(host),
        Action::PowerOn => handlers::power::step_power_on(host),
        Action::PowerOff => handlers::power::step_power_off(host),
        Action::PowerCycle => handlers::powercycle::step(host),
        Action::Swact => handlers::swact::step(host),
        Action::Recover => handlers::recover::step(host),
        Action::Add => handlers::add_delete::step_add(host),
        Action::Delete => handlers::add_delete::step_delete(host),
    }
}

/// Convenience re-export for callers that only need the cause taxonomy
/// without pulling in the whole `auto_recovery` module path.
pub use Cause as RecoveryCause;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::state::host::NodeType;

    #[test]
    fn set_action_refuses_when_one_already_active() {
        let registry = Arc::new(HostRegistry::new());
        registry.insert(HostRecord::new("compute-0", NodeType::WORKER));
        let engine = Engine::new(registry);
        engine.set_action("compute-0", Action::Lock).unwrap();
        let err = engine.set_action("compute-0", Action::Reset).unwrap_err();
        assert!(matches!(err, MtceError::ActionInFlight(_, Action::Lock)));
    }

    #[test]
    fn swact_rejected_on_non_controller() {
        let registry = Arc::new(HostRegistry::new());
        registry.insert(HostRecord::new("compute-0", NodeType::WORKER));
        let engine = Engine::new(registry);
        let err = engine.set_action("compute-0", Action::Swact).unwrap_err();
        assert!(matches!(err, MtceError::InvalidStage(_, _)));
    }

    #[test]
    fn fail_crossing_hands_an_idle_host_to_recover() {
        let registry = Arc::new(HostRegistry::new());
        registry.insert(HostRecord::new("compute-0", NodeType::WORKER));
        let engine = Engine::new(registry.clone());
        let host = registry.get("compute-0").unwrap();
        host.lock().reported_uptime = Some(12345);

        engine.on_heartbeat_miss("compute-0", crate::core::heartbeat::MissEvent::Fail).unwrap();

        let host = host.lock();
        assert_eq!(host.action, Action::Recover);
        assert_eq!(host.uptime_at_loss, Some(12345));
        assert!(host.liveness[crate::core::state::host::Iface::Management.index()].heartbeat_failed);
    }

    #[test]
    fn tick_drives_force_lock_to_completion() {
        let registry = Arc::new(HostRegistry::new());
        registry.insert(HostRecord::new("compute-0", NodeType::WORKER));
        let engine = Engine::new(registry.clone());
        engine.set_action("compute-0", Action::ForceLock).unwrap();
        for _ in 0..5 {
            engine.tick();
        }
        let host = registry.get("compute-0").unwrap();
        assert_eq!(host.lock().action, Action::None);
    }
}
