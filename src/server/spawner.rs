// src/server/spawner.rs

//! Spawns the engine's long-running tasks: the tick loop, the heartbeat
//! pulse loop, and the alarm drain loop: one `tokio::spawn` per independent
//! duty, all sharing `Arc`-wrapped state, joined back only at shutdown.

use super::initialization::Setup;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Controller index this process acts as on the cluster-vault wire format.
/// Fixed at 0 until an active/standby controller pair is wired up with a
/// real identity source.
const LOCAL_CONTROLLER_INDEX: u8 = 0;
/// Network index the management-network pulse agent's history is recorded
/// under in the cluster vault.
const MGMT_NETWORK_INDEX: u8 = 0;

pub fn spawn_all(setup: &Setup) -> Vec<JoinHandle<()>> {
    vec![
        spawn_tick_loop(setup),
        spawn_heartbeat_loop(setup),
        spawn_alarm_drain_loop(setup),
    ]
}

fn spawn_tick_loop(setup: &Setup) -> JoinHandle<()> {
    let engine = setup.engine.clone();
    let period = setup.config.heartbeat.pulse_period;
    tokio::spawn(async move {
        info!("engine tick loop starting, period = {:?}", period);
        let mut ticker = tokio::time::interval(period);
        loop {
            ticker.tick().await;
            engine.tick();
        }
    })
}

/// Drives the multicast pulse agent one period at a time: registers every
/// host currently in the registry, opens the period, closes it, and feeds
/// any miss-threshold crossings into the host FSM. Also updates the
/// cluster vault at each period boundary and pushes it to SM whenever the
/// not-responding count changes.
///
/// The actual multicast send/receive over `core::message_plane::IfaceSocket`
/// is left to a follow-on task once a concrete network topology is
/// supplied; this loop exercises the agent's period bookkeeping and its
/// consumers end to end against whatever replies `PulseAgent::handle_reply`
/// has already recorded.
fn spawn_heartbeat_loop(setup: &Setup) -> JoinHandle<()> {
    let engine = setup.engine.clone();
    let registry = setup.registry.clone();
    let agent = setup.pulse_agent.clone();
    let vault = setup.vault.clone();
    let sm_reporter = setup.sm_reporter.clone();
    let period = setup.config.heartbeat.pulse_period;
    tokio::spawn(async move {
        info!("heartbeat pulse loop starting, period = {:?}", period);
        let mut ticker = tokio::time::interval(period);
        let mut last_not_responding: Option<u16> = None;
        loop {
            ticker.tick().await;

            let events = {
                let mut agent = agent.lock();
                for hostname in registry.hostnames_in_order() {
                    agent.monitor(&hostname);
                }
                agent.begin_period();
                agent.close_period()
            };

            for (hostname, event) in &events {
                if let Err(e) = engine.on_heartbeat_miss(hostname, *event) {
                    warn!("heartbeat miss event for unknown host {hostname}: {e}");
                }
            }

            let (monitored, not_responding) = {
                let agent = agent.lock();
                (agent.monitored_count(), agent.not_responding_count())
            };

            let payload = {
                let mut v = vault.lock();
                v.record_period(LOCAL_CONTROLLER_INDEX, MGMT_NETWORK_INDEX, monitored, not_responding);
                v.serialize_prefix()
            };

            if last_not_responding != Some(not_responding) {
                last_not_responding = Some(not_responding);
                sm_reporter
                    .send_payload(&payload, "heartbeat not-responding count changed")
                    .await;
            }
        }
    })
}

/// Drains the alarm queue at a fixed cadence, independent of the engine
/// tick. The queue lives behind a `tokio::sync::Mutex` rather than
/// `parking_lot` specifically because `drain_one` awaits the fault-manager
/// round trip while holding the guard.
fn spawn_alarm_drain_loop(setup: &Setup) -> JoinHandle<()> {
    let queue = setup.alarm_queue.clone();
    let client = setup.fault_manager.clone();
    tokio::spawn(async move {
        info!("alarm drain loop starting");
        loop {
            let outcome = {
                let mut q = queue.lock().await;
                q.drain_one(client.as_ref()).await
            };
            match outcome {
                crate::core::alarm::queue::DrainOutcome::Holding => {
                    warn!("alarm queue head is holding for retry");
                }
                crate::core::alarm::queue::DrainOutcome::Advanced
                | crate::core::alarm::queue::DrainOutcome::Empty => {}
            }
            tokio::time::sleep(Duration::from_millis(200)).await;
        }
    })
}
