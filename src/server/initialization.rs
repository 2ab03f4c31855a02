// src/server/initialization.rs

//! Bootstrap: builds every piece of shared state the engine needs before
//! the main loop starts. Construction is kept separate from running so
//! construction failures abort cleanly before any socket or task is live.

use crate::config::Config;
use crate::core::alarm::{AlarmQueue, HttpFaultManagerClient};
use crate::core::cluster::{ClusterVault, SmReporter, UdpSmSocket};
use crate::core::fsm::Engine;
use crate::core::heartbeat::{PulseAgent, PulseThresholds};
use crate::core::inventory_client::HttpInventoryClient;
use crate::core::message_plane::NetlinkMonitor;
use crate::core::sm_client::HttpSmClient;
use crate::core::state::HostRegistry;
use anyhow::Result;
use std::sync::Arc;

/// Everything the spawned tasks need a handle to. Built once at startup,
/// then cloned (cheaply, via `Arc`) into each task.
pub struct Setup {
    pub config: Config,
    pub registry: Arc<HostRegistry>,
    pub engine: Arc<Engine>,
    pub vault: Arc<parking_lot::Mutex<ClusterVault>>,
    pub pulse_agent: Arc<parking_lot::Mutex<PulseAgent>>,
    pub sm_reporter: Arc<SmReporter<UdpSmSocket>>,
    pub alarm_queue: Arc<tokio::sync::Mutex<AlarmQueue>>,
    pub fault_manager: Arc<HttpFaultManagerClient>,
    pub inventory: Arc<HttpInventoryClient>,
    pub sm: Arc<HttpSmClient>,
    pub link_monitor: Arc<NetlinkMonitor>,
}

impl Setup {
    pub async fn build(config: Config) -> Result<Self> {
        let registry = Arc::new(HostRegistry::new());
        let engine = Arc::new(Engine::new(registry.clone()));

        let vault = Arc::new(parking_lot::Mutex::new(ClusterVault::new(
            config.heartbeat.pulse_period.as_millis() as u16,
            !config.simplex_mode,
        )));

        let pulse_thresholds = PulseThresholds {
            minor: config.heartbeat.minor_threshold,
            major: config.heartbeat.major_threshold,
            fail: config.heartbeat.fail_threshold,
        };
        let pulse_agent = Arc::new(parking_lot::Mutex::new(PulseAgent::new(
            "mgmt",
            0,
            pulse_thresholds,
        )));

        let sm_socket = UdpSmSocket::bind(config.cluster.sm_vault_addr).await?;
        let sm_reporter = Arc::new(SmReporter::new(sm_socket));

        let fault_manager = Arc::new(HttpFaultManagerClient::new(
            config.alarm.fault_manager_endpoint.clone(),
        ));
        let alarm_queue = Arc::new(tokio::sync::Mutex::new(AlarmQueue::new(config.alarm.queue_cap)));

        let inventory = Arc::new(HttpInventoryClient::new(
            config.rest.inventory_base_url.clone(),
            config.rest.timeout,
        ));
        let sm = Arc::new(HttpSmClient::new(config.rest.sm_base_url.clone(), config.rest.timeout));

        let link_monitor = Arc::new(NetlinkMonitor::new());
        link_monitor.open();

        Ok(Self {
            config,
            registry,
            engine,
            vault,
            pulse_agent,
            sm_reporter,
            alarm_queue,
            fault_manager,
            inventory,
            sm,
            link_monitor,
        })
    }
}
