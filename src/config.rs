// src/config.rs

//! Typed configuration: loading, per-field defaults, and validation.
//! Every section carries its own `#[serde(default = "...")]` defaults
//! so a mostly-empty TOML file still produces a runnable configuration.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    #[serde(default = "default_management_iface")]
    pub management_iface: String,
    #[serde(default)]
    pub cluster_host_iface: Option<String>,
    #[serde(default)]
    pub pxeboot_iface: Option<String>,
    #[serde(default = "default_multicast_addr")]
    pub pulse_multicast_addr: IpAddr,
}

fn default_management_iface() -> String {
    "lo".to_string()
}
fn default_multicast_addr() -> IpAddr {
    "239.1.1.2".parse().unwrap()
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            management_iface: default_management_iface(),
            cluster_host_iface: None,
            pxeboot_iface: None,
            pulse_multicast_addr: default_multicast_addr(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeartbeatConfig {
    #[serde(default = "default_pulse_period_ms", with = "humantime_serde")]
    pub pulse_period: Duration,
    #[serde(default = "default_minor_threshold")]
    pub minor_threshold: u32,
    #[serde(default = "default_major_threshold")]
    pub major_threshold: u32,
    #[serde(default = "default_fail_threshold")]
    pub fail_threshold: u32,
    #[serde(default = "default_pxeboot_fail_threshold")]
    pub pxeboot_fail_threshold: u32,
}

fn default_pulse_period_ms() -> Duration {
    Duration::from_millis(100)
}
fn default_minor_threshold() -> u32 {
    1
}
fn default_major_threshold() -> u32 {
    4
}
fn default_fail_threshold() -> u32 {
    8
}
fn default_pxeboot_fail_threshold() -> u32 {
    10
}

impl Default for HeartbeatConfig {
    fn default() -> Self {
        Self {
            pulse_period: default_pulse_period_ms(),
            minor_threshold: default_minor_threshold(),
            major_threshold: default_major_threshold(),
            fail_threshold: default_fail_threshold(),
            pxeboot_fail_threshold: default_pxeboot_fail_threshold(),
        }
    }
}

/// Per-cause auto-recovery overrides. Any cause omitted from the TOML file
/// keeps `auto_recovery::default_policy`'s built-in threshold/interval.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AutoRecoveryConfig {
    #[serde(default)]
    pub config_threshold: Option<u32>,
    #[serde(default)]
    pub goenable_threshold: Option<u32>,
    #[serde(default)]
    pub host_services_threshold: Option<u32>,
    #[serde(default)]
    pub heartbeat_threshold: Option<u32>,
    #[serde(default)]
    pub luks_threshold: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BmcConfig {
    #[serde(default = "default_bmc_access_timeout", with = "humantime_serde")]
    pub access_alarm_delay: Duration,
    #[serde(default = "default_bmc_audit_period", with = "humantime_serde")]
    pub audit_period: Duration,
    #[serde(default = "default_bmc_protocol_mode")]
    pub protocol_mode: String,
}

fn default_bmc_access_timeout() -> Duration {
    Duration::from_secs(120)
}
fn default_bmc_audit_period() -> Duration {
    Duration::from_secs(300)
}
fn default_bmc_protocol_mode() -> String {
    "dynamic".to_string()
}

impl Default for BmcConfig {
    fn default() -> Self {
        Self {
            access_alarm_delay: default_bmc_access_timeout(),
            audit_period: default_bmc_audit_period(),
            protocol_mode: default_bmc_protocol_mode(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlarmConfig {
    #[serde(default = "default_alarm_queue_cap")]
    pub queue_cap: usize,
    #[serde(default = "default_fm_endpoint")]
    pub fault_manager_endpoint: String,
}

fn default_alarm_queue_cap() -> usize {
    2000
}
fn default_fm_endpoint() -> String {
    "http://127.0.0.1:18002/v1/fm".to_string()
}

impl Default for AlarmConfig {
    fn default() -> Self {
        Self {
            queue_cap: default_alarm_queue_cap(),
            fault_manager_endpoint: default_fm_endpoint(),
        }
    }
}

/// Where the cluster vault's SM reporter delivers the serialized prefix.
/// SM listens on a local, loopback-only UDP socket for this push.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterConfig {
    #[serde(default = "default_sm_vault_addr")]
    pub sm_vault_addr: SocketAddr,
}

fn default_sm_vault_addr() -> SocketAddr {
    "127.0.0.1:2122".parse().unwrap()
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            sm_vault_addr: default_sm_vault_addr(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestClientsConfig {
    #[serde(default = "default_inventory_endpoint")]
    pub inventory_base_url: String,
    #[serde(default = "default_sm_endpoint")]
    pub sm_base_url: String,
    #[serde(default = "default_rest_timeout", with = "humantime_serde")]
    pub timeout: Duration,
}

fn default_inventory_endpoint() -> String {
    "http://127.0.0.1:6385".to_string()
}
fn default_sm_endpoint() -> String {
    "http://127.0.0.1:2222".to_string()
}
fn default_rest_timeout() -> Duration {
    Duration::from_secs(10)
}

impl Default for RestClientsConfig {
    fn default() -> Self {
        Self {
            inventory_base_url: default_inventory_endpoint(),
            sm_base_url: default_sm_endpoint(),
            timeout: default_rest_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub simplex_mode: bool,
    #[serde(default)]
    pub dor_mode: bool,
    #[serde(default)]
    pub network: NetworkConfig,
    #[serde(default)]
    pub heartbeat: HeartbeatConfig,
    #[serde(default)]
    pub auto_recovery: AutoRecoveryConfig,
    #[serde(default)]
    pub bmc: BmcConfig,
    #[serde(default)]
    pub alarm: AlarmConfig,
    #[serde(default)]
    pub rest: RestClientsConfig,
    #[serde(default)]
    pub cluster: ClusterConfig,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    pub fn from_file(path: &str) -> Result<Self> {
        let settings = ::config::Config::builder()
            .add_source(::config::File::with_name(path).required(false))
            .add_source(::config::Environment::with_prefix("MTCE").separator("__"))
            .build()
            .with_context(|| format!("failed to build configuration from \"{path}\""))?;

        settings
            .try_deserialize()
            .with_context(|| format!("failed to parse configuration from \"{path}\""))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane_without_a_config_file() {
        let cfg = Config::from_file("/nonexistent/path/does-not-matter.toml").unwrap();
        assert_eq!(cfg.log_level, "info");
        assert_eq!(cfg.alarm.queue_cap, 2000);
        assert_eq!(cfg.heartbeat.fail_threshold, 8);
    }
}
