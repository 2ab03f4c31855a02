// src/core/bmc/mod.rs

//! BMC Access & Protocol Arbiter. The BMC worker is the only
//! real parallel actor in the engine: a task+channel
//! abstraction where the engine sends a command descriptor and polls a
//! non-blocking `recv` for the result: a long-running per-entity task
//! that owns its own connection, with the engine only ever touching
//! shared state through `Arc<Mutex<...>>`.

pub mod arbiter;
pub mod worker;

use serde::{Deserialize, Serialize};
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Protocol {
    Dynamic,
    Ipmi,
    Redfish,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThreadControl {
    Idle,
    Active,
}

#[derive(Debug, Clone, Default)]
pub struct LearnedInfo {
    pub firmware_version: Option<String>,
    pub power_state: Option<PowerState>,
    pub supported_reset_actions: Vec<String>,
    pub last_restart_cause: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerState {
    On,
    Off,
    Unknown,
}

/// Per-host BMC sub-state, independent of whatever action handler is
/// currently in progress.
#[derive(Debug, Clone)]
pub struct BmcState {
    pub protocol: Protocol,
    pub accessible: bool,
    pub learned: LearnedInfo,
    pub thread: ThreadControl,
    pub ping_ok: bool,
    pub last_access_lost_at: Option<Instant>,
    pub access_alarm_raised: bool,
    pub audit_period: Option<std::time::Duration>,
}

impl Default for BmcState {
    fn default() -> Self {
        Self {
            protocol: Protocol::Dynamic,
            accessible: false,
            learned: LearnedInfo::default(),
            thread: ThreadControl::Idle,
            ping_ok: false,
            last_access_lost_at: None,
            access_alarm_raised: false,
            audit_period: Some(std::time::Duration::from_secs(300)),
        }
    }
}

/// The out-of-band commands the engine may issue, serialized one at a time
/// per host.
#[derive(Debug, Clone)]
pub enum BmcCommand {
    PowerStatus,
    PowerOn,
    PowerOff,
    PowerReset,
    SetBootDevice { device: String },
    BmcInfo,
    RawGet { path: String },
}

#[derive(Debug, Clone)]
pub enum BmcCommandResult {
    Pass(BmcCommandValue),
    Retry,
    Error(String),
}

#[derive(Debug, Clone)]
pub enum BmcCommandValue {
    PowerState(PowerState),
    Info(LearnedInfo),
    Ack,
    Raw(String),
}
