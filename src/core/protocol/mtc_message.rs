// src/core/protocol/mtc_message.rs

//! JSON message bodies exchanged between the agent and a client's mtcAgent
//! service: the mtcAlive liveness report and the command messages the
//! engine sends down (reboot, reset, wipedisk, ...). Both carry a small
//! fixed header naming the host and the originating service.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageHeader {
    pub hostname: String,
    pub service: String,
}

/// Out-of-band flag-set carried on every mtcAlive.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct OobFlags {
    pub configured: bool,
    pub healthy: bool,
    pub locked: bool,
    pub subf_configured: bool,
    pub subf_goenabled: bool,
    pub patching: bool,
    pub patched: bool,
    pub sm_degraded: bool,
    pub sm_unhealthy: bool,
    pub luks_failed: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum HealthSignal {
    Healthy,
    Unhealthy,
    Unknown,
}

/// The mtcAlive liveness report body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MtcAliveReport {
    #[serde(flatten)]
    pub header: MessageHeader,
    pub uptime: u64,
    pub health: HealthSignal,
    pub oob: OobFlags,
    /// Sequence number for the interface this report arrived on.
    pub sequence: u32,
}

/// Command codes the engine sends to a client's mtcClient/mtcAgent.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum CommandCode {
    Reboot,
    Reset,
    Wipedisk,
    LazyReboot,
    Sync,
    Locked,
    Unlocked,
    RequestMtcAlive,
    GoenabledRequest,
}

/// A command message. Carries up to four integer parameters, matching the
/// small fixed-arity parameter list used by the original protocol.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MtcCommand {
    #[serde(flatten)]
    pub header: MessageHeader,
    pub command: CommandCode,
    #[serde(default)]
    pub params: Vec<i64>,
}

impl MtcCommand {
    pub fn new(hostname: impl Into<String>, service: impl Into<String>, command: CommandCode) -> Self {
        Self {
            header: MessageHeader {
                hostname: hostname.into(),
                service: service.into(),
            },
            command,
            params: Vec::new(),
        }
    }

    pub fn with_params(mut self, params: Vec<i64>) -> Self {
        self.params = params;
        self
    }
}
