// src/core/constants.rs

//! Fixed-name, fixed-value constants shared across the engine: pulse wire
//! tags, cluster vault layout, alarm identifiers, BMC protocol tags, and the
//! well-known filesystem flag paths. Centralized here so that no module
//! re-derives or hardcodes a value that must match across the agent/client
//! boundary.

/// Exact 15-byte header of a multicast pulse request (agent -> clients).
pub const PULSE_REQUEST_HEADER: &[u8; 15] = b"cgts pulse req:";
/// Exact 15-byte header of a unicast pulse reply (client -> agent).
pub const PULSE_REPLY_HEADER: &[u8; 15] = b"cgts pulse rsp:";
pub const PULSE_HEADER_SIZE: usize = 15;

/// Cluster vault header constants (mtceHbsCluster.h: VERSION/REVISION/MAGIC_NUMBER).
pub const CLUSTER_VAULT_VERSION: u8 = 1;
pub const CLUSTER_VAULT_REVISION: u8 = 0;
pub const CLUSTER_VAULT_MAGIC: u16 = 0x5aa5;

/// History ring size: 20 entries at the default 100ms period covers 2s of history.
pub const HISTORY_RING_SIZE: usize = 20;
/// Non-OAM, two-controller build defaults.
pub const MAX_CONTROLLERS: usize = 2;
pub const MAX_NETWORKS: usize = 2;
pub const MAX_HISTORY_ELEMENTS: usize = MAX_CONTROLLERS * MAX_NETWORKS;

/// Consecutive-miss threshold before storage-0's dedicated responding latch trips.
pub const STORAGE0_NOT_RESPONDING_THRESHOLD: u32 = 3;

/// Bit 0 of the pulse flags word: pmond (process monitor) alive.
pub const FLAG_PMOND_ALIVE: u32 = 1 << 0;
/// Bit 1: cluster-host network is provisioned for this client.
pub const FLAG_CLSTR_PROVISIONED: u32 = 1 << 1;
/// Bit range carrying the originating controller index (0 or 1).
pub const CTRLX_BIT: u32 = 2;
pub const CTRLX_MASK: u32 = 0b11 << CTRLX_BIT;

/// Alarm ID table (mirrors alarm.cpp's fixed alarm-id strings).
pub mod alarm_id {
    pub const HOST_ENABLE: &str = "100.101";
    pub const HOST_DISABLE: &str = "100.102";
    pub const HEARTBEAT_LOSS: &str = "100.103";
    pub const BMC_ACCESS: &str = "100.106";
    pub const AUTO_RECOVERY_DISABLED: &str = "200.004";
    pub const CONFIG_OUT_OF_DATE: &str = "250.001";
    pub const SM_DEGRADE: &str = "400.002";
}

/// BMC protocol discovery tags.
pub mod bmc_protocol {
    pub const DYNAMIC: &str = "dynamic";
    pub const IPMI: &str = "ipmi";
    pub const REDFISH: &str = "redfish";
    /// Minimum Redfish version accepted during protocol discovery.
    pub const MIN_REDFISH_VERSION: &str = "1.0.0";
}

/// Well-known flag-file paths. Paths are overridable via config for test
/// isolation; these are the production defaults.
pub mod flag_files {
    pub const CONFIG_COMPLETE_FILE: &str = "/etc/platform/.config_complete";
    pub const CONFIG_FAIL_FILE: &str = "/etc/platform/.config_fail";
    pub const CONFIG_PASS_FILE: &str = "/etc/platform/.config_pass";
    pub const GOENABLED_MAIN_PASS: &str = "/var/run/goenabled";
    pub const GOENABLED_MAIN_FAIL: &str = "/var/run/goenabled_failed";
    pub const GOENABLED_SUBF_PASS: &str = "/var/run/goenabled_subf";
    pub const GOENABLED_SUBF_FAIL: &str = "/var/run/goenabled_subf_failed";
    pub const NODE_LOCKED_FILE: &str = "/var/run/.node_locked";
    pub const NODE_LOCKED_FILE_BACKUP: &str = "/etc/platform/.node_locked";
    pub const PLATFORM_SIMPLEX_MODE: &str = "/etc/platform/simplex";
    pub const UNLOCK_READY_FILE: &str = "/var/run/.unlock_ready";
    pub const SMGMT_DEGRADED_FILE: &str = "/var/run/.sm_degraded";
    pub const SMGMT_UNHEALTHY_FILE: &str = "/var/run/.sm_unhealthy";
}

/// Name of the optional fault-insertion file. Renamed on load so a
/// fresh copy must be dropped to re-arm.
pub const FITINFO_FILE: &str = "/var/run/fitinfo";
pub const FITINFO_FILE_CONSUMED_SUFFIX: &str = ".done";
