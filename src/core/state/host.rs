// src/core/state/host.rs

//! The Host Record: per-host identity, addressing, triad
//! state, current action and stage cursor, liveness counters, degrade
//! mask, auto-recovery counters, alarm mirror, timers, BMC sub-state, and
//! the REST work/done queues. A record is owned exclusively by the engine;
//! external subscribers only ever see copies.

use super::timers::TimerSet;
use crate::core::auto_recovery::Cause;
use crate::core::bmc::BmcState;
use crate::core::protocol::Severity;
use bitflags::bitflags;
use std::collections::VecDeque;
use std::net::IpAddr;
use std::time::Instant;
use strum_macros::{Display, EnumIter};
use uuid::Uuid;

bitflags! {
    /// Node-type bitmask.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct NodeType: u8 {
        const CONTROLLER = 0b001;
        const WORKER     = 0b010;
        const STORAGE    = 0b100;
    }
}

bitflags! {
    /// Degrade-cause mask: host is degraded iff this mask
    /// is non-zero while unlocked-enabled.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct DegradeMask: u16 {
        const HEARTBEAT       = 1 << 0;
        const PROCESS_MONITOR = 1 << 1;
        const RESOURCE        = 1 << 2;
        const CONFIG          = 1 << 3;
        const SM              = 1 << 4;
        const ENABLE          = 1 << 5;
        const HWMON           = 1 << 6;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum AdminState {
    Locked,
    Unlocked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum OperState {
    Enabled,
    Disabled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Availability {
    Available,
    Degraded,
    Offline,
    Online,
    Failed,
    Intest,
    PoweredOff,
    NotInstalled,
    Offduty,
}

/// The triad: administrative intent, operational status, and its
/// availability refinement (GLOSSARY). A subfunction triad mirrors this for
/// combined-role controllers.
#[derive(Debug, Clone, Copy)]
pub struct Triad {
    pub admin: AdminState,
    pub oper: OperState,
    pub avail: Availability,
}

impl Triad {
    pub fn locked_disabled_offline() -> Self {
        Self {
            admin: AdminState::Locked,
            oper: OperState::Disabled,
            avail: Availability::Offline,
        }
    }
}

/// Exactly one action is active on a host at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter)]
pub enum Action {
    None,
    Unlock,
    Lock,
    ForceLock,
    Reset,
    Reinstall,
    PowerOn,
    PowerOff,
    PowerCycle,
    Swact,
    Enable,
    EnableSubf,
    Recover,
    Add,
    Delete,
}

/// Per-action-handler stage cursor. Each handler owns exactly one of these
/// fields' worth of progress; no other thread (there is only the engine
/// thread, but the invariant still matters across handler boundaries) may
/// advance it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Default)]
pub enum Stage {
    #[default]
    Idle,
    Start,
    HeartbeatStopCmd,
    ResetProgression,
    ResetWait,
    IntestStart,
    MtcAlivePurge,
    MtcAliveWait,
    GoenabledTimer,
    GoenabledWait,
    HeartbeatWait,
    HeartbeatSoak,
    StateChange,
    WorkqueueWait,
    Enabled,
    Failure,
    FailureWait,
    FailureSwactWait,
    RetryWait,
    ReqMtcAlive,
    ReqMtcAliveWait,
    MtcAliveTimer,
    ResetSendWait,
    ResetRecvWait,
    ConfigCompleteWait,
    SubfGoenabledTimer,
    SubfGoenabledWait,
    HeartbeatStart,
    DisServicesWait,
    HandlePoweronSend,
    HandlePoweronRecv,
    HandleForceLock,
    ResetHostWait,
    TaskStateUpdate,
    ReqSend,
    RespWait,
    OfflineWait,
    Query,
    QueryRecv,
    Swact,
    SwactRecv,
    SwactPoll,
    Done,
    Poweroff,
    PoweroffCmndWait,
    PoweroffWait,
    Cooloff,
    Poweron,
    PoweronVerify,
    PoweronVerifyWait,
    PoweronWait,
    Holdoff,
}

/// Per-interface liveness bookkeeping.
#[derive(Debug, Clone, Copy, Default)]
pub struct IfaceLiveness {
    pub last_seen: Option<Instant>,
    pub mtc_alive_seq_last_received: u32,
    pub mtc_alive_seq_last_compared: u32,
    pub miss_count: u32,
    pub loss_count: u32,
    pub heartbeat_failed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum HealthSignal {
    Healthy,
    Unhealthy,
    Unknown,
}

/// What the Enable handler's heartbeat soak should do when the client's
/// configured heartbeat-failure action is "none": skip the soak entirely
/// rather than waiting it out with nothing watching the degrade mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Default)]
pub enum HeartbeatFailureAction {
    #[default]
    Failover,
    None,
}

#[derive(Debug, Clone, Default)]
pub struct Addressing {
    pub management_ip: Option<IpAddr>,
    pub cluster_host_ip: Option<IpAddr>,
    pub pxeboot_ip: Option<IpAddr>,
    pub mac: Option<String>,
    pub bmc_ip: Option<IpAddr>,
    pub bmc_username: Option<String>,
    /// The BMC password is fetched lazily from the external secret store;
    /// this only ever holds a reference name, never the secret itself.
    pub bmc_secret_ref: Option<String>,
}

/// A single queued REST command descriptor. The REST client itself is an
/// external collaborator; this crate only orders and tracks
/// descriptors, never the client's wire types.
#[derive(Debug, Clone)]
pub struct WorkItem {
    pub sequence: u64,
    pub description: String,
}

#[derive(Debug, Clone, Default)]
pub struct AutoRecoveryState {
    pub counts: [u32; Cause::COUNT],
    pub ar_disabled: bool,
    pub ar_cause: Option<Cause>,
}

/// The full per-host record. Owned exclusively by the engine;
/// `Arc<parking_lot::Mutex<HostRecord>>` is how the BMC worker task and the
/// heartbeat loop touch it without violating single-writer ownership of the
/// stage cursor (only the engine tick advances stages).
#[derive(Debug)]
pub struct HostRecord {
    pub hostname: String,
    pub uuid: Uuid,
    pub node_type: NodeType,
    pub function: String,
    pub subfunction: Option<String>,

    pub addressing: Addressing,

    pub triad: Triad,
    pub subf_triad: Option<Triad>,

    pub action: Action,
    pub stage: Stage,

    pub liveness: [IfaceLiveness; 3], // indexed by Iface
    pub health_signal: HealthSignal,
    pub oob: crate::core::protocol::OobFlags,

    pub degrade_mask: DegradeMask,

    pub auto_recovery: AutoRecoveryState,

    pub alarms: std::collections::HashMap<String, Severity>,

    pub timers: TimerSet,

    pub bmc: BmcState,

    pub work_queue: VecDeque<WorkItem>,
    pub done_queue: VecDeque<WorkItem>,
    pub next_sequence: u64,

    pub task: String,

    /// Saved uptime at the moment heartbeat loss was declared, used by the
    /// recover handler's "did the host actually reset" tie-break.
    pub uptime_at_loss: Option<u64>,
    pub graceful_recovery_counter: u32,

    /// Uptime as carried on the most recent mtcAlive report, kept outside
    /// `liveness` since it's a body field rather than a per-interface
    /// counter.
    pub reported_uptime: Option<u64>,

    pub heartbeat_failure_action: HeartbeatFailureAction,
}

impl HostRecord {
    pub fn new(hostname: impl Into<String>, node_type: NodeType) -> Self {
        Self {
            hostname: hostname.into(),
            uuid: Uuid::new_v4(),
            node_type,
            function: String::new(),
            subfunction: None,
            addressing: Addressing::default(),
            triad: Triad::locked_disabled_offline(),
            subf_triad: None,
            action: Action::None,
            stage: Stage::Idle,
            liveness: Default::default(),
            health_signal: HealthSignal::Unknown,
            oob: Default::default(),
            degrade_mask: DegradeMask::empty(),
            auto_recovery: AutoRecoveryState::default(),
            alarms: Default::default(),
            timers: TimerSet::new(),
            bmc: BmcState::default(),
            work_queue: VecDeque::new(),
            done_queue: VecDeque::new(),
            next_sequence: 0,
            task: String::new(),
            uptime_at_loss: None,
            graceful_recovery_counter: 0,
            reported_uptime: None,
            heartbeat_failure_action: HeartbeatFailureAction::default(),
        }
    }

    /// Recomputes availability from the degrade mask: degraded iff
    /// unlocked-enabled and mask != 0; available
    /// iff unlocked-enabled and mask == 0. Leaves any other availability
    /// (offline, failed, intest, ...) untouched — those are set explicitly
    /// by the handler driving that transition.
    pub fn recompute_degrade(&mut self) {
        if self.triad.admin == AdminState::Unlocked && self.triad.oper == OperState::Enabled {
            self.triad.avail = if self.degrade_mask.is_empty() {
                Availability::Available
            } else {
                Availability::Degraded
            };
        }
    }

    pub fn enqueue_work(&mut self, description: impl Into<String>) {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.work_queue.push_back(WorkItem {
            sequence,
            description: description.into(),
        });
    }

    pub fn complete_front_work(&mut self) -> Option<WorkItem> {
        let item = self.work_queue.pop_front()?;
        self.done_queue.push_back(item.clone());
        Some(item)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter)]
pub enum Iface {
    Management,
    ClusterHost,
    Pxeboot,
}

impl Iface {
    pub fn index(self) -> usize {
        self as usize
    }
}
