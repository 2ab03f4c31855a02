// src/core/state/mod.rs

//! Host state: the record type, the shared registry, and per-host timers.

pub mod host;
pub mod registry;
pub mod timers;

pub use host::{
    Action, AdminState, Addressing, Availability, AutoRecoveryState, DegradeMask, HealthSignal,
    HostRecord, Iface, IfaceLiveness, NodeType, OperState, Stage, Triad, WorkItem,
};
pub use registry::{HostRegistry, SharedHost};
pub use timers::{TimerId, TimerSet};
