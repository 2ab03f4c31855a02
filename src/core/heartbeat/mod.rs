// src/core/heartbeat/mod.rs

//! The heartbeat pulse engine: per-network multicast pulse agents, the
//! client-side responder, and the pxeboot network's dedicated monitor.

pub mod pulse_agent;
pub mod pulse_client;
pub mod pxeboot_monitor;

pub use pulse_agent::{MissEvent, PulseAgent, PulseThresholds};
pub use pulse_client::PulseClient;
pub use pxeboot_monitor::{PxebootMonitor, PxebootState};
