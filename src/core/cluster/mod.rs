// src/core/cluster/mod.rs

//! Cluster Vault & SM Reporter.

pub mod sm_reporter;
pub mod vault;

pub use sm_reporter::{SmReporter, SmSocket, UdpSmSocket};
pub use vault::{ClusterVault, History, HistoryEntry};
