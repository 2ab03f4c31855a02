// src/core/state/registry.rs

//! The engine's host registry: every host record the engine is responsible
//! for, keyed by hostname, with insertion order preserved for the
//! inventory-ordered listing operations the REST surface exposes.
//!
//! A `DashMap<String, Arc<Mutex<HostRecord>>>`
//! master registry: concurrent lookups for the BMC worker tasks and the
//! heartbeat loop, single-writer discipline for the stage cursor enforced
//! by convention (only the engine tick task calls mutating methods other
//! than the narrow BMC/heartbeat update paths).

use super::host::HostRecord;
use dashmap::DashMap;
use parking_lot::Mutex;
use std::sync::Arc;

pub type SharedHost = Arc<Mutex<HostRecord>>;

pub struct HostRegistry {
    hosts: DashMap<String, SharedHost>,
    /// Insertion order, independent of the DashMap's unspecified iteration
    /// order, so listing operations are stable across calls.
    order: Mutex<Vec<String>>,
}

impl HostRegistry {
    pub fn new() -> Self {
        Self {
            hosts: DashMap::new(),
            order: Mutex::new(Vec::new()),
        }
    }

    pub fn insert(&self, record: HostRecord) -> SharedHost {
        let hostname = record.hostname.clone();
        let shared = Arc::new(Mutex::new(record));
        if self.hosts.insert(hostname.clone(), shared.clone()).is_none() {
            self.order.lock().push(hostname);
        }
        shared
    }

    pub fn get(&self, hostname: &str) -> Option<SharedHost> {
        self.hosts.get(hostname).map(|entry| entry.value().clone())
    }

    pub fn remove(&self, hostname: &str) -> Option<SharedHost> {
        let removed = self.hosts.remove(hostname).map(|(_, v)| v);
        if removed.is_some() {
            self.order.lock().retain(|h| h != hostname);
        }
        removed
    }

    pub fn contains(&self, hostname: &str) -> bool {
        self.hosts.contains_key(hostname)
    }

    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }

    /// Snapshot of hostnames in insertion order, for the REST listing
    /// surface and the per-period cluster vault aggregation pass.
    pub fn hostnames_in_order(&self) -> Vec<String> {
        self.order.lock().clone()
    }

    pub fn for_each_in_order(&self, mut f: impl FnMut(&SharedHost)) {
        for hostname in self.order.lock().iter() {
            if let Some(entry) = self.hosts.get(hostname) {
                f(entry.value());
            }
        }
    }
}

impl Default for HostRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::state::host::NodeType;

    #[test]
    fn insertion_order_is_preserved_across_removal_and_reinsert() {
        let registry = HostRegistry::new();
        registry.insert(HostRecord::new("compute-1", NodeType::WORKER));
        registry.insert(HostRecord::new("compute-0", NodeType::WORKER));
        registry.insert(HostRecord::new("controller-0", NodeType::CONTROLLER));
        assert_eq!(
            registry.hostnames_in_order(),
            vec!["compute-1", "compute-0", "controller-0"]
        );

        registry.remove("compute-0");
        registry.insert(HostRecord::new("compute-0", NodeType::WORKER));
        assert_eq!(
            registry.hostnames_in_order(),
            vec!["compute-1", "controller-0", "compute-0"]
        );
    }

    #[test]
    fn get_returns_shared_handle() {
        let registry = HostRegistry::new();
        registry.insert(HostRecord::new("compute-0", NodeType::WORKER));
        let handle = registry.get("compute-0").unwrap();
        handle.lock().degrade_mask = crate::core::state::host::DegradeMask::HEARTBEAT;
        let handle2 = registry.get("compute-0").unwrap();
        assert_eq!(
            handle2.lock().degrade_mask,
            crate::core::state::host::DegradeMask::HEARTBEAT
        );
    }
}
