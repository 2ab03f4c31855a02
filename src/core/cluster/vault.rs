// src/core/cluster/vault.rs

//! The Cluster Vault: a process-wide singleton, written
//! only on the active controller, aggregating per-(controller,network)
//! heartbeat history that SM consumes. Constants mirror
//! `mtceHbsCluster.h`: version 1, revision 0, magic `0x5aa5`, a 20-entry
//! ring per history.

use crate::core::constants::{
    CLUSTER_VAULT_MAGIC, CLUSTER_VAULT_REVISION, CLUSTER_VAULT_VERSION, HISTORY_RING_SIZE,
    MAX_HISTORY_ELEMENTS, STORAGE0_NOT_RESPONDING_THRESHOLD,
};
use std::collections::VecDeque;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HistoryEntry {
    pub hosts_enabled: u16,
    pub hosts_responding: u16,
}

/// Size in bytes of one `HistoryEntry` on the wire (two u16 fields).
pub const HISTORY_ENTRY_SIZE: usize = 4;

#[derive(Debug, Clone)]
pub struct History {
    pub controller: u8,
    pub network: u8,
    pub storage0_responding: bool,
    pub sm_heartbeat_fail: bool,
    entries: VecDeque<HistoryEntry>,
    pub oldest_entry_index: u16,
    storage0_miss_streak: u32,
}

impl History {
    pub fn new(controller: u8, network: u8) -> Self {
        Self {
            controller,
            network,
            storage0_responding: true,
            sm_heartbeat_fail: false,
            entries: VecDeque::with_capacity(HISTORY_RING_SIZE),
            oldest_entry_index: 0,
            storage0_miss_streak: 0,
        }
    }

    pub fn entries(&self) -> &VecDeque<HistoryEntry> {
        &self.entries
    }

    pub fn entries_count(&self) -> usize {
        self.entries.len()
    }

    /// Appends an entry at the period boundary, saturating the ring at
    /// `HISTORY_RING_SIZE` and advancing `oldest_entry_index` to the next
    /// write slot.
    pub fn push_entry(&mut self, entry: HistoryEntry) {
        debug_assert!(entry.hosts_responding <= entry.hosts_enabled);
        if self.entries.len() == HISTORY_RING_SIZE {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
        self.oldest_entry_index = (self.oldest_entry_index + 1) % HISTORY_RING_SIZE as u16;
    }

    /// Tracks storage-0's dedicated consecutive-miss latch: `>= N`
    /// consecutive misses flips `storage0_responding` to false.
    pub fn note_storage0(&mut self, responded: bool) {
        if responded {
            self.storage0_miss_streak = 0;
            self.storage0_responding = true;
        } else {
            self.storage0_miss_streak += 1;
            if self.storage0_miss_streak >= STORAGE0_NOT_RESPONDING_THRESHOLD {
                self.storage0_responding = false;
            }
        }
    }
}

/// Wire header size: version(1) + revision(1) + magic(2) + reqid(2) +
/// period_msec(2) + bytes(2) + storage0_enabled(1) + histories_count(1).
pub const VAULT_HEADER_SIZE: usize = 12;

pub struct ClusterVault {
    pub version: u8,
    pub revision: u8,
    pub magic: u16,
    pub period_msec: u16,
    pub storage0_enabled: bool,
    histories: Vec<History>,
}

impl ClusterVault {
    pub fn new(period_msec: u16, storage0_enabled: bool) -> Self {
        Self {
            version: CLUSTER_VAULT_VERSION,
            revision: CLUSTER_VAULT_REVISION,
            magic: CLUSTER_VAULT_MAGIC,
            period_msec,
            storage0_enabled,
            histories: Vec::new(),
        }
    }

    pub fn histories(&self) -> &[History] {
        &self.histories
    }

    pub fn histories_count(&self) -> usize {
        self.histories.len()
    }

    /// Finds or creates the history for (controller, network), enforcing
    /// the dense-index / unique-pair invariant and the
    /// `histories <= controllers * networks` bound.
    pub fn history_mut(&mut self, controller: u8, network: u8) -> &mut History {
        if let Some(idx) = self
            .histories
            .iter()
            .position(|h| h.controller == controller && h.network == network)
        {
            return &mut self.histories[idx];
        }
        assert!(
            self.histories.len() < MAX_HISTORY_ELEMENTS,
            "cluster vault history count exceeds controllers * networks"
        );
        self.histories.push(History::new(controller, network));
        self.histories.last_mut().expect("just pushed")
    }

    /// Updates this controller's own histories at a period boundary for
    /// every provisioned network: append
    /// `(monitored_hosts, monitored_hosts - not_responding)`.
    pub fn record_period(
        &mut self,
        controller: u8,
        network: u8,
        monitored_hosts: u16,
        not_responding: u16,
    ) {
        let responding = monitored_hosts.saturating_sub(not_responding);
        self.history_mut(controller, network).push_entry(HistoryEntry {
            hosts_enabled: monitored_hosts,
            hosts_responding: responding,
        });
    }

    /// Injects a `(0, 0)` entry into the peer controller's histories when
    /// it's enabled but didn't reply this period, so SM sees the gap
    ///.
    pub fn record_peer_gap(&mut self, peer_controller: u8, network: u8) {
        self.history_mut(peer_controller, network).push_entry(HistoryEntry {
            hosts_enabled: 0,
            hosts_responding: 0,
        });
    }

    /// Byte length of the wire prefix covering only the valid histories:
    /// header + histories * (per-history fixed fields + ring_size entries).
    pub fn byte_len(&self) -> usize {
        VAULT_HEADER_SIZE + self.histories.len() * HISTORY_WIRE_SIZE
    }

    /// Serializes the vault prefix for SM delivery: the
    /// byte count must equal `header + histories * sizeof(history)`.
    pub fn serialize_prefix(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.byte_len());
        buf.push(self.version);
        buf.push(self.revision);
        buf.extend_from_slice(&self.magic.to_be_bytes());
        buf.extend_from_slice(&0u16.to_be_bytes()); // reqid, filled by caller if needed
        buf.extend_from_slice(&self.period_msec.to_be_bytes());
        buf.extend_from_slice(&(self.byte_len() as u16).to_be_bytes());
        buf.push(self.storage0_enabled as u8);
        buf.push(self.histories.len() as u8);

        for history in &self.histories {
            buf.push(history.controller);
            buf.push(history.network);
            buf.push((history.sm_heartbeat_fail as u8) << 1 | history.storage0_responding as u8);
            buf.push(0); // reserved
            buf.extend_from_slice(&(history.entries_count() as u16).to_be_bytes());
            buf.extend_from_slice(&(HISTORY_RING_SIZE as u16).to_be_bytes());
            buf.extend_from_slice(&history.oldest_entry_index.to_be_bytes());
            for i in 0..HISTORY_RING_SIZE {
                let entry = history.entries().get(i).copied().unwrap_or_default();
                buf.extend_from_slice(&entry.hosts_enabled.to_be_bytes());
                buf.extend_from_slice(&entry.hosts_responding.to_be_bytes());
            }
        }
        debug_assert_eq!(buf.len(), self.byte_len());
        buf
    }
}

/// Fixed per-history fields (controller/network/flags/reserved/entries/
/// entries_max/oldest_index = 10 bytes) plus the full 20-entry ring.
pub const HISTORY_FIXED_SIZE: usize = 10;
pub const HISTORY_WIRE_SIZE: usize = HISTORY_FIXED_SIZE + HISTORY_RING_SIZE * HISTORY_ENTRY_SIZE;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn byte_len_matches_serialized_length() {
        let mut vault = ClusterVault::new(100, true);
        vault.record_period(0, 0, 10, 1);
        vault.record_period(0, 1, 10, 0);
        vault.record_period(1, 0, 10, 2);
        assert_eq!(vault.serialize_prefix().len(), vault.byte_len());
        assert!(vault.histories_count() <= MAX_HISTORY_ELEMENTS);
    }

    #[test]
    fn ring_saturates_at_20_entries() {
        let mut history = History::new(0, 0);
        for i in 0..30u16 {
            history.push_entry(HistoryEntry {
                hosts_enabled: 5,
                hosts_responding: i % 6,
            });
        }
        assert_eq!(history.entries_count(), HISTORY_RING_SIZE);
        assert!((history.oldest_entry_index as usize) < HISTORY_RING_SIZE);
    }

    #[test]
    fn storage0_latch_trips_after_threshold_misses() {
        let mut history = History::new(0, 0);
        assert!(history.storage0_responding);
        for _ in 0..STORAGE0_NOT_RESPONDING_THRESHOLD {
            history.note_storage0(false);
        }
        assert!(!history.storage0_responding);
        history.note_storage0(true);
        assert!(history.storage0_responding);
    }

    #[test]
    fn responding_never_exceeds_enabled() {
        let mut vault = ClusterVault::new(100, false);
        vault.record_period(0, 0, 5, 10); // not_responding > monitored: saturates to 0
        let entry = vault.history_mut(0, 0).entries().back().copied().unwrap();
        assert!(entry.hosts_responding <= entry.hosts_enabled);
    }
}
