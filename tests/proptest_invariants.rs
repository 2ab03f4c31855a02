use mtce_core::core::alarm::AlarmQueue;
use mtce_core::core::cluster::ClusterVault;
use mtce_core::core::protocol::{AlarmEntry, AlarmOperation, Severity};
use proptest::prelude::*;

fn entry(id: usize) -> AlarmEntry {
    AlarmEntry {
        alarmid: format!("100.{id}"),
        hostname: "compute-0".to_string(),
        operation: AlarmOperation::Set,
        severity: Severity::Major,
        entity: "host=compute-0".to_string(),
        prefix: "100".to_string(),
    }
}

proptest! {
    /// The cluster vault's serialized prefix length always matches its own
    /// `byte_len()` accounting, for any sequence of period updates across
    /// any number of controller/network pairs.
    #[test]
    fn vault_byte_len_matches_serialized_length(
        updates in prop::collection::vec((0u8..4, 0u8..3, 0u16..64, 0u16..64), 0..50)
    ) {
        let mut vault = ClusterVault::new(100, true);
        for (controller, network, monitored, not_responding) in updates {
            vault.record_period(controller, network, monitored, not_responding);
        }
        prop_assert_eq!(vault.serialize_prefix().len(), vault.byte_len());
    }

    /// Enqueuing past the cap never grows the queue beyond it, regardless
    /// of how many entries are pushed.
    #[test]
    fn alarm_queue_never_exceeds_its_cap(cap in 1usize..20, pushes in 0usize..100) {
        let mut queue = AlarmQueue::new(cap);
        for i in 0..pushes {
            queue.enqueue(entry(i));
            prop_assert!(queue.len() <= cap);
        }
    }
}
