// src/core/alarm/queue.rs

//! The Alarm Request Queue: tail-enqueue, head-dequeue, with
//! a retry/drop policy keyed on the fault manager's returned error class.
//! Bounded at a configurable cap (default 2000); overflow drops from the
//! tail (newest) so older alarms are preserved.

use super::client::{FaultManagerClient, FmErrorClass, FmOutcome};
use crate::core::protocol::AlarmEntry;
use std::collections::VecDeque;
use std::time::{Duration, Instant};
use tracing::{info, warn};

pub const DEFAULT_QUEUE_CAP: usize = 2000;
/// Hold-off applied before retrying a transient failure at the head
///.
pub const RETRY_HOLDOFF: Duration = Duration::from_secs(5);

pub struct AlarmQueue {
    entries: VecDeque<AlarmEntry>,
    cap: usize,
    retry_not_before: Option<Instant>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrainOutcome {
    /// Head was processed (success or a non-transient pop) and can advance.
    Advanced,
    /// Head is being held for its retry hold-off; nothing was sent.
    Holding,
    /// Queue was empty.
    Empty,
}

impl AlarmQueue {
    pub fn new(cap: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            cap,
            retry_not_before: None,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Enqueues at the tail. If the cap is exceeded, drops from the tail
    /// (the entry just pushed) rather than disturbing the head — drops
    /// always come from the tail once the cap is reached.
    pub fn enqueue(&mut self, entry: AlarmEntry) {
        if self.entries.len() >= self.cap {
            warn!(
                "alarm queue at cap ({}), dropping newest entry for host {}",
                self.cap, entry.hostname
            );
            return;
        }
        self.entries.push_back(entry);
    }

    /// Drains (attempts to submit) the head entry through `client`,
    /// applying the retry policy by error class.
    pub async fn drain_one(&mut self, client: &dyn FaultManagerClient) -> DrainOutcome {
        let Some(head) = self.entries.front() else {
            return DrainOutcome::Empty;
        };

        if let Some(not_before) = self.retry_not_before
            && Instant::now() < not_before
        {
            return DrainOutcome::Holding;
        }

        match client.submit(head).await {
            Ok(FmOutcome::Success) => {
                self.entries.pop_front();
                self.retry_not_before = None;
                DrainOutcome::Advanced
            }
            Ok(FmOutcome::Error(class)) if class.is_transient() => {
                self.retry_not_before = Some(Instant::now() + RETRY_HOLDOFF);
                DrainOutcome::Holding
            }
            Ok(FmOutcome::Error(class)) if class.is_benign_pop() => {
                info!(
                    "alarm {} for {} popped: {:?}",
                    head.alarmid, head.hostname, class
                );
                self.entries.pop_front();
                self.retry_not_before = None;
                DrainOutcome::Advanced
            }
            Ok(FmOutcome::Error(class)) => {
                warn!(
                    "alarm {} for {} dropped (non-retryable: {:?})",
                    head.alarmid, head.hostname, class
                );
                self.entries.pop_front();
                self.retry_not_before = None;
                DrainOutcome::Advanced
            }
            Err(e) => {
                warn!("fault manager submit errored, holding: {}", e);
                self.retry_not_before = Some(Instant::now() + RETRY_HOLDOFF);
                DrainOutcome::Holding
            }
        }
    }
}

impl Default for AlarmQueue {
    fn default() -> Self {
        Self::new(DEFAULT_QUEUE_CAP)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::alarm::client::FmOutcome;
    use crate::core::protocol::{AlarmOperation, Severity};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct ScriptedClient {
        outcomes: Mutex<VecDeque<Result<FmOutcome, crate::core::errors::MtceError>>>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl FaultManagerClient for ScriptedClient {
        async fn submit(
            &self,
            _entry: &AlarmEntry,
        ) -> Result<FmOutcome, crate::core::errors::MtceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.outcomes.lock().unwrap().pop_front().unwrap()
        }
    }

    fn sample_entry() -> AlarmEntry {
        AlarmEntry {
            alarmid: "100.101".into(),
            hostname: "compute-0".into(),
            operation: AlarmOperation::Set,
            severity: Severity::Major,
            entity: "host=compute-0".into(),
            prefix: "mtce".into(),
        }
    }

    #[test]
    fn overflow_drops_from_tail() {
        let mut q = AlarmQueue::new(2);
        q.enqueue(sample_entry());
        q.enqueue(sample_entry());
        q.enqueue(sample_entry()); // dropped
        assert_eq!(q.len(), 2);
    }

    #[tokio::test]
    async fn transient_error_holds_head() {
        let mut q = AlarmQueue::new(10);
        q.enqueue(sample_entry());
        let client = ScriptedClient {
            outcomes: Mutex::new(VecDeque::from([Ok(FmOutcome::Error(FmErrorClass::NotConnected))])),
            calls: AtomicUsize::new(0),
        };
        let outcome = q.drain_one(&client).await;
        assert_eq!(outcome, DrainOutcome::Holding);
        assert_eq!(q.len(), 1);
    }

    #[tokio::test]
    async fn success_pops_head() {
        let mut q = AlarmQueue::new(10);
        q.enqueue(sample_entry());
        let client = ScriptedClient {
            outcomes: Mutex::new(VecDeque::from([Ok(FmOutcome::Success)])),
            calls: AtomicUsize::new(0),
        };
        let outcome = q.drain_one(&client).await;
        assert_eq!(outcome, DrainOutcome::Advanced);
        assert!(q.is_empty());
    }
}
