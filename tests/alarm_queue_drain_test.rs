use async_trait::async_trait;
use mtce_core::core::alarm::{AlarmQueue, FaultManagerClient, FmErrorClass, FmOutcome};
use mtce_core::core::errors::MtceError;
use mtce_core::core::protocol::{AlarmEntry, AlarmOperation, Severity};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

struct ScriptedClient {
    responses: Mutex<Vec<FmOutcome>>,
    calls: AtomicUsize,
}

impl ScriptedClient {
    fn new(responses: Vec<FmOutcome>) -> Self {
        Self {
            responses: Mutex::new(responses),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl FaultManagerClient for ScriptedClient {
    async fn submit(&self, _entry: &AlarmEntry) -> Result<FmOutcome, MtceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            Ok(FmOutcome::Success)
        } else {
            Ok(responses.remove(0))
        }
    }
}

fn entry(id: &str) -> AlarmEntry {
    AlarmEntry {
        alarmid: id.to_string(),
        hostname: "compute-0".to_string(),
        operation: AlarmOperation::Set,
        severity: Severity::Major,
        entity: "host=compute-0".to_string(),
        prefix: "100.101".to_string(),
    }
}

#[tokio::test]
async fn successful_submit_advances_the_queue() {
    let client = ScriptedClient::new(vec![]);
    let mut queue = AlarmQueue::new(10);
    queue.enqueue(entry("100.101"));

    let outcome = queue.drain_one(&client).await;
    assert!(matches!(outcome, mtce_core::core::alarm::queue::DrainOutcome::Advanced));
    assert!(queue.is_empty());
}

#[tokio::test]
async fn transient_error_holds_the_head_in_place() {
    let client = ScriptedClient::new(vec![FmOutcome::Error(FmErrorClass::NotConnected)]);
    let mut queue = AlarmQueue::new(10);
    queue.enqueue(entry("100.102"));

    let outcome = queue.drain_one(&client).await;
    assert!(matches!(outcome, mtce_core::core::alarm::queue::DrainOutcome::Holding));
    assert_eq!(queue.len(), 1);

    let outcome = queue.drain_one(&client).await;
    assert!(matches!(outcome, mtce_core::core::alarm::queue::DrainOutcome::Holding));
    assert_eq!(queue.len(), 1, "head must not be popped while holding");
}

#[tokio::test]
async fn cap_drops_the_newest_entry_not_the_head() {
    let mut queue = AlarmQueue::new(1);
    queue.enqueue(entry("100.101"));
    queue.enqueue(entry("100.102"));
    assert_eq!(queue.len(), 1);

    let client = ScriptedClient::new(vec![]);
    let outcome = queue.drain_one(&client).await;
    assert!(matches!(outcome, mtce_core::core::alarm::queue::DrainOutcome::Advanced));
}
