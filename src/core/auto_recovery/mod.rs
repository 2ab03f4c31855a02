// src/core/auto_recovery/mod.rs

//! The Auto-Recovery Controller: thresholded retry policy
//! that latches a host into a disabled state after repeated cause-specific
//! failures, tracked with the same counter/threshold bookkeeping
//! pattern (per-entity counters gating a state transition), generalized
//! here to five independent per-cause counters instead of one vote tally.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use strum_macros::{EnumCount, EnumIter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumCount, Serialize, Deserialize)]
pub enum Cause {
    Config,
    Goenable,
    HostServices,
    Heartbeat,
    Luks,
}

#[derive(Debug, Clone, Copy)]
pub struct CausePolicy {
    pub threshold: u32,
    pub interval: Duration,
    pub disabled_task_string: &'static str,
}

/// Default thresholds/intervals, overridable from config per cause.
pub fn default_policy(cause: Cause) -> CausePolicy {
    match cause {
        Cause::Config => CausePolicy {
            threshold: 3,
            interval: Duration::from_secs(30),
            disabled_task_string: "Auto recovery disabled: repeated config failures",
        },
        Cause::Goenable => CausePolicy {
            threshold: 3,
            interval: Duration::from_secs(30),
            disabled_task_string: "Auto recovery disabled: repeated goenabled failures",
        },
        Cause::HostServices => CausePolicy {
            threshold: 3,
            interval: Duration::from_secs(60),
            disabled_task_string: "Auto recovery disabled: repeated host-services failures",
        },
        Cause::Heartbeat => CausePolicy {
            threshold: 5,
            interval: Duration::from_secs(60),
            disabled_task_string: "Auto recovery disabled: repeated heartbeat failures",
        },
        Cause::Luks => CausePolicy {
            threshold: 2,
            interval: Duration::from_secs(30),
            disabled_task_string: "Auto recovery disabled: repeated LUKS failures",
        },
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArDecision {
    /// Under threshold: caller should retry after the cause's interval.
    Retry,
    /// Over threshold: `ar_disabled` has latched; caller must refuse
    /// further enable attempts until `ar_enable` is called.
    Disabled,
}

/// Pure decision function over the host's `AutoRecoveryState` (kept on the
/// `HostRecord` itself, see `core::state::host::AutoRecoveryState`). Split
/// out as a free function so the FSM handlers and tests can drive it
/// without needing the whole host record.
pub fn ar_manage(
    state: &mut crate::core::state::host::AutoRecoveryState,
    cause: Cause,
    task_string: &mut String,
) -> ArDecision {
    let policy = default_policy(cause);
    let idx = cause as usize;
    state.counts[idx] += 1;
    state.ar_cause = Some(cause);

    if state.counts[idx] > policy.threshold {
        state.ar_disabled = true;
        *task_string = policy.disabled_task_string.to_string();
        ArDecision::Disabled
    } else {
        ArDecision::Retry
    }
}

/// Clears all counts and the latch. Called on successful enable.
pub fn ar_enable(state: &mut crate::core::state::host::AutoRecoveryState) {
    state.counts = [0; Cause::COUNT];
    state.ar_disabled = false;
    state.ar_cause = None;
}

pub fn retry_interval(cause: Cause) -> Duration {
    default_policy(cause).interval
}

/// Snapshot used by the inventory/operator-facing task string reporter.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ArSnapshot {
    pub counts: HashMap<Cause, u32>,
    pub ar_disabled: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::state::host::AutoRecoveryState;

    #[test]
    fn under_threshold_retries() {
        let mut state = AutoRecoveryState::default();
        let mut task = String::new();
        for _ in 0..default_policy(Cause::Goenable).threshold {
            let decision = ar_manage(&mut state, Cause::Goenable, &mut task);
            assert_eq!(decision, ArDecision::Retry);
        }
        assert!(!state.ar_disabled);
    }

    #[test]
    fn over_threshold_latches_disabled() {
        let mut state = AutoRecoveryState::default();
        let mut task = String::new();
        let threshold = default_policy(Cause::Goenable).threshold;
        for _ in 0..=threshold {
            ar_manage(&mut state, Cause::Goenable, &mut task);
        }
        assert!(state.ar_disabled);
        assert_eq!(task, default_policy(Cause::Goenable).disabled_task_string);
    }

    #[test]
    fn ar_enable_clears_latch() {
        let mut state = AutoRecoveryState::default();
        let mut task = String::new();
        let threshold = default_policy(Cause::Heartbeat).threshold;
        for _ in 0..=threshold {
            ar_manage(&mut state, Cause::Heartbeat, &mut task);
        }
        assert!(state.ar_disabled);
        ar_enable(&mut state);
        assert!(!state.ar_disabled);
        assert_eq!(state.counts, [0; Cause::COUNT]);
    }
}
