// src/core/state/timers.rs

//! A bounded timer set keyed by a small enum, replacing the ad-hoc
//! per-purpose timer objects of the source. Each
//! slot holds an optional deadline and a `ring` flag set by `tick()` when
//! the deadline has passed; the owning handler drains the flag.

use std::collections::HashMap;
use std::time::{Duration, Instant};
use strum_macros::EnumIter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub enum TimerId {
    MtcAction,
    MtcAliveTimer,
    OfflineTimer,
    OnlineTimer,
    HttpTimer,
    BmcAccessTimer,
    BmcAuditTimer,
    HostServicesTimer,
    HwmonRecoveryTimer,
    HwmonControlTimer,
    InsvTestTimer,
    OosTestTimer,
    MtcConfigTimer,
}

#[derive(Debug, Clone, Copy, Default)]
struct TimerSlot {
    deadline: Option<Instant>,
    rung: bool,
}

/// Per-host collection of scoped, one-shot timer handles. Cancelled on
/// record deletion (by simply dropping the `TimerSet`) or on re-arming for
/// the next stage.
#[derive(Debug, Default)]
pub struct TimerSet {
    slots: HashMap<TimerId, TimerSlot>,
}

impl TimerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arms `id` to ring after `delay`, overwriting any previous arming.
    pub fn arm(&mut self, id: TimerId, delay: Duration) {
        self.slots.insert(
            id,
            TimerSlot {
                deadline: Some(Instant::now() + delay),
                rung: false,
            },
        );
    }

    pub fn cancel(&mut self, id: TimerId) {
        self.slots.remove(&id);
    }

    /// Called once per engine tick to promote expired deadlines into ring
    /// flags. Does not itself clear the flag; `take_ring` does that.
    pub fn tick(&mut self) {
        let now = Instant::now();
        for slot in self.slots.values_mut() {
            if let Some(deadline) = slot.deadline
                && now >= deadline
                && !slot.rung
            {
                slot.rung = true;
            }
        }
    }

    /// Returns true and clears the ring flag if `id` has rung since the
    /// last call. A handler polls this to decide whether its umbrella
    /// timer expired.
    pub fn take_ring(&mut self, id: TimerId) -> bool {
        if let Some(slot) = self.slots.get_mut(&id)
            && slot.rung
        {
            slot.rung = false;
            self.slots.remove(&id);
            return true;
        }
        false
    }

    pub fn is_armed(&self, id: TimerId) -> bool {
        self.slots.contains_key(&id)
    }
}
