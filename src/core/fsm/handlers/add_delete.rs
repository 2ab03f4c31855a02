// src/core/fsm/handlers/add_delete.rs

//! Add/Delete: purely administrative bookkeeping transitions driven by
//! inventory-service notifications. No hardware is touched; the handler
//! exists so `Action::Add`/`Action::Delete` participate in the same
//! single-active-action discipline as every hardware-facing handler.

use crate::core::fsm::outcome::HandlerOutcome;
use crate::core::state::host::{Availability, HostRecord, Stage};

pub fn step_add(host: &mut HostRecord) -> HandlerOutcome {
    match host.stage {
        Stage::Idle | Stage::Start => {
            host.stage = Stage::TaskStateUpdate;
            HandlerOutcome::InProgress
        }
        Stage::TaskStateUpdate => {
            host.triad.avail = Availability::Offline;
            host.stage = Stage::Done;
            HandlerOutcome::Complete
        }
        _ => HandlerOutcome::Failed(format!("add handler hit unexpected stage {:?}", host.stage)),
    }
}

/// Delete never runs to completion on a live `HostRecord` — the registry
/// entry is removed once this returns `Complete`, so there is no state left
/// to transition into afterward.
pub fn step_delete(host: &mut HostRecord) -> HandlerOutcome {
    match host.stage {
        Stage::Idle | Stage::Start => {
            host.stage = Stage::TaskStateUpdate;
            HandlerOutcome::InProgress
        }
        Stage::TaskStateUpdate => HandlerOutcome::Complete,
        _ => HandlerOutcome::Failed(format!("delete handler hit unexpected stage {:?}", host.stage)),
    }
}
