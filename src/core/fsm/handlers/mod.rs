// src/core/fsm/handlers/mod.rs

//! One module per host action, plus `always_on` for the checks that run
//! regardless of which action (if any) currently owns the host.

pub mod add_delete;
pub mod always_on;
pub mod disable;
pub mod enable;
pub mod power;
pub mod powercycle;
pub mod recover;
pub mod reinstall;
pub mod reset;
pub mod swact;
