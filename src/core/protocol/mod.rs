// src/core/protocol/mod.rs

pub mod alarm_message;
pub mod mtc_message;
pub mod pulse_frame;

pub use alarm_message::{AlarmEntry, AlarmOperation, AlarmRequest, Severity};
pub use mtc_message::{CommandCode, HealthSignal, MtcAliveReport, MtcCommand, OobFlags};
pub use pulse_frame::{PulseKind, PulseMessage};
