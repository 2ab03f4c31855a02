// src/core/protocol/alarm_message.rs

//! JSON request body sent to the fault manager:
//! `{"mtcalarm":[{...}, ...]}`, one or more entries per request.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AlarmOperation {
    Set,
    Clear,
    Msg,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Clear,
    Warning,
    Minor,
    Major,
    Critical,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlarmEntry {
    pub alarmid: String,
    pub hostname: String,
    pub operation: AlarmOperation,
    pub severity: Severity,
    pub entity: String,
    pub prefix: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlarmRequest {
    pub mtcalarm: Vec<AlarmEntry>,
}

impl AlarmRequest {
    pub fn single(entry: AlarmEntry) -> Self {
        Self {
            mtcalarm: vec![entry],
        }
    }
}
