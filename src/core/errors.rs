// src/core/errors.rs

//! Defines the primary error type for the maintenance engine. `thiserror`
//! gives us `Display` plus ergonomic `From` conversions at the call sites
//! that talk to the outside world (REST clients, sockets, JSON).

use thiserror::Error;

/// The engine-wide error taxonomy. Handlers never propagate
/// these outward past the engine tick; they are mapped to retries, alarms,
/// and task strings. Only the `Fatal` variants are allowed to abort startup.
#[derive(Error, Debug, Clone)]
pub enum MtceError {
    #[error("host '{0}' not found")]
    HostNotFound(String),

    #[error("host '{0}' already has an action in flight: {1:?}")]
    ActionInFlight(String, crate::core::state::host::Action),

    #[error("invalid stage transition for host '{0}': {1}")]
    InvalidStage(String, String),

    #[error("transient I/O error: {0}")]
    Transient(String),

    #[error("remote service unavailable: {0}")]
    RemoteUnavailable(String),

    #[error("malformed message: {0}")]
    Malformed(String),

    #[error("operation failed: {0}")]
    OperationFailed(String),

    #[error("BMC not provisioned for host '{0}'")]
    BmcNotProvisioned(String),

    #[error("BMC command rejected: worker busy (prior command not done)")]
    BmcWorkerBusy,

    #[error("alarm queue is full, dropping entry")]
    AlarmQueueFull,

    #[error("auto-recovery disabled for host '{0}', cause {1:?}")]
    AutoRecoveryDisabled(String, crate::core::auto_recovery::Cause),

    #[error("HTTP client error: {0}")]
    Http(String),

    #[error("JSON error: {0}")]
    Json(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("fatal startup error: {0}")]
    Fatal(String),
}

impl From<std::io::Error> for MtceError {
    fn from(e: std::io::Error) -> Self {
        MtceError::Io(e.to_string())
    }
}

impl From<serde_json::Error> for MtceError {
    fn from(e: serde_json::Error) -> Self {
        MtceError::Json(e.to_string())
    }
}

impl From<reqwest::Error> for MtceError {
    fn from(e: reqwest::Error) -> Self {
        MtceError::Http(e.to_string())
    }
}

/// Result alias used throughout the `core` module.
pub type MtceResult<T> = Result<T, MtceError>;
