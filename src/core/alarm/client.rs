// src/core/alarm/client.rs

//! The fault-manager client contract. A `reqwest`-backed implementation is provided for
//! production; tests substitute a scripted fake.

use crate::core::errors::MtceError;
use crate::core::protocol::{AlarmEntry, AlarmRequest};
use async_trait::async_trait;

/// The error classes the fault manager's response is mapped to.
/// Distinct from `MtceError` because the queue's retry policy keys
/// directly off this classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FmErrorClass {
    NotConnected,
    CommunicationsError,
    Pending,
    EntityNotFound,
    AlarmAlreadyExists,
    InvalidRequest,
    InvalidParameter,
    Attribute,
    DbFailure,
    ResourceUnavailable,
    NoMem,
}

impl FmErrorClass {
    /// Transient classes are retried in place with a hold-off, never
    /// reordered.
    pub fn is_transient(self) -> bool {
        matches!(
            self,
            FmErrorClass::NotConnected | FmErrorClass::CommunicationsError | FmErrorClass::Pending
        )
    }

    /// Classes that are popped and logged without being treated as a drop.
    pub fn is_benign_pop(self) -> bool {
        matches!(self, FmErrorClass::EntityNotFound | FmErrorClass::AlarmAlreadyExists)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FmOutcome {
    Success,
    Error(FmErrorClass),
}

#[async_trait]
pub trait FaultManagerClient: Send + Sync {
    async fn submit(&self, entry: &AlarmEntry) -> Result<FmOutcome, MtceError>;
}

/// Production client: a persistent socket would be ideal, but the fault
/// manager here is reached over its HTTP bridge via a plain `reqwest`
/// client.
pub struct HttpFaultManagerClient {
    endpoint: String,
    http: reqwest::Client,
}

impl HttpFaultManagerClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            http: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl FaultManagerClient for HttpFaultManagerClient {
    async fn submit(&self, entry: &AlarmEntry) -> Result<FmOutcome, MtceError> {
        let body = AlarmRequest::single(entry.clone());
        let resp = self.http.post(&self.endpoint).json(&body).send().await;
        match resp {
            Ok(r) if r.status().is_success() => Ok(FmOutcome::Success),
            Ok(r) if r.status() == reqwest::StatusCode::NOT_FOUND => {
                Ok(FmOutcome::Error(FmErrorClass::EntityNotFound))
            }
            Ok(r) if r.status() == reqwest::StatusCode::CONFLICT => {
                Ok(FmOutcome::Error(FmErrorClass::AlarmAlreadyExists))
            }
            Ok(r) if r.status().is_server_error() => Ok(FmOutcome::Error(FmErrorClass::DbFailure)),
            Ok(r) => Ok(FmOutcome::Error(classify_status(r.status()))),
            Err(e) if e.is_connect() || e.is_timeout() => {
                Ok(FmOutcome::Error(FmErrorClass::NotConnected))
            }
            Err(e) => Err(MtceError::from(e)),
        }
    }
}

fn classify_status(status: reqwest::StatusCode) -> FmErrorClass {
    match status.as_u16() {
        400 => FmErrorClass::InvalidRequest,
        422 => FmErrorClass::InvalidParameter,
        409 => FmErrorClass::AlarmAlreadyExists,
        507 => FmErrorClass::NoMem,
        503 => FmErrorClass::ResourceUnavailable,
        _ => FmErrorClass::Attribute,
    }
}
