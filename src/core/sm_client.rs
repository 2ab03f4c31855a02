// src/core/sm_client.rs

//! The HA service manager (SM) client contract used by the Swact handler:
//! requesting a controller role switchover and polling its outcome. SM's
//! own failover policy is out of scope; this crate only models the
//! request/response shape it depends on.

use crate::core::errors::MtceError;
use async_trait::async_trait;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwactOutcome {
    Accepted,
    Rejected,
    InProgress,
    Complete,
}

#[async_trait]
pub trait SmClient: Send + Sync {
    async fn request_swact(&self, hostname: &str) -> Result<SwactOutcome, MtceError>;
    async fn query_swact(&self, hostname: &str) -> Result<SwactOutcome, MtceError>;
}

pub struct HttpSmClient {
    base_url: String,
    http: reqwest::Client,
    timeout: Duration,
}

impl HttpSmClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            base_url: base_url.into(),
            http: reqwest::Client::new(),
            timeout,
        }
    }

    fn parse_outcome(status: reqwest::StatusCode) -> SwactOutcome {
        match status.as_u16() {
            200 => SwactOutcome::Complete,
            202 => SwactOutcome::Accepted,
            409 => SwactOutcome::InProgress,
            _ => SwactOutcome::Rejected,
        }
    }
}

#[async_trait]
impl SmClient for HttpSmClient {
    async fn request_swact(&self, hostname: &str) -> Result<SwactOutcome, MtceError> {
        let url = format!("{}/v1/swact/{}", self.base_url, hostname);
        let resp = self.http.post(&url).timeout(self.timeout).send().await?;
        Ok(Self::parse_outcome(resp.status()))
    }

    async fn query_swact(&self, hostname: &str) -> Result<SwactOutcome, MtceError> {
        let url = format!("{}/v1/swact/{}", self.base_url, hostname);
        let resp = self.http.get(&url).timeout(self.timeout).send().await?;
        Ok(Self::parse_outcome(resp.status()))
    }
}
