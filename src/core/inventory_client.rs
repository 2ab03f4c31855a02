// src/core/inventory_client.rs

//! The inventory-service client contract: an external collaborator this
//! crate only models the request/response shape of, never its wire
//! payload internals. The engine uses it to push task-string and
//! state updates and to persist the discovered BMC protocol.

use crate::core::errors::MtceError;
use async_trait::async_trait;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct StateUpdate {
    pub hostname: String,
    pub admin: String,
    pub oper: String,
    pub avail: String,
    pub task: String,
}

#[async_trait]
pub trait InventoryClient: Send + Sync {
    async fn update_state(&self, update: &StateUpdate) -> Result<(), MtceError>;
    async fn persist_bmc_protocol(&self, hostname: &str, protocol: &str) -> Result<(), MtceError>;
}

/// Production client wrapped with a per-host HTTP timer and retry counter,
/// mirroring the fault-manager client's shape.
pub struct HttpInventoryClient {
    base_url: String,
    http: reqwest::Client,
    timeout: Duration,
}

impl HttpInventoryClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            base_url: base_url.into(),
            http: reqwest::Client::new(),
            timeout,
        }
    }
}

#[async_trait]
impl InventoryClient for HttpInventoryClient {
    async fn update_state(&self, update: &StateUpdate) -> Result<(), MtceError> {
        let url = format!("{}/v1/ihosts/{}", self.base_url, update.hostname);
        self.http
            .patch(&url)
            .timeout(self.timeout)
            .json(update)
            .send()
            .await?
            .error_for_status()
            .map_err(MtceError::from)?;
        Ok(())
    }

    async fn persist_bmc_protocol(&self, hostname: &str, protocol: &str) -> Result<(), MtceError> {
        let url = format!("{}/v1/ihosts/{}", self.base_url, hostname);
        self.http
            .patch(&url)
            .timeout(self.timeout)
            .json(&serde_json::json!({ "bm_type": protocol }))
            .send()
            .await?
            .error_for_status()
            .map_err(MtceError::from)?;
        Ok(())
    }
}

impl serde::Serialize for StateUpdate {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(4))?;
        map.serialize_entry("administrative", &self.admin)?;
        map.serialize_entry("operational", &self.oper)?;
        map.serialize_entry("availability", &self.avail)?;
        map.serialize_entry("task", &self.task)?;
        map.end()
    }
}
