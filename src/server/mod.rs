// src/server/mod.rs

//! Top-level bootstrap: build shared state, spawn the long-running
//! tasks, then block until one of them exits (which should only happen
//! on a fatal error or process shutdown).

pub mod initialization;
pub mod spawner;

use anyhow::Result;
use tracing::{error, info};

pub async fn run(config: crate::config::Config) -> Result<()> {
    let setup = initialization::Setup::build(config).await?;
    info!("engine bootstrap complete, spawning tasks");

    let handles = spawner::spawn_all(&setup);

    for handle in handles {
        if let Err(e) = handle.await {
            error!("a long-running task panicked: {e}");
        }
    }

    Ok(())
}
