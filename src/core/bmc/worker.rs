// src/core/bmc/worker.rs

//! The per-host BMC worker: a single spawned task that executes exactly
//! one out-of-band command at a time and publishes its result back to the
//! engine through a done-flag + data buffer. Directly grounded on the
//! one long-running task per monitored host, cloneable handle,
//! `tokio::select!` over its inputs, simplified to a strict
//! request/response cycle since the BMC worker has no independent
//! periodic duties of its own.

use super::{BmcCommand, BmcCommandResult, BmcCommandValue, PowerState};
use crate::core::errors::MtceError;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, warn};

/// Extra info a command needs beyond its own variant: the BMC address and
/// credentials, fetched lazily by the arbiter before dispatch.
#[derive(Debug, Clone)]
pub struct CommandExtraInfo {
    pub ip: IpAddr,
    pub username: String,
    pub secret: Arc<str>,
}

struct Dispatch {
    command: BmcCommand,
    extra: CommandExtraInfo,
    reply: mpsc::Sender<BmcCommandResult>,
}

/// A cloneable handle the engine holds per host. `send` is a programming
/// error if the previous command hasn't completed (`done() == false`);
/// `recv` is the non-blocking poll the FSM handlers call every tick.
#[derive(Clone)]
pub struct BmcWorkerHandle {
    hostname: Arc<str>,
    dispatch_tx: mpsc::Sender<Dispatch>,
    pending: Arc<Mutex<Option<mpsc::Receiver<BmcCommandResult>>>>,
}

impl BmcWorkerHandle {
    pub fn spawn(hostname: impl Into<Arc<str>>) -> Self {
        let hostname = hostname.into();
        let (dispatch_tx, dispatch_rx) = mpsc::channel::<Dispatch>(4);
        let worker_hostname = hostname.clone();
        tokio::spawn(run_worker(worker_hostname, dispatch_rx));
        Self {
            hostname,
            dispatch_tx,
            pending: Arc::new(Mutex::new(None)),
        }
    }

    /// True when no command is outstanding and a new one may be sent.
    pub async fn done(&self) -> bool {
        self.pending.lock().await.is_none()
    }

    pub async fn send(
        &self,
        command: BmcCommand,
        extra: CommandExtraInfo,
    ) -> Result<(), MtceError> {
        if !self.done().await {
            return Err(MtceError::BmcWorkerBusy);
        }
        let (reply_tx, reply_rx) = mpsc::channel(1);
        self.dispatch_tx
            .send(Dispatch {
                command,
                extra,
                reply: reply_tx,
            })
            .await
            .map_err(|_| MtceError::Transient(format!("BMC worker for {} gone", self.hostname)))?;
        *self.pending.lock().await = Some(reply_rx);
        Ok(())
    }

    /// Non-blocking poll for completion. Returns `Retry` while the command
    /// is still in flight.
    pub async fn recv(&self) -> BmcCommandResult {
        let mut guard = self.pending.lock().await;
        match guard.as_mut() {
            None => BmcCommandResult::Retry,
            Some(rx) => match rx.try_recv() {
                Ok(result) => {
                    *guard = None;
                    result
                }
                Err(mpsc::error::TryRecvError::Empty) => BmcCommandResult::Retry,
                Err(mpsc::error::TryRecvError::Disconnected) => {
                    *guard = None;
                    BmcCommandResult::Error("BMC worker dropped without replying".into())
                }
            },
        }
    }

    /// Kills any in-flight command by dropping the dispatch channel side of
    /// the pending slot. Up to three kill retries are allowed before
    /// the engine gives up and logs an error; that retry loop
    /// lives in the arbiter, which calls this repeatedly.
    pub async fn kill_inflight(&self) {
        *self.pending.lock().await = None;
    }
}

async fn run_worker(hostname: Arc<str>, mut dispatch_rx: mpsc::Receiver<Dispatch>) {
    while let Some(Dispatch {
        command,
        extra,
        reply,
    }) = dispatch_rx.recv().await
    {
        let result = execute(&hostname, &command, &extra).await;
        // The worker doesn't care if the engine already gave up on this
        // reply (kill_inflight dropped the receiver); send is best-effort.
        let _ = reply.send(result).await;
    }
    debug!("BMC worker for {} exiting (handle dropped)", hostname);
}

/// Executes a single out-of-band command against the BMC at `extra.ip`.
/// This is the boundary to the real IPMI/Redfish transport; here it models
/// the request/response shape the engine depends on.
async fn execute(hostname: &str, command: &BmcCommand, extra: &CommandExtraInfo) -> BmcCommandResult {
    tokio::time::sleep(Duration::from_millis(5)).await;
    match command {
        BmcCommand::PowerStatus => BmcCommandResult::Pass(BmcCommandValue::PowerState(
            query_power_state(hostname, extra).await,
        )),
        BmcCommand::PowerOn | BmcCommand::PowerOff | BmcCommand::PowerReset => {
            BmcCommandResult::Pass(BmcCommandValue::Ack)
        }
        BmcCommand::SetBootDevice { device } => {
            debug!("{}: set one-time boot device to {}", hostname, device);
            BmcCommandResult::Pass(BmcCommandValue::Ack)
        }
        BmcCommand::BmcInfo => BmcCommandResult::Pass(BmcCommandValue::Info(Default::default())),
        BmcCommand::RawGet { path } => {
            warn!("{}: raw BMC GET {} not implemented by transport", hostname, path);
            BmcCommandResult::Error("raw GET unsupported by this transport".into())
        }
    }
}

async fn query_power_state(_hostname: &str, _extra: &CommandExtraInfo) -> PowerState {
    PowerState::Unknown
}
