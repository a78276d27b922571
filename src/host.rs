//! Host runtime for a worker
//!
//! The host owns signal delivery: it registers one worker, dispatches
//! `install` and `fetch` signals to it and waits for each to resolve.
//! A failed install may be retried according to the host policy; fetch
//! signals are never retried.

use crate::cache::DiskStorage;
use crate::config::schema::HostConfig;
use crate::config::{Config, ConfigManager};
use crate::error::{PrecacheError, PrecacheResult};
use crate::http::{Request, Response};
use crate::network::HttpNetwork;
use crate::worker::{CacheProxy, InstallReport, Worker};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info_span, warn, Instrument};
use uuid::Uuid;

/// Lifecycle signal delivered to the worker
#[derive(Debug, Clone)]
pub enum Signal {
    /// A new worker version is being activated
    Install,
    /// A network request was intercepted
    Fetch(Request),
}

impl Signal {
    pub fn kind(&self) -> &'static str {
        match self {
            Signal::Install => "install",
            Signal::Fetch(_) => "fetch",
        }
    }
}

/// What a resolved signal produced
#[derive(Debug, Clone)]
pub enum SignalOutcome {
    Installed(InstallReport),
    Responded(Response),
}

/// Retry policy for the install signal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostPolicy {
    /// Total install attempts (at least 1)
    pub install_attempts: u32,
    /// Delay between install attempts
    pub retry_delay: Duration,
}

impl Default for HostPolicy {
    fn default() -> Self {
        Self {
            install_attempts: 1,
            retry_delay: Duration::from_millis(500),
        }
    }
}

impl From<&HostConfig> for HostPolicy {
    fn from(config: &HostConfig) -> Self {
        Self {
            install_attempts: config.install_attempts.max(1),
            retry_delay: Duration::from_millis(config.retry_delay_ms),
        }
    }
}

/// Delivers signals to a registered worker
#[derive(Default)]
pub struct Host {
    worker: Option<Arc<dyn Worker>>,
    policy: HostPolicy,
}

impl Host {
    pub fn new(policy: HostPolicy) -> Self {
        Self {
            worker: None,
            policy,
        }
    }

    /// Register the worker that handles signals, replacing any previous one
    pub fn register(&mut self, worker: Arc<dyn Worker>) {
        self.worker = Some(worker);
    }

    pub fn policy(&self) -> HostPolicy {
        self.policy
    }

    /// Deliver a signal and wait for the worker to resolve it
    pub async fn dispatch(&self, signal: Signal) -> PrecacheResult<SignalOutcome> {
        let worker = self.worker.clone().ok_or(PrecacheError::NoWorker)?;
        let span = info_span!("signal", id = %Uuid::new_v4(), kind = signal.kind());

        async move {
            match signal {
                Signal::Install => self
                    .run_install(worker.as_ref())
                    .await
                    .map(SignalOutcome::Installed),
                Signal::Fetch(request) => worker
                    .on_fetch(request)
                    .await
                    .map(SignalOutcome::Responded),
            }
        }
        .instrument(span)
        .await
    }

    /// Dispatch the install signal
    pub async fn install(&self) -> PrecacheResult<InstallReport> {
        match self.dispatch(Signal::Install).await? {
            SignalOutcome::Installed(report) => Ok(report),
            SignalOutcome::Responded(_) => Err(PrecacheError::User(
                "install signal resolved with a response".to_string(),
            )),
        }
    }

    /// Dispatch a fetch signal
    pub async fn fetch(&self, request: Request) -> PrecacheResult<Response> {
        match self.dispatch(Signal::Fetch(request)).await? {
            SignalOutcome::Responded(response) => Ok(response),
            SignalOutcome::Installed(_) => Err(PrecacheError::User(
                "fetch signal resolved with an install report".to_string(),
            )),
        }
    }

    async fn run_install(&self, worker: &dyn Worker) -> PrecacheResult<InstallReport> {
        let attempts = self.policy.install_attempts.max(1);
        let mut attempt = 1;

        loop {
            match worker.on_install().await {
                Ok(report) => return Ok(report),
                Err(e) if attempt < attempts && e.is_retryable() => {
                    warn!(
                        "Install attempt {}/{} failed: {}, retrying",
                        attempt, attempts, e
                    );
                    tokio::time::sleep(self.policy.retry_delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Create a host running the cache proxy over disk storage and HTTP
pub fn create_host(config: &Config) -> PrecacheResult<Host> {
    let network = HttpNetwork::new(
        &config.network.origin,
        Duration::from_secs(config.network.timeout_secs),
    )?;
    let storage = DiskStorage::new(ConfigManager::storage_root(config));
    let proxy = CacheProxy::new(Arc::new(storage), Arc::new(network));

    let mut host = Host::new(HostPolicy::from(&config.host));
    host.register(Arc::new(proxy));
    Ok(host)
}
