//! Fan-out orchestrator
//!
//! The MultiUpdater is responsible for:
//! - Initialising every configured updater and reporting all failures at once
//! - Dispatching each update request to every updater concurrently
//! - Turning every updater result into an ordered outcome report
//!
//! ## Architecture
//!
//! ```text
//!                      UpdateRequest
//!                            │
//!                            ▼
//!                   ┌────────────────┐
//!                   │  MultiUpdater  │
//!                   └────────────────┘
//!                            │  one task per updater
//!         ┌──────────────────┼──────────────────┐
//!         ▼                  ▼                  ▼
//!  ┌─────────────┐    ┌─────────────┐    ┌─────────────┐
//!  │  Updater 1  │    │  Updater 2  │    │  Updater N  │
//!  └─────────────┘    └─────────────┘    └─────────────┘
//!         │                  │                  │
//!         └──────────────────┼──────────────────┘
//!                            ▼
//!              Vec<UpdateOutcome> (configuration order)
//! ```
//!
//! ## Settle-All
//!
//! Both `init` and `update` wait for every task before returning. A failing
//! updater never cancels or delays the report of its siblings.

use crate::config::MultiUpdaterConfig;
use crate::credentials::CredentialSource;
use crate::error::{Error, Result};
use crate::registry::UpdaterRegistry;
use crate::traits::{UpdateRequest, Updater};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, error, info};

/// Whether an updater applied the request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeStatus {
    Success,
    Failure,
}

impl std::fmt::Display for OutcomeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutcomeStatus::Success => f.write_str("success"),
            OutcomeStatus::Failure => f.write_str("failure"),
        }
    }
}

/// Result of one updater for one request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateOutcome {
    /// The updater's static name
    pub provider: String,

    /// Success or failure
    pub status: OutcomeStatus,

    /// Provider confirmation on success, error message on failure
    pub result: String,
}

impl UpdateOutcome {
    fn from_result(provider: &str, result: Result<String>) -> Self {
        match result {
            Ok(message) => Self {
                provider: provider.to_string(),
                status: OutcomeStatus::Success,
                result: message,
            },
            Err(e) => Self {
                provider: provider.to_string(),
                status: OutcomeStatus::Failure,
                result: e.to_string(),
            },
        }
    }

    /// Whether the updater succeeded
    pub fn is_success(&self) -> bool {
        self.status == OutcomeStatus::Success
    }
}

/// Concurrent driver for a fixed, ordered set of updaters
///
/// ## Lifecycle
///
/// 1. Create with [`MultiUpdater::new()`] or [`MultiUpdater::from_registry()`]
/// 2. Call [`MultiUpdater::init()`] once at startup; treat failure as fatal
/// 3. Call [`MultiUpdater::update()`] per incoming request
///
/// The updater list never changes after construction. Cloning is cheap and
/// shares the updaters.
#[derive(Clone)]
pub struct MultiUpdater {
    /// Updaters in configuration order
    updaters: Vec<Arc<dyn Updater>>,
}

impl MultiUpdater {
    /// Create an orchestrator over `updaters`, in that order
    pub fn new(updaters: Vec<Arc<dyn Updater>>) -> Self {
        Self { updaters }
    }

    /// Build the updaters named in `config` from `registry`
    ///
    /// # Returns
    ///
    /// - `Ok(MultiUpdater)`: every name was registered
    /// - `Err(Error::Config)`: invalid config or unknown updater name
    pub fn from_registry(
        registry: &UpdaterRegistry,
        config: &MultiUpdaterConfig,
        credentials: Arc<dyn CredentialSource>,
    ) -> Result<Self> {
        config.validate()?;

        let updaters = config
            .updaters
            .iter()
            .map(|name| registry.create_updater(name, Arc::clone(&credentials)))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self::new(updaters))
    }

    /// Names of the configured updaters, in order
    pub fn names(&self) -> Vec<&'static str> {
        self.updaters.iter().map(|u| u.name()).collect()
    }

    /// Number of configured updaters
    pub fn len(&self) -> usize {
        self.updaters.len()
    }

    /// Whether no updater is configured
    pub fn is_empty(&self) -> bool {
        self.updaters.is_empty()
    }

    /// Initialise every updater concurrently
    ///
    /// Waits for all of them. If any fail, the error lists one
    /// `"<updater>: <message>"` line per failure, in configuration order.
    pub async fn init(&self) -> Result<()> {
        let handles: Vec<JoinHandle<Result<()>>> = self
            .updaters
            .iter()
            .map(|updater| {
                let updater = Arc::clone(updater);
                tokio::spawn(async move { updater.init().await })
            })
            .collect();

        let mut failures = Vec::new();
        for (updater, handle) in self.updaters.iter().zip(handles) {
            match flatten(handle.await) {
                Ok(()) => debug!("{}: initialised", updater.name()),
                Err(e) => {
                    error!("{}: initialisation failed: {}", updater.name(), e);
                    failures.push(format!("{}: {}", updater.name(), e));
                }
            }
        }

        if failures.is_empty() {
            info!("Initialised {} updater(s)", self.updaters.len());
            Ok(())
        } else {
            Err(Error::Init(failures.join("\n")))
        }
    }

    /// Apply `request` at every updater concurrently
    ///
    /// Never fails: each updater's result, success or failure, becomes one
    /// [`UpdateOutcome`]. The report has exactly one entry per updater, in
    /// configuration order.
    pub async fn update(&self, request: &UpdateRequest) -> Vec<UpdateOutcome> {
        let request = Arc::new(request.clone());

        debug!(
            "Dispatching update for {} to {} updater(s)",
            request.fqdn(),
            self.updaters.len()
        );

        let handles: Vec<JoinHandle<Result<String>>> = self
            .updaters
            .iter()
            .map(|updater| {
                let updater = Arc::clone(updater);
                let request = Arc::clone(&request);
                tokio::spawn(async move { updater.update(&request).await })
            })
            .collect();

        let mut outcomes = Vec::with_capacity(handles.len());
        for (updater, handle) in self.updaters.iter().zip(handles) {
            let outcome = UpdateOutcome::from_result(updater.name(), flatten(handle.await));
            log_outcome(&outcome);
            outcomes.push(outcome);
        }

        outcomes
    }
}

impl std::fmt::Debug for MultiUpdater {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MultiUpdater")
            .field("updaters", &self.names())
            .finish()
    }
}

/// A panicked or cancelled task counts as a failure of that updater
fn flatten<T>(joined: std::result::Result<Result<T>, JoinError>) -> Result<T> {
    joined.unwrap_or_else(|e| Err(Error::Other(format!("updater task failed: {}", e))))
}

fn log_outcome(outcome: &UpdateOutcome) {
    match outcome.status {
        OutcomeStatus::Success => info!(
            provider = %outcome.provider,
            "{}: {} ({})",
            outcome.provider,
            outcome.status,
            outcome.result
        ),
        OutcomeStatus::Failure => error!(
            provider = %outcome.provider,
            "{}: {} ({})",
            outcome.provider,
            outcome.status,
            outcome.result
        ),
    }
}
