//! Test doubles and common utilities for orchestrator contract tests
//!
//! This module provides scripted updaters that record how they were called
//! without talking to any provider.

#![allow(dead_code)]

use async_trait::async_trait;
use mddns_core::error::{Error, Result};
use mddns_core::{UpdateRequest, Updater};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Barrier;

/// An updater whose results and timing are fixed up front
pub struct ScriptedUpdater {
    name: &'static str,
    init_error: Option<String>,
    update_result: std::result::Result<String, String>,
    delay: Duration,
    barrier: Option<Arc<Barrier>>,
    panics: bool,
    init_calls: Arc<AtomicUsize>,
    init_completed: Arc<AtomicUsize>,
    update_calls: Arc<AtomicUsize>,
    seen_requests: Arc<Mutex<Vec<UpdateRequest>>>,
}

impl ScriptedUpdater {
    /// An updater that initialises and updates successfully
    pub fn ok(name: &'static str) -> Self {
        Self {
            name,
            init_error: None,
            update_result: Ok(format!("{} updated", name)),
            delay: Duration::ZERO,
            barrier: None,
            panics: false,
            init_calls: Arc::new(AtomicUsize::new(0)),
            init_completed: Arc::new(AtomicUsize::new(0)),
            update_calls: Arc::new(AtomicUsize::new(0)),
            seen_requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Fail `init` with a configuration error
    pub fn failing_init(mut self, message: &str) -> Self {
        self.init_error = Some(message.to_string());
        self
    }

    /// Fail `update` with a provider error
    pub fn failing_update(mut self, message: &str) -> Self {
        self.update_result = Err(message.to_string());
        self
    }

    /// Sleep before answering either call
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Wait on `barrier` before answering `update`
    pub fn with_barrier(mut self, barrier: Arc<Barrier>) -> Self {
        self.barrier = Some(barrier);
        self
    }

    /// Panic inside `update`
    pub fn panicking(mut self) -> Self {
        self.panics = true;
        self
    }

    /// Number of times init() was called
    pub fn init_calls(&self) -> usize {
        self.init_calls.load(Ordering::SeqCst)
    }

    /// Number of times init() ran to completion
    pub fn init_completed(&self) -> usize {
        self.init_completed.load(Ordering::SeqCst)
    }

    /// Number of times update() was called
    pub fn update_calls(&self) -> usize {
        self.update_calls.load(Ordering::SeqCst)
    }

    /// Requests passed to update()
    pub fn seen_requests(&self) -> Vec<UpdateRequest> {
        self.seen_requests.lock().unwrap().clone()
    }

    /// Wrap for the orchestrator while keeping a handle for assertions
    pub fn shared(self) -> (Arc<ScriptedUpdater>, Arc<dyn Updater>) {
        let updater = Arc::new(self);
        let dynamic: Arc<dyn Updater> = updater.clone();
        (updater, dynamic)
    }
}

#[async_trait]
impl Updater for ScriptedUpdater {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn init(&self) -> Result<()> {
        self.init_calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.init_completed.fetch_add(1, Ordering::SeqCst);

        match &self.init_error {
            Some(message) => Err(Error::config(message.clone())),
            None => Ok(()),
        }
    }

    async fn update(&self, request: &UpdateRequest) -> Result<String> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        self.seen_requests.lock().unwrap().push(request.clone());

        if let Some(barrier) = &self.barrier {
            barrier.wait().await;
        }
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if self.panics {
            panic!("{} blew up", self.name);
        }

        self.update_result
            .clone()
            .map_err(|message| Error::provider(self.name, message))
    }
}

/// The request used throughout the contract tests
pub fn dual_stack_request() -> UpdateRequest {
    UpdateRequest::new("example.com", "@")
        .with_ip4addr([1, 2, 3, 4].into())
        .with_ip6addr("1::1".parse().unwrap())
}

/// Assert that outcomes carry `names` in exactly this order
pub fn assert_order(outcomes: &[mddns_core::UpdateOutcome], names: &[&str]) {
    let got: Vec<&str> = outcomes.iter().map(|o| o.provider.as_str()).collect();
    assert_eq!(got, names, "outcomes must follow configuration order");
}
