//! Name-based updater registry
//!
//! The registry maps updater names to factories so the set of updaters can
//! be chosen by configuration instead of hard-coded construction.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use mddns_core::{MultiUpdater, MultiUpdaterConfig, UpdaterRegistry};
//!
//! let mut registry = UpdaterRegistry::new();
//! mddns_provider_netcup::register(&mut registry);
//! mddns_provider_bytecamp::register(&mut registry);
//!
//! let multi = MultiUpdater::from_registry(
//!     &registry,
//!     &MultiUpdaterConfig::default(),
//!     credentials,
//! )?;
//! ```
//!
//! ## Registration
//!
//! Provider crates expose a `register` function:
//!
//! ```rust,ignore
//! pub fn register(registry: &mut UpdaterRegistry) {
//!     registry.register_updater("netcup", Box::new(NetcupFactory));
//! }
//! ```

use crate::credentials::CredentialSource;
use crate::error::{Error, Result};
use crate::traits::{Updater, UpdaterFactory};
use std::collections::HashMap;
use std::sync::Arc;

/// Registry of updater factories, keyed by updater name
#[derive(Default)]
pub struct UpdaterRegistry {
    factories: HashMap<String, Box<dyn UpdaterFactory>>,
}

impl UpdaterRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an updater factory, replacing any factory of the same name
    pub fn register_updater(&mut self, name: impl Into<String>, factory: Box<dyn UpdaterFactory>) {
        self.factories.insert(name.into(), factory);
    }

    /// Create the updater registered as `name`
    ///
    /// # Returns
    ///
    /// - `Ok(Arc<dyn Updater>)`: Created updater
    /// - `Err(Error::Config)`: If `name` is not registered or creation fails
    pub fn create_updater(
        &self,
        name: &str,
        credentials: Arc<dyn CredentialSource>,
    ) -> Result<Arc<dyn Updater>> {
        let factory = self.factories.get(name).ok_or_else(|| {
            Error::config(format!(
                "Unknown updater: {} (registered: {})",
                name,
                self.list_updaters().join(", ")
            ))
        })?;

        factory.create(credentials)
    }

    /// List all registered updater names, sorted
    pub fn list_updaters(&self) -> Vec<String> {
        let mut names: Vec<String> = self.factories.keys().cloned().collect();
        names.sort();
        names
    }

    /// Check if an updater name is registered
    pub fn has_updater(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }
}
