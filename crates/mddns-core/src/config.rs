//! Configuration types for the DDNS updater
//!
//! Provider secrets are not part of this configuration; they are resolved
//! through a [`crate::credentials::CredentialSource`] at `init` time.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Updaters driven when nothing else is configured
pub const DEFAULT_UPDATERS: &[&str] = &["netcup", "bytecamp"];

/// Which updaters the orchestrator drives, in order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiUpdaterConfig {
    /// Registered updater names; outcomes follow this order
    #[serde(default = "default_updaters")]
    pub updaters: Vec<String>,
}

impl MultiUpdaterConfig {
    /// Create a configuration for the given updater names
    pub fn new<I, S>(updaters: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            updaters: updaters.into_iter().map(Into::into).collect(),
        }
    }

    /// Parse a comma-separated list such as `"netcup, ionos"`
    pub fn from_list(list: &str) -> Self {
        Self::new(
            list.split(',')
                .map(|s| s.trim().to_lowercase())
                .filter(|s| !s.is_empty()),
        )
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.updaters.is_empty() {
            return Err(crate::Error::config("No updaters configured"));
        }

        let mut seen = HashSet::new();
        for name in &self.updaters {
            if !seen.insert(name.as_str()) {
                return Err(crate::Error::config(format!(
                    "Updater configured more than once: {}",
                    name
                )));
            }
        }

        Ok(())
    }
}

impl Default for MultiUpdaterConfig {
    fn default() -> Self {
        Self {
            updaters: default_updaters(),
        }
    }
}

fn default_updaters() -> Vec<String> {
    DEFAULT_UPDATERS.iter().map(|s| s.to_string()).collect()
}
