//! Credential lookup
//!
//! Updaters never read the environment themselves. They receive an
//! `Arc<dyn CredentialSource>` and ask it for secrets by name, which keeps
//! them testable without touching process state.
//!
//! [`EnvCredentials`] is the production source. A variable can be
//! indirected through a file by adding the `_FILE` suffix, which is how
//! docker secrets are mounted:
//!
//! ```text
//! NETCUP_API_PASSWORD=secret                        # direct
//! NETCUP_API_PASSWORD_FILE=/run/secrets/netcup_pw   # read from file
//! ```
//!
//! The file wins when both are set.

use crate::error::{Error, Result};
use std::collections::HashMap;
use std::fmt;

/// Suffix marking a variable that holds a path to the secret
pub const FILE_SUFFIX: &str = "_FILE";

/// Synchronous lookup of a secret by name
pub trait CredentialSource: Send + Sync {
    /// Resolve `name`
    ///
    /// Fails with [`Error::Config`] if the credential is absent or unreadable.
    fn get(&self, name: &str) -> Result<String>;
}

type Lookup = Box<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Credentials from environment variables, with `_FILE` indirection
pub struct EnvCredentials {
    lookup: Lookup,
}

impl EnvCredentials {
    /// Read from the process environment
    pub fn new() -> Self {
        Self::with_lookup(|name| std::env::var(name).ok())
    }

    /// Read variables through `lookup` instead of the process environment
    pub fn with_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        Self {
            lookup: Box::new(lookup),
        }
    }

    fn var(&self, name: &str) -> Option<String> {
        (self.lookup)(name).filter(|value| !value.is_empty())
    }
}

impl Default for EnvCredentials {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EnvCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnvCredentials").finish_non_exhaustive()
    }
}

impl CredentialSource for EnvCredentials {
    fn get(&self, name: &str) -> Result<String> {
        let file_var = format!("{}{}", name, FILE_SUFFIX);
        if let Some(path) = self.var(&file_var) {
            tracing::debug!("Reading credential {} from file", name);
            let contents = std::fs::read_to_string(&path).map_err(|e| {
                Error::config(format!(
                    "Failed to read credential \"{}\" from {} ({}): {}",
                    name, file_var, path, e
                ))
            })?;
            return Ok(contents.trim_end_matches(['\r', '\n']).to_string());
        }

        self.var(name).ok_or_else(|| Error::missing_credential(name))
    }
}

/// Fixed in-memory credentials, for embedding and tests
#[derive(Default, Clone)]
pub struct StaticCredentials {
    values: HashMap<String, String>,
}

impl StaticCredentials {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a credential
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }
}

impl<K, V> FromIterator<(K, V)> for StaticCredentials
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

// Values are secrets; only the names are shown.
impl fmt::Debug for StaticCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticCredentials")
            .field("names", &self.values.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl CredentialSource for StaticCredentials {
    fn get(&self, name: &str) -> Result<String> {
        self.values
            .get(name)
            .filter(|value| !value.is_empty())
            .cloned()
            .ok_or_else(|| Error::missing_credential(name))
    }
}
