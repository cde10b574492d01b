//! Error types for the DDNS updater
//!
//! This module defines all error types used throughout the crate.

use thiserror::Error;

/// Result type alias for updater operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the DDNS updater
#[derive(Error, Debug)]
pub enum Error {
    /// A credential or setting is missing or unreadable
    #[error("{0}")]
    Config(String),

    /// The provider explicitly rejected the operation
    ///
    /// Displays as the upstream message only; outcomes are already labeled
    /// with the provider name.
    #[error("{message}")]
    Provider {
        /// Provider name
        provider: String,
        /// Upstream message or status
        message: String,
    },

    /// The provider could not be reached at all
    #[error("Transport error: {message}")]
    Transport {
        /// Provider name
        provider: String,
        /// Transport-level failure description
        message: String,
    },

    /// One or more updaters failed to initialise
    ///
    /// Holds one `"<updater>: <message>"` line per failing updater.
    #[error("{0}")]
    Init(String),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a provider-specific error
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create a transport error
    pub fn transport(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Transport {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Error for a credential that is neither set nor file-indirected
    pub fn missing_credential(name: &str) -> Self {
        Self::Config(format!("Required credential \"{}\" not found", name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_error_displays_upstream_message() {
        let err = Error::provider("netcup", "The login to the API failed.");
        assert_eq!(err.to_string(), "The login to the API failed.");
    }

    #[test]
    fn test_missing_credential_names_variable() {
        let err = Error::missing_credential("NETCUP_API_KEY");
        assert!(matches!(err, Error::Config(_)));
        assert_eq!(
            err.to_string(),
            "Required credential \"NETCUP_API_KEY\" not found"
        );
    }

    #[test]
    fn test_transport_error_is_prefixed() {
        let err = Error::transport("ionos", "connection refused");
        assert_eq!(err.to_string(), "Transport error: connection refused");
    }
}
