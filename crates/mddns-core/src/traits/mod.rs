//! Core traits for the DDNS updater
//!
//! This module defines the abstract interfaces that all implementations must follow.
//!
//! - [`Updater`]: Apply one update request at a DDNS provider
//! - [`UpdaterFactory`]: Build an updater for the registry

pub mod updater;

pub use updater::{APEX_HOSTNAME, UpdateRequest, Updater};

use crate::credentials::CredentialSource;
use std::sync::Arc;

/// Helper trait for constructing updaters by name
pub trait UpdaterFactory: Send + Sync {
    /// Create an updater that resolves its secrets through `credentials`
    ///
    /// Creation must not touch the credentials; they are validated by
    /// [`Updater::init`].
    fn create(
        &self,
        credentials: Arc<dyn CredentialSource>,
    ) -> Result<Arc<dyn Updater>, crate::Error>;
}
