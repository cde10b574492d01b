// # Netcup DNS Updater
//
// This crate provides the Netcup updater for mddns.
//
// Netcup has no dynamic DNS endpoint. The CCP JSON API only lets a client read
// the whole record set of a zone and write a whole record set back, so every
// update is:
//
// 1. `login` → session id (never cached; sessions expire between calls)
// 2. `infoDnsRecords` for the request's domain
// 3. merge the requested A/AAAA addresses with `mddns_core::reconcile`
// 4. `updateDnsRecords` with the full, merged set
//
// Records the request does not target are written back exactly as read.
//
// ## Configuration (credentials)
//
// - `NETCUP_CUSTOMER_NUMBER`
// - `NETCUP_API_PASSWORD`
// - `NETCUP_API_KEY`
//
// Each may instead be read from a file named by the `_FILE` variant
// (e.g. `NETCUP_API_PASSWORD_FILE`).
//
// ## API Reference
//
// - Endpoint: POST `https://ccp.netcup.net/run/webservice/servers/endpoint.php?JSON`
// - Body: `{"action": "<action>", "param": {...}}`

mod client;
mod types;

pub use client::NETCUP_ENDPOINT;

use async_trait::async_trait;
use client::{NetcupClient, NetcupCredentials};
use mddns_core::credentials::CredentialSource;
use mddns_core::reconcile;
use mddns_core::traits::{UpdateRequest, Updater, UpdaterFactory};
use mddns_core::{Error, Result, UpdaterRegistry};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Name used in outcome reports and for registration
pub const PROVIDER_NAME: &str = "netcup";

/// Credential names, in validation order
pub const CUSTOMER_NUMBER: &str = "NETCUP_CUSTOMER_NUMBER";
pub const API_PASSWORD: &str = "NETCUP_API_PASSWORD";
pub const API_KEY: &str = "NETCUP_API_KEY";

/// Reconcile-style updater for the Netcup CCP API
pub struct NetcupUpdater {
    /// Where credentials are resolved at `init`
    source: Arc<dyn CredentialSource>,

    /// Credentials loaded by the last successful `init`
    /// ⚠️ NEVER log these values
    credentials: RwLock<Option<NetcupCredentials>>,

    /// API client
    client: NetcupClient,
}

// Custom Debug implementation that hides the credentials
impl std::fmt::Debug for NetcupUpdater {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NetcupUpdater")
            .field("credentials", &"<REDACTED>")
            .field("endpoint", &self.client.endpoint())
            .finish()
    }
}

impl NetcupUpdater {
    /// Create an updater against the public Netcup endpoint
    pub fn new(source: Arc<dyn CredentialSource>) -> Result<Self> {
        Self::with_endpoint(source, NETCUP_ENDPOINT)
    }

    /// Create an updater against another endpoint (mirrors, tests)
    pub fn with_endpoint(source: Arc<dyn CredentialSource>, endpoint: impl Into<String>) -> Result<Self> {
        Ok(Self {
            source,
            credentials: RwLock::new(None),
            client: NetcupClient::new(endpoint)?,
        })
    }

    fn load_credentials(&self) -> Result<NetcupCredentials> {
        Ok(NetcupCredentials {
            customer_number: self.source.get(CUSTOMER_NUMBER)?,
            api_password: self.source.get(API_PASSWORD)?,
            api_key: self.source.get(API_KEY)?,
        })
    }
}

#[async_trait]
impl Updater for NetcupUpdater {
    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }

    async fn init(&self) -> Result<()> {
        let credentials = self.load_credentials()?;
        *self.credentials.write().await = Some(credentials);
        Ok(())
    }

    async fn update(&self, request: &UpdateRequest) -> Result<String> {
        let credentials = self
            .credentials
            .read()
            .await
            .clone()
            .ok_or_else(|| Error::config("netcup updater used before init"))?;

        tracing::info!("Updating Netcup records for {}", request.fqdn());

        let session = self.client.login(&credentials).await?;
        let records = session.info_dns_records(&request.domain).await?;
        tracing::debug!("Fetched {} record(s) for {}", records.len(), request.domain);

        let records = reconcile::reconcile_request(records, request);
        session.update_dns_records(&request.domain, records).await
    }
}

/// Factory for creating Netcup updaters
pub struct NetcupFactory;

impl UpdaterFactory for NetcupFactory {
    fn create(&self, credentials: Arc<dyn CredentialSource>) -> Result<Arc<dyn Updater>> {
        Ok(Arc::new(NetcupUpdater::new(credentials)?))
    }
}

/// Register the Netcup updater with a registry
///
/// # Example
///
/// ```rust
/// use mddns_core::UpdaterRegistry;
///
/// let mut registry = UpdaterRegistry::new();
/// mddns_provider_netcup::register(&mut registry);
/// assert!(registry.has_updater("netcup"));
/// ```
pub fn register(registry: &mut UpdaterRegistry) {
    registry.register_updater(PROVIDER_NAME, Box::new(NetcupFactory));
}

#[cfg(test)]
mod tests {
    use super::*;
    use mddns_core::StaticCredentials;

    fn full_credentials() -> StaticCredentials {
        StaticCredentials::new()
            .with(CUSTOMER_NUMBER, "123456")
            .with(API_PASSWORD, "VALID_API_PASSWORD")
            .with(API_KEY, "API_KEY")
    }

    fn without(name: &str) -> StaticCredentials {
        [CUSTOMER_NUMBER, API_PASSWORD, API_KEY]
            .into_iter()
            .filter(|n| *n != name)
            .map(|n| (n, "value"))
            .collect()
    }

    #[tokio::test]
    async fn test_init_with_complete_credentials() {
        let updater = NetcupUpdater::new(Arc::new(full_credentials())).unwrap();
        assert!(updater.init().await.is_ok());
    }

    #[tokio::test]
    async fn test_init_names_missing_credential() {
        for name in [CUSTOMER_NUMBER, API_PASSWORD, API_KEY] {
            let updater = NetcupUpdater::new(Arc::new(without(name))).unwrap();
            let err = updater.init().await.unwrap_err();
            assert!(matches!(err, Error::Config(_)));
            assert_eq!(
                err.to_string(),
                format!("Required credential \"{}\" not found", name)
            );
        }
    }

    #[tokio::test]
    async fn test_init_reports_first_missing_credential() {
        let updater = NetcupUpdater::new(Arc::new(StaticCredentials::new())).unwrap();
        let err = updater.init().await.unwrap_err();
        assert!(err.to_string().contains(CUSTOMER_NUMBER));
    }

    #[tokio::test]
    async fn test_update_before_init_fails() {
        let updater = NetcupUpdater::new(Arc::new(full_credentials())).unwrap();
        let err = updater
            .update(&UpdateRequest::new("example.com", "@"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_credentials_not_exposed_in_debug() {
        let credentials = NetcupCredentials {
            customer_number: "123456".into(),
            api_key: "secret_key_12345".into(),
            api_password: "secret_password".into(),
        };
        let debug_str = format!("{:?}", credentials);
        assert!(!debug_str.contains("secret_key_12345"));
        assert!(!debug_str.contains("secret_password"));
    }

    #[test]
    fn test_provider_name_and_registration() {
        let mut registry = UpdaterRegistry::new();
        register(&mut registry);

        let updater = registry
            .create_updater(PROVIDER_NAME, Arc::new(full_credentials()))
            .unwrap();
        assert_eq!(updater.name(), "netcup");
    }
}
