// # IONOS Dynamic DNS Updater
//
// IONOS hands out one opaque update key per dyndns configuration; the key
// already names the domains it covers. An update is a GET carrying the key
// and, per address family, the address to publish. Without an address the
// service publishes the caller's source address.
//
// ## Configuration (credentials)
//
// - `IONOS_API_KEY` (or `IONOS_API_KEY_FILE`)
//
// ## API Reference
//
// - `GET https://api.hosting.ionos.com/dns/v1/dyndns?q=<key>[&ipv4=..|&ipv6=..]`

use async_trait::async_trait;
use mddns_core::credentials::CredentialSource;
use mddns_core::reconcile::RecordType;
use mddns_core::traits::{UpdateRequest, Updater, UpdaterFactory};
use mddns_core::{Error, Result, UpdaterRegistry};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// Name used in outcome reports and for registration
pub const PROVIDER_NAME: &str = "ionos";

/// Credential name
pub const API_KEY: &str = "IONOS_API_KEY";

/// IONOS dyndns endpoint
pub const IONOS_ENDPOINT: &str = "https://api.hosting.ionos.com/dns/v1/dyndns";

const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Notify-style updater for the IONOS dyndns service
pub struct IonosUpdater {
    source: Arc<dyn CredentialSource>,

    /// Update key loaded by the last successful `init`
    /// ⚠️ NEVER log this value
    api_key: RwLock<Option<String>>,

    endpoint: String,
    http: reqwest::Client,
}

impl std::fmt::Debug for IonosUpdater {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IonosUpdater")
            .field("api_key", &"<REDACTED>")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

impl IonosUpdater {
    pub fn new(source: Arc<dyn CredentialSource>) -> Result<Self> {
        Self::with_endpoint(source, IONOS_ENDPOINT)
    }

    pub fn with_endpoint(source: Arc<dyn CredentialSource>, endpoint: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            source,
            api_key: RwLock::new(None),
            endpoint: endpoint.into(),
            http,
        })
    }

    /// Issue one update call; `family` is `None` for the bare call
    async fn notify(&self, key: &str, family: Option<(&str, String)>) -> Result<()> {
        let mut query = vec![("q", key.to_string())];
        if let Some((param, addr)) = family {
            query.push((param, addr));
        }

        let response = self
            .http
            .get(&self.endpoint)
            .query(&query)
            .send()
            .await
            .map_err(|e| Error::transport(PROVIDER_NAME, format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::transport(PROVIDER_NAME, format!("Failed to read response: {}", e)))?;
        Err(Error::provider(
            PROVIDER_NAME,
            format!("Server returned error code {}: {}", status.as_u16(), body),
        ))
    }
}

#[async_trait]
impl Updater for IonosUpdater {
    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }

    async fn init(&self) -> Result<()> {
        let key = self.source.get(API_KEY)?;
        *self.api_key.write().await = Some(key);
        Ok(())
    }

    async fn update(&self, request: &UpdateRequest) -> Result<String> {
        let key = self
            .api_key
            .read()
            .await
            .clone()
            .ok_or_else(|| Error::config("ionos updater used before init"))?;

        let targets = request.targets();
        if targets.is_empty() {
            tracing::debug!("IONOS update without address, using source address");
            self.notify(&key, None).await?;
            return Ok("Update triggered with source address".to_string());
        }

        let mut published = Vec::with_capacity(targets.len());
        for (record_type, addr) in targets {
            let param = match record_type {
                RecordType::AAAA => "ipv6",
                _ => "ipv4",
            };
            tracing::debug!("IONOS update: {}={}", param, addr);
            self.notify(&key, Some((param, addr.to_string()))).await?;
            published.push(addr.to_string());
        }

        Ok(format!("Update triggered for {}", published.join(", ")))
    }
}

/// Factory for creating IONOS updaters
pub struct IonosFactory;

impl UpdaterFactory for IonosFactory {
    fn create(&self, credentials: Arc<dyn CredentialSource>) -> Result<Arc<dyn Updater>> {
        Ok(Arc::new(IonosUpdater::new(credentials)?))
    }
}

/// Register the IONOS updater with a registry
pub fn register(registry: &mut UpdaterRegistry) {
    registry.register_updater(PROVIDER_NAME, Box::new(IonosFactory));
}
