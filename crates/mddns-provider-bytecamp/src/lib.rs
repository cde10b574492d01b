// # Bytecamp Dynamic DNS Updater
//
// Bytecamp (nerdcamp) exposes a classic `update.cgi`. The account credentials
// identify the host to update, so the request's domain and hostname are not
// sent. `reqc=2` selects the plain status response.
//
// The endpoint's certificate chain does not validate, so this updater's HTTP
// client accepts invalid certificates. No other updater does.
//
// ## Configuration (credentials)
//
// - `BYTECAMP_USER`
// - `BYTECAMP_PASS`
//
// Either may be read from a file via the `_FILE` variant.

use async_trait::async_trait;
use mddns_core::credentials::CredentialSource;
use mddns_core::traits::{UpdateRequest, Updater, UpdaterFactory};
use mddns_core::{Error, Result, UpdaterRegistry};
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

pub const PROVIDER_NAME: &str = "bytecamp";

pub const USER: &str = "BYTECAMP_USER";
pub const PASS: &str = "BYTECAMP_PASS";

pub const BYTECAMP_ENDPOINT: &str = "https://update.nerdcamp.net/update.cgi";

const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone)]
struct Account {
    user: String,
    pass: String,
}

/// Notify-style updater for the Bytecamp update service
pub struct BytecampUpdater {
    source: Arc<dyn CredentialSource>,
    // ⚠️ NEVER log
    account: RwLock<Option<Account>>,
    endpoint: String,
    http: reqwest::Client,
}

impl std::fmt::Debug for BytecampUpdater {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BytecampUpdater")
            .field("account", &"<REDACTED>")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

impl BytecampUpdater {
    pub fn new(source: Arc<dyn CredentialSource>) -> Result<Self> {
        Self::with_endpoint(source, BYTECAMP_ENDPOINT)
    }

    pub fn with_endpoint(source: Arc<dyn CredentialSource>, endpoint: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .danger_accept_invalid_certs(true)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            source,
            account: RwLock::new(None),
            endpoint: endpoint.into(),
            http,
        })
    }

    async fn notify(&self, account: &Account, addr: Option<IpAddr>) -> Result<String> {
        let mut query = vec![
            ("user", account.user.clone()),
            ("pass", account.pass.clone()),
            ("reqc", "2".to_string()),
        ];
        if let Some(addr) = addr {
            query.push(("ip", addr.to_string()));
        }

        let response = self
            .http
            .get(&self.endpoint)
            .query(&query)
            .send()
            .await
            .map_err(|e| Error::transport(PROVIDER_NAME, format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::transport(PROVIDER_NAME, format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(Error::provider(
                PROVIDER_NAME,
                format!("Server returned error code {}: {}", status.as_u16(), body),
            ));
        }

        Ok(body.trim().to_string())
    }
}

#[async_trait]
impl Updater for BytecampUpdater {
    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }

    async fn init(&self) -> Result<()> {
        let account = Account {
            user: self.source.get(USER)?,
            pass: self.source.get(PASS)?,
        };
        *self.account.write().await = Some(account);
        Ok(())
    }

    async fn update(&self, request: &UpdateRequest) -> Result<String> {
        let account = self
            .account
            .read()
            .await
            .clone()
            .ok_or_else(|| Error::config("bytecamp updater used before init"))?;

        let targets = request.targets();
        let addrs: Vec<Option<IpAddr>> = if targets.is_empty() {
            vec![None]
        } else {
            targets.into_iter().map(|(_, addr)| Some(addr)).collect()
        };

        let mut replies = Vec::with_capacity(addrs.len());
        for addr in addrs {
            match addr {
                Some(addr) => tracing::debug!("Bytecamp update: ip={}", addr),
                None => tracing::debug!("Bytecamp update without address, using source address"),
            }
            let reply = self.notify(&account, addr).await?;
            if !reply.is_empty() {
                replies.push(reply);
            }
        }

        if replies.is_empty() {
            Ok("Update accepted".to_string())
        } else {
            Ok(replies.join("\n"))
        }
    }
}

pub struct BytecampFactory;

impl UpdaterFactory for BytecampFactory {
    fn create(&self, credentials: Arc<dyn CredentialSource>) -> Result<Arc<dyn Updater>> {
        Ok(Arc::new(BytecampUpdater::new(credentials)?))
    }
}

/// Register the Bytecamp updater with a registry
pub fn register(registry: &mut UpdaterRegistry) {
    registry.register_updater(PROVIDER_NAME, Box::new(BytecampFactory));
}
