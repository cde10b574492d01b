use crate::types::*;
use crate::PROVIDER_NAME;
use mddns_core::{DnsRecord, Error, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

/// Netcup CCP JSON API endpoint
pub const NETCUP_ENDPOINT: &str =
    "https://ccp.netcup.net/run/webservice/servers/endpoint.php?JSON";

/// Default HTTP timeout for API requests (30 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Account credentials for the CCP API
#[derive(Clone)]
pub(crate) struct NetcupCredentials {
    pub customer_number: String,
    pub api_key: String,
    pub api_password: String,
}

// Custom Debug implementation that hides the secrets
impl std::fmt::Debug for NetcupCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NetcupCredentials")
            .field("customer_number", &self.customer_number)
            .field("api_key", &"<REDACTED>")
            .field("api_password", &"<REDACTED>")
            .finish()
    }
}

/// A logged-in API session
///
/// Sessions expire on the server side, so one is opened per update call and
/// never kept.
pub(crate) struct Session<'a> {
    client: &'a NetcupClient,
    credentials: &'a NetcupCredentials,
    id: String,
}

/// Thin client for the actions the updater needs
#[derive(Debug, Clone)]
pub(crate) struct NetcupClient {
    endpoint: String,
    http: reqwest::Client,
}

impl NetcupClient {
    pub fn new(endpoint: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            endpoint: endpoint.into(),
            http,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Open a session
    ///
    /// A rejected login fails with the API's `longmessage`.
    pub async fn login<'a>(&'a self, credentials: &'a NetcupCredentials) -> Result<Session<'a>> {
        let param = LoginParam {
            customernumber: &credentials.customer_number,
            apikey: &credentials.api_key,
            apipassword: &credentials.api_password,
        };

        let data: LoginData = self.call("login", param).await?;
        tracing::debug!("Netcup session opened");

        Ok(Session {
            client: self,
            credentials,
            id: data.apisessionid,
        })
    }

    async fn call<P, T>(&self, action: &str, param: P) -> Result<T>
    where
        P: Serialize,
        T: DeserializeOwned,
    {
        let response = self.send(action, param).await?;
        serde_json::from_value(response.responsedata).map_err(|e| {
            Error::provider(
                PROVIDER_NAME,
                format!("Invalid {} response data: {}", action, e),
            )
        })
    }

    async fn send<P: Serialize>(&self, action: &str, param: P) -> Result<ApiResponse> {
        tracing::debug!("Netcup API call: {}", action);

        let response = self
            .http
            .post(&self.endpoint)
            .json(&ApiRequest { action, param })
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

        let response: ApiResponse = serde_json::from_str(&body).map_err(|e| {
            Error::provider(PROVIDER_NAME, format!("Invalid {} response: {}", action, e))
        })?;

        if !response.is_success() {
            tracing::debug!(
                "Netcup {} rejected ({} {})",
                action,
                response.statuscode,
                response.shortmessage
            );
            return Err(Error::provider(PROVIDER_NAME, response.longmessage));
        }

        Ok(response)
    }
}

impl Session<'_> {
    fn param<'s>(&'s self, domain: &'s str, dnsrecordset: Option<DnsRecordSet>) -> SessionParam<'s> {
        SessionParam {
            customernumber: &self.credentials.customer_number,
            apikey: &self.credentials.api_key,
            apisessionid: &self.id,
            domainname: domain,
            dnsrecordset,
        }
    }

    /// Fetch every record of `domain`
    pub async fn info_dns_records(&self, domain: &str) -> Result<Vec<DnsRecord>> {
        let set: DnsRecordSet = self
            .client
            .call("infoDnsRecords", self.param(domain, None))
            .await?;
        Ok(set.dnsrecords)
    }

    /// Write back the full record set of `domain`
    ///
    /// Returns the API's `longmessage`.
    pub async fn update_dns_records(&self, domain: &str, records: Vec<DnsRecord>) -> Result<String> {
        let set = DnsRecordSet {
            dnsrecords: records,
        };
        let response = self
            .client
            .send("updateDnsRecords", self.param(domain, Some(set)))
            .await?;
        Ok(response.longmessage)
    }
}
