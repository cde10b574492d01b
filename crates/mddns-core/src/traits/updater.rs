// # Updater Trait
//
// Defines the interface every DDNS provider adapter implements.
//
// ## Implementations
//
// - Netcup (reconcile-style): `mddns-provider-netcup` crate
// - IONOS (notify-style): `mddns-provider-ionos` crate
// - Bytecamp (notify-style): `mddns-provider-bytecamp` crate
//
// ## Usage
//
// ```rust,ignore
// use mddns_core::{Updater, UpdateRequest};
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let updater = /* Updater implementation */;
//
//     updater.init().await?;
//
//     let request = UpdateRequest::new("example.com", "@")
//         .with_ip4addr([192, 168, 1, 1].into());
//     let message = updater.update(&request).await?;
//
//     Ok(())
// }
// ```

use crate::reconcile::RecordType;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

/// Host label addressing the apex of a domain
pub const APEX_HOSTNAME: &str = "@";

/// One dynamic DNS change, as accepted from the inbound boundary
///
/// Requests are immutable once built; updaters only ever see `&UpdateRequest`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateRequest {
    /// Fully qualified domain (zone) name, e.g. `example.com`
    pub domain: String,

    /// Host label inside the domain, `"@"` for the apex
    #[serde(default = "default_hostname")]
    pub hostname: String,

    /// New IPv4 address, if the caller has one
    #[serde(default)]
    pub ip4addr: Option<Ipv4Addr>,

    /// New IPv6 address, if the caller has one
    #[serde(default)]
    pub ip6addr: Option<Ipv6Addr>,
}

impl UpdateRequest {
    /// Create a request without addresses
    pub fn new(domain: impl Into<String>, hostname: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            hostname: hostname.into(),
            ip4addr: None,
            ip6addr: None,
        }
    }

    /// Set the IPv4 address
    pub fn with_ip4addr(mut self, addr: Ipv4Addr) -> Self {
        self.ip4addr = Some(addr);
        self
    }

    /// Set the IPv6 address
    pub fn with_ip6addr(mut self, addr: Ipv6Addr) -> Self {
        self.ip6addr = Some(addr);
        self
    }

    /// Requested (record type, address) pairs, A before AAAA
    pub fn targets(&self) -> Vec<(RecordType, IpAddr)> {
        let mut targets = Vec::with_capacity(2);
        if let Some(addr) = self.ip4addr {
            targets.push((RecordType::A, IpAddr::V4(addr)));
        }
        if let Some(addr) = self.ip6addr {
            targets.push((RecordType::AAAA, IpAddr::V6(addr)));
        }
        targets
    }

    /// `hostname.domain`, or just the domain for the apex
    pub fn fqdn(&self) -> String {
        if self.hostname == APEX_HOSTNAME || self.hostname.is_empty() {
            self.domain.clone()
        } else {
            format!("{}.{}", self.hostname, self.domain)
        }
    }
}

fn default_hostname() -> String {
    APEX_HOSTNAME.to_string()
}

/// Trait for DDNS provider adapters
///
/// The orchestrator holds a homogeneous collection of `Arc<dyn Updater>` and
/// never inspects the concrete type; [`Updater::name`] is the only identity it
/// reads, for labeling outcomes and log lines.
///
/// # Thread Safety
///
/// Implementations must be thread-safe: `update` runs on its own tokio task,
/// possibly while another `init` pass is in progress.
///
/// # Contract
///
/// - No retries, no caching of provider state between calls. A failed
///   call is reported once and the caller decides what to do.
/// - No side effects visible to the orchestrator besides the return value.
#[async_trait]
pub trait Updater: Send + Sync {
    /// Static identifier used in outcome reports (e.g. "netcup")
    fn name(&self) -> &'static str;

    /// Validate and load the credentials this updater needs
    ///
    /// Fails with [`crate::Error::Config`] naming the first missing
    /// credential. Calling it again re-validates and replaces the loaded
    /// credentials.
    async fn init(&self) -> Result<(), crate::Error>;

    /// Apply one update request at the provider
    ///
    /// # Returns
    ///
    /// - `Ok(String)`: human-readable confirmation from the provider
    /// - `Err(Error::Provider)`: the provider rejected the change
    /// - `Err(Error::Transport)`: the provider could not be reached
    async fn update(&self, request: &UpdateRequest) -> Result<String, crate::Error>;
}
