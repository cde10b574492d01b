// # mddns-core
//
// Core library for the multi-provider dynamic DNS updater.
//
// ## Architecture Overview
//
// One update request (domain, host label, optional IPv4/IPv6 address) is
// applied at several independent DDNS providers at once:
// - **Updater**: Trait every provider adapter implements (`init`, `update`)
// - **MultiUpdater**: Drives all updaters concurrently and reports one outcome each
// - **reconcile**: Record merge for providers that read, edit and write back a zone
// - **CredentialSource**: Lookup of provider secrets, with `_FILE` indirection
// - **UpdaterRegistry**: Name-based factories for building the updater set
//
// ## Design Principles
//
// 1. **Isolation**: One provider's failure never affects another's outcome
// 2. **Settle-All**: Every updater finishes before results are reported
// 3. **Protocol-Agnostic Core**: HTTP and wire formats live in provider crates
// 4. **Stateless**: Nothing is cached or persisted between update calls

pub mod traits;
pub mod engine;
pub mod reconcile;
pub mod registry;
pub mod credentials;
pub mod config;
pub mod error;

// Re-export core types for convenience
pub use traits::{UpdateRequest, Updater, UpdaterFactory, APEX_HOSTNAME};
pub use engine::{MultiUpdater, OutcomeStatus, UpdateOutcome};
pub use reconcile::{DesiredRecord, DnsRecord, RecordChange, RecordType};
pub use registry::UpdaterRegistry;
pub use credentials::{CredentialSource, EnvCredentials, StaticCredentials};
pub use config::MultiUpdaterConfig;
pub use error::{Error, Result};
