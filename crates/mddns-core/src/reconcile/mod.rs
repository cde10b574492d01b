//! Record reconciliation for read-merge-write providers
//!
//! Some providers have no "set my address" endpoint. Instead the full record
//! set of a zone is read, edited locally and written back in one request.
//! This module holds the merge step of that protocol. Providers call
//! [`reconcile_request`]; [`reconcile`] and [`apply`] are its single-record
//! building blocks, and each change is logged at debug level.
//!
//! ## Invariants
//!
//! - At most one record is touched per (type, hostname) pair; a second
//!   record is never introduced for a pair that already has one.
//! - Records outside the targeted (type, hostname) pairs keep every field
//!   and their position.
//! - A matched record keeps its identity and provider metadata; only the
//!   `destination` changes. Providers expect those fields echoed back.
//! - A new record carries only type, hostname and destination. The missing
//!   identity tells the provider to create it.

use crate::traits::UpdateRequest;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// DNS record type
///
/// Only A and AAAA are ever targeted; every other type read from a provider
/// is carried through untouched as [`RecordType::Other`].
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RecordType {
    /// IPv4 address record
    A,
    /// IPv6 address record
    AAAA,
    /// Any other record type, kept verbatim
    Other(String),
}

impl RecordType {
    /// Wire name of the type
    pub fn as_str(&self) -> &str {
        match self {
            RecordType::A => "A",
            RecordType::AAAA => "AAAA",
            RecordType::Other(name) => name,
        }
    }
}

impl From<String> for RecordType {
    fn from(name: String) -> Self {
        match name.as_str() {
            "A" => RecordType::A,
            "AAAA" => RecordType::AAAA,
            _ => RecordType::Other(name),
        }
    }
}

impl From<RecordType> for String {
    fn from(record_type: RecordType) -> Self {
        match record_type {
            RecordType::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One record of a provider's zone
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DnsRecord {
    /// Provider-assigned identity; `None` asks the provider to create the record
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Host label, `"@"` for the apex
    pub hostname: String,

    /// Record type
    #[serde(rename = "type")]
    pub record_type: RecordType,

    /// Record data (the address for A/AAAA)
    pub destination: String,

    /// Any other provider fields, echoed back unchanged
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DnsRecord {
    fn matches(&self, record_type: &RecordType, hostname: &str) -> bool {
        self.record_type == *record_type && self.hostname == hostname
    }
}

/// The (type, hostname, destination) triple a request wants to see
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesiredRecord {
    pub record_type: RecordType,
    pub hostname: String,
    pub destination: String,
}

impl DesiredRecord {
    pub fn new(
        record_type: RecordType,
        hostname: impl Into<String>,
        destination: impl ToString,
    ) -> Self {
        Self {
            record_type,
            hostname: hostname.into(),
            destination: destination.to_string(),
        }
    }
}

impl From<&DesiredRecord> for DnsRecord {
    fn from(desired: &DesiredRecord) -> Self {
        Self {
            id: None,
            hostname: desired.hostname.clone(),
            record_type: desired.record_type.clone(),
            destination: desired.destination.clone(),
            extra: Map::new(),
        }
    }
}

/// What [`apply`] did to the record set
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordChange {
    /// An existing record got a new destination
    Updated {
        /// The destination it had before
        previous: String,
    },
    /// An existing record already had the desired destination
    Unchanged,
    /// No record matched; one was appended
    Created,
}

/// Merge `desired` into `records` in place
///
/// The first record matching (type, hostname) gets the new destination; if
/// none matches, a bare record is appended.
pub fn apply(records: &mut Vec<DnsRecord>, desired: &DesiredRecord) -> RecordChange {
    match records
        .iter_mut()
        .find(|record| record.matches(&desired.record_type, &desired.hostname))
    {
        Some(record) if record.destination == desired.destination => RecordChange::Unchanged,
        Some(record) => {
            let previous = std::mem::replace(&mut record.destination, desired.destination.clone());
            RecordChange::Updated { previous }
        }
        None => {
            records.push(DnsRecord::from(desired));
            RecordChange::Created
        }
    }
}

/// Produce the record set with `desired` merged in
pub fn reconcile(mut existing: Vec<DnsRecord>, desired: &DesiredRecord) -> Vec<DnsRecord> {
    match apply(&mut existing, desired) {
        RecordChange::Updated { previous } => tracing::debug!(
            "{} {}: {} -> {}",
            desired.record_type,
            desired.hostname,
            previous,
            desired.destination
        ),
        RecordChange::Unchanged => tracing::debug!(
            "{} {} already points to {}",
            desired.record_type,
            desired.hostname,
            desired.destination
        ),
        RecordChange::Created => tracing::debug!(
            "{} {}: creating with {}",
            desired.record_type,
            desired.hostname,
            desired.destination
        ),
    }
    existing
}

/// Desired records for every address family present in `request`
pub fn desired_records(request: &UpdateRequest) -> Vec<DesiredRecord> {
    request
        .targets()
        .into_iter()
        .map(|(record_type, addr)| DesiredRecord::new(record_type, &request.hostname, addr))
        .collect()
}

/// Run [`reconcile`] for the A family, then the AAAA family, of `request`
///
/// A request without addresses returns `existing` unchanged.
pub fn reconcile_request(existing: Vec<DnsRecord>, request: &UpdateRequest) -> Vec<DnsRecord> {
    desired_records(request)
        .iter()
        .fold(existing, |records, desired| reconcile(records, desired))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(id: &str, record_type: RecordType, hostname: &str, destination: &str) -> DnsRecord {
        let mut extra = Map::new();
        extra.insert("priority".to_string(), json!("0"));
        extra.insert("deleterecord".to_string(), json!(false));
        extra.insert("state".to_string(), json!("yes"));
        DnsRecord {
            id: Some(id.to_string()),
            hostname: hostname.to_string(),
            record_type,
            destination: destination.to_string(),
            extra,
        }
    }

    #[test]
    fn test_overwrite_keeps_identity_and_metadata() {
        let existing = vec![record("1", RecordType::A, "@", "OLD4")];
        let desired = DesiredRecord::new(RecordType::A, "@", "NEW4");

        let result = reconcile(existing.clone(), &desired);

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].destination, "NEW4");
        assert_eq!(result[0].id, existing[0].id);
        assert_eq!(result[0].extra, existing[0].extra);
    }

    #[test]
    fn test_other_hosts_untouched() {
        let existing = vec![
            record("1", RecordType::A, "www", "W4"),
            record("2", RecordType::A, "@", "OLD4"),
            record("3", RecordType::AAAA, "www", "W6"),
            record("4", RecordType::AAAA, "@", "OLD6"),
        ];
        let request = UpdateRequest::new("example.com", "@")
            .with_ip4addr([1, 2, 3, 4].into())
            .with_ip6addr("1::1".parse().unwrap());

        let result = reconcile_request(existing.clone(), &request);

        assert_eq!(result.len(), 4);
        assert_eq!(result[0], existing[0]);
        assert_eq!(result[2], existing[2]);
        assert_eq!(result[1].destination, "1.2.3.4");
        assert_eq!(result[3].destination, "1::1");
    }

    #[test]
    fn test_missing_record_is_appended_without_identity() {
        let existing = vec![record("1", RecordType::A, "@", "OLD4")];
        let desired = DesiredRecord::new(RecordType::AAAA, "@", "1::1");

        let result = reconcile(existing.clone(), &desired);

        assert_eq!(result.len(), 2);
        assert_eq!(result[0], existing[0]);
        assert_eq!(
            result[1],
            DnsRecord {
                id: None,
                hostname: "@".to_string(),
                record_type: RecordType::AAAA,
                destination: "1::1".to_string(),
                extra: Map::new(),
            }
        );
    }

    #[test]
    fn test_only_first_match_is_touched() {
        let existing = vec![
            record("1", RecordType::A, "@", "OLD4"),
            record("2", RecordType::A, "@", "OTHER4"),
        ];
        let desired = DesiredRecord::new(RecordType::A, "@", "NEW4");

        let result = reconcile(existing, &desired);

        assert_eq!(result.len(), 2);
        assert_eq!(result[0].destination, "NEW4");
        assert_eq!(result[1].destination, "OTHER4");
    }

    #[test]
    fn test_type_must_match_as_well_as_hostname() {
        let existing = vec![record("1", RecordType::Other("MX".into()), "@", "mail")];
        let desired = DesiredRecord::new(RecordType::A, "@", "1.2.3.4");

        let result = reconcile(existing, &desired);

        assert_eq!(result.len(), 2);
        assert_eq!(result[0].destination, "mail");
        assert_eq!(result[1].record_type, RecordType::A);
    }

    #[test]
    fn test_request_without_addresses_is_a_no_op() {
        let existing = vec![record("1", RecordType::A, "@", "OLD4")];
        let request = UpdateRequest::new("example.com", "@");

        assert_eq!(reconcile_request(existing.clone(), &request), existing);
    }

    #[test]
    fn test_apply_reports_change() {
        let mut records = vec![record("1", RecordType::A, "@", "OLD4")];

        let change = apply(&mut records, &DesiredRecord::new(RecordType::A, "@", "NEW4"));
        assert_eq!(change, RecordChange::Updated { previous: "OLD4".into() });

        let change = apply(&mut records, &DesiredRecord::new(RecordType::A, "@", "NEW4"));
        assert_eq!(change, RecordChange::Unchanged);

        let change = apply(&mut records, &DesiredRecord::new(RecordType::AAAA, "@", "1::1"));
        assert_eq!(change, RecordChange::Created);
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_provider_fields_round_trip() {
        let raw = json!({
            "id": "51708779",
            "hostname": "@",
            "type": "TXT",
            "priority": "0",
            "destination": "v=spf1 -all",
            "deleterecord": false,
            "state": "yes"
        });

        let parsed: DnsRecord = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(parsed.record_type, RecordType::Other("TXT".into()));
        assert_eq!(serde_json::to_value(&parsed).unwrap(), raw);
    }

    #[test]
    fn test_created_record_serializes_without_id() {
        let created = DnsRecord::from(&DesiredRecord::new(RecordType::A, "@", "1.2.3.4"));
        assert_eq!(
            serde_json::to_value(&created).unwrap(),
            json!({"hostname": "@", "type": "A", "destination": "1.2.3.4"})
        );
    }
}
