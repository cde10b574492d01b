//! Validation of `/update` query parameters
//!
//! Every parameter is checked and every problem reported, so a misconfigured
//! router sees all of its mistakes in one 422 response.

use anyhow::Result;
use mddns_core::{APEX_HOSTNAME, UpdateRequest};
use serde::Serialize;
use std::collections::HashMap;
use std::net::{Ipv4Addr, Ipv6Addr};

pub const INVALID_DOMAIN: &str = "Please provide a valid domain";
pub const INVALID_HOSTNAME: &str = "Please provide a valid hostname";
pub const INVALID_IP: &str = "Please provide a valid IP address";

/// One rejected query parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub param: &'static str,
    pub msg: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl FieldError {
    fn new(param: &'static str, msg: &'static str, value: Option<&String>) -> Self {
        Self {
            param,
            msg,
            value: value.cloned(),
        }
    }
}

/// Turn raw query parameters into an [`UpdateRequest`]
///
/// - `domain`: required FQDN
/// - `hostname`: defaults to `"@"`
/// - `ip4addr` / `ip6addr`: optional, must parse as the respective family
pub fn update_request(query: &HashMap<String, String>) -> Result<UpdateRequest, Vec<FieldError>> {
    let mut errors = Vec::new();

    let domain = query.get("domain");
    if domain.is_none_or(|d| validate_fqdn(d).is_err()) {
        errors.push(FieldError::new("domain", INVALID_DOMAIN, domain));
    }

    let hostname = query.get("hostname");
    if hostname.is_some_and(|h| !is_valid_hostname(h)) {
        errors.push(FieldError::new("hostname", INVALID_HOSTNAME, hostname));
    }

    let ip4addr = parse_optional::<Ipv4Addr>(query, "ip4addr", &mut errors);
    let ip6addr = parse_optional::<Ipv6Addr>(query, "ip6addr", &mut errors);

    if !errors.is_empty() {
        return Err(errors);
    }

    let mut request = UpdateRequest::new(
        domain.cloned().unwrap_or_default(),
        hostname.map_or(APEX_HOSTNAME, String::as_str),
    );
    request.ip4addr = ip4addr;
    request.ip6addr = ip6addr;
    Ok(request)
}

fn parse_optional<T: std::str::FromStr>(
    query: &HashMap<String, String>,
    param: &'static str,
    errors: &mut Vec<FieldError>,
) -> Option<T> {
    let raw = query.get(param)?;
    match raw.parse() {
        Ok(addr) => Some(addr),
        Err(_) => {
            errors.push(FieldError::new(param, INVALID_IP, Some(raw)));
            None
        }
    }
}

/// Any non-empty label text without whitespace or control characters
///
/// Providers accept record names that are not host names, such as `*` or
/// `_acme-challenge`, so no DNS syntax is enforced here.
fn is_valid_hostname(hostname: &str) -> bool {
    !hostname.is_empty()
        && !hostname
            .chars()
            .any(|c| c.is_whitespace() || c.is_control())
}

/// A domain name with at least two labels and an alphabetic or punycode
/// (`xn--`) top-level label
pub fn validate_fqdn(domain: &str) -> Result<()> {
    validate_domain_name(domain)?;

    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 {
        anyhow::bail!("Domain name needs at least two labels: '{}'", domain);
    }

    let tld = labels[labels.len() - 1];
    let punycode = tld.len() > 4 && tld[..4].eq_ignore_ascii_case("xn--");
    if tld.len() < 2 || !(punycode || tld.chars().all(|c| c.is_ascii_alphabetic())) {
        anyhow::bail!("Invalid top-level label: '{}'", tld);
    }

    Ok(())
}

/// Validate that a string is a syntactically valid domain name
///
/// Basic RFC 1035 checks: total length, label length, characters and hyphen
/// placement.
pub fn validate_domain_name(domain: &str) -> Result<()> {
    if domain.is_empty() {
        anyhow::bail!("Domain name cannot be empty");
    }

    // RFC 1035: 253 chars max
    if domain.len() > 253 {
        anyhow::bail!(
            "Domain name too long: {} chars (max 253). Got: {}",
            domain.len(),
            domain
        );
    }

    for label in domain.split('.') {
        if label.is_empty() {
            anyhow::bail!("Domain name has empty label: '{}'", domain);
        }

        if label.len() > 63 {
            anyhow::bail!(
                "Domain label too long: {} chars (max 63). Label: '{}'",
                label.len(),
                label
            );
        }

        if !label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            anyhow::bail!(
                "Domain label contains invalid characters. Label: '{}'. \
                Valid: alphanumeric and hyphen only.",
                label
            );
        }

        if label.starts_with('-') || label.ends_with('-') {
            anyhow::bail!(
                "Domain label cannot start or end with hyphen. Label: '{}'",
                label
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_full_query() {
        let request = update_request(&query(&[
            ("domain", "FAKE.DOMAIN"),
            ("hostname", "www"),
            ("ip4addr", "1.2.3.4"),
            ("ip6addr", "1::1"),
        ]))
        .unwrap();

        assert_eq!(request.domain, "FAKE.DOMAIN");
        assert_eq!(request.hostname, "www");
        assert_eq!(request.ip4addr, Some(Ipv4Addr::new(1, 2, 3, 4)));
        assert_eq!(request.ip6addr, Some("1::1".parse().unwrap()));
    }

    #[test]
    fn test_hostname_defaults_to_apex() {
        let request = update_request(&query(&[("domain", "example.com")])).unwrap();
        assert_eq!(request.hostname, "@");
        assert_eq!(request.ip4addr, None);
        assert_eq!(request.ip6addr, None);
    }

    #[test]
    fn test_missing_domain() {
        let errors = update_request(&query(&[("ip4addr", "1.2.3.4")])).unwrap_err();
        assert_eq!(
            errors,
            vec![FieldError {
                param: "domain",
                msg: INVALID_DOMAIN,
                value: None
            }]
        );
    }

    #[test]
    fn test_invalid_domains() {
        for domain in ["localhost", "-bad.com", "a..b", "exa mple.com", "example.123", ""] {
            let errors = update_request(&query(&[("domain", domain)])).unwrap_err();
            assert_eq!(errors[0].param, "domain", "accepted {:?}", domain);
        }
    }

    #[test]
    fn test_invalid_addresses_are_all_reported() {
        let errors = update_request(&query(&[
            ("domain", "example.com"),
            ("ip4addr", "1::1"),
            ("ip6addr", "1.2.3.4"),
        ]))
        .unwrap_err();

        let params: Vec<_> = errors.iter().map(|e| e.param).collect();
        assert_eq!(params, vec!["ip4addr", "ip6addr"]);
        assert!(errors.iter().all(|e| e.msg == INVALID_IP));
        assert_eq!(errors[0].value.as_deref(), Some("1::1"));
    }

    #[test]
    fn test_invalid_hostname() {
        let errors =
            update_request(&query(&[("domain", "example.com"), ("hostname", "")])).unwrap_err();
        assert_eq!(errors[0].msg, INVALID_HOSTNAME);
    }

    #[test]
    fn test_record_style_hostnames_accepted() {
        for hostname in ["*", "_acme-challenge", "*.dev", "_dmarc", "www"] {
            let request = update_request(&query(&[
                ("domain", "example.com"),
                ("hostname", hostname),
                ("ip4addr", "1.2.3.4"),
            ]))
            .unwrap_or_else(|e| panic!("rejected {:?}: {:?}", hostname, e));
            assert_eq!(request.hostname, hostname);
        }
    }

    #[test]
    fn test_hostname_with_whitespace_rejected() {
        let errors = update_request(&query(&[("domain", "example.com"), ("hostname", "w w")]))
            .unwrap_err();
        assert_eq!(errors[0].param, "hostname");
    }

    #[test]
    fn test_punycode_tld_accepted() {
        let request = update_request(&query(&[("domain", "example.xn--p1ai")])).unwrap();
        assert_eq!(request.domain, "example.xn--p1ai");
        assert!(validate_fqdn("xn--80ak6aa92e.xn--p1ai").is_ok());
        assert!(validate_fqdn("example.xn--").is_err());
    }

    #[test]
    fn test_domain_length_limits() {
        let long_label = "a".repeat(64);
        assert!(validate_fqdn(&format!("{}.com", long_label)).is_err());

        let long_name = format!("{}.com", vec!["a".repeat(63); 4].join("."));
        assert!(long_name.len() > 253);
        assert!(validate_fqdn(&long_name).is_err());
    }
}
