//! Wire types of the Netcup CCP JSON API
//!
//! Every call is a POST of `{"action": ..., "param": {...}}` to the same
//! endpoint. Every answer shares one envelope; `responsedata` depends on the
//! action and is an empty string on errors.

use mddns_core::DnsRecord;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Serialize, Debug)]
pub(crate) struct ApiRequest<'a, P: Serialize> {
    pub action: &'a str,
    pub param: P,
}

#[derive(Serialize)]
pub(crate) struct LoginParam<'a> {
    pub customernumber: &'a str,
    pub apikey: &'a str,
    pub apipassword: &'a str,
}

#[derive(Serialize)]
pub(crate) struct SessionParam<'a> {
    pub customernumber: &'a str,
    pub apikey: &'a str,
    pub apisessionid: &'a str,
    pub domainname: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dnsrecordset: Option<DnsRecordSet>,
}

/// Envelope of every API answer
#[derive(Deserialize, Debug)]
pub(crate) struct ApiResponse {
    pub status: String,
    #[serde(default)]
    pub statuscode: u32,
    #[serde(default)]
    pub shortmessage: String,
    #[serde(default)]
    pub longmessage: String,
    #[serde(default)]
    pub responsedata: Value,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        self.status == "success"
    }
}

#[derive(Deserialize, Debug)]
pub(crate) struct LoginData {
    pub apisessionid: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub(crate) struct DnsRecordSet {
    #[serde(default)]
    pub dnsrecords: Vec<DnsRecord>,
}
