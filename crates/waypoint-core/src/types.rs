//! Request and credential-scope value types shared across the resolver.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

/// Bucket addressing convention for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AddressingStyle {
    /// The bucket travels in the URI path (`https://host/bucket/key`).
    Path,
    /// The bucket travels in the hostname (`https://bucket.host/key`).
    Virtual,
}

impl AddressingStyle {
    /// Pick the addressing style a bucket name can support.
    ///
    /// Virtual-hosted addressing requires a DNS-compatible bucket name;
    /// everything else must fall back to path-style.
    #[must_use]
    pub fn preferred_for(bucket: &str) -> Self {
        if bucket_is_dns_compatible(bucket) {
            Self::Virtual
        } else {
            Self::Path
        }
    }
}

/// Whether a bucket name can be used as a DNS hostname label.
///
/// Rules: 3-63 characters, lowercase letters / digits / hyphens only, and the
/// first and last character must be a letter or digit.
#[must_use]
pub fn bucket_is_dns_compatible(bucket: &str) -> bool {
    let bytes = bucket.as_bytes();
    (3..=63).contains(&bytes.len())
        && bytes
            .iter()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || *b == b'-')
        && bytes[0] != b'-'
        && bytes[bytes.len() - 1] != b'-'
}

/// A single endpoint-resolution request.
///
/// Immutable, one per call: the region and bucket the caller is addressing
/// plus the transport feature flags that select between endpoint families.
#[derive(Debug, Clone, PartialEq, Eq, TypedBuilder)]
pub struct Request {
    /// The client's configured region (e.g. `"us-west-2"`).
    pub region: String,

    /// The bucket being addressed. May be a plain bucket name or a resource
    /// identifier such as an access-point ARN.
    pub bucket: String,

    /// Path-style or virtual-hosted-style addressing.
    #[builder(default = AddressingStyle::Virtual)]
    pub address_style: AddressingStyle,

    /// Whether the dualstack (IPv4+IPv6) endpoint family is requested.
    #[builder(default = false)]
    pub dualstack: bool,

    /// Whether the transfer-acceleration endpoint family is requested.
    #[builder(default = false)]
    pub accelerate: bool,

    /// Whether a region embedded in a resource identifier takes precedence
    /// over the client's configured region.
    #[builder(default = false)]
    pub use_arn_region: bool,
}

/// Signing-scope overrides attached to a resolved endpoint.
///
/// When a rule routes a request to an endpoint signed in a different region
/// or service than the client's defaults, the scope carries the overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialScope {
    /// Signing region override, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    /// Signing service override, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
}

impl CredentialScope {
    /// True if the scope carries no overrides.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.region.is_none() && self.service.is_none()
    }

    /// View the scope as a string map (`"region"` / `"service"` keys).
    #[must_use]
    pub fn as_map(&self) -> BTreeMap<String, String> {
        let mut map = BTreeMap::new();
        if let Some(region) = &self.region {
            map.insert("region".to_owned(), region.clone());
        }
        if let Some(service) = &self.service {
            map.insert("service".to_owned(), service.clone());
        }
        map
    }
}
