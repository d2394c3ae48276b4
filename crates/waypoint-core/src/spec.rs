//! Declarative row format handed to [`crate::RuleTable::from_rows`].
//!
//! Rows carry regex patterns and templates as plain strings so they can be
//! authored in JSON (or generated by a collaborator such as
//! `waypoint-tables`) and shipped as data. The core compiles and validates
//! every pattern exactly once, at table construction.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::types::{AddressingStyle, CredentialScope};

/// One declarative rule row: match criteria plus outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RowSpec {
    /// Which request shapes the row applies to.
    pub key: KeySpec,
    /// What happens when it matches.
    pub outcome: OutcomeSpec,
}

/// Declarative match criteria. Absent fields are wildcards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct KeySpec {
    /// Required addressing style, if constrained.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_style: Option<AddressingStyle>,

    /// Required dualstack flag, if constrained.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dualstack: Option<bool>,

    /// Required accelerate flag, if constrained.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accelerate: Option<bool>,

    /// Required use-arn-region flag, if constrained.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_arn_region: Option<bool>,

    /// Pattern the request's region must match, if constrained.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region_regex: Option<String>,

    /// Pattern the request's bucket must match, if constrained.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bucket_regex: Option<String>,

    /// Human-readable annotation for diagnostics and logging.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub docs: String,
}

/// Declarative outcome: endpoint rewrite or configured rejection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum OutcomeSpec {
    /// Rewrite the request URI using these instructions.
    Endpoint(ValueSpec),
    /// Fail resolution with this message, surfaced verbatim.
    Error {
        /// The configured rejection message.
        message: String,
    },
}

/// Declarative rewriting instructions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueSpec {
    /// Template producing the new scheme and authority.
    pub uri_template: TemplateSpec,

    /// Pattern run against the bucket to extract capture groups.
    pub bucket_regex: String,

    /// Opaque header hints, passed through untouched.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub header_template: HashMap<String, String>,

    /// Signing-scope overrides attached to the resolved endpoint.
    #[serde(default, skip_serializing_if = "CredentialScope::is_empty")]
    pub credential_scope: CredentialScope,

    /// Whether the bucket must be stripped from the front of the base URI's
    /// path.
    #[serde(default)]
    pub remove_bucket_from_path: bool,

    /// Optional region constraint template.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region_match: Option<TemplateSpec>,
}

/// A template string with its ordered placeholder keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateSpec {
    /// The template text, with `{key}` markers.
    pub template: String,

    /// Ordered placeholder keys: `"region"` or `"bucket:N"` (1-based).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keys: Vec<String>,
}

impl TemplateSpec {
    /// Build a template spec from a text and its keys.
    #[must_use]
    pub fn new(template: impl Into<String>, keys: &[&str]) -> Self {
        Self {
            template: template.into(),
            keys: keys.iter().map(|k| (*k).to_owned()).collect(),
        }
    }
}
