//! Partition metadata model.
//!
//! The standard table is generated from partition metadata: each partition
//! names its DNS suffix, a region pattern, and the storage service's
//! endpoint templates (a partition-wide default plus per-region overrides).
//! Endpoint entries are kept as raw JSON values until defaults have been
//! merged in, then parsed into [`EndpointSpec`].

use std::collections::{BTreeMap, HashMap};

use serde::Deserialize;
use serde_json::Value;
use waypoint_core::CredentialScope;

/// Top-level partition metadata document.
#[derive(Debug, Clone, Deserialize)]
pub struct Partitions {
    /// All known partitions.
    pub partitions: Vec<Partition>,
}

/// One partition: an isolated slice of infrastructure with its own DNS
/// suffix and region namespace.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Partition {
    /// Partition identifier (e.g. `"aws"`).
    pub partition: String,

    /// Human-readable partition name.
    #[serde(default)]
    pub partition_name: String,

    /// DNS suffix shared by the partition's endpoints.
    pub dns_suffix: String,

    /// Pattern matching the partition's region names.
    pub region_regex: String,

    /// Partition-wide endpoint defaults, merged under service defaults.
    #[serde(default)]
    pub defaults: Value,

    /// Per-service endpoint metadata, keyed by service identifier.
    pub services: HashMap<String, Service>,
}

/// Endpoint metadata for one service within a partition.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    /// Service-level endpoint defaults, merged over partition defaults.
    #[serde(default)]
    pub defaults: Value,

    /// Per-region endpoint overrides, merged over the defaults. Ordered so
    /// generated tables are deterministic.
    #[serde(default)]
    pub endpoints: BTreeMap<String, Value>,
}

/// A fully merged endpoint entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointSpec {
    /// Hostname template; may contain `{service}`, `{region}`, and
    /// `{dnsSuffix}` markers.
    #[serde(default)]
    pub hostname: Option<String>,

    /// Supported URI schemes, e.g. `["https"]`.
    #[serde(default)]
    pub protocols: Vec<String>,

    /// Signing-scope overrides for this endpoint.
    #[serde(default)]
    pub credential_scope: CredentialScope,
}

/// Recursively merge `b` into `a`; objects merge key-wise, everything else
/// is replaced.
pub(crate) fn merge(a: &mut Value, b: &Value) {
    match (a, b) {
        (Value::Object(a), Value::Object(b)) => {
            for (k, v) in b {
                merge(a.entry(k.clone()).or_insert(Value::Null), v);
            }
        }
        (a, b) => {
            *a = b.clone();
        }
    }
}
