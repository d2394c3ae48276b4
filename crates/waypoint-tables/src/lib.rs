//! Standard rule-table generation for waypoint endpoint resolution.
//!
//! `waypoint-core` resolves requests against an ordered rule table but does
//! not care where the table comes from. This crate generates the standard
//! table from partition metadata: per-region virtual-hosted and path-style
//! rows, dualstack and transfer-acceleration variants, access-point ARN
//! rows (including FIPS pseudo-regions), and the guard / fallback error rows
//! that make unsupported combinations fail with a useful message.
//!
//! Row order is load-bearing: guards go first, happy paths in the middle,
//! wildcard ARN fallbacks last. [`standard_table`] produces declarative
//! [`RowSpec`]s so the result can also be serialized and audited as JSON.

mod builders;
pub mod model;

use anyhow::Context;
use tracing::debug;
use waypoint_core::{RowSpec, RuleTable};

use crate::model::Partitions;

/// Errors produced while generating a table from partition metadata.
#[derive(Debug, thiserror::Error)]
pub enum TableSpecError {
    /// A partition carries no storage-service entry.
    #[error("partition {partition:?} has no s3 service entry")]
    MissingService {
        /// The offending partition.
        partition: String,
    },

    /// A merged endpoint entry does not have the expected shape.
    #[error("partition {partition:?} has a malformed endpoint entry: {source}")]
    InvalidEndpoint {
        /// The offending partition.
        partition: String,
        /// The underlying deserialization error.
        #[source]
        source: serde_json::Error,
    },

    /// A merged endpoint entry has no hostname.
    #[error("partition {partition:?} has an endpoint entry without a hostname")]
    MissingHostname {
        /// The offending partition.
        partition: String,
    },

    /// An endpoint entry supports neither `https` nor `http`.
    #[error("partition {partition:?} has an endpoint entry with no supported scheme")]
    NoSupportedScheme {
        /// The offending partition.
        partition: String,
    },

    /// A hostname template the dualstack derivation cannot handle.
    #[error("cannot derive a dualstack host from {hostname:?}")]
    UnsupportedHostname {
        /// The offending hostname template.
        hostname: String,
    },

    /// A partition's region pattern failed to compile.
    #[error("invalid region pattern {pattern:?}: {source}")]
    InvalidRegionPattern {
        /// The offending pattern.
        pattern: String,
        /// The underlying regex error.
        #[source]
        source: regex::Error,
    },

    /// A generated row failed table compilation.
    #[error(transparent)]
    Table(#[from] waypoint_core::TableError),

    /// Any other error.
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// Parse the bundled partition metadata.
///
/// # Errors
///
/// Returns [`TableSpecError::Internal`] if the bundled metadata does not
/// parse, which indicates a packaging defect.
pub fn builtin_partitions() -> Result<Partitions, TableSpecError> {
    let partitions: Partitions = serde_json::from_str(include_str!("../data/partitions.json"))
        .context("bundled partition metadata must parse")?;
    Ok(partitions)
}

/// Generate the standard table rows from partition metadata.
///
/// The rows come out in resolution order:
///
/// 1. guards: accelerate with ARNs / path addressing / DNS-incompatible
///    buckets, virtual-hosted with DNS-incompatible buckets;
/// 2. per-endpoint dualstack, accelerate, and dualstack+accelerate rows;
/// 3. error rows for FIPS pseudo-regions embedded in an ARN;
/// 4. per-endpoint vanilla, access-point ARN, and FIPS pseudo-region rows;
/// 5. wildcard ARN fallback error rows (cross-partition and malformed
///    ARNs) — these must trail every happy-path row.
///
/// # Errors
///
/// Returns a [`TableSpecError`] when the metadata is malformed or a
/// hostname template cannot be derived.
pub fn standard_table(partitions: &Partitions) -> Result<Vec<RowSpec>, TableSpecError> {
    let endpoints = builders::derive_endpoints(partitions)?;
    let mut rows = Vec::new();

    rows.extend(builders::accelerate_guard_rows());
    rows.extend(builders::virtual_addressing_guard_rows());

    for ep in &endpoints {
        rows.extend(builders::dualstack_rows(ep)?);
    }
    for ep in &endpoints {
        rows.extend(builders::accelerate_rows(ep));
    }
    for ep in &endpoints {
        rows.extend(builders::dualstack_accelerate_rows(ep));
    }

    rows.extend(builders::fips_in_arn_rows());

    for ep in &endpoints {
        rows.extend(builders::vanilla_rows(ep));
        rows.extend(builders::access_point_rows(ep));
        rows.extend(builders::fips_meta_region_rows(ep));
    }

    rows.extend(builders::trailing_arn_error_rows());

    debug!(rows = rows.len(), "generated standard table rows");
    Ok(rows)
}

/// Compile the standard table from the bundled partition metadata.
///
/// # Errors
///
/// Returns a [`TableSpecError`] if the bundled metadata is malformed or a
/// generated row fails compilation; both indicate a defect in this crate.
pub fn builtin_table() -> Result<RuleTable, TableSpecError> {
    let rows = standard_table(&builtin_partitions()?)?;
    Ok(RuleTable::from_rows(rows)?)
}
