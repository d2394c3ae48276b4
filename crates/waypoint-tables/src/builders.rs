//! Row builders for the standard table.
//!
//! Each builder produces a slice of the table; `standard_table` in the crate
//! root stitches them together in the order that gives the table its
//! meaning. Guard rows (error outcomes for unsupported combinations) go
//! before the happy-path rows they protect; wildcard fallback error rows go
//! last.

use regex::Regex;
use serde_json::Value;
use tracing::debug;
use waypoint_core::{
    AddressingStyle, CredentialScope, KeySpec, OutcomeSpec, RowSpec, TemplateSpec, ValueSpec,
};

use crate::TableSpecError;
use crate::model::{EndpointSpec, Partition, Partitions, merge};

/// Anchored pattern for DNS-compatible bucket names: 3-63 characters,
/// lowercase letters / digits / hyphens, no leading or trailing hyphen.
/// Mirrors `waypoint_core::bucket_is_dns_compatible`.
pub(crate) const DNS_BUCKET: &str = "^[a-z0-9][a-z0-9-]{1,61}[a-z0-9]$";

/// Anchored pattern for plain bucket names (as opposed to ARNs).
pub(crate) const BASIC_BUCKET: &str = "^[a-z0-9._-]+$";

/// Capture pattern that takes the whole bucket as group 1.
const WHOLE_BUCKET: &str = "^(.*)$";

/// Patterns that collectively match every DNS-incompatible bucket name.
/// Used as ordered guards where a single (non-negatable) regex cannot
/// express "not DNS-compatible".
const NON_DNS_BUCKET: &[&str] = &["[^a-z0-9-]", "^.{0,2}$", "^.{64,}$", "^-", "-$"];

/// Access-point ARN pattern for a partition pattern. Capture groups:
/// 1 partition, 2 region, 3 account id, 4 access point name.
pub(crate) fn access_point_arn(partition: &str) -> String {
    format!(
        r"^arn[:/]({partition})[:/]s3[:/]([a-zA-Z0-9-]+)[:/]([a-zA-Z0-9-]{{1,63}})[:/]accesspoint[:/]([a-zA-Z0-9-]{{1,63}})$"
    )
}

/// A region constraint attached to a derived endpoint: either one region
/// exactly, or the whole span of a partition's region pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum RegionPattern {
    /// One region, matched literally.
    Exact(String),
    /// An already-anchored region pattern.
    Pattern(String),
}

impl RegionPattern {
    /// Render as an anchored regex pattern.
    fn anchored(&self) -> String {
        match self {
            Self::Exact(region) => format!("^{}$", regex::escape(region)),
            Self::Pattern(pattern) => pattern.clone(),
        }
    }

    /// The pattern body without its `^`/`$` anchors, for embedding inside a
    /// larger pattern.
    fn core(&self) -> String {
        match self {
            Self::Exact(region) => regex::escape(region),
            Self::Pattern(pattern) => {
                let trimmed = pattern.strip_prefix('^').unwrap_or(pattern);
                trimmed.strip_suffix('$').unwrap_or(trimmed).to_owned()
            }
        }
    }
}

/// One endpoint family derived from partition metadata, with everything the
/// row builders need resolved up front.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DerivedEndpoint {
    /// Regions this endpoint serves.
    pub(crate) region: RegionPattern,
    /// Owning partition identifier.
    pub(crate) partition: String,
    /// URI scheme (`https` preferred).
    pub(crate) scheme: String,
    /// Hostname with `{service}`/`{dnsSuffix}` resolved; may still contain
    /// a `{region}` placeholder.
    pub(crate) hostname: String,
    /// The unresolved hostname template, kept for dualstack derivation.
    pub(crate) raw_pattern: String,
    /// The partition's DNS suffix.
    pub(crate) dns_suffix: String,
    /// Whether this endpoint serves a real region (as opposed to a
    /// partition-global pseudo-region).
    pub(crate) regional: bool,
    /// Signing-scope overrides for this endpoint.
    pub(crate) credential_scope: CredentialScope,
}

/// Derive endpoint families from partition metadata.
///
/// Per-region overrides come before their partition-wide default, so rows
/// generated for an override shadow the partition rows under
/// first-match-wins.
pub(crate) fn derive_endpoints(
    partitions: &Partitions,
) -> Result<Vec<DerivedEndpoint>, TableSpecError> {
    let mut out = Vec::new();
    for partition in &partitions.partitions {
        let service =
            partition
                .services
                .get("s3")
                .ok_or_else(|| TableSpecError::MissingService {
                    partition: partition.partition.clone(),
                })?;
        let mut service_default = partition.defaults.clone();
        merge(&mut service_default, &service.defaults);

        let region_regex = Regex::new(&partition.region_regex).map_err(|source| {
            TableSpecError::InvalidRegionPattern {
                pattern: partition.region_regex.clone(),
                source,
            }
        })?;
        let partition_endpoint = derive_one(
            partition,
            &service_default,
            RegionPattern::Pattern(partition.region_regex.clone()),
            true,
        )?;

        for (region, override_value) in &service.endpoints {
            let mut merged = service_default.clone();
            merge(&mut merged, override_value);
            let endpoint = derive_one(
                partition,
                &merged,
                RegionPattern::Exact(region.clone()),
                region_regex.is_match(region),
            )?;
            // Overrides identical to the partition default would only
            // duplicate its rows.
            if (
                &endpoint.raw_pattern,
                &endpoint.scheme,
                &endpoint.credential_scope,
            ) != (
                &partition_endpoint.raw_pattern,
                &partition_endpoint.scheme,
                &partition_endpoint.credential_scope,
            ) {
                out.push(endpoint);
            }
        }
        out.push(partition_endpoint);
    }
    debug!(endpoints = out.len(), "derived endpoint families");
    Ok(out)
}

fn derive_one(
    partition: &Partition,
    merged: &Value,
    region: RegionPattern,
    regional: bool,
) -> Result<DerivedEndpoint, TableSpecError> {
    let spec: EndpointSpec =
        serde_json::from_value(merged.clone()).map_err(|source| TableSpecError::InvalidEndpoint {
            partition: partition.partition.clone(),
            source,
        })?;
    let raw_pattern = spec
        .hostname
        .ok_or_else(|| TableSpecError::MissingHostname {
            partition: partition.partition.clone(),
        })?;
    let scheme = if spec.protocols.iter().any(|p| p == "https") {
        "https"
    } else if spec.protocols.iter().any(|p| p == "http") {
        "http"
    } else {
        return Err(TableSpecError::NoSupportedScheme {
            partition: partition.partition.clone(),
        });
    };
    let hostname = raw_pattern
        .replace("{service}", "s3")
        .replace("{dnsSuffix}", &partition.dns_suffix);
    Ok(DerivedEndpoint {
        region,
        partition: partition.partition.clone(),
        scheme: scheme.to_owned(),
        hostname,
        raw_pattern,
        dns_suffix: partition.dns_suffix.clone(),
        regional,
        credential_scope: spec.credential_scope,
    })
}

/// Rewrite a hostname template into its dualstack form, resolving
/// `{service}` and `{dnsSuffix}`.
pub(crate) fn dualstack_host(
    raw_pattern: &str,
    dns_suffix: &str,
) -> Result<String, TableSpecError> {
    let pattern = if raw_pattern.contains("{service}") {
        raw_pattern.replace("{service}", "{service}.dualstack")
    } else if let Some(rest) = raw_pattern.strip_prefix("s3") {
        format!("{{service}}.dualstack{rest}")
    } else {
        return Err(TableSpecError::UnsupportedHostname {
            hostname: raw_pattern.to_owned(),
        });
    };
    Ok(pattern
        .replace("{service}", "s3")
        .replace("{dnsSuffix}", dns_suffix))
}

fn endpoint_outcome(
    template: TemplateSpec,
    bucket_regex: &str,
    credential_scope: &CredentialScope,
    remove_bucket_from_path: bool,
    region_match: Option<TemplateSpec>,
) -> OutcomeSpec {
    OutcomeSpec::Endpoint(ValueSpec {
        uri_template: template,
        bucket_regex: bucket_regex.to_owned(),
        header_template: Default::default(),
        credential_scope: credential_scope.clone(),
        remove_bucket_from_path,
        region_match,
    })
}

fn error_row(key: KeySpec, message: &str) -> RowSpec {
    RowSpec {
        key,
        outcome: OutcomeSpec::Error {
            message: message.to_owned(),
        },
    }
}

/// Guard rows for transfer acceleration: access-point ARNs and path-style
/// addressing never support it, and the bucket name must be DNS-compatible.
pub(crate) fn accelerate_guard_rows() -> Vec<RowSpec> {
    let mut out = vec![error_row(
        KeySpec {
            accelerate: Some(true),
            bucket_regex: Some(access_point_arn("[a-zA-Z0-9-]+")),
            docs: "access points do not support accelerate".to_owned(),
            ..KeySpec::default()
        },
        "access point ARNs do not support transfer acceleration",
    )];
    // The DNS guards go before the path-addressing guard: a DNS-incompatible
    // bucket forces path addressing, and the bucket name is the actionable
    // problem.
    for pattern in NON_DNS_BUCKET {
        out.push(error_row(
            KeySpec {
                accelerate: Some(true),
                bucket_regex: Some((*pattern).to_owned()),
                docs: "accelerate requires a DNS-compatible bucket".to_owned(),
                ..KeySpec::default()
            },
            "bucket name is not DNS compatible as required by transfer acceleration",
        ));
    }
    out.push(error_row(
        KeySpec {
            address_style: Some(AddressingStyle::Path),
            accelerate: Some(true),
            docs: "accelerate cannot be combined with path addressing".to_owned(),
            ..KeySpec::default()
        },
        "transfer acceleration and path addressing are incompatible",
    ));
    out
}

/// Guard rows rejecting virtual-hosted addressing of DNS-incompatible
/// bucket names.
pub(crate) fn virtual_addressing_guard_rows() -> Vec<RowSpec> {
    NON_DNS_BUCKET
        .iter()
        .map(|pattern| {
            error_row(
                KeySpec {
                    address_style: Some(AddressingStyle::Virtual),
                    bucket_regex: Some((*pattern).to_owned()),
                    docs: "virtual addressing requires a DNS-compatible bucket".to_owned(),
                    ..KeySpec::default()
                },
                "virtual-hosted addressing requires a DNS-compatible bucket name",
            )
        })
        .collect()
}

/// Dualstack rows: virtual-hosted for DNS-compatible buckets, path-style
/// otherwise.
pub(crate) fn dualstack_rows(ep: &DerivedEndpoint) -> Result<Vec<RowSpec>, TableSpecError> {
    let host = dualstack_host(&ep.raw_pattern, &ep.dns_suffix)?;
    Ok(vec![
        RowSpec {
            key: KeySpec {
                region_regex: Some(ep.region.anchored()),
                bucket_regex: Some(DNS_BUCKET.to_owned()),
                address_style: Some(AddressingStyle::Virtual),
                dualstack: Some(true),
                accelerate: Some(false),
                docs: "dualstack, virtual-hosted".to_owned(),
                ..KeySpec::default()
            },
            outcome: endpoint_outcome(
                TemplateSpec::new(
                    format!("{}://{{bucket:1}}.{host}", ep.scheme),
                    &["region", "bucket:1"],
                ),
                WHOLE_BUCKET,
                &ep.credential_scope,
                true,
                None,
            ),
        },
        RowSpec {
            key: KeySpec {
                region_regex: Some(ep.region.anchored()),
                bucket_regex: Some(BASIC_BUCKET.to_owned()),
                address_style: Some(AddressingStyle::Path),
                dualstack: Some(true),
                accelerate: Some(false),
                docs: "dualstack, path-style".to_owned(),
                ..KeySpec::default()
            },
            outcome: endpoint_outcome(
                TemplateSpec::new(format!("{}://{host}", ep.scheme), &["region"]),
                WHOLE_BUCKET,
                &ep.credential_scope,
                false,
                None,
            ),
        },
    ])
}

/// Transfer-acceleration row. The accelerate hostname is partition-global;
/// the guard rows above have already rejected path addressing and
/// DNS-incompatible buckets.
pub(crate) fn accelerate_rows(ep: &DerivedEndpoint) -> Vec<RowSpec> {
    vec![RowSpec {
        key: KeySpec {
            region_regex: Some(ep.region.anchored()),
            bucket_regex: Some(DNS_BUCKET.to_owned()),
            address_style: Some(AddressingStyle::Virtual),
            dualstack: Some(false),
            accelerate: Some(true),
            docs: "accelerate, virtual-hosted".to_owned(),
            ..KeySpec::default()
        },
        outcome: endpoint_outcome(
            TemplateSpec::new(
                format!("{}://{{bucket:1}}.s3-accelerate.{}", ep.scheme, ep.dns_suffix),
                &["bucket:1"],
            ),
            WHOLE_BUCKET,
            &ep.credential_scope,
            true,
            None,
        ),
    }]
}

/// Combined dualstack + accelerate row.
pub(crate) fn dualstack_accelerate_rows(ep: &DerivedEndpoint) -> Vec<RowSpec> {
    vec![RowSpec {
        key: KeySpec {
            region_regex: Some(ep.region.anchored()),
            bucket_regex: Some(DNS_BUCKET.to_owned()),
            address_style: Some(AddressingStyle::Virtual),
            dualstack: Some(true),
            accelerate: Some(true),
            docs: "accelerate over dualstack, virtual-hosted".to_owned(),
            ..KeySpec::default()
        },
        outcome: endpoint_outcome(
            TemplateSpec::new(
                format!(
                    "{}://{{bucket:1}}.s3-accelerate.dualstack.{}",
                    ep.scheme, ep.dns_suffix
                ),
                &["bucket:1"],
            ),
            WHOLE_BUCKET,
            &ep.credential_scope,
            true,
            None,
        ),
    }]
}

/// Vanilla rows (no dualstack, no accelerate): virtual-hosted for
/// DNS-compatible buckets, path-style for everything else.
pub(crate) fn vanilla_rows(ep: &DerivedEndpoint) -> Vec<RowSpec> {
    vec![
        RowSpec {
            key: KeySpec {
                region_regex: Some(ep.region.anchored()),
                bucket_regex: Some(DNS_BUCKET.to_owned()),
                address_style: Some(AddressingStyle::Virtual),
                dualstack: Some(false),
                accelerate: Some(false),
                docs: "vanilla, virtual-hosted".to_owned(),
                ..KeySpec::default()
            },
            outcome: endpoint_outcome(
                TemplateSpec::new(
                    format!("{}://{{bucket:1}}.{}", ep.scheme, ep.hostname),
                    &["region", "bucket:1"],
                ),
                WHOLE_BUCKET,
                &ep.credential_scope,
                true,
                None,
            ),
        },
        RowSpec {
            key: KeySpec {
                region_regex: Some(ep.region.anchored()),
                bucket_regex: Some(BASIC_BUCKET.to_owned()),
                address_style: Some(AddressingStyle::Path),
                dualstack: Some(false),
                accelerate: Some(false),
                docs: "vanilla, path-style".to_owned(),
                ..KeySpec::default()
            },
            outcome: endpoint_outcome(
                TemplateSpec::new(format!("{}://{}", ep.scheme, ep.hostname), &["region"]),
                WHOLE_BUCKET,
                &ep.credential_scope,
                false,
                None,
            ),
        },
    ]
}

/// Error rows for FIPS pseudo-regions embedded inside an ARN: FIPS is a
/// property of the client's region, never of the resource.
pub(crate) fn fips_in_arn_rows() -> Vec<RowSpec> {
    let patterns = [
        r"arn[:/][a-zA-Z0-9-]+[:/]s3[:/]fips-[a-zA-Z0-9-]+[:/]([a-zA-Z0-9-]{1,63})[:/]accesspoint[:/]([a-zA-Z0-9-]{1,63})",
        r"arn[:/][a-zA-Z0-9-]+[:/]s3[:/][a-zA-Z0-9-]+-fips[:/]([a-zA-Z0-9-]{1,63})[:/]accesspoint[:/]([a-zA-Z0-9-]{1,63})",
    ];
    patterns
        .iter()
        .map(|pattern| {
            error_row(
                KeySpec {
                    bucket_regex: Some((*pattern).to_owned()),
                    docs: "FIPS region not allowed inside an ARN".to_owned(),
                    ..KeySpec::default()
                },
                "invalid ARN: FIPS region not allowed in ARN",
            )
        })
        .collect()
}

/// Access-point ARN rows for one endpoint family, covering the
/// use-arn-region and dualstack combinations.
pub(crate) fn access_point_rows(ep: &DerivedEndpoint) -> Vec<RowSpec> {
    let arn = access_point_arn(&regex::escape(&ep.partition));
    let mut out = Vec::new();
    for use_arn_region in [true, false] {
        for dualstack in [true, false] {
            let key = KeySpec {
                region_regex: Some(ep.region.anchored()),
                bucket_regex: Some(arn.clone()),
                dualstack: Some(dualstack),
                accelerate: Some(false),
                use_arn_region: Some(use_arn_region),
                docs: "access point ARN".to_owned(),
                ..KeySpec::default()
            };
            let outcome = if !use_arn_region && !ep.regional {
                OutcomeSpec::Error {
                    message: "client region is not a regional endpoint".to_owned(),
                }
            } else {
                let region_part = if use_arn_region {
                    "{bucket:2}"
                } else {
                    "{region}"
                };
                let keys: &[&str] = if use_arn_region {
                    &["bucket:2", "bucket:3", "bucket:4"]
                } else {
                    &["region", "bucket:3", "bucket:4"]
                };
                let ds = if dualstack { ".dualstack" } else { "" };
                endpoint_outcome(
                    TemplateSpec::new(
                        format!(
                            "{}://{{bucket:4}}-{{bucket:3}}.s3-accesspoint{ds}.{region_part}.{}",
                            ep.scheme, ep.dns_suffix
                        ),
                        keys,
                    ),
                    &arn,
                    &CredentialScope::default(),
                    true,
                    // Without use-arn-region the ARN's region must agree
                    // with the client's.
                    (!use_arn_region)
                        .then(|| TemplateSpec::new("^{bucket:2}$", &["bucket:2"])),
                )
            };
            out.push(RowSpec { key, outcome });
        }
    }
    out
}

/// Access-point ARN rows for FIPS pseudo-regions (`fips-<region>` or
/// `<region>-fips`). The endpoint region always comes from the ARN; the
/// constraint checks the client region is the FIPS variant of it.
pub(crate) fn fips_meta_region_rows(ep: &DerivedEndpoint) -> Vec<RowSpec> {
    let arn = access_point_arn(&regex::escape(&ep.partition));
    let core = ep.region.core();
    let meta_regions = [format!("^fips-{core}$"), format!("^{core}-fips$")];
    let mut out = Vec::new();
    for use_arn_region in [true, false] {
        for dualstack in [true, false] {
            for meta_region in &meta_regions {
                let key = KeySpec {
                    region_regex: Some(meta_region.clone()),
                    bucket_regex: Some(arn.clone()),
                    dualstack: Some(dualstack),
                    accelerate: Some(false),
                    use_arn_region: Some(use_arn_region),
                    docs: "access point ARN, FIPS pseudo-region".to_owned(),
                    ..KeySpec::default()
                };
                let outcome = if !use_arn_region && !ep.regional {
                    OutcomeSpec::Error {
                        message: "client region is not a regional endpoint".to_owned(),
                    }
                } else {
                    let ds = if dualstack { ".dualstack" } else { "" };
                    endpoint_outcome(
                        TemplateSpec::new(
                            format!(
                                "{}://{{bucket:4}}-{{bucket:3}}.s3-accesspoint-fips{ds}.{{bucket:2}}.{}",
                                ep.scheme, ep.dns_suffix
                            ),
                            &["bucket:2", "bucket:3", "bucket:4"],
                        ),
                        &arn,
                        &CredentialScope::default(),
                        true,
                        Some(TemplateSpec::new(
                            "^(fips-{bucket:2}|{bucket:2}-fips)$",
                            &["bucket:2"],
                        )),
                    )
                };
                out.push(RowSpec { key, outcome });
            }
        }
    }
    out
}

/// Wildcard fallback error rows for ARNs nothing above claimed. MUST come
/// after every happy-path row.
pub(crate) fn trailing_arn_error_rows() -> Vec<RowSpec> {
    let mut out = vec![error_row(
        KeySpec {
            region_regex: Some("[a-zA-Z0-9-]+".to_owned()),
            bucket_regex: Some(access_point_arn("[a-zA-Z0-9-]+")),
            use_arn_region: Some(true),
            docs: "fallback for partition/region mismatch".to_owned(),
            ..KeySpec::default()
        },
        "invalid configuration: cross-partition access point ARN",
    )];
    let malformed: &[(&str, &str)] = &[
        (
            "invalid ARN: missing access point name",
            r"arn[:/][a-zA-Z0-9-]+[:/]s3[:/]([a-zA-Z0-9-]+)[:/]([a-zA-Z0-9-]{1,63})[:/]accesspoint$",
        ),
        (
            "invalid ARN: access point name contains invalid character",
            r"arn[:/][a-zA-Z0-9-]+[:/]s3[:/]([a-zA-Z0-9-]+)[:/]([a-zA-Z0-9-]{1,63})[:/]accesspoint:.*$",
        ),
        (
            "invalid ARN: unknown resource type",
            r"arn[:/][a-zA-Z0-9-]+[:/]s3[:/]([a-zA-Z0-9-]+)[:/]([a-zA-Z0-9-]{1,63})[:/].*",
        ),
        (
            "invalid ARN: missing region",
            r"arn[:/][a-zA-Z0-9-]+[:/]s3[:/][:/]([a-zA-Z0-9-]{1,63})[:/]accesspoint[:/]([a-zA-Z0-9-]{1,63})",
        ),
        (
            "invalid ARN: missing account id",
            r"arn[:/][a-zA-Z0-9-]+[:/]s3[:/]([a-zA-Z0-9-]+)[:/][:/].*$",
        ),
        (
            "invalid ARN: account id contains invalid character",
            r"arn[:/][a-zA-Z0-9-]+[:/]s3[:/]([a-zA-Z0-9-]+)[:/][^:/]+[:/].*$",
        ),
        (
            "invalid ARN: not an S3 ARN",
            r"arn[:/][a-zA-Z0-9-]+[:/][a-zA-Z0-9-]+[:/]([a-zA-Z0-9-]+)[:/]([a-zA-Z0-9-]{1,63})[:/].*$",
        ),
    ];
    for (message, pattern) in malformed {
        out.push(error_row(
            KeySpec {
                bucket_regex: Some((*pattern).to_owned()),
                docs: (*message).to_owned(),
                ..KeySpec::default()
            },
            message,
        ));
    }
    out
}
