//! Compiled rules: the match predicate and the rule value applied on a match.
//!
//! Rules are compiled from the declarative row format in [`crate::spec`] when
//! a [`crate::RuleTable`] is constructed. All regex patterns and templates
//! are validated exactly once, at compilation time; a compiled rule can be
//! evaluated repeatedly and concurrently without further validation.

use std::collections::HashMap;

use regex::Regex;

use crate::error::TableError;
use crate::spec::{KeySpec, OutcomeSpec, RowSpec, TemplateSpec, ValueSpec};
use crate::types::{AddressingStyle, CredentialScope, Request};

/// A parsed template placeholder.
///
/// `"region"` substitutes the request's region; `"bucket:N"` substitutes the
/// `N`-th capture group (1-based) of the rule's bucket pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placeholder {
    /// The request's region.
    Region,
    /// A capture group of the rule's bucket pattern.
    Capture {
        /// The literal key as written in the template (e.g. `"bucket:2"`).
        key: String,
        /// The 1-based capture group index.
        group: usize,
    },
}

impl Placeholder {
    /// Parse a placeholder key.
    fn parse(key: &str) -> Result<Self, TableError> {
        if key == "region" {
            return Ok(Self::Region);
        }
        let group = key
            .strip_prefix("bucket:")
            .and_then(|n| n.parse::<usize>().ok())
            .filter(|n| *n >= 1)
            .ok_or_else(|| TableError::InvalidPlaceholder {
                key: key.to_owned(),
            })?;
        Ok(Self::Capture {
            key: key.to_owned(),
            group,
        })
    }

    /// The literal key as written in the template.
    #[must_use]
    pub fn key(&self) -> &str {
        match self {
            Self::Region => "region",
            Self::Capture { key, .. } => key,
        }
    }
}

/// A URI (or region-constraint) template with its ordered placeholder keys.
///
/// The template text contains `{key}` markers for each key; substitution
/// happens in key order. Validation guarantees that every `{...}` marker in
/// the text is covered by a declared key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UriTemplate {
    template: String,
    keys: Vec<Placeholder>,
}

impl UriTemplate {
    /// Parse and validate a template.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::InvalidPlaceholder`] for a key that is neither
    /// `"region"` nor `"bucket:N"`, and [`TableError::UnboundPlaceholder`] if
    /// the text contains a `{...}` marker not covered by the declared keys.
    pub fn new(template: impl Into<String>, keys: &[String]) -> Result<Self, TableError> {
        let template = template.into();
        let keys = keys
            .iter()
            .map(|key| Placeholder::parse(key))
            .collect::<Result<Vec<_>, _>>()?;

        let mut probe = template.clone();
        for key in &keys {
            probe = probe.replace(&format!("{{{}}}", key.key()), "");
        }
        if probe.contains('{') {
            return Err(TableError::UnboundPlaceholder { template });
        }

        Ok(Self { template, keys })
    }

    /// The raw template text.
    #[must_use]
    pub fn template(&self) -> &str {
        &self.template
    }

    /// The ordered placeholders substituted into the template.
    #[must_use]
    pub fn keys(&self) -> &[Placeholder] {
        &self.keys
    }

    /// The highest capture group referenced, if any.
    pub(crate) fn max_capture_group(&self) -> Option<usize> {
        self.keys
            .iter()
            .filter_map(|key| match key {
                Placeholder::Region => None,
                Placeholder::Capture { group, .. } => Some(*group),
            })
            .max()
    }

    /// Check that the template compiles as a regex once placeholders are
    /// substituted. Substituted values are regex-escaped at apply time, so
    /// probing with empty values covers the pattern's own syntax.
    pub(crate) fn validate_as_pattern(&self) -> Result<(), TableError> {
        let mut probe = self.template.clone();
        for key in &self.keys {
            probe = probe.replace(&format!("{{{}}}", key.key()), "");
        }
        Regex::new(&probe)
            .map(|_| ())
            .map_err(|source| TableError::InvalidPattern {
                pattern: self.template.clone(),
                source,
            })
    }

    fn from_spec(spec: &TemplateSpec) -> Result<Self, TableError> {
        Self::new(spec.template.clone(), &spec.keys)
    }
}

/// Match criteria for a rule: which request shapes the rule applies to.
///
/// Absent constraints are wildcards. A key with no constraints set matches
/// every request.
#[derive(Debug, Clone)]
pub struct RuleKey {
    /// Required addressing style, if constrained.
    pub address_style: Option<AddressingStyle>,
    /// Required dualstack flag, if constrained.
    pub dualstack: Option<bool>,
    /// Required accelerate flag, if constrained.
    pub accelerate: Option<bool>,
    /// Required use-arn-region flag, if constrained.
    pub use_arn_region: Option<bool>,
    /// Pattern the request's region must match, if constrained.
    pub region_regex: Option<Regex>,
    /// Pattern the request's bucket must match, if constrained.
    pub bucket_regex: Option<Regex>,
    /// Human-readable annotation for diagnostics and logging.
    pub docs: String,
}

impl RuleKey {
    /// True if every present constraint is satisfied by the request.
    ///
    /// Pure and side-effect free; safe to evaluate repeatedly and
    /// concurrently.
    #[must_use]
    pub fn matches(&self, request: &Request) -> bool {
        if let Some(style) = self.address_style {
            if style != request.address_style {
                return false;
            }
        }
        if let Some(dualstack) = self.dualstack {
            if dualstack != request.dualstack {
                return false;
            }
        }
        if let Some(accelerate) = self.accelerate {
            if accelerate != request.accelerate {
                return false;
            }
        }
        if let Some(use_arn_region) = self.use_arn_region {
            if use_arn_region != request.use_arn_region {
                return false;
            }
        }
        if let Some(regex) = &self.region_regex {
            if !regex.is_match(&request.region) {
                return false;
            }
        }
        // The bucket constraint tests the bucket, never the region.
        if let Some(regex) = &self.bucket_regex {
            if !regex.is_match(&request.bucket) {
                return false;
            }
        }
        true
    }

    fn from_spec(spec: KeySpec) -> Result<Self, TableError> {
        Ok(Self {
            address_style: spec.address_style,
            dualstack: spec.dualstack,
            accelerate: spec.accelerate,
            use_arn_region: spec.use_arn_region,
            region_regex: spec.region_regex.map(|p| compile_pattern(&p)).transpose()?,
            bucket_regex: spec.bucket_regex.map(|p| compile_pattern(&p)).transpose()?,
            docs: spec.docs,
        })
    }
}

/// The rewriting instructions of a rule that resolves to an endpoint.
#[derive(Debug, Clone)]
pub struct RuleValue {
    /// Template producing the new scheme and authority.
    pub uri_template: UriTemplate,
    /// Pattern run against the bucket to extract capture groups at apply
    /// time. Expected to agree with the key's bucket constraint.
    pub bucket_regex: Regex,
    /// Opaque header hints, passed through untouched and never interpreted.
    pub header_template: HashMap<String, String>,
    /// Signing-scope overrides attached to the resolved endpoint.
    pub credential_scope: CredentialScope,
    /// Whether the bucket must be stripped from the front of the base URI's
    /// path.
    pub remove_bucket_from_path: bool,
    /// Optional region constraint, rendered and matched against the
    /// request's region before any rewriting happens.
    pub region_match: Option<UriTemplate>,
}

impl RuleValue {
    fn from_spec(spec: ValueSpec) -> Result<Self, TableError> {
        let uri_template = UriTemplate::new(spec.uri_template.template, &spec.uri_template.keys)?;
        let bucket_regex = compile_pattern(&spec.bucket_regex)?;
        let region_match = spec
            .region_match
            .as_ref()
            .map(UriTemplate::from_spec)
            .transpose()?;
        if let Some(constraint) = &region_match {
            constraint.validate_as_pattern()?;
        }

        // Every referenced capture group must exist in the bucket pattern.
        let referenced = [
            uri_template.max_capture_group(),
            region_match.as_ref().and_then(UriTemplate::max_capture_group),
        ]
        .into_iter()
        .flatten()
        .max();
        if let Some(group) = referenced {
            if group >= bucket_regex.captures_len() {
                return Err(TableError::MissingCaptureGroup {
                    pattern: bucket_regex.as_str().to_owned(),
                    group,
                });
            }
        }

        Ok(Self {
            uri_template,
            bucket_regex,
            header_template: spec.header_template,
            credential_scope: spec.credential_scope,
            remove_bucket_from_path: spec.remove_bucket_from_path,
            region_match,
        })
    }
}

/// The outcome a rule declares for the requests it matches.
///
/// Exhaustive by construction: a rule either resolves to an endpoint or
/// rejects the request shape with a configured message.
#[derive(Debug, Clone)]
pub enum RuleOutcome {
    /// Rewrite the request URI using the rule's value.
    Endpoint(RuleValue),
    /// Fail resolution with this configured message.
    Reject(String),
}

/// A single compiled rule: match criteria plus outcome.
#[derive(Debug, Clone)]
pub struct Rule {
    /// Which request shapes this rule applies to.
    pub key: RuleKey,
    /// What happens when it matches.
    pub outcome: RuleOutcome,
}

impl Rule {
    /// Compile a declarative row, validating every pattern and template.
    ///
    /// # Errors
    ///
    /// Returns a [`TableError`] on a malformed pattern, template, or
    /// placeholder key.
    pub fn compile(row: RowSpec) -> Result<Self, TableError> {
        let key = RuleKey::from_spec(row.key)?;
        let outcome = match row.outcome {
            OutcomeSpec::Endpoint(value) => RuleOutcome::Endpoint(RuleValue::from_spec(value)?),
            OutcomeSpec::Error { message } => RuleOutcome::Reject(message),
        };
        Ok(Self { key, outcome })
    }
}

fn compile_pattern(pattern: &str) -> Result<Regex, TableError> {
    Regex::new(pattern).map_err(|source| TableError::InvalidPattern {
        pattern: pattern.to_owned(),
        source,
    })
}
