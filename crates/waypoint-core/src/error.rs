//! Error types for table construction and request resolution.

/// Errors produced while resolving a request against a rule table.
///
/// Every failure is terminal for the call and non-retryable: resolution is a
/// pure function of the table and the request, so retrying with the same
/// inputs cannot change the outcome.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    /// The matched rule explicitly forbids this request shape. The message is
    /// authored in the rule table and surfaced verbatim.
    #[error("{0}")]
    RuleRejected(String),

    /// No rule in the table matched the request. Indicates an incomplete rule
    /// table or a request shape outside the supported combinations.
    #[error("no rule in the table matched the request")]
    NoRuleMatched,

    /// The request's region does not satisfy the matched rule's region
    /// constraint.
    #[error("invalid region {region:?}: expected a region matching {expected:?}")]
    InvalidRegion {
        /// The region on the request.
        region: String,
        /// The rendered region constraint that was not satisfied.
        expected: String,
    },

    /// The base URI is malformed or inconsistent with the request (e.g. the
    /// path does not contain the expected bucket segment).
    #[error("invalid URI: {0}")]
    InvalidUri(String),

    /// The bucket did not match the matched rule's capture pattern. Signals a
    /// malformed rule table; the matcher and the applier are expected to
    /// agree on the bucket pattern.
    #[error("bucket {bucket:?} does not match capture pattern {pattern:?}")]
    CaptureMismatch {
        /// The bucket on the request.
        bucket: String,
        /// The capture pattern that failed to match.
        pattern: String,
    },
}

/// Convenience result type for resolution operations.
pub type ResolveResult<T> = Result<T, ResolveError>;

/// Errors produced while constructing a rule table from declarative rows.
///
/// Construction fails fast on bad configuration so that per-request
/// resolution never pays regex compilation costs or discovers malformed
/// patterns.
#[derive(Debug, thiserror::Error)]
pub enum TableError {
    /// A regex pattern in a rule failed to compile.
    #[error("invalid regex pattern {pattern:?}: {source}")]
    InvalidPattern {
        /// The offending pattern.
        pattern: String,
        /// The underlying regex error.
        #[source]
        source: regex::Error,
    },

    /// A template contains a `{placeholder}` that is not named in its keys.
    #[error("template {template:?} contains a placeholder not named in its keys")]
    UnboundPlaceholder {
        /// The offending template.
        template: String,
    },

    /// A template key is neither `"region"` nor `"bucket:N"` with `N >= 1`.
    #[error("invalid placeholder key {key:?} (expected \"region\" or \"bucket:N\" with N >= 1)")]
    InvalidPlaceholder {
        /// The offending key.
        key: String,
    },

    /// A template references a capture group the rule's bucket pattern does
    /// not define.
    #[error("capture pattern {pattern:?} has no capture group {group}")]
    MissingCaptureGroup {
        /// The rule's bucket pattern.
        pattern: String,
        /// The out-of-range group index.
        group: usize,
    },
}
