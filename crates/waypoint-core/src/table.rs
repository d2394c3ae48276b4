//! The ordered rule table and its resolution entry points.

use tracing::debug;

use crate::apply;
use crate::error::{ResolveError, ResolveResult, TableError};
use crate::rule::{Rule, RuleOutcome};
use crate::spec::RowSpec;
use crate::types::{CredentialScope, Request};

/// The outcome of a successful resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionResult {
    /// The rewritten URI. Kept as a string so the base URI's fragment, which
    /// `http::Uri` cannot represent, survives untouched.
    pub uri: String,

    /// Signing-scope overrides attached by the matched rule.
    pub credential_scope: CredentialScope,
}

/// An ordered, immutable table of compiled rules.
///
/// Resolution scans the table top to bottom and commits to the first rule
/// whose key matches; later rules are never consulted, even if applying the
/// committed rule fails. Row order is therefore part of a table's meaning:
/// specific rows go before general ones, and error rows act as guards for
/// everything below them.
#[derive(Debug, Clone)]
pub struct RuleTable {
    rules: Vec<Rule>,
}

impl RuleTable {
    /// Compile a table from declarative rows, preserving their order.
    ///
    /// All regex patterns and templates are compiled and validated here, so
    /// per-request resolution never fails on malformed configuration.
    ///
    /// # Errors
    ///
    /// Returns the first [`TableError`] encountered while compiling a row.
    pub fn from_rows(rows: Vec<RowSpec>) -> Result<Self, TableError> {
        let rules = rows
            .into_iter()
            .map(Rule::compile)
            .collect::<Result<Vec<_>, _>>()?;
        debug!(rules = rules.len(), "compiled rule table");
        Ok(Self { rules })
    }

    /// Number of rules in the table.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// True if the table has no rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Resolve a request against the table, rewriting `base_uri`.
    ///
    /// Pure and deterministic: identical inputs always produce identical
    /// outputs, and concurrent calls are safe.
    ///
    /// # Errors
    ///
    /// - [`ResolveError::NoRuleMatched`] if no rule's key matches.
    /// - [`ResolveError::RuleRejected`] if the first matching rule declares
    ///   an error outcome; the configured message is surfaced verbatim.
    /// - Any applier error from the committed rule. There is no fallback to
    ///   later rules once a key has matched.
    pub fn resolve(&self, request: &Request, base_uri: &str) -> ResolveResult<ResolutionResult> {
        let rule = self
            .rules
            .iter()
            .find(|rule| rule.key.matches(request))
            .ok_or(ResolveError::NoRuleMatched)?;
        debug!(
            rule = %rule.key.docs,
            region = %request.region,
            bucket = %request.bucket,
            "matched rule"
        );
        match &rule.outcome {
            RuleOutcome::Endpoint(value) => apply::apply(base_uri, request, value),
            RuleOutcome::Reject(message) => Err(ResolveError::RuleRejected(message.clone())),
        }
    }

    /// Resolve a request and rewrite an in-flight HTTP request's URI.
    ///
    /// The HTTP request's own URI is the base; on success it is replaced with
    /// the resolved one and the resolution outcome is returned so the caller
    /// can pick up the credential scope.
    ///
    /// # Errors
    ///
    /// Same as [`RuleTable::resolve`], plus [`ResolveError::InvalidUri`] if
    /// the resolved URI is not accepted by `http`.
    pub fn rewrite<B>(
        &self,
        request: &Request,
        http_req: &mut http::Request<B>,
    ) -> ResolveResult<ResolutionResult> {
        let base_uri = http_req.uri().to_string();
        let result = self.resolve(request, &base_uri)?;
        *http_req.uri_mut() = result
            .uri
            .parse()
            .map_err(|_| ResolveError::InvalidUri(result.uri.clone()))?;
        Ok(result)
    }
}
