//! Rule-table endpoint resolution for object-storage requests.
//!
//! This crate decides which endpoint an object-storage request should be
//! sent to. A [`RuleTable`] holds an ordered list of rules; each rule pairs
//! match criteria (addressing style, feature flags, region and bucket
//! patterns) with an outcome: rewrite the request URI from a template, or
//! reject the request shape with a configured message. Resolution commits to
//! the first matching rule.
//!
//! # Architecture
//!
//! ```text
//! RowSpec (declarative rows, serde)
//!        |
//!        v  RuleTable::from_rows (compile + validate once)
//!   RuleTable (ordered Vec<Rule>)
//!        |
//!        v  resolve(request, base_uri)   first match wins
//!   RuleOutcome
//!     |           |
//!     v           v
//!  Endpoint     Reject(message)
//!     |
//!     v  apply (template substitution, URI reassembly)
//!  ResolutionResult { uri, credential_scope }
//! ```
//!
//! Tables are typically authored as data (JSON rows) or generated; the
//! companion `waypoint-tables` crate produces the standard table.

pub mod apply;
pub mod config;
pub mod error;
pub mod rule;
pub mod spec;
mod table;
pub mod types;

pub use config::ResolverConfig;
pub use error::{ResolveError, ResolveResult, TableError};
pub use rule::{Placeholder, Rule, RuleKey, RuleOutcome, RuleValue, UriTemplate};
pub use spec::{KeySpec, OutcomeSpec, RowSpec, TemplateSpec, ValueSpec};
pub use table::{ResolutionResult, RuleTable};
pub use types::{AddressingStyle, CredentialScope, Request, bucket_is_dns_compatible};
