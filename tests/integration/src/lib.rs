//! Integration tests for waypoint endpoint resolution.
//!
//! These run entirely in-process: they compile the builtin standard table
//! once and resolve requests against it the way a storage client would.

use std::sync::{Once, OnceLock};

use waypoint_core::{Request, ResolverConfig, RuleTable};

static INIT: Once = Once::new();

/// Initialize tracing (once).
fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .init();
    });
}

/// The compiled builtin table, shared across tests.
pub fn table() -> &'static RuleTable {
    init_tracing();
    static TABLE: OnceLock<RuleTable> = OnceLock::new();
    TABLE.get_or_init(|| waypoint_tables::builtin_table().expect("builtin table should compile"))
}

/// Build a request the way a default-configured client would.
#[must_use]
pub fn request(region: &str, bucket: &str) -> Request {
    ResolverConfig::default().request_in(region, bucket)
}

mod test_access_points;
mod test_arn_errors;
mod test_rewrite;
mod test_standard_endpoints;
mod test_table_json;
