//! Resolver configuration.
//!
//! Provides [`ResolverConfig`] for the client-side knobs that shape
//! endpoint-resolution requests: the default region, the addressing style,
//! and the transport feature flags. Configuration values can be loaded from
//! environment variables.

use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

use crate::types::{AddressingStyle, Request};

/// Client-side resolver configuration.
///
/// All fields have defaults matching a plain regional setup. Configuration
/// can be loaded from environment variables via [`ResolverConfig::from_env`].
///
/// # Examples
///
/// ```
/// use waypoint_core::ResolverConfig;
///
/// let config = ResolverConfig::default();
/// assert_eq!(config.default_region, "us-east-1");
/// assert!(!config.dualstack);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase")]
pub struct ResolverConfig {
    /// Default region used when a request does not name one.
    #[builder(default = String::from("us-east-1"))]
    pub default_region: String,

    /// Addressing style for plain bucket names. `None` picks per bucket:
    /// virtual-hosted when the name is DNS-compatible, path-style otherwise.
    #[builder(default)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_style: Option<AddressingStyle>,

    /// Whether the dualstack (IPv4+IPv6) endpoint family is requested.
    #[builder(default = false)]
    pub dualstack: bool,

    /// Whether the transfer-acceleration endpoint family is requested.
    #[builder(default = false)]
    pub accelerate: bool,

    /// Whether a region embedded in a resource identifier takes precedence
    /// over the configured region.
    #[builder(default = false)]
    pub use_arn_region: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            default_region: String::from("us-east-1"),
            address_style: None,
            dualstack: false,
            accelerate: false,
            use_arn_region: false,
        }
    }
}

impl ResolverConfig {
    /// Load configuration from environment variables.
    ///
    /// Reads the following environment variables (falling back to defaults):
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `WAYPOINT_DEFAULT_REGION` | `us-east-1` |
    /// | `WAYPOINT_ADDRESS_STYLE` | unset (per-bucket) |
    /// | `WAYPOINT_DUALSTACK` | `false` |
    /// | `WAYPOINT_ACCELERATE` | `false` |
    /// | `WAYPOINT_USE_ARN_REGION` | `false` |
    ///
    /// `WAYPOINT_ADDRESS_STYLE` accepts `path` or `virtual`; any other value
    /// leaves the per-bucket default in place.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(v) = std::env::var("WAYPOINT_DEFAULT_REGION") {
            config.default_region = v;
        }
        if let Ok(v) = std::env::var("WAYPOINT_ADDRESS_STYLE") {
            config.address_style = match v.to_ascii_lowercase().as_str() {
                "path" => Some(AddressingStyle::Path),
                "virtual" => Some(AddressingStyle::Virtual),
                _ => None,
            };
        }
        if let Ok(v) = std::env::var("WAYPOINT_DUALSTACK") {
            config.dualstack = parse_bool(&v);
        }
        if let Ok(v) = std::env::var("WAYPOINT_ACCELERATE") {
            config.accelerate = parse_bool(&v);
        }
        if let Ok(v) = std::env::var("WAYPOINT_USE_ARN_REGION") {
            config.use_arn_region = parse_bool(&v);
        }

        config
    }

    /// Build a resolution request for a bucket in the configured region.
    #[must_use]
    pub fn request(&self, bucket: &str) -> Request {
        self.request_in(&self.default_region, bucket)
    }

    /// Build a resolution request for a bucket in an explicit region.
    #[must_use]
    pub fn request_in(&self, region: &str, bucket: &str) -> Request {
        let address_style = self
            .address_style
            .unwrap_or_else(|| AddressingStyle::preferred_for(bucket));
        Request::builder()
            .region(region.to_owned())
            .bucket(bucket.to_owned())
            .address_style(address_style)
            .dualstack(self.dualstack)
            .accelerate(self.accelerate)
            .use_arn_region(self.use_arn_region)
            .build()
    }
}

/// Parse a string as a boolean, accepting `"1"` and `"true"` (case-insensitive).
fn parse_bool(value: &str) -> bool {
    value == "1" || value.eq_ignore_ascii_case("true")
}
