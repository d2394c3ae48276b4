//! Access-point ARN resolution, including region precedence and FIPS
//! pseudo-regions.

#[cfg(test)]
mod tests {
    use waypoint_core::{ResolveError, ResolverConfig};

    use crate::{request, table};

    const ARN: &str = "arn:aws:s3:us-west-2:123456789012:accesspoint:myap";

    fn base(arn: &str) -> String {
        format!("/{arn}/object.txt")
    }

    #[test]
    fn test_should_resolve_access_point_in_client_region() {
        let result = table()
            .resolve(&request("us-west-2", ARN), &base(ARN))
            .unwrap();
        assert_eq!(
            result.uri,
            "https://myap-123456789012.s3-accesspoint.us-west-2.amazonaws.com/object.txt"
        );
    }

    #[test]
    fn test_should_fail_with_invalid_region_for_cross_region_arn() {
        // Without use-arn-region the ARN's region must equal the client's.
        let err = table()
            .resolve(&request("eu-west-1", ARN), &base(ARN))
            .unwrap_err();
        assert!(matches!(err, ResolveError::InvalidRegion { .. }));
    }

    #[test]
    fn test_should_use_arn_region_when_enabled() {
        let config = ResolverConfig::builder().use_arn_region(true).build();
        let req = config.request_in("eu-west-1", ARN);
        let result = table().resolve(&req, &base(ARN)).unwrap();
        assert_eq!(
            result.uri,
            "https://myap-123456789012.s3-accesspoint.us-west-2.amazonaws.com/object.txt"
        );
    }

    #[test]
    fn test_should_resolve_access_point_over_dualstack() {
        let config = ResolverConfig::builder().dualstack(true).build();
        let req = config.request_in("us-west-2", ARN);
        let result = table().resolve(&req, &base(ARN)).unwrap();
        assert_eq!(
            result.uri,
            "https://myap-123456789012.s3-accesspoint.dualstack.us-west-2.amazonaws.com/object.txt"
        );
    }

    #[test]
    fn test_should_resolve_fips_pseudo_region_from_arn_region() {
        let arn = "arn:aws:s3:us-east-1:123456789012:accesspoint:myap";
        let result = table()
            .resolve(&request("fips-us-east-1", arn), &base(arn))
            .unwrap();
        assert_eq!(
            result.uri,
            "https://myap-123456789012.s3-accesspoint-fips.us-east-1.amazonaws.com/object.txt"
        );

        let result = table()
            .resolve(&request("us-east-1-fips", arn), &base(arn))
            .unwrap();
        assert_eq!(
            result.uri,
            "https://myap-123456789012.s3-accesspoint-fips.us-east-1.amazonaws.com/object.txt"
        );
    }

    #[test]
    fn test_should_fail_fips_region_mismatching_arn_region() {
        // Client is in the FIPS variant of us-east-1 but the ARN names
        // us-west-2.
        let err = table()
            .resolve(&request("fips-us-east-1", ARN), &base(ARN))
            .unwrap_err();
        assert!(matches!(err, ResolveError::InvalidRegion { .. }));
    }

    #[test]
    fn test_should_reject_accelerate_with_access_point() {
        let config = ResolverConfig::builder().accelerate(true).build();
        let req = config.request_in("us-west-2", ARN);
        let err = table().resolve(&req, &base(ARN)).unwrap_err();
        assert_eq!(
            err,
            ResolveError::RuleRejected(
                "access point ARNs do not support transfer acceleration".to_owned()
            )
        );
    }
}
