//! Malformed and mismatched ARNs must fall into the trailing error rows.

#[cfg(test)]
mod tests {
    use waypoint_core::{ResolveError, ResolverConfig};

    use crate::{request, table};

    fn rejected(region: &str, bucket: &str, use_arn_region: bool) -> String {
        let config = ResolverConfig::builder()
            .use_arn_region(use_arn_region)
            .build();
        let req = config.request_in(region, bucket);
        match table().resolve(&req, &format!("/{bucket}/k")) {
            Err(ResolveError::RuleRejected(message)) => message,
            other => panic!("expected a rule rejection for {bucket:?}, got {other:?}"),
        }
    }

    #[test]
    fn test_should_reject_cross_partition_access_point_arn() {
        let arn = "arn:aws:s3:us-west-2:123456789012:accesspoint:myap";
        assert_eq!(
            rejected("cn-north-1", arn, true),
            "invalid configuration: cross-partition access point ARN"
        );
    }

    #[test]
    fn test_should_reject_fips_region_embedded_in_arn() {
        let arn = "arn:aws:s3:fips-us-east-1:123456789012:accesspoint:myap";
        assert_eq!(
            rejected("us-east-1", arn, false),
            "invalid ARN: FIPS region not allowed in ARN"
        );
    }

    #[test]
    fn test_should_reject_arn_missing_access_point_name() {
        let arn = "arn:aws:s3:us-west-2:123456789012:accesspoint";
        assert_eq!(
            rejected("us-west-2", arn, false),
            "invalid ARN: missing access point name"
        );
    }

    #[test]
    fn test_should_reject_arn_with_unknown_resource_type() {
        let arn = "arn:aws:s3:us-west-2:123456789012:bucket_name:mybucket";
        assert_eq!(
            rejected("us-west-2", arn, false),
            "invalid ARN: unknown resource type"
        );
    }

    #[test]
    fn test_should_reject_arn_missing_region() {
        let arn = "arn:aws:s3::123456789012:accesspoint:myap";
        assert_eq!(rejected("us-west-2", arn, false), "invalid ARN: missing region");
    }

    #[test]
    fn test_should_reject_non_s3_arn() {
        let arn = "arn:aws:sqs:us-west-2:123456789012:queue:jobs";
        assert_eq!(rejected("us-west-2", arn, false), "invalid ARN: not an S3 ARN");
    }
}
