//! End-to-end resolution of plain bucket names against the builtin table.

#[cfg(test)]
mod tests {
    use waypoint_core::{AddressingStyle, ResolveError, ResolverConfig};

    use crate::{request, table};

    struct TestCase {
        name: &'static str,
        region: &'static str,
        bucket: &'static str,
        dualstack: bool,
        accelerate: bool,
        expected: &'static str,
    }

    #[test]
    fn test_should_resolve_standard_endpoint_families() {
        let cases = [
            TestCase {
                name: "vanilla virtual-hosted",
                region: "us-west-2",
                bucket: "my-bucket",
                dualstack: false,
                accelerate: false,
                expected: "https://my-bucket.s3.us-west-2.amazonaws.com/object.txt",
            },
            TestCase {
                name: "us-east-1 partition-global host",
                region: "us-east-1",
                bucket: "my-bucket",
                dualstack: false,
                accelerate: false,
                expected: "https://my-bucket.s3.amazonaws.com/object.txt",
            },
            TestCase {
                name: "dualstack",
                region: "us-west-2",
                bucket: "my-bucket",
                dualstack: true,
                accelerate: false,
                expected: "https://my-bucket.s3.dualstack.us-west-2.amazonaws.com/object.txt",
            },
            TestCase {
                name: "dualstack in us-east-1",
                region: "us-east-1",
                bucket: "my-bucket",
                dualstack: true,
                accelerate: false,
                expected: "https://my-bucket.s3.dualstack.amazonaws.com/object.txt",
            },
            TestCase {
                name: "accelerate",
                region: "us-west-2",
                bucket: "my-bucket",
                dualstack: false,
                accelerate: true,
                expected: "https://my-bucket.s3-accelerate.amazonaws.com/object.txt",
            },
            TestCase {
                name: "accelerate over dualstack",
                region: "us-west-2",
                bucket: "my-bucket",
                dualstack: true,
                accelerate: true,
                expected: "https://my-bucket.s3-accelerate.dualstack.amazonaws.com/object.txt",
            },
            TestCase {
                name: "china partition",
                region: "cn-north-1",
                bucket: "my-bucket",
                dualstack: false,
                accelerate: false,
                expected: "https://my-bucket.s3.cn-north-1.amazonaws.com.cn/object.txt",
            },
        ];
        for case in &cases {
            let config = ResolverConfig::builder()
                .dualstack(case.dualstack)
                .accelerate(case.accelerate)
                .build();
            let req = config.request_in(case.region, case.bucket);
            let result = table()
                .resolve(&req, &format!("/{}/object.txt", case.bucket))
                .unwrap_or_else(|e| panic!("{}: {e}", case.name));
            assert_eq!(result.uri, case.expected, "{}", case.name);
        }
    }

    #[test]
    fn test_should_fall_back_to_path_style_for_dns_incompatible_bucket() {
        let req = request("us-west-2", "my_bucket");
        assert_eq!(req.address_style, AddressingStyle::Path);
        let result = table().resolve(&req, "/my_bucket/object.txt").unwrap();
        assert_eq!(
            result.uri,
            "https://s3.us-west-2.amazonaws.com/my_bucket/object.txt"
        );
    }

    #[test]
    fn test_should_honor_forced_path_style() {
        let config = ResolverConfig::builder()
            .address_style(Some(AddressingStyle::Path))
            .build();
        let req = config.request_in("us-west-2", "my-bucket");
        let result = table().resolve(&req, "/my-bucket/object.txt").unwrap();
        assert_eq!(
            result.uri,
            "https://s3.us-west-2.amazonaws.com/my-bucket/object.txt"
        );
    }

    #[test]
    fn test_should_attach_credential_scope_from_region_override() {
        let result = table()
            .resolve(&request("us-east-1", "my-bucket"), "/my-bucket/k")
            .unwrap();
        assert_eq!(result.credential_scope.region.as_deref(), Some("us-east-1"));

        let result = table()
            .resolve(&request("us-west-2", "my-bucket"), "/my-bucket/k")
            .unwrap();
        assert!(result.credential_scope.is_empty());
    }

    #[test]
    fn test_should_preserve_query_and_fragment_end_to_end() {
        let result = table()
            .resolve(
                &request("us-west-2", "my-bucket"),
                "/my-bucket/key?versionId=abc&partNumber=2#trailer",
            )
            .unwrap();
        assert_eq!(
            result.uri,
            "https://my-bucket.s3.us-west-2.amazonaws.com/key?versionId=abc&partNumber=2#trailer"
        );
    }

    #[test]
    fn test_should_reject_virtual_addressing_of_dns_incompatible_bucket() {
        let config = ResolverConfig::builder()
            .address_style(Some(AddressingStyle::Virtual))
            .build();
        let req = config.request_in("us-west-2", "my_bucket");
        let err = table().resolve(&req, "/my_bucket/k").unwrap_err();
        assert!(matches!(err, ResolveError::RuleRejected(_)));
    }

    #[test]
    fn test_should_reject_accelerate_with_path_addressing() {
        let config = ResolverConfig::builder()
            .address_style(Some(AddressingStyle::Path))
            .accelerate(true)
            .build();
        let req = config.request_in("us-west-2", "my-bucket");
        let err = table().resolve(&req, "/my-bucket/k").unwrap_err();
        assert_eq!(
            err,
            ResolveError::RuleRejected(
                "transfer acceleration and path addressing are incompatible".to_owned()
            )
        );
    }

    #[test]
    fn test_should_reject_accelerate_with_dns_incompatible_bucket() {
        let config = ResolverConfig::builder().accelerate(true).build();
        let req = config.request_in("us-west-2", "my_bucket");
        let err = table().resolve(&req, "/my_bucket/k").unwrap_err();
        assert_eq!(
            err,
            ResolveError::RuleRejected(
                "bucket name is not DNS compatible as required by transfer acceleration"
                    .to_owned()
            )
        );
    }

    #[test]
    fn test_should_fail_with_no_rule_matched_for_unknown_region() {
        let err = table()
            .resolve(&request("mars-central-9", "my-bucket"), "/my-bucket/k")
            .unwrap_err();
        assert_eq!(err, ResolveError::NoRuleMatched);
    }
}
