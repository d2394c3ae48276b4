//! Tables authored as JSON data, end to end.

#[cfg(test)]
mod tests {
    use waypoint_core::{Request, ResolveError, RowSpec, RuleTable};

    fn zonal_table() -> RuleTable {
        let json = r#"[
            {
                "key": {"accelerate": true, "docs": "zonal buckets never accelerate"},
                "outcome": {"type": "error", "message": "zonal buckets do not support transfer acceleration"}
            },
            {
                "key": {
                    "bucketRegex": "^.+--.+--x-s3$",
                    "docs": "zonal bucket"
                },
                "outcome": {
                    "type": "endpoint",
                    "uriTemplate": {
                        "template": "https://{bucket:1}.zone-{bucket:2}.s3express.{region}.amazonaws.com",
                        "keys": ["region", "bucket:1", "bucket:2"]
                    },
                    "bucketRegex": "^(.+)--(.+)--x-s3$",
                    "removeBucketFromPath": true
                }
            }
        ]"#;
        let rows: Vec<RowSpec> = serde_json::from_str(json).expect("rows should parse");
        RuleTable::from_rows(rows).expect("table should compile")
    }

    fn zonal_request(accelerate: bool) -> Request {
        Request::builder()
            .region("us-east-1".into())
            .bucket("mybucket--use1-az4--x-s3".into())
            .accelerate(accelerate)
            .build()
    }

    #[test]
    fn test_should_resolve_zonal_bucket_from_json_table() {
        let table = zonal_table();
        let result = table
            .resolve(
                &zonal_request(false),
                "/mybucket--use1-az4--x-s3/data.bin?x-id=GetObject",
            )
            .unwrap();
        assert_eq!(
            result.uri,
            "https://mybucket.zone-use1-az4.s3express.us-east-1.amazonaws.com/data.bin?x-id=GetObject"
        );
    }

    #[test]
    fn test_should_apply_error_row_before_endpoint_row() {
        let table = zonal_table();
        let err = table
            .resolve(&zonal_request(true), "/mybucket--use1-az4--x-s3/data.bin")
            .unwrap_err();
        assert_eq!(
            err,
            ResolveError::RuleRejected(
                "zonal buckets do not support transfer acceleration".to_owned()
            )
        );
    }

    #[test]
    fn test_should_fail_no_rule_matched_for_plain_bucket() {
        let table = zonal_table();
        let req = Request::builder()
            .region("us-east-1".into())
            .bucket("plain-bucket".into())
            .build();
        let err = table.resolve(&req, "/plain-bucket/k").unwrap_err();
        assert_eq!(err, ResolveError::NoRuleMatched);
    }
}
