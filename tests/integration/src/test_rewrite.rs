//! Rewriting in-flight `http::Request`s against the builtin table.

#[cfg(test)]
mod tests {
    use waypoint_core::{ResolveError, ResolverConfig};

    use crate::{request, table};

    fn http_request(uri: &str) -> http::Request<()> {
        http::Request::builder()
            .method("GET")
            .uri(uri)
            .body(())
            .expect("test request should build")
    }

    #[test]
    fn test_should_rewrite_origin_form_request() {
        let mut req = http_request("/my-bucket/photos/cat.png?partNumber=1");
        let result = table()
            .rewrite(&request("us-west-2", "my-bucket"), &mut req)
            .unwrap();
        assert_eq!(
            req.uri().to_string(),
            "https://my-bucket.s3.us-west-2.amazonaws.com/photos/cat.png?partNumber=1"
        );
        assert!(result.credential_scope.is_empty());
    }

    #[test]
    fn test_should_surface_credential_scope_on_rewrite() {
        let mut req = http_request("/my-bucket/k");
        let result = table()
            .rewrite(&request("us-east-1", "my-bucket"), &mut req)
            .unwrap();
        assert_eq!(req.uri().host(), Some("my-bucket.s3.amazonaws.com"));
        assert_eq!(result.credential_scope.region.as_deref(), Some("us-east-1"));
    }

    #[test]
    fn test_should_leave_request_untouched_on_rejection() {
        let config = ResolverConfig::builder().accelerate(true).build();
        let mut req = http_request("/my_bucket/k");
        let err = table()
            .rewrite(&config.request_in("us-west-2", "my_bucket"), &mut req)
            .unwrap_err();
        assert!(matches!(err, ResolveError::RuleRejected(_)));
        assert_eq!(req.uri().to_string(), "/my_bucket/k");
    }
}
