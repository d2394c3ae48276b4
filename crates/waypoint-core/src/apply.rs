//! Template application: rewrite a base URI using a matched rule's value.
//!
//! The applier is a pure function. It decomposes the base URI into
//! components, substitutes placeholders into the rule's URI template, and
//! reassembles a final URI that takes its scheme and authority from the
//! rendered template while keeping the base URI's path, query, and fragment
//! intact (the path optionally loses its leading bucket segment).

use http::Uri;
use regex::{Captures, Regex};

use crate::error::{ResolveError, ResolveResult};
use crate::rule::{Placeholder, RuleValue, UriTemplate};
use crate::table::ResolutionResult;
use crate::types::Request;

/// Apply a matched rule's value to a base URI.
///
/// The base URI may be absolute (`https://host/path?q`) or origin-form
/// (`/path?q`); the final scheme and authority always come from the rendered
/// template.
///
/// # Errors
///
/// - [`ResolveError::InvalidRegion`] if the rule's region constraint is not
///   satisfied by the request's region.
/// - [`ResolveError::InvalidUri`] if the base URI cannot be decomposed, the
///   path's first segment is not exactly the bucket when stripping is
///   required, or the rendered template is not an absolute URI.
/// - [`ResolveError::CaptureMismatch`] if the bucket does not match the
///   rule's capture pattern.
pub fn apply(
    base_uri: &str,
    request: &Request,
    value: &RuleValue,
) -> ResolveResult<ResolutionResult> {
    // http::Uri cannot carry a fragment; split it off and carry it around
    // the parse so it survives untouched.
    let (base, fragment) = split_fragment(base_uri);
    let parsed: Uri = base
        .parse()
        .map_err(|_| ResolveError::InvalidUri(base_uri.to_owned()))?;
    let (path, query) = match parsed.path_and_query() {
        Some(pq) => (pq.path().to_owned(), pq.query().map(ToOwned::to_owned)),
        None => (String::new(), None),
    };

    if let Some(constraint) = &value.region_match {
        check_region(constraint, request, &value.bucket_regex)?;
    }

    let path = if value.remove_bucket_from_path {
        strip_bucket(&path, &request.bucket)?
    } else {
        path
    };

    // The capture pattern must accept the bucket even when the template
    // references no capture group; a miss means the rule is malformed.
    if !value.bucket_regex.is_match(&request.bucket) {
        return Err(ResolveError::CaptureMismatch {
            bucket: request.bucket.clone(),
            pattern: value.bucket_regex.as_str().to_owned(),
        });
    }

    let rendered = render(&value.uri_template, request, &value.bucket_regex, false)?;
    let endpoint: Uri = rendered
        .parse()
        .map_err(|_| ResolveError::InvalidUri(rendered.clone()))?;
    let (scheme, authority) = match (endpoint.scheme_str(), endpoint.authority()) {
        (Some(scheme), Some(authority)) => (scheme.to_owned(), authority.to_string()),
        _ => return Err(ResolveError::InvalidUri(rendered)),
    };

    let mut uri = format!("{scheme}://{authority}{path}");
    if let Some(query) = &query {
        uri.push('?');
        uri.push_str(query);
    }
    if let Some(fragment) = fragment {
        uri.push('#');
        uri.push_str(fragment);
    }

    Ok(ResolutionResult {
        uri,
        credential_scope: value.credential_scope.clone(),
    })
}

/// Render a region-constraint template and match it against the request's
/// region.
fn check_region(
    constraint: &UriTemplate,
    request: &Request,
    bucket_regex: &Regex,
) -> ResolveResult<()> {
    let pattern = render(constraint, request, bucket_regex, true)?;
    // Substituted values are escaped and `RuleTable::from_rows` probe-compiles
    // the constraint, so a compile failure here means the value was built by
    // hand with a malformed pattern. That is a rule problem, not a region
    // mismatch.
    let regex = Regex::new(&pattern).map_err(|_| {
        ResolveError::InvalidUri(format!("region constraint {pattern:?} is not a valid pattern"))
    })?;
    if regex.is_match(&request.region) {
        Ok(())
    } else {
        Err(ResolveError::InvalidRegion {
            region: request.region.clone(),
            expected: pattern,
        })
    }
}

/// Strip the leading `/{bucket}` segment from a path.
///
/// The bucket must be the entire first segment; a bucket that is merely a
/// prefix of it (`/my-bucket-backup` for bucket `my-bucket`) does not count.
fn strip_bucket(path: &str, bucket: &str) -> ResolveResult<String> {
    let stripped = path
        .strip_prefix('/')
        .and_then(|p| p.strip_prefix(bucket))
        .filter(|rest| rest.is_empty() || rest.starts_with('/'))
        .ok_or_else(|| {
            ResolveError::InvalidUri(format!(
                "path {path:?} does not start with bucket {bucket:?}"
            ))
        })?;
    if stripped.is_empty() {
        Ok("/".to_owned())
    } else {
        Ok(stripped.to_owned())
    }
}

/// Substitute a template's placeholders in declared key order.
///
/// When `escape` is set the substituted values are regex-escaped, for
/// templates that render into patterns rather than URIs.
fn render(
    template: &UriTemplate,
    request: &Request,
    bucket_regex: &Regex,
    escape: bool,
) -> ResolveResult<String> {
    let captures = capture_groups(template, request, bucket_regex)?;
    let text = template.template();
    let mut rendered = String::with_capacity(text.len());
    let mut rest = text;
    // Single pass over the original text: a substituted value is emitted
    // verbatim and never re-scanned for markers of its own.
    while let Some(start) = rest.find('{') {
        let Some(end) = rest[start..].find('}') else {
            break;
        };
        rendered.push_str(&rest[..start]);
        let marker = &rest[start + 1..start + end];
        match template.keys().iter().find(|key| key.key() == marker) {
            Some(key) => {
                let value = match key {
                    Placeholder::Region => request.region.clone(),
                    Placeholder::Capture { group, .. } => captures
                        .as_ref()
                        .and_then(|caps| caps.get(*group))
                        .map(|m| m.as_str().to_owned())
                        .ok_or_else(|| ResolveError::CaptureMismatch {
                            bucket: request.bucket.clone(),
                            pattern: bucket_regex.as_str().to_owned(),
                        })?,
                };
                if escape {
                    rendered.push_str(&regex::escape(&value));
                } else {
                    rendered.push_str(&value);
                }
            }
            // Template validation binds every marker to a key, so this only
            // sees text that merely looks like one.
            None => rendered.push_str(&rest[start..=start + end]),
        }
        rest = &rest[start + end + 1..];
    }
    rendered.push_str(rest);
    Ok(rendered)
}

/// Run the bucket pattern if the template references any capture group.
fn capture_groups<'r>(
    template: &UriTemplate,
    request: &'r Request,
    bucket_regex: &'r Regex,
) -> ResolveResult<Option<Captures<'r>>> {
    if template.max_capture_group().is_none() {
        return Ok(None);
    }
    bucket_regex
        .captures(&request.bucket)
        .map(Some)
        .ok_or_else(|| ResolveError::CaptureMismatch {
            bucket: request.bucket.clone(),
            pattern: bucket_regex.as_str().to_owned(),
        })
}

/// Split a trailing `#fragment` off a URI reference.
fn split_fragment(uri: &str) -> (&str, Option<&str>) {
    match uri.split_once('#') {
        Some((base, fragment)) => (base, Some(fragment)),
        None => (uri, None),
    }
}
