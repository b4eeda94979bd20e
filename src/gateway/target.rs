//! Upstream URL construction.
//!
//! # Rules
//! - Wildcard segments come from the raw (still percent-encoded) path
//! - Empty segments are dropped, the rest joined with `/`
//! - Exactly one trailing `/`
//! - Query string appended verbatim when non-empty

use axum::http::Uri;

/// Prefix the gateway route is mounted under, on both legs.
pub const API_PREFIX: &str = "/api";

/// Join path segments into the upstream path below `/api/`.
///
/// The result always ends with exactly one `/`.
pub fn upstream_path<'a, I>(segments: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let mut joined = segments
        .into_iter()
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("/");

    while joined.ends_with("//") {
        joined.pop();
    }
    if !joined.ends_with('/') {
        joined.push('/');
    }
    joined
}

/// Wildcard segments of an inbound path mounted under [`API_PREFIX`].
pub fn wildcard_segments(path: &str) -> impl Iterator<Item = &str> {
    path.strip_prefix(API_PREFIX)
        .unwrap_or(path)
        .split('/')
}

/// Full upstream URL for an inbound request URI.
pub fn upstream_url(base: &str, uri: &Uri) -> String {
    let path = upstream_path(wildcard_segments(uri.path()));
    let mut url = format!(
        "{}{}/{}",
        base.trim_end_matches('/'),
        API_PREFIX,
        path.trim_start_matches('/')
    );

    if let Some(query) = uri.query().filter(|q| !q.is_empty()) {
        url.push('?');
        url.push_str(query);
    }
    url
}
