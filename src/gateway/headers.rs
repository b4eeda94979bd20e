//! Inbound → outbound header filtering.
//!
//! `host` and `content-length` belong to the inbound leg and are recomputed
//! by the outbound client. Everything else is forwarded as-is.

use axum::http::{header, HeaderMap, HeaderName};

/// Headers never copied onto the upstream request.
pub const STRIPPED_HEADERS: [HeaderName; 2] = [header::HOST, header::CONTENT_LENGTH];

/// Copy every forwardable header, keeping all values of repeated headers.
///
/// `HeaderName` is stored lowercase, so names come out normalized.
pub fn forward_headers(inbound: &HeaderMap) -> HeaderMap {
    let mut outbound = HeaderMap::with_capacity(inbound.len());
    for (name, value) in inbound {
        if STRIPPED_HEADERS.contains(name) {
            continue;
        }
        outbound.append(name.clone(), value.clone());
    }
    outbound
}
