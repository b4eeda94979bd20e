//! Response relay.
//!
//! # Responsibilities
//! - Turn the backend response into the client response
//!
//! # Design Decisions
//! - Body is read in full; either all of it is relayed or the request fails
//! - Status and end-to-end headers are copied without filtering
//! - `transfer-encoding` framed the upstream leg only; the buffered body is
//!   re-framed by the server

use axum::{
    body::Body,
    http::{header, HeaderName},
    response::Response,
};

/// Upstream response headers that describe the upstream connection's framing.
pub const UPSTREAM_FRAMING_HEADERS: [HeaderName; 1] = [header::TRANSFER_ENCODING];

/// Rebuild the upstream response for the client, byte for byte.
pub async fn relay_response(upstream: reqwest::Response) -> Result<Response, reqwest::Error> {
    let status = upstream.status();
    let mut headers = upstream.headers().clone();
    for name in &UPSTREAM_FRAMING_HEADERS {
        headers.remove(name);
    }
    let body = upstream.bytes().await?;

    let mut response = Response::new(Body::from(body));
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    Ok(response)
}
