//! The `/api/{*path}` proxy handler.
//!
//! # Pipeline
//! ```text
//! inbound request
//!     → target.rs   upstream URL (path join + verbatim query)
//!     → headers.rs  drop host / content-length
//!     → body.rs     classify content type once, read body
//!     → upstream client call (same method)
//!     → http::response::relay_response (status, headers, bytes unchanged)
//!
//! any failure of the upstream call → 500 {"error":"Failed to connect to backend"}
//! ```

use std::time::Instant;

use axum::{
    body::Body,
    extract::State,
    http::{header, Request},
    response::{IntoResponse, Response},
};

use crate::error::GatewayError;
use crate::gateway::body::{BodyEncoding, OutboundBody};
use crate::gateway::headers::forward_headers;
use crate::gateway::target::upstream_url;
use crate::gateway::upstream::Upstream;
use crate::http::request::RequestIdExt;
use crate::http::response::relay_response;
use crate::http::server::AppState;
use crate::observability::metrics;

/// Forward one request to the backend and relay its answer.
pub async fn proxy_handler(
    State(state): State<AppState>,
    request: Request<Body>,
) -> Response {
    let start_time = Instant::now();
    let request_id = request.request_id().unwrap_or("unknown").to_string();
    let method = request.method().clone();

    let upstream = state.upstream.load_full();
    let url = upstream_url(upstream.base_url(), request.uri());

    let response = match forward(&upstream, request, &url, &request_id).await {
        Ok(response) => response,
        Err(e) => {
            match &e {
                GatewayError::Upstream(source) => {
                    tracing::error!(
                        request_id = %request_id,
                        method = %method,
                        url = %url,
                        error = %source,
                        "Proxy error: upstream request failed"
                    );
                    metrics::record_upstream_failure(method.as_str());
                }
                other => {
                    tracing::warn!(
                        request_id = %request_id,
                        method = %method,
                        error = ?other,
                        "Rejected inbound request body"
                    );
                }
            }
            e.into_response()
        }
    };

    metrics::record_request(method.as_str(), response.status().as_u16(), start_time);
    response
}

async fn forward(
    upstream: &Upstream,
    request: Request<Body>,
    url: &str,
    request_id: &str,
) -> Result<Response, GatewayError> {
    let method = request.method().clone();
    let headers = forward_headers(request.headers());
    let encoding = BodyEncoding::from_content_type(request.headers().get(header::CONTENT_TYPE));

    let body = OutboundBody::read(request, encoding).await?;

    tracing::debug!(
        request_id = %request_id,
        method = %method,
        url = %url,
        encoding = %encoding,
        "Forwarding request"
    );

    let builder = upstream.client().request(method, url);
    let upstream_response = body.attach(builder, headers)?.send().await?;

    tracing::debug!(
        request_id = %request_id,
        status = %upstream_response.status(),
        "Upstream responded"
    );

    Ok(relay_response(upstream_response).await?)
}
