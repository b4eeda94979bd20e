//! Request ids.
//!
//! # Responsibilities
//! - Attach a request id to every inbound request for log correlation
//! - Reuse the client's `x-request-id` when it sent one, else mint a UUID v4
//!
//! # Design Decisions
//! - The id lives in request extensions, never in the headers: the upstream
//!   request carries `x-request-id` only if the client sent it
//! - Runs as the outermost layer so every span can see it
//! - Responses are left alone so upstream headers relay unchanged

use axum::{
    extract::Request,
    http::HeaderValue,
    middleware::Next,
    response::Response,
};
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

/// Header a client may use to choose its own request id.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Generates UUID v4 request ids.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidRequestId;

impl MakeRequestId for UuidRequestId {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// Middleware storing a [`RequestId`] extension on the request.
///
/// Install with `axum::middleware::from_fn(assign_request_id)`.
pub async fn assign_request_id(mut request: Request, next: Next) -> Response {
    if request.extensions().get::<RequestId>().is_none() {
        let id = request
            .headers()
            .get(X_REQUEST_ID)
            .cloned()
            .map(RequestId::new)
            .or_else(|| UuidRequestId.make_request_id(&request));
        if let Some(id) = id {
            request.extensions_mut().insert(id);
        }
    }
    next.run(request).await
}

/// Read the request id of an inbound request.
pub trait RequestIdExt {
    fn request_id(&self) -> Option<&str>;
}

impl<B> RequestIdExt for axum::http::Request<B> {
    fn request_id(&self) -> Option<&str> {
        self.extensions()
            .get::<RequestId>()
            .and_then(|id| id.header_value().to_str().ok())
    }
}
