//! Request identification.
//!
//! # Responsibilities
//! - Generate a unique request ID (UUID v4) when the client sent none
//! - Echo the ID on the response
//! - Attach the ID to the request tracing span
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing

use axum::body::Body;
use axum::http::{HeaderName, Request};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tracing::Span;

/// Header carrying the request ID.
pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Sets a UUID v4 `x-request-id` on requests that lack one.
pub fn set_request_id_layer() -> SetRequestIdLayer<MakeRequestUuid> {
    SetRequestIdLayer::new(X_REQUEST_ID, MakeRequestUuid)
}

/// Copies `x-request-id` from the request to the response.
pub fn propagate_request_id_layer() -> PropagateRequestIdLayer {
    PropagateRequestIdLayer::new(X_REQUEST_ID)
}

/// Request ID of `request`, or "unknown".
pub fn request_id<B>(request: &Request<B>) -> &str {
    request
        .headers()
        .get(&X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
}

/// Span for one HTTP request, tagged with its request ID.
pub fn make_request_span(request: &Request<Body>) -> Span {
    tracing::info_span!(
        "request",
        method = %request.method(),
        path = %request.uri().path(),
        request_id = %request_id(request),
    )
}
