//! Request ID middleware for request tracing and correlation.
//!
//! Every request gets an ID that is recorded on the current span, tagged on
//! the Sentry scope, and echoed back in the `x-request-id` response header.

use axum::{extract::Request, http::HeaderValue, middleware::Next, response::Response};
use tracing::Span;
use uuid::Uuid;

/// The HTTP header name for request IDs.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Longest upstream request ID that is reused as is.
const MAX_REQUEST_ID_LEN: usize = 128;

/// Reuse an upstream ID only if it is short and plain.
fn accept_upstream(value: &str) -> Option<&str> {
    let plain = value
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.'));
    (!value.is_empty() && value.len() <= MAX_REQUEST_ID_LEN && plain).then_some(value)
}

/// Middleware that ensures every request has a request ID.
///
/// A plain `x-request-id` from a proxy is kept; anything else is replaced by
/// a fresh UUID v4.
pub async fn request_id_middleware(request: Request, next: Next) -> Response {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .and_then(accept_upstream)
        .map_or_else(|| Uuid::new_v4().to_string(), String::from);

    Span::current().record("request_id", &request_id);

    sentry::configure_scope(|scope| {
        scope.set_tag("request_id", &request_id);
    });

    let mut response = next.run(request).await;

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    response
}
