//! Request ID middleware for request tracing and correlation.
//!
//! Propagates an upstream `x-request-id` when it looks sane, otherwise mints
//! a UUID v4. The id is recorded in the current tracing span, tagged on the
//! Sentry scope, and echoed in the response headers.

use axum::{extract::Request, http::HeaderValue, middleware::Next, response::Response};
use tracing::Span;
use uuid::Uuid;

/// The HTTP header name for request IDs.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Longest upstream id we will propagate rather than replace.
const MAX_PROPAGATED_ID_LEN: usize = 64;

/// Middleware that ensures every request has a usable request ID.
pub async fn request_id_middleware(request: Request, next: Next) -> Response {
    let upstream = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .filter(|s| !s.is_empty() && s.len() <= MAX_PROPAGATED_ID_LEN);

    let request_id = upstream.map_or_else(|| Uuid::new_v4().to_string(), String::from);

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
