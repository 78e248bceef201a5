//! Per-request spans.
//!
//! # Responsibilities
//! - Create one span per inbound webhook with a correlation ID
//! - Carry method and path so every log line of the request is attributable
//!
//! # Design Decisions
//! - The request ID lives only in the span; it is never added to the
//!   forwarded request, which carries exactly the inbound `X-` headers

use axum::body::Body;
use axum::http::Request;
use tracing::Span;
use uuid::Uuid;

/// Span maker for `tower_http::trace::TraceLayer`.
pub fn make_request_span(request: &Request<Body>) -> Span {
    let request_id = Uuid::new_v4();
    tracing::info_span!(
        "webhook",
        request_id = %request_id,
        method = %request.method(),
        path = %request.uri().path(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_make_request_span() {
        let request = Request::builder()
            .method("POST")
            .uri("/hooks/gogs")
            .body(Body::empty())
            .unwrap();
        // No subscriber is installed, so the span is disabled but must still build.
        let _span = make_request_span(&request);
    }
}
