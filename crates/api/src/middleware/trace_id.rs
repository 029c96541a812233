//! Per-request correlation IDs.

use axum::{
    body::Body,
    http::{header::HeaderName, HeaderValue, Request},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Correlation ID carried in request extensions for handlers that log.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// Accept a caller-supplied ID only if it is short, printable ASCII;
/// anything else gets a fresh UUID.
fn correlation_id(req: &Request<Body>) -> String {
    req.headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|s| !s.is_empty() && s.len() <= 64 && s.chars().all(|c| c.is_ascii_graphic()))
        .map(str::to_owned)
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

/// Assigns every request a correlation ID, logs the outcome line, and
/// echoes the ID back in the response headers.
pub async fn trace_id(mut req: Request<Body>, next: Next) -> Response {
    let id = correlation_id(&req);
    req.extensions_mut().insert(RequestId(id.clone()));

    let span = tracing::info_span!(
        "request",
        request_id = %id,
        method = %req.method(),
        path = %req.uri().path(),
    );
    let _guard = span.enter();

    let started = std::time::Instant::now();
    let mut response = next.run(req).await;

    tracing::info!(
        request_id = %id,
        status = response.status().as_u16(),
        duration_ms = started.elapsed().as_millis() as u64,
        "Request completed"
    );

    if let Ok(value) = HeaderValue::from_str(&id) {
        response
            .headers_mut()
            .insert(HeaderName::from_static(REQUEST_ID_HEADER), value);
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request_with_header(value: &str) -> Request<Body> {
        Request::builder()
            .header(REQUEST_ID_HEADER, value)
            .body(Body::empty())
            .unwrap()
    }

    #[test]
    fn test_caller_id_is_kept() {
        let req = request_with_header("req-abc-123");
        assert_eq!(correlation_id(&req), "req-abc-123");
    }

    #[test]
    fn test_missing_id_gets_uuid() {
        let req = Request::builder().body(Body::empty()).unwrap();
        let id = correlation_id(&req);
        assert!(Uuid::parse_str(&id).is_ok());
    }

    #[test]
    fn test_oversized_id_is_replaced() {
        let req = request_with_header(&"x".repeat(65));
        assert!(Uuid::parse_str(&correlation_id(&req)).is_ok());
    }

    #[test]
    fn test_id_with_spaces_is_replaced() {
        let req = request_with_header("not a valid id");
        assert!(Uuid::parse_str(&correlation_id(&req)).is_ok());
    }
}
