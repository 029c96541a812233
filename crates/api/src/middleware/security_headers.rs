//! Response hardening headers.

use axum::{
    body::Body,
    http::{header, HeaderValue, Request},
    middleware::Next,
    response::Response,
};

const BASELINE_HEADERS: [(&str, &str); 3] = [
    ("x-content-type-options", "nosniff"),
    ("x-frame-options", "DENY"),
    ("x-xss-protection", "1; mode=block"),
];

/// Stamps hardening headers on every response.
///
/// `Strict-Transport-Security` is opt-in via `ODCSE__SECURITY__HSTS_ENABLED`
/// since it only makes sense behind real TLS termination.
pub async fn security_headers_middleware(req: Request<Body>, next: Next) -> Response {
    let mut response = next.run(req).await;
    let headers = response.headers_mut();

    for (name, value) in BASELINE_HEADERS {
        headers.insert(
            header::HeaderName::from_static(name),
            HeaderValue::from_static(value),
        );
    }

    if hsts_enabled() {
        headers.insert(
            header::STRICT_TRANSPORT_SECURITY,
            HeaderValue::from_static("max-age=31536000; includeSubDomains"),
        );
    }

    response
}

fn hsts_enabled() -> bool {
    std::env::var("ODCSE__SECURITY__HSTS_ENABLED")
        .map(|v| v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_baseline_values_are_valid_header_values() {
        for (_, value) in BASELINE_HEADERS {
            assert!(HeaderValue::from_static(value).to_str().is_ok());
        }
    }

    #[test]
    fn test_hsts_defaults_off() {
        std::env::remove_var("ODCSE__SECURITY__HSTS_ENABLED");
        assert!(!hsts_enabled());
    }
}
