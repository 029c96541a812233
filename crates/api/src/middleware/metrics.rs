//! Prometheus recorder, HTTP timing middleware, and the domain counters.

use std::sync::OnceLock;
use std::time::Instant;

use axum::{
    body::Body,
    extract::MatchedPath,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use metrics::{counter, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

static PROMETHEUS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the global recorder. Call once at startup, before any metric
/// is touched.
pub fn init_metrics() {
    let handle = PrometheusBuilder::new()
        .set_buckets(&[0.001, 0.005, 0.01, 0.05, 0.1, 0.2, 0.5, 1.0, 2.0, 5.0])
        .expect("Failed to set histogram buckets")
        .install_recorder()
        .expect("Failed to install Prometheus recorder");

    if PROMETHEUS_HANDLE.set(handle).is_err() {
        panic!("Prometheus recorder installed twice");
    }
}

/// Times every request against its matched route template (so
/// `/od-requests/:request_id/decision` is one series, not one per ID).
pub async fn metrics_middleware(req: Request<Body>, next: Next) -> Response {
    let started = Instant::now();
    let method = req.method().as_str().to_owned();
    let route = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_owned())
        .unwrap_or_else(|| req.uri().path().to_owned());

    let response = next.run(req).await;

    counter!(
        "odcse_http_requests_total",
        "method" => method.clone(),
        "path" => route.clone(),
        "status" => response.status().as_u16().to_string()
    )
    .increment(1);
    histogram!(
        "odcse_http_request_duration_seconds",
        "method" => method,
        "path" => route
    )
    .record(started.elapsed().as_secs_f64());

    response
}

pub fn record_od_request_submitted() {
    counter!("odcse_od_requests_submitted_total").increment(1);
}

pub fn record_od_request_decided(outcome: &str) {
    counter!("odcse_od_requests_decided_total", "outcome" => outcome.to_string()).increment(1);
}

pub fn record_invitation_sent() {
    counter!("odcse_invitations_sent_total").increment(1);
}

pub fn record_invitation_responded(outcome: &str) {
    counter!("odcse_invitations_responded_total", "outcome" => outcome.to_string()).increment(1);
}

pub fn record_otp_issued() {
    counter!("odcse_otp_challenges_issued_total").increment(1);
}

/// GET /metrics, in Prometheus exposition format.
pub async fn metrics_handler() -> impl IntoResponse {
    match PROMETHEUS_HANDLE.get() {
        Some(handle) => (
            axum::http::StatusCode::OK,
            [(axum::http::header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            handle.render(),
        ),
        None => (
            axum::http::StatusCode::INTERNAL_SERVER_ERROR,
            [(axum::http::header::CONTENT_TYPE, "text/plain")],
            "Metrics not initialized".to_string(),
        ),
    }
}
