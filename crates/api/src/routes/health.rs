//! Health and probe endpoints.

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::app::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub database: DatabaseHealth,
}

#[derive(Debug, Serialize)]
pub struct DatabaseHealth {
    pub connected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct ProbeResponse {
    pub status: &'static str,
}

async fn ping_database(state: &AppState) -> Option<u64> {
    let start = std::time::Instant::now();
    sqlx::query("SELECT 1")
        .execute(&state.pool)
        .await
        .ok()
        .map(|_| start.elapsed().as_millis() as u64)
}

/// GET /api/health
///
/// Reports database connectivity with round-trip latency. 503 when the
/// database is unreachable, with the body still describing the failure.
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let latency_ms = ping_database(&state).await;
    let connected = latency_ms.is_some();

    let code = if connected {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        code,
        Json(HealthResponse {
            status: if connected { "healthy" } else { "unhealthy" },
            version: env!("CARGO_PKG_VERSION"),
            database: DatabaseHealth {
                connected,
                latency_ms,
            },
        }),
    )
}

/// GET /api/health/live: the process is up.
pub async fn live() -> Json<ProbeResponse> {
    Json(ProbeResponse { status: "alive" })
}

/// GET /api/health/ready: the service can take traffic.
pub async fn ready(State(state): State<AppState>) -> Result<Json<ProbeResponse>, StatusCode> {
    match ping_database(&state).await {
        Some(_) => Ok(Json(ProbeResponse { status: "ready" })),
        None => Err(StatusCode::SERVICE_UNAVAILABLE),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_body_omits_latency_when_down() {
        let body = serde_json::to_value(HealthResponse {
            status: "unhealthy",
            version: "0.0.0",
            database: DatabaseHealth {
                connected: false,
                latency_ms: None,
            },
        })
        .unwrap();

        assert_eq!(body["status"], "unhealthy");
        assert_eq!(body["database"]["connected"], false);
        assert!(body["database"].get("latency_ms").is_none());
    }

    #[test]
    fn test_health_body_reports_latency_when_up() {
        let body = serde_json::to_value(HealthResponse {
            status: "healthy",
            version: "0.0.0",
            database: DatabaseHealth {
                connected: true,
                latency_ms: Some(3),
            },
        })
        .unwrap();

        assert_eq!(body["database"]["latency_ms"], 3);
    }
}
