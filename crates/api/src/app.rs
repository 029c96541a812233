use anyhow::Context;
use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};
use shared::jwt::JwtConfig;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::middleware::{
    metrics_handler, metrics_middleware, rate_limit_middleware, require_auth,
    security_headers_middleware, trace_id, RateLimiterState,
};
use crate::routes::{accounts, auth, events, health, invitations, od_requests};
use crate::services::{AttendanceClient, EmailService};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
    pub jwt: Arc<JwtConfig>,
    pub email: EmailService,
    pub attendance: AttendanceClient,
    pub rate_limiter: Option<Arc<RateLimiterState>>,
}

pub fn create_app(config: Config, pool: PgPool) -> anyhow::Result<Router> {
    let config = Arc::new(config);

    let jwt = Arc::new(
        JwtConfig::with_leeway(
            &config.jwt.private_key,
            &config.jwt.public_key,
            config.jwt.token_expiry_secs,
            config.jwt.leeway_secs,
        )
        .context("Failed to load JWT signing keys")?,
    );

    // Rate limiter guards the OTP request route; 0 disables it.
    let rate_limiter = if config.security.otp_rate_limit_per_minute > 0 {
        Some(Arc::new(RateLimiterState::new(
            config.security.otp_rate_limit_per_minute,
        )))
    } else {
        None
    };

    let state = AppState {
        pool,
        config: config.clone(),
        jwt,
        email: EmailService::new(config.email.clone()),
        attendance: AttendanceClient::new(&config.attendance),
        rate_limiter,
    };

    // Build CORS layer based on configuration
    let cors = if config.security.cors_origins.is_empty() {
        // Default: allow any origin (for development)
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        use tower_http::cors::AllowOrigin;
        let origins: Vec<_> = config
            .security
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    };

    // Auth routes are public; only forgot-password sits behind the OTP
    // rate limiter.
    let auth_routes = Router::new()
        .route("/api/v1/auth/login", post(auth::login))
        .route("/api/v1/auth/verify-otp", post(auth::verify_otp))
        .route("/api/v1/auth/reset-password", post(auth::reset_password))
        .merge(
            Router::new()
                .route("/api/v1/auth/forgot-password", post(auth::forgot_password))
                .route_layer(middleware::from_fn_with_state(
                    state.clone(),
                    rate_limit_middleware,
                )),
        );

    // Everything else requires a valid bearer token; role gates live in the
    // handlers.
    let protected_routes = Router::new()
        // Account directory
        .route("/api/v1/users/me", get(accounts::me))
        .route("/api/v1/users", get(accounts::by_email))
        .route("/api/v1/students/search", get(accounts::search_students))
        .route("/api/v1/staff", get(accounts::list_staff))
        // Events
        .route(
            "/api/v1/events",
            get(events::list_events).post(events::create_event),
        )
        // Invitations
        .route("/api/v1/invitations", post(invitations::send_invitation))
        .route(
            "/api/v1/invitations/pending",
            get(invitations::pending_invitations),
        )
        .route(
            "/api/v1/invitations/status",
            get(invitations::invitation_status),
        )
        .route(
            "/api/v1/invitations/:id/respond",
            post(invitations::respond_to_invitation),
        )
        .route(
            "/api/v1/invitations/:id",
            delete(invitations::cancel_invitation),
        )
        // OD requests
        .route(
            "/api/v1/od-requests",
            get(od_requests::list_my_requests).post(od_requests::submit_od_request),
        )
        .route(
            "/api/v1/od-requests/assigned",
            get(od_requests::list_assigned_requests),
        )
        .route(
            "/api/v1/od-requests/:request_id/decision",
            post(od_requests::decide_od_request),
        )
        .route(
            "/api/v1/od-requests/:request_id/complete",
            post(od_requests::complete_od_request),
        )
        .route(
            "/api/v1/od-requests/:request_id/certificate",
            get(od_requests::certificate),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    // Public routes (no authentication required)
    let public_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/health/ready", get(health::ready))
        .route("/api/health/live", get(health::live))
        .route("/metrics", get(metrics_handler));

    let router = Router::new()
        .merge(public_routes)
        .merge(auth_routes)
        .merge(protected_routes)
        // Global middleware (order matters: bottom layers run first)
        .layer(middleware::from_fn(security_headers_middleware))
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id))
        .layer(cors)
        .with_state(state);

    Ok(router)
}
