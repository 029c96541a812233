//! Authentication routes: login and the OTP password-reset flow.

use axum::{extract::State, Json};
use domain::models::auth::{
    ForgotPasswordRequest, ForgotPasswordResponse, LoginRequest, LoginResponse,
    ResetPasswordRequest, ResetPasswordResponse, VerifyOtpRequest, VerifyOtpResponse,
};
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::services::auth::AuthService;

fn auth_service(state: &AppState) -> AuthService {
    AuthService::new(
        state.pool.clone(),
        state.jwt.clone(),
        state.email.clone(),
        state.config.workflow.otp_ttl_secs as u64,
    )
}

/// Login with email and password.
///
/// POST /api/v1/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    request.validate()?;

    let result = auth_service(&state)
        .login(&request.email, &request.password)
        .await?;

    Ok(Json(LoginResponse {
        token: result.token,
        role: result.role,
        name: result.name,
    }))
}

/// Start the password-reset flow by mailing a one-time code.
///
/// POST /api/v1/auth/forgot-password
///
/// An unknown (or non-resettable) email is a 200 with `exists: false`, not
/// an error. This route sits behind the OTP rate limiter.
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(request): Json<ForgotPasswordRequest>,
) -> Result<Json<ForgotPasswordResponse>, ApiError> {
    request.validate()?;

    let exists = auth_service(&state).forgot_password(&request.email).await?;

    let message = if exists {
        "A reset code has been sent to your email".to_string()
    } else {
        "No account found for this email".to_string()
    };

    Ok(Json(ForgotPasswordResponse { exists, message }))
}

/// Verify a submitted one-time code.
///
/// POST /api/v1/auth/verify-otp
pub async fn verify_otp(
    State(state): State<AppState>,
    Json(request): Json<VerifyOtpRequest>,
) -> Result<Json<VerifyOtpResponse>, ApiError> {
    request.validate()?;

    let otp_token = auth_service(&state)
        .verify_otp(&request.email, &request.otp)
        .await?;

    Ok(Json(VerifyOtpResponse {
        verified: true,
        otp_token,
    }))
}

/// Complete the password reset.
///
/// POST /api/v1/auth/reset-password
pub async fn reset_password(
    State(state): State<AppState>,
    Json(request): Json<ResetPasswordRequest>,
) -> Result<Json<ResetPasswordResponse>, ApiError> {
    request.validate()?;

    auth_service(&state)
        .reset_password(&request.email, &request.password, &request.otp_token)
        .await?;

    Ok(Json(ResetPasswordResponse {
        success: true,
        message: "Password has been reset".to_string(),
    }))
}
