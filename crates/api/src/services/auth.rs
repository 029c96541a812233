//! Authentication service: login and the OTP password-reset flow.
//!
//! Reset codes are stored hashed; the hash doubles as the single-use
//! `otp_token` the client echoes back during the final reset step.

use chrono::{Duration, Utc};
use domain::models::auth::generate_otp_code;
use domain::models::Role;
use persistence::repositories::{AccountRepository, OtpRepository};
use shared::crypto::{constant_time_eq, sha256_hex};
use shared::jwt::{JwtConfig, JwtError};
use shared::password::{hash_password, verify_password, PasswordError};
use sqlx::PgPool;
use std::sync::Arc;
use thiserror::Error;

use crate::error::ApiError;
use crate::middleware::metrics::record_otp_issued;
use crate::services::email::EmailService;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Password reset is not available for this account")]
    ResetNotAllowed,

    #[error("No reset code was requested for this email")]
    OtpNotFound,

    #[error("The reset code is invalid")]
    OtpInvalid,

    #[error("The reset code has expired")]
    OtpExpired,

    #[error("Token error: {0}")]
    Token(#[from] JwtError),

    #[error("Password error: {0}")]
    Password(#[from] PasswordError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => {
                ApiError::Unauthorized("Invalid email or password".into())
            }
            AuthError::ResetNotAllowed => ApiError::Forbidden(err.to_string()),
            AuthError::OtpNotFound => ApiError::NotFound(err.to_string()),
            AuthError::OtpInvalid | AuthError::OtpExpired => ApiError::Validation(err.to_string()),
            AuthError::Token(e) => ApiError::Internal(format!("Token error: {}", e)),
            AuthError::Password(e) => ApiError::Internal(format!("Password error: {}", e)),
            AuthError::Database(e) => e.into(),
        }
    }
}

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct LoginResult {
    pub token: String,
    pub role: Role,
    pub name: String,
}

/// Authentication service.
#[derive(Clone)]
pub struct AuthService {
    accounts: AccountRepository,
    otps: OtpRepository,
    jwt: Arc<JwtConfig>,
    email: EmailService,
    otp_ttl_secs: u64,
}

impl AuthService {
    /// Creates a new AuthService backed by the given pool.
    pub fn new(
        pool: PgPool,
        jwt: Arc<JwtConfig>,
        email: EmailService,
        otp_ttl_secs: u64,
    ) -> Self {
        Self {
            accounts: AccountRepository::new(pool.clone()),
            otps: OtpRepository::new(pool),
            jwt,
            email,
            otp_ttl_secs,
        }
    }

    /// Login with email and password.
    ///
    /// Unknown email and wrong password both collapse into
    /// `InvalidCredentials` so the response cannot be used for enumeration.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResult, AuthError> {
        let account = self
            .accounts
            .find_by_email(email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !verify_password(password, &account.password_hash)? {
            return Err(AuthError::InvalidCredentials);
        }

        let role: Role = account.role.into();
        let (token, jti) = self
            .jwt
            .generate_token(account.id, &account.email, role.as_str(), &account.name)?;

        tracing::info!(account_id = %account.id, jti = %jti, "Login successful");

        Ok(LoginResult {
            token,
            role,
            name: account.name,
        })
    }

    /// Start the password-reset flow by issuing a one-time code.
    ///
    /// Returns whether a resettable account exists for the email. Admin
    /// accounts are not resettable through this flow and report `false`,
    /// indistinguishable from an unknown address.
    pub async fn forgot_password(&self, email: &str) -> Result<bool, AuthError> {
        let account = match self.accounts.find_resettable_by_email(email).await? {
            Some(account) => account,
            None => {
                tracing::debug!("Password reset requested for non-resettable email");
                return Ok(false);
            }
        };

        let code = generate_otp_code();
        let code_hash = sha256_hex(&code);
        let expires_at = Utc::now() + Duration::seconds(self.otp_ttl_secs as i64);

        self.otps
            .upsert(&account.email, &code_hash, expires_at)
            .await?;

        record_otp_issued();

        // Mail delivery must not delay the response.
        let email_service = self.email.clone();
        let to_email = account.email.clone();
        let to_name = account.name.clone();
        let ttl = self.otp_ttl_secs;
        tokio::spawn(async move {
            if let Err(e) = email_service
                .send_otp_email(&to_email, &to_name, &code, ttl)
                .await
            {
                tracing::error!(error = %e, "Failed to send OTP email");
            }
        });

        tracing::info!(account_id = %account.id, "OTP challenge issued");

        Ok(true)
    }

    /// Verify a submitted code against the stored challenge.
    ///
    /// On success returns the stored code hash, which the client echoes back
    /// as `otp_token` in the reset step.
    pub async fn verify_otp(&self, email: &str, otp: &str) -> Result<String, AuthError> {
        let challenge = self
            .otps
            .find_by_email(email)
            .await?
            .ok_or(AuthError::OtpNotFound)?;

        if challenge.is_expired(Utc::now()) {
            self.otps.delete(email).await?;
            return Err(AuthError::OtpExpired);
        }

        if !constant_time_eq(&sha256_hex(otp), &challenge.code_hash) {
            return Err(AuthError::OtpInvalid);
        }

        Ok(challenge.code_hash)
    }

    /// Complete the reset: check the echoed token, store the new hash,
    /// and consume the challenge.
    pub async fn reset_password(
        &self,
        email: &str,
        new_password: &str,
        otp_token: &str,
    ) -> Result<(), AuthError> {
        let challenge = self
            .otps
            .find_by_email(email)
            .await?
            .ok_or(AuthError::OtpNotFound)?;

        if challenge.is_expired(Utc::now()) {
            self.otps.delete(email).await?;
            return Err(AuthError::OtpExpired);
        }

        if !constant_time_eq(otp_token, &challenge.code_hash) {
            return Err(AuthError::OtpInvalid);
        }

        let account = self
            .accounts
            .find_resettable_by_email(email)
            .await?
            .ok_or(AuthError::ResetNotAllowed)?;

        let password_hash = hash_password(new_password)?;
        self.accounts
            .update_password_hash(&account.email, &password_hash)
            .await?;

        // Single use: the challenge is gone once the reset lands.
        self.otps.delete(email).await?;

        tracing::info!(account_id = %account.id, "Password reset completed");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;

    #[test]
    fn test_auth_error_mapping() {
        let cases: Vec<(AuthError, StatusCode)> = vec![
            (AuthError::InvalidCredentials, StatusCode::UNAUTHORIZED),
            (AuthError::ResetNotAllowed, StatusCode::FORBIDDEN),
            (AuthError::OtpNotFound, StatusCode::NOT_FOUND),
            (AuthError::OtpInvalid, StatusCode::BAD_REQUEST),
            (AuthError::OtpExpired, StatusCode::BAD_REQUEST),
        ];

        for (error, expected) in cases {
            let api_error: ApiError = error.into();
            assert_eq!(api_error.into_response().status(), expected);
        }
    }

    #[test]
    fn test_invalid_credentials_message_is_generic() {
        let api_error: ApiError = AuthError::InvalidCredentials.into();
        match api_error {
            ApiError::Unauthorized(msg) => assert_eq!(msg, "Invalid email or password"),
            _ => panic!("Expected Unauthorized"),
        }
    }

    #[test]
    fn test_code_hash_round_trip() {
        let code = generate_otp_code();
        let hash = sha256_hex(&code);
        assert!(constant_time_eq(&sha256_hex(&code), &hash));
        assert!(!constant_time_eq(&sha256_hex("000000"), &hash) || code == "000000");
    }
}
