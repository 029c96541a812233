//! Authentication flow DTOs and OTP helpers.

use rand::Rng;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Generates a 6-digit one-time code, zero-padded.
pub fn generate_otp_code() -> String {
    let code: u32 = rand::thread_rng().gen_range(0..1_000_000);
    format!("{:06}", code)
}

/// Request body for login.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Response body for a successful login.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub role: super::Role,
    pub name: String,
}

/// Request body for forgot-password.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ForgotPasswordRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
}

/// Response body for forgot-password.
///
/// An unregistered email is reported through `exists: false` rather than an
/// error status, so the client can render a dedicated message without
/// treating it as a transport failure.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForgotPasswordResponse {
    pub exists: bool,
    pub message: String,
}

/// Request body for OTP verification.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct VerifyOtpRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(equal = 6, message = "OTP must be 6 digits"))]
    pub otp: String,
}

/// Response body for a successful OTP verification.
///
/// `otp_token` is the stored code hash, echoed back unmodified during reset
/// as a single-use capability proof.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyOtpResponse {
    pub verified: bool,
    pub otp_token: String,
}

/// Request body for password reset.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    #[validate(length(min = 1, message = "OTP token is required"))]
    pub otp_token: String,
}

/// Response body for password reset.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordResponse {
    pub success: bool,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_otp_code_format() {
        for _ in 0..100 {
            let code = generate_otp_code();
            assert_eq!(code.len(), 6);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn test_login_request_validation() {
        let ok = LoginRequest {
            email: "asha@college.edu".into(),
            password: "secret".into(),
        };
        assert!(ok.validate().is_ok());

        let bad = LoginRequest {
            email: "not-an-email".into(),
            password: "secret".into(),
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_verify_otp_request_length() {
        let bad = VerifyOtpRequest {
            email: "asha@college.edu".into(),
            otp: "12345".into(),
        };
        assert!(bad.validate().is_err());

        let ok = VerifyOtpRequest {
            email: "asha@college.edu".into(),
            otp: "123456".into(),
        };
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn test_reset_password_min_length() {
        let bad = ResetPasswordRequest {
            email: "asha@college.edu".into(),
            password: "short".into(),
            otp_token: "deadbeef".into(),
        };
        assert!(bad.validate().is_err());
    }
}
