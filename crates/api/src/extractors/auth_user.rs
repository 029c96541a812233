//! Authenticated account extractor.
//!
//! The auth middleware validates the bearer token and stores an `AuthUser`
//! in request extensions; handlers pull it out with this extractor.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use domain::models::Role;
use uuid::Uuid;

use crate::error::ApiError;

/// Identity carried by a validated session token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub account_id: Uuid,
    pub email: String,
    pub role: Role,
    pub name: String,
    /// Token identifier, for log correlation.
    pub jti: String,
}

impl AuthUser {
    /// Students only; staff and admins are turned away.
    pub fn require_student(&self) -> Result<(), ApiError> {
        match self.role {
            Role::Student => Ok(()),
            _ => Err(ApiError::Forbidden(
                "This operation is restricted to students".into(),
            )),
        }
    }

    /// Staff only.
    pub fn require_staff(&self) -> Result<(), ApiError> {
        match self.role {
            Role::Staff => Ok(()),
            _ => Err(ApiError::Forbidden(
                "This operation is restricted to staff".into(),
            )),
        }
    }

    /// Staff or admin.
    pub fn require_staff_or_admin(&self) -> Result<(), ApiError> {
        match self.role {
            Role::Staff | Role::Admin => Ok(()),
            _ => Err(ApiError::Forbidden(
                "This operation is restricted to staff".into(),
            )),
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or_else(|| ApiError::Unauthorized("Authentication required".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn auth(role: Role) -> AuthUser {
        AuthUser {
            account_id: Uuid::new_v4(),
            email: "someone@college.edu".into(),
            role,
            name: "Someone".into(),
            jti: "jti-1".into(),
        }
    }

    #[test]
    fn test_student_gate() {
        assert!(auth(Role::Student).require_student().is_ok());
        assert!(auth(Role::Staff).require_student().is_err());
        assert!(auth(Role::Admin).require_student().is_err());
    }

    #[test]
    fn test_staff_gate() {
        assert!(auth(Role::Staff).require_staff().is_ok());
        assert!(auth(Role::Student).require_staff().is_err());
    }

    #[test]
    fn test_staff_or_admin_gate() {
        assert!(auth(Role::Staff).require_staff_or_admin().is_ok());
        assert!(auth(Role::Admin).require_staff_or_admin().is_ok());
        assert!(auth(Role::Student).require_staff_or_admin().is_err());
    }
}
