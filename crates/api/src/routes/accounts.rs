//! Account directory routes: profile lookup, classmate search, staff list.

use axum::{
    extract::{Query, State},
    Json,
};
use domain::models::{Account, StaffSummary, StudentSummary};
use persistence::repositories::AccountRepository;
use serde::Deserialize;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::AuthUser;

/// Default and maximum result sizes for the classmate search.
const SEARCH_DEFAULT_LIMIT: i64 = 20;
const SEARCH_MAX_LIMIT: i64 = 50;

/// Get the calling account's profile.
///
/// GET /api/v1/users/me
pub async fn me(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Account>, ApiError> {
    let account = AccountRepository::new(state.pool.clone())
        .find_by_id(auth.account_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Account not found".into()))?;

    Ok(Json(account.into()))
}

#[derive(Debug, Deserialize)]
pub struct LookupQuery {
    pub email: String,
}

/// Look up an account's public profile by email.
///
/// GET /api/v1/users?email=
pub async fn by_email(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(query): Query<LookupQuery>,
) -> Result<Json<Account>, ApiError> {
    let account = AccountRepository::new(state.pool.clone())
        .find_by_email(&query.email)
        .await?
        .ok_or_else(|| ApiError::NotFound("Account not found".into()))?;

    Ok(Json(account.into()))
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub query: String,
    pub limit: Option<i64>,
}

/// Search students by name or register number fragment.
///
/// GET /api/v1/students/search?query=
pub async fn search_students(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(params): Query<SearchQuery>,
) -> Result<Json<Vec<StudentSummary>>, ApiError> {
    let query = params.query.trim();
    if query.is_empty() {
        return Err(ApiError::Validation("query: must not be empty".into()));
    }

    let limit = params
        .limit
        .unwrap_or(SEARCH_DEFAULT_LIMIT)
        .clamp(1, SEARCH_MAX_LIMIT);

    let rows = AccountRepository::new(state.pool.clone())
        .search_students(query, limit)
        .await?;

    let students = rows
        .into_iter()
        .map(|row| StudentSummary {
            register_number: row.register_number,
            name: row.name,
            email: row.email,
            semester: row.semester,
            section: row.section,
        })
        .collect();

    Ok(Json(students))
}

/// List all staff members for tutor selection.
///
/// GET /api/v1/staff
pub async fn list_staff(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> Result<Json<Vec<StaffSummary>>, ApiError> {
    let rows = AccountRepository::new(state.pool.clone()).list_staff().await?;

    let staff = rows
        .into_iter()
        .map(|row| StaffSummary {
            staff_id: row.staff_id,
            name: row.name,
            email: row.email,
            department: row.department,
            designation: row.designation,
        })
        .collect();

    Ok(Json(staff))
}
