//! Invitation routes: sending, responding, polling, cancelling.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{Duration, Utc};
use domain::models::invitation::{
    Invitation, InvitationStatus, InvitationStatusResponse, PendingInvitationsResponse,
    RespondToInvitationRequest, SendInvitationRequest, SendInvitationResponse,
};
use domain::services::workflow::{check_send_invitation, participant_from_invitation};
use persistence::repositories::{AccountRepository, InvitationRepository, NewInvitation};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::middleware::metrics::{record_invitation_responded, record_invitation_sent};

/// Send an invitation to a classmate to join an OD request draft.
///
/// POST /api/v1/invitations
pub async fn send_invitation(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(request): Json<SendInvitationRequest>,
) -> Result<(StatusCode, Json<SendInvitationResponse>), ApiError> {
    auth.require_student()?;
    request.validate()?;

    let accounts = AccountRepository::new(state.pool.clone());

    let requester = accounts
        .find_by_id(auth.account_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Account not found".into()))?;
    let requester_register_number = requester
        .register_number
        .clone()
        .ok_or_else(|| ApiError::Forbidden("Only students can send invitations".into()))?;

    let target = accounts
        .find_student_by_register_number(&request.register_number)
        .await?
        .ok_or_else(|| ApiError::NotFound("No student found for this register number".into()))?;

    let invitations = InvitationRepository::new(state.pool.clone());
    let existing: Vec<Invitation> = invitations
        .list_for_draft(&request.od_request_id)
        .await?
        .into_iter()
        .map(Invitation::from)
        .collect();

    check_send_invitation(
        &requester_register_number,
        &request.register_number,
        &[],
        &existing,
    )?;

    let expires_at = Utc::now() + Duration::seconds(state.config.workflow.invitation_ttl_secs);

    let created = invitations
        .create(NewInvitation {
            od_request_id: &request.od_request_id,
            register_number: target.register_number.as_deref().unwrap_or_default(),
            recipient_email: &target.email,
            target_name: &target.name,
            target_semester: target.semester.unwrap_or(1),
            target_section: target.section.as_deref(),
            event_name: &request.event_name,
            from_date: request.from_date,
            to_date: request.to_date,
            requester_register_number: &requester_register_number,
            requester_name: &requester.name,
            requester_email: &requester.email,
            expires_at,
        })
        .await?;

    record_invitation_sent();

    // Mail delivery must not delay the response.
    let email_service = state.email.clone();
    let to_email = target.email.clone();
    let to_name = target.name.clone();
    let requester_name = requester.name.clone();
    let event_name = request.event_name.clone();
    let (from_date, to_date) = (request.from_date, request.to_date);
    tokio::spawn(async move {
        if let Err(e) = email_service
            .send_invitation_email(
                &to_email,
                &to_name,
                &requester_name,
                &event_name,
                from_date,
                to_date,
            )
            .await
        {
            tracing::error!(error = %e, "Failed to send invitation email");
        }
    });

    tracing::info!(
        invitation_id = %created.id,
        od_request_id = %created.od_request_id,
        "Invitation sent"
    );

    Ok((
        StatusCode::CREATED,
        Json(SendInvitationResponse {
            invitation_id: created.id,
        }),
    ))
}

/// Accept or decline a pending invitation.
///
/// POST /api/v1/invitations/:id/respond
pub async fn respond_to_invitation(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(request): Json<RespondToInvitationRequest>,
) -> Result<Json<Invitation>, ApiError> {
    auth.require_student()?;

    let invitations = InvitationRepository::new(state.pool.clone());

    let invitation = invitations
        .find_active_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Invitation not found".into()))?;

    if !invitation.recipient_email.eq_ignore_ascii_case(&auth.email) {
        return Err(ApiError::Forbidden(
            "This invitation is addressed to another student".into(),
        ));
    }

    let status = request.decision.resulting_status();
    let updated = invitations
        .respond(id, status.into())
        .await?
        .ok_or_else(|| ApiError::InvalidState("Invitation has already been answered".into()))?;

    record_invitation_responded(&status.to_string());

    tracing::info!(invitation_id = %id, status = %status, "Invitation answered");

    Ok(Json(updated.into()))
}

/// Pending invitations addressed to the calling student.
///
/// GET /api/v1/invitations/pending
pub async fn pending_invitations(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<PendingInvitationsResponse>, ApiError> {
    auth.require_student()?;

    let rows = InvitationRepository::new(state.pool.clone())
        .list_pending_for_recipient(&auth.email)
        .await?;

    Ok(Json(PendingInvitationsResponse {
        success: true,
        invitations: rows.into_iter().map(Invitation::from).collect(),
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusQuery {
    pub od_request_id: String,
}

/// Requester-side poll of a draft's invitations, grouped by outcome.
///
/// GET /api/v1/invitations/status?odRequestId=
pub async fn invitation_status(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<StatusQuery>,
) -> Result<Json<InvitationStatusResponse>, ApiError> {
    auth.require_student()?;

    let all: Vec<Invitation> = InvitationRepository::new(state.pool.clone())
        .list_for_draft(&query.od_request_id)
        .await?
        .into_iter()
        .map(Invitation::from)
        .collect();

    // Only the draft's requester may poll its invitations.
    if let Some(first) = all.first() {
        if !first.requester_email.eq_ignore_ascii_case(&auth.email) {
            return Err(ApiError::Forbidden(
                "Only the requester can view this draft's invitations".into(),
            ));
        }
    }

    let mut accepted = Vec::new();
    let mut pending = Vec::new();
    let mut declined = Vec::new();
    for invitation in all {
        match invitation.status {
            InvitationStatus::Accepted => accepted.push(participant_from_invitation(&invitation)),
            InvitationStatus::Pending => pending.push(invitation),
            InvitationStatus::Declined => declined.push(invitation),
        }
    }

    Ok(Json(InvitationStatusResponse {
        accepted,
        pending,
        declined,
    }))
}

/// Cancel a still-pending invitation the caller sent.
///
/// DELETE /api/v1/invitations/:id
pub async fn cancel_invitation(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    auth.require_student()?;

    let invitations = InvitationRepository::new(state.pool.clone());

    let invitation = invitations
        .find_active_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Invitation not found".into()))?;

    if !invitation.requester_email.eq_ignore_ascii_case(&auth.email) {
        return Err(ApiError::Forbidden(
            "Only the requester can cancel an invitation".into(),
        ));
    }

    let deleted = invitations.delete_pending(id).await?;
    if deleted == 0 {
        return Err(ApiError::InvalidState(
            "Invitation has already been answered".into(),
        ));
    }

    tracing::info!(invitation_id = %id, "Invitation cancelled");

    Ok(StatusCode::NO_CONTENT)
}
