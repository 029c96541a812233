//! OD request routes: submission, listings, tutor decision, completion and
//! certificate data.

use std::collections::HashMap;

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use chrono::{NaiveDate, Utc};
use domain::models::certificate::Certificate;
use domain::models::od_request::{
    generate_request_id, DecideOdRequest, ListOdRequestsResponse, OdRequest, Participant,
    SubmitOdRequest, SupportingDocument,
};
use domain::models::Invitation;
use domain::services::certificate::{build_certificate, CertificateError};
use domain::services::workflow::{
    ensure_no_pending, inclusive_day_count, reconcile_participants, requester_leads, validate_draft,
};
use persistence::repositories::{
    AccountRepository, DecisionUpdate, InvitationRepository, NewOdRequest, OdRequestRepository,
};
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::middleware::metrics::{record_od_request_decided, record_od_request_submitted};

/// Document types accepted as supporting evidence.
fn allowed_document_type(content_type: &str) -> bool {
    content_type.starts_with("image/") || content_type == "application/pdf"
}

/// A supporting document buffered from the multipart stream.
struct PendingDocument {
    file_name: String,
    content_type: String,
    bytes: Vec<u8>,
}

/// Submit an OD request.
///
/// POST /api/v1/od-requests (multipart/form-data, students only)
///
/// Scalar fields arrive as text parts; `students` is a JSON-encoded
/// participant list with the requester at index 0; each `documents` part is
/// a file.
pub async fn submit_od_request(
    State(state): State<AppState>,
    auth: AuthUser,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<OdRequest>), ApiError> {
    auth.require_student()?;

    let mut od_request_id = None;
    let mut event_name = None;
    let mut from_date = None;
    let mut to_date = None;
    let mut venue = None;
    let mut tutor_name = None;
    let mut participants: Vec<Participant> = Vec::new();
    let mut documents: Vec<PendingDocument> = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::Validation(format!("Malformed multipart body: {}", e)))?
    {
        let field_name = field.name().unwrap_or_default().to_string();

        match field_name.as_str() {
            "odRequestId" => od_request_id = Some(read_text(field).await?),
            "eventName" => event_name = Some(read_text(field).await?),
            "fromDate" => from_date = Some(read_date(field, "fromDate").await?),
            "toDate" => to_date = Some(read_date(field, "toDate").await?),
            "venue" => venue = Some(read_text(field).await?),
            "tutorName" => tutor_name = Some(read_text(field).await?),
            "students" => {
                let raw = read_text(field).await?;
                participants = serde_json::from_str(&raw).map_err(|_| {
                    ApiError::Validation("students: must be a JSON participant list".into())
                })?;
            }
            "documents" => {
                if documents.len() >= state.config.uploads.max_documents {
                    return Err(ApiError::Validation(format!(
                        "documents: at most {} files are allowed",
                        state.config.uploads.max_documents
                    )));
                }
                let content_type = field.content_type().unwrap_or_default().to_string();
                if !allowed_document_type(&content_type) {
                    return Err(ApiError::Validation(
                        "documents: only images and PDF files are allowed".into(),
                    ));
                }
                let file_name = field.file_name().unwrap_or("document").to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::Validation(format!("Failed to read document: {}", e)))?
                    .to_vec();
                documents.push(PendingDocument {
                    file_name,
                    content_type,
                    bytes,
                });
            }
            _ => {}
        }
    }

    let draft = SubmitOdRequest {
        // Solo submissions need no pre-agreed draft id; mint one here.
        od_request_id: od_request_id.unwrap_or_else(generate_request_id),
        event_name: event_name
            .ok_or_else(|| ApiError::Validation("eventName: is required".into()))?,
        from_date: from_date.ok_or_else(|| ApiError::Validation("fromDate: is required".into()))?,
        to_date: to_date.ok_or_else(|| ApiError::Validation("toDate: is required".into()))?,
        venue: venue.ok_or_else(|| ApiError::Validation("venue: is required".into()))?,
        tutor_name: tutor_name
            .ok_or_else(|| ApiError::Validation("tutorName: is required".into()))?,
    };
    draft.validate()?;
    validate_draft(&draft, &participants)?;

    if !requester_leads(&participants) {
        return Err(ApiError::Validation(
            "students: the requester must be the first participant".into(),
        ));
    }
    if !participants[0].email.eq_ignore_ascii_case(&auth.email) {
        return Err(ApiError::Forbidden(
            "Only the requester can submit this request".into(),
        ));
    }

    // Resolve the draft's invitations: unresolved pending ones block the
    // submission, accepted ones are folded into the participant list.
    let invitations: Vec<Invitation> = InvitationRepository::new(state.pool.clone())
        .list_for_draft(&draft.od_request_id)
        .await?
        .into_iter()
        .map(Invitation::from)
        .collect();
    ensure_no_pending(&invitations, Utc::now())?;
    let promoted = reconcile_participants(&mut participants, &invitations);
    if promoted > 0 {
        tracing::debug!(count = promoted, "Promoted accepted invitations at submit");
    }

    // Snapshot attendance at submission time; the feed being down leaves the
    // snapshot empty rather than failing the submit.
    let register_numbers: Vec<String> = participants
        .iter()
        .map(|p| p.register_number.to_uppercase())
        .collect();
    let attendance = state.attendance.fetch_percentages(&register_numbers).await;
    for participant in &mut participants {
        if let Some(pct) = attendance.get(&participant.register_number.to_uppercase()) {
            participant.attendance_percentage = Some(*pct);
        }
    }

    // Resolve the free-text tutor reference against the staff directory.
    let tutor = AccountRepository::new(state.pool.clone())
        .find_staff_by_name(&draft.tutor_name)
        .await?;

    let stored_documents = store_documents(&state, &draft.od_request_id, documents).await?;

    let participants_json = serde_json::to_value(&participants)
        .map_err(|e| ApiError::Internal(format!("Failed to encode participants: {}", e)))?;
    let documents_json = serde_json::to_value(&stored_documents)
        .map_err(|e| ApiError::Internal(format!("Failed to encode documents: {}", e)))?;

    let entity = OdRequestRepository::new(state.pool.clone())
        .create(NewOdRequest {
            request_id: &draft.od_request_id,
            event_name: &draft.event_name,
            from_date: draft.from_date,
            to_date: draft.to_date,
            number_of_days: inclusive_day_count(draft.from_date, draft.to_date),
            venue: &draft.venue,
            tutor_name: &draft.tutor_name,
            tutor_email: tutor.as_ref().map(|t| t.email.as_str()),
            tutor_staff_id: tutor.as_ref().and_then(|t| t.staff_id.as_deref()),
            participants: participants_json,
            documents: documents_json,
        })
        .await?;

    record_od_request_submitted();

    tracing::info!(
        request_id = %entity.request_id,
        participants = participants.len(),
        "OD request submitted"
    );

    let request: OdRequest = entity
        .try_into()
        .map_err(|e| ApiError::Internal(format!("Failed to decode request: {}", e)))?;

    Ok((StatusCode::CREATED, Json(request)))
}

/// List the calling student's OD requests, newest first.
///
/// GET /api/v1/od-requests
pub async fn list_my_requests(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ListOdRequestsResponse>, ApiError> {
    auth.require_student()?;

    let account = AccountRepository::new(state.pool.clone())
        .find_by_id(auth.account_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Account not found".into()))?;
    let register_number = account
        .register_number
        .ok_or_else(|| ApiError::Forbidden("Only students can list OD requests".into()))?;

    let entities = OdRequestRepository::new(state.pool.clone())
        .list_for_register_number(&register_number)
        .await?;

    Ok(Json(ListOdRequestsResponse {
        requests: decode_requests(entities)?,
    }))
}

/// Pending requests routed to the calling tutor.
///
/// GET /api/v1/od-requests/assigned
pub async fn list_assigned_requests(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ListOdRequestsResponse>, ApiError> {
    auth.require_staff()?;

    let entities = OdRequestRepository::new(state.pool.clone())
        .list_pending_for_tutor(&auth.email, &auth.name)
        .await?;

    Ok(Json(ListOdRequestsResponse {
        requests: decode_requests(entities)?,
    }))
}

/// Approve or reject a pending request.
///
/// POST /api/v1/od-requests/:request_id/decision
pub async fn decide_od_request(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(request_id): Path<String>,
    Json(request): Json<DecideOdRequest>,
) -> Result<Json<OdRequest>, ApiError> {
    auth.require_staff()?;
    request.validate()?;

    let repo = OdRequestRepository::new(state.pool.clone());
    let status = request.decision.resulting_status();

    let updated = repo
        .decide(
            &request_id,
            status.into(),
            DecisionUpdate {
                decided_by: &auth.name,
                decided_at: Utc::now(),
                comments: request.comments.as_deref(),
                signature_url: request.signature_url.as_deref(),
            },
        )
        .await?;

    let entity = match updated {
        Some(entity) => entity,
        None => {
            // CAS failed: either the request never existed, or a decision
            // already landed.
            return if repo.exists(&request_id).await? {
                Err(ApiError::InvalidState(
                    "Request has already been decided".into(),
                ))
            } else {
                Err(ApiError::NotFound("OD request not found".into()))
            };
        }
    };

    record_od_request_decided(&status.to_string());

    tracing::info!(request_id = %request_id, status = %status, "OD request decided");

    let od_request: OdRequest = entity
        .try_into()
        .map_err(|e| ApiError::Internal(format!("Failed to decode request: {}", e)))?;

    // Notify the requester; delivery must not delay the response.
    if let Some(requester) = od_request.participants.first().cloned() {
        let email_service = state.email.clone();
        let request_id = od_request.request_id.clone();
        let event_name = od_request.event_name.clone();
        let outcome = status.to_string();
        let comments = request.comments.clone();
        tokio::spawn(async move {
            if let Err(e) = email_service
                .send_decision_email(
                    &requester.email,
                    &requester.name,
                    &request_id,
                    &event_name,
                    &outcome,
                    comments.as_deref(),
                )
                .await
            {
                tracing::error!(error = %e, "Failed to send decision email");
            }
        });
    }

    Ok(Json(od_request))
}

/// Mark an approved request completed.
///
/// POST /api/v1/od-requests/:request_id/complete
pub async fn complete_od_request(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(request_id): Path<String>,
) -> Result<Json<OdRequest>, ApiError> {
    auth.require_student()?;

    let repo = OdRequestRepository::new(state.pool.clone());

    let existing = repo
        .find_by_request_id(&request_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("OD request not found".into()))?;
    let existing: OdRequest = existing
        .try_into()
        .map_err(|e| ApiError::Internal(format!("Failed to decode request: {}", e)))?;

    let requester = existing
        .participants
        .first()
        .ok_or_else(|| ApiError::Internal("Request has no participants".into()))?;
    if !requester.email.eq_ignore_ascii_case(&auth.email) {
        return Err(ApiError::Forbidden(
            "Only the requester can complete this request".into(),
        ));
    }

    let entity = repo
        .complete(&request_id)
        .await?
        .ok_or_else(|| ApiError::InvalidState("Only approved requests can be completed".into()))?;

    tracing::info!(request_id = %request_id, "OD request completed");

    let od_request: OdRequest = entity
        .try_into()
        .map_err(|e| ApiError::Internal(format!("Failed to decode request: {}", e)))?;

    Ok(Json(od_request))
}

/// Certificate render data for an approved (or completed) request.
///
/// GET /api/v1/od-requests/:request_id/certificate
pub async fn certificate(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(request_id): Path<String>,
) -> Result<Json<Certificate>, ApiError> {
    let entity = OdRequestRepository::new(state.pool.clone())
        .find_by_request_id(&request_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("OD request not found".into()))?;
    let od_request: OdRequest = entity
        .try_into()
        .map_err(|e| ApiError::Internal(format!("Failed to decode request: {}", e)))?;

    let register_numbers: Vec<String> = od_request
        .participants
        .iter()
        .map(|p| p.register_number.to_uppercase())
        .collect();
    let live_attendance: HashMap<String, f64> =
        state.attendance.fetch_percentages(&register_numbers).await;

    let certificate = build_certificate(&od_request, &live_attendance)
        .map_err(|CertificateError::NotApproved(status)| {
            ApiError::InvalidState(format!(
                "Certificate is only available for approved requests (status: {})",
                status
            ))
        })?;

    Ok(Json(certificate))
}

fn decode_requests(
    entities: Vec<persistence::entities::OdRequestEntity>,
) -> Result<Vec<OdRequest>, ApiError> {
    entities
        .into_iter()
        .map(|entity| {
            entity
                .try_into()
                .map_err(|e| ApiError::Internal(format!("Failed to decode request: {}", e)))
        })
        .collect()
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> Result<String, ApiError> {
    field
        .text()
        .await
        .map_err(|e| ApiError::Validation(format!("Malformed multipart field: {}", e)))
}

async fn read_date(
    field: axum::extract::multipart::Field<'_>,
    name: &str,
) -> Result<NaiveDate, ApiError> {
    let raw = read_text(field).await?;
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| ApiError::Validation(format!("{}: must be a YYYY-MM-DD date", name)))
}

/// Persist supporting documents under the uploads directory.
async fn store_documents(
    state: &AppState,
    request_id: &str,
    documents: Vec<PendingDocument>,
) -> Result<Vec<SupportingDocument>, ApiError> {
    if documents.is_empty() {
        return Ok(Vec::new());
    }

    let dir = std::path::Path::new(&state.config.uploads.dir)
        .join("od-requests")
        .join(request_id);
    tokio::fs::create_dir_all(&dir)
        .await
        .map_err(|e| ApiError::Internal(format!("Failed to prepare uploads dir: {}", e)))?;

    let mut stored = Vec::with_capacity(documents.len());
    for document in documents {
        let extension = std::path::Path::new(&document.file_name)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("bin");
        let path = dir.join(format!("{}.{}", Uuid::new_v4(), extension));

        tokio::fs::write(&path, &document.bytes)
            .await
            .map_err(|e| ApiError::Internal(format!("Failed to store document: {}", e)))?;

        stored.push(SupportingDocument {
            name: document.file_name,
            url: path.to_string_lossy().into_owned(),
            content_type: document.content_type,
        });
    }

    Ok(stored)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowed_document_types() {
        assert!(allowed_document_type("image/png"));
        assert!(allowed_document_type("application/pdf"));
        assert!(!allowed_document_type("application/msword"));
        assert!(!allowed_document_type(""));
    }
}
