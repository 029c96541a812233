//! Event routes: listing for everyone, creation for staff.

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use domain::models::event::{CreateEventRequest, ListEventsResponse};
use domain::models::Event;
use persistence::repositories::{EventRepository, NewEvent};
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::AuthUser;

/// Attachment types permitted on events.
fn allowed_attachment_type(content_type: &str) -> bool {
    content_type.starts_with("image/") || content_type == "application/pdf"
}

/// List all events, newest first.
///
/// GET /api/v1/events
pub async fn list_events(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> Result<Json<ListEventsResponse>, ApiError> {
    let rows = EventRepository::new(state.pool.clone()).list_all().await?;

    Ok(Json(ListEventsResponse {
        events: rows.into_iter().map(Event::from).collect(),
    }))
}

/// Uploaded attachment held until the scalar fields are validated.
struct PendingAttachment {
    file_name: String,
    content_type: String,
    bytes: Vec<u8>,
}

/// Create an event with an optional image or PDF attachment.
///
/// POST /api/v1/events (multipart/form-data, staff or admin only)
pub async fn create_event(
    State(state): State<AppState>,
    auth: AuthUser,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<Event>), ApiError> {
    auth.require_staff_or_admin()?;

    let mut name = None;
    let mut description = String::new();
    let mut venue = None;
    let mut registration_start = None;
    let mut registration_end = None;
    let mut attachment: Option<PendingAttachment> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::Validation(format!("Malformed multipart body: {}", e)))?
    {
        let field_name = field.name().unwrap_or_default().to_string();

        match field_name.as_str() {
            "name" => name = Some(read_text(field).await?),
            "description" => description = read_text(field).await?,
            "venue" => venue = Some(read_text(field).await?),
            "registrationStart" => {
                registration_start = Some(read_datetime(field, "registrationStart").await?)
            }
            "registrationEnd" => {
                registration_end = Some(read_datetime(field, "registrationEnd").await?)
            }
            "attachment" => {
                let content_type = field.content_type().unwrap_or_default().to_string();
                if !allowed_attachment_type(&content_type) {
                    return Err(ApiError::Validation(
                        "attachment: only images and PDF files are allowed".into(),
                    ));
                }
                let file_name = field.file_name().unwrap_or("attachment").to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::Validation(format!("Failed to read attachment: {}", e)))?
                    .to_vec();
                attachment = Some(PendingAttachment {
                    file_name,
                    content_type,
                    bytes,
                });
            }
            _ => {}
        }
    }

    let request = CreateEventRequest {
        name: name.ok_or_else(|| ApiError::Validation("name: is required".into()))?,
        description,
        venue: venue.ok_or_else(|| ApiError::Validation("venue: is required".into()))?,
        registration_start: registration_start
            .ok_or_else(|| ApiError::Validation("registrationStart: is required".into()))?,
        registration_end: registration_end
            .ok_or_else(|| ApiError::Validation("registrationEnd: is required".into()))?,
    };
    request.validate()?;

    if request.registration_end <= request.registration_start {
        return Err(ApiError::Validation(
            "registrationEnd: must be after registrationStart".into(),
        ));
    }

    let stored = match attachment {
        Some(pending) => Some(store_attachment(&state, pending).await?),
        None => None,
    };

    let event = EventRepository::new(state.pool.clone())
        .create(NewEvent {
            name: &request.name,
            description: &request.description,
            venue: &request.venue,
            registration_start: request.registration_start,
            registration_end: request.registration_end,
            attachment_name: stored.as_ref().map(|(n, _, _)| n.as_str()),
            attachment_path: stored.as_ref().map(|(_, p, _)| p.as_str()),
            attachment_content_type: stored.as_ref().map(|(_, _, t)| t.as_str()),
        })
        .await?;

    tracing::info!(event_id = %event.id, created_by = %auth.email, "Event created");

    Ok((StatusCode::CREATED, Json(event.into())))
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> Result<String, ApiError> {
    field
        .text()
        .await
        .map_err(|e| ApiError::Validation(format!("Malformed multipart field: {}", e)))
}

async fn read_datetime(
    field: axum::extract::multipart::Field<'_>,
    name: &str,
) -> Result<DateTime<Utc>, ApiError> {
    let raw = read_text(field).await?;
    DateTime::parse_from_rfc3339(raw.trim())
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| ApiError::Validation(format!("{}: must be an RFC 3339 timestamp", name)))
}

/// Persist the attachment under the uploads directory. Returns
/// (original name, stored path, content type).
async fn store_attachment(
    state: &AppState,
    pending: PendingAttachment,
) -> Result<(String, String, String), ApiError> {
    let dir = std::path::Path::new(&state.config.uploads.dir).join("events");
    tokio::fs::create_dir_all(&dir)
        .await
        .map_err(|e| ApiError::Internal(format!("Failed to prepare uploads dir: {}", e)))?;

    let extension = std::path::Path::new(&pending.file_name)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("bin");
    let stored_name = format!("{}.{}", Uuid::new_v4(), extension);
    let path = dir.join(&stored_name);

    tokio::fs::write(&path, &pending.bytes)
        .await
        .map_err(|e| ApiError::Internal(format!("Failed to store attachment: {}", e)))?;

    Ok((
        pending.file_name,
        path.to_string_lossy().into_owned(),
        pending.content_type,
    ))
}
