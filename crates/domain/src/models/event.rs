//! Event domain models.
//!
//! Events are created by staff (with an optional image/PDF attachment) and
//! are read-only to students.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// An uploaded event attachment reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventAttachment {
    pub file_name: String,
    pub file_path: String,
    /// Restricted to `image/*` or `application/pdf`.
    pub content_type: String,
}

/// A college event students may request OD for.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub venue: String,
    pub registration_start: DateTime<Utc>,
    pub registration_end: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachment: Option<EventAttachment>,
    pub created_at: DateTime<Utc>,
}

/// Scalar fields of the event-creation form (the attachment arrives as a
/// separate multipart part).
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventRequest {
    #[validate(length(min = 1, max = 200, message = "Event name must be 1-200 characters"))]
    pub name: String,

    #[validate(length(max = 2000, message = "Description must be at most 2000 characters"))]
    #[serde(default)]
    pub description: String,

    #[validate(length(min = 1, max = 200, message = "Venue must be 1-200 characters"))]
    pub venue: String,

    pub registration_start: DateTime<Utc>,
    pub registration_end: DateTime<Utc>,
}

/// Response for event listing.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListEventsResponse {
    pub events: Vec<Event>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_event_request_validation() {
        let now = Utc::now();
        let req = CreateEventRequest {
            name: "Tech Fest".into(),
            description: "Annual inter-college fest".into(),
            venue: "Main auditorium".into(),
            registration_start: now,
            registration_end: now + chrono::Duration::days(7),
        };
        assert!(req.validate().is_ok());

        let unnamed = CreateEventRequest {
            name: "".into(),
            ..req
        };
        assert!(unnamed.validate().is_err());
    }
}
