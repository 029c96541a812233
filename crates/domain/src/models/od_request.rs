//! OD request domain models.
//!
//! An OD request aggregates the requester, the invited participants, event
//! metadata, the tutor's decision and supporting documents. Lifecycle:
//! `pending -> approved | rejected`, `approved -> completed`. Requests are
//! historical records and are never hard-deleted.

use chrono::{DateTime, NaiveDate, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// OD request lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OdStatus {
    Pending,
    Approved,
    Rejected,
    Completed,
}

impl OdStatus {
    /// Whether a tutor decision (approve/reject) may still be applied.
    pub fn is_decidable(&self) -> bool {
        matches!(self, OdStatus::Pending)
    }

    /// The only transition out of `approved` is to `completed`.
    pub fn can_transition_to(&self, next: OdStatus) -> bool {
        matches!(
            (self, next),
            (OdStatus::Pending, OdStatus::Approved)
                | (OdStatus::Pending, OdStatus::Rejected)
                | (OdStatus::Approved, OdStatus::Completed)
        )
    }
}

impl std::fmt::Display for OdStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OdStatus::Pending => write!(f, "pending"),
            OdStatus::Approved => write!(f, "approved"),
            OdStatus::Rejected => write!(f, "rejected"),
            OdStatus::Completed => write!(f, "completed"),
        }
    }
}

/// A participant snapshot embedded in an OD request.
///
/// The requester is always participant #0 with `is_requester=true` and no
/// invitation back-reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub register_number: String,
    pub name: String,
    pub email: String,
    pub semester: i16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    /// Attendance percentage snapshot taken at submission time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attendance_percentage: Option<f64>,
    pub is_requester: bool,
    pub status: super::InvitationStatus,
    /// Weak back-reference to the accepted invitation, absent for the
    /// requester.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invitation_id: Option<Uuid>,
}

/// Tutor decision block.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Decision {
    pub decided_by: String,
    pub decided_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature_url: Option<String>,
}

/// A supporting document uploaded with the request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupportingDocument {
    pub name: String,
    pub url: String,
    pub content_type: String,
}

/// Tutor snapshot embedded in the request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TutorSnapshot {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub staff_id: Option<String>,
}

/// A persisted OD request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OdRequest {
    pub request_id: String,
    pub event_name: String,
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
    pub number_of_days: i64,
    pub venue: String,
    pub status: OdStatus,
    pub tutor: TutorSnapshot,
    pub participants: Vec<Participant>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decision: Option<Decision>,
    pub documents: Vec<SupportingDocument>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Scalar fields of the submission form (documents arrive as separate
/// multipart parts; `students` is a JSON-encoded participant list).
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SubmitOdRequest {
    /// Draft identifier the invitations were sent under.
    #[validate(length(min = 1, max = 64, message = "odRequestId is required"))]
    pub od_request_id: String,

    #[validate(length(min = 1, max = 200, message = "Event name is required"))]
    pub event_name: String,

    pub from_date: NaiveDate,
    pub to_date: NaiveDate,

    #[validate(length(min = 1, max = 200, message = "Venue is required"))]
    pub venue: String,

    #[validate(length(min = 1, max = 100, message = "Tutor name is required"))]
    pub tutor_name: String,
}

/// A tutor's decision on a pending request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OdDecision {
    Approve,
    Reject,
}

impl OdDecision {
    pub fn resulting_status(&self) -> OdStatus {
        match self {
            OdDecision::Approve => OdStatus::Approved,
            OdDecision::Reject => OdStatus::Rejected,
        }
    }
}

/// Request body for deciding an OD request.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct DecideOdRequest {
    pub decision: OdDecision,

    #[validate(length(max = 1000, message = "Comments must be at most 1000 characters"))]
    pub comments: Option<String>,

    #[validate(url(message = "signatureUrl must be a valid URL"))]
    pub signature_url: Option<String>,
}

/// Response wrapper for request listings.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListOdRequestsResponse {
    pub requests: Vec<OdRequest>,
}

/// Generates a request identifier (time + random composite) for
/// submissions that arrive without a client-chosen draft id.
pub fn generate_request_id() -> String {
    let millis = Utc::now().timestamp_millis();
    let salt: u16 = rand::thread_rng().gen_range(0..10_000);
    format!("OD{}-{:04}", millis, salt)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_transitions() {
        assert!(OdStatus::Pending.can_transition_to(OdStatus::Approved));
        assert!(OdStatus::Pending.can_transition_to(OdStatus::Rejected));
        assert!(OdStatus::Approved.can_transition_to(OdStatus::Completed));

        assert!(!OdStatus::Rejected.can_transition_to(OdStatus::Completed));
        assert!(!OdStatus::Completed.can_transition_to(OdStatus::Pending));
        assert!(!OdStatus::Approved.can_transition_to(OdStatus::Rejected));
    }

    #[test]
    fn test_only_pending_is_decidable() {
        assert!(OdStatus::Pending.is_decidable());
        assert!(!OdStatus::Approved.is_decidable());
        assert!(!OdStatus::Rejected.is_decidable());
        assert!(!OdStatus::Completed.is_decidable());
    }

    #[test]
    fn test_decision_maps_to_status() {
        assert_eq!(OdDecision::Approve.resulting_status(), OdStatus::Approved);
        assert_eq!(OdDecision::Reject.resulting_status(), OdStatus::Rejected);
    }

    #[test]
    fn test_generate_request_id_shape() {
        let id = generate_request_id();
        assert!(id.starts_with("OD"));
        assert!(id.contains('-'));
        // time component + 4-digit salt
        let (_, salt) = id.rsplit_once('-').unwrap();
        assert_eq!(salt.len(), 4);
    }

    #[test]
    fn test_generate_request_id_uniqueish() {
        let ids: std::collections::HashSet<_> =
            (0..50).map(|_| generate_request_id()).collect();
        assert!(ids.len() > 1);
    }

    #[test]
    fn test_status_serialization() {
        assert_eq!(
            serde_json::to_string(&OdStatus::Pending).unwrap(),
            "\"pending\""
        );
        assert_eq!(
            serde_json::to_string(&OdDecision::Approve).unwrap(),
            "\"approve\""
        );
    }
}
