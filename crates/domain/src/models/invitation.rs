//! Invitation domain models.
//!
//! An invitation is a time-limited offer for a classmate to join an OD
//! request draft. Each invitation is its own two-state machine:
//! `pending -> accepted` or `pending -> declined`, terminal either way.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Invitation lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvitationStatus {
    Pending,
    Accepted,
    Declined,
}

impl InvitationStatus {
    /// Once accepted or declined there is no re-offer.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, InvitationStatus::Pending)
    }
}

impl std::fmt::Display for InvitationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InvitationStatus::Pending => write!(f, "pending"),
            InvitationStatus::Accepted => write!(f, "accepted"),
            InvitationStatus::Declined => write!(f, "declined"),
        }
    }
}

/// A recipient's decision on a pending invitation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvitationDecision {
    Accept,
    Decline,
}

impl InvitationDecision {
    pub fn resulting_status(&self) -> InvitationStatus {
        match self {
            InvitationDecision::Accept => InvitationStatus::Accepted,
            InvitationDecision::Decline => InvitationStatus::Declined,
        }
    }
}

/// A pending or resolved invitation to join an OD request draft.
///
/// Carries a snapshot of the target student (resolved when the invitation is
/// sent) so that acceptance can be promoted into a participant entry without
/// another directory lookup.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Invitation {
    pub id: Uuid,
    /// Draft identifier shared by all invitations of one OD request draft.
    pub od_request_id: String,
    pub register_number: String,
    pub recipient_email: String,
    pub target_name: String,
    pub target_semester: i16,
    pub target_section: Option<String>,
    pub event_name: String,
    pub from_date: chrono::NaiveDate,
    pub to_date: chrono::NaiveDate,
    pub requester_register_number: String,
    pub requester_name: String,
    pub requester_email: String,
    pub status: InvitationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub responded_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Request body for sending an invitation.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SendInvitationRequest {
    #[validate(length(min = 1, max = 64, message = "odRequestId is required"))]
    pub od_request_id: String,

    #[validate(custom(function = "shared::validation::validate_register_number"))]
    pub register_number: String,

    #[validate(email(message = "Invalid recipient email"))]
    pub recipient_email: String,

    #[validate(length(min = 1, max = 200, message = "Event name is required"))]
    pub event_name: String,

    pub from_date: chrono::NaiveDate,
    pub to_date: chrono::NaiveDate,
}

/// Response after sending an invitation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendInvitationResponse {
    pub invitation_id: Uuid,
}

/// Request body for responding to an invitation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RespondToInvitationRequest {
    pub decision: InvitationDecision,
}

/// Invitations addressed to the calling student (recipient-side poll).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingInvitationsResponse {
    pub success: bool,
    pub invitations: Vec<Invitation>,
}

/// Requester-side poll of a draft's invitations, grouped by outcome.
///
/// `accepted` entries carry the participant snapshot the client merges into
/// its draft; declined or expired invitations simply drop out of `pending`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvitationStatusResponse {
    pub accepted: Vec<super::Participant>,
    pub pending: Vec<Invitation>,
    pub declined: Vec<Invitation>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states() {
        assert!(!InvitationStatus::Pending.is_terminal());
        assert!(InvitationStatus::Accepted.is_terminal());
        assert!(InvitationStatus::Declined.is_terminal());
    }

    #[test]
    fn test_decision_maps_to_status() {
        assert_eq!(
            InvitationDecision::Accept.resulting_status(),
            InvitationStatus::Accepted
        );
        assert_eq!(
            InvitationDecision::Decline.resulting_status(),
            InvitationStatus::Declined
        );
    }

    #[test]
    fn test_status_serialization() {
        assert_eq!(
            serde_json::to_string(&InvitationStatus::Pending).unwrap(),
            "\"pending\""
        );
        assert_eq!(
            serde_json::to_string(&InvitationDecision::Accept).unwrap(),
            "\"accept\""
        );
    }

    #[test]
    fn test_send_invitation_request_validation() {
        let req = SendInvitationRequest {
            od_request_id: "OD1709281520123-4831".into(),
            register_number: "21CSE042".into(),
            recipient_email: "peer@college.edu".into(),
            event_name: "Tech Fest".into(),
            from_date: chrono::NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            to_date: chrono::NaiveDate::from_ymd_opt(2024, 3, 2).unwrap(),
        };
        assert!(req.validate().is_ok());

        let bad = SendInvitationRequest {
            register_number: "bad reg".into(),
            ..req
        };
        assert!(bad.validate().is_err());
    }
}
