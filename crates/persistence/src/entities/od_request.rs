//! OD request entity (database row mapping).

use chrono::{DateTime, NaiveDate, Utc};
use domain::models::od_request::TutorSnapshot;
use domain::models::{Decision, OdRequest, OdStatus, Participant, SupportingDocument};
use sqlx::FromRow;
use uuid::Uuid;

/// Database enum for OD request status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "od_status", rename_all = "lowercase")]
pub enum OdStatusDb {
    Pending,
    Approved,
    Rejected,
    Completed,
}

impl From<OdStatusDb> for OdStatus {
    fn from(db: OdStatusDb) -> Self {
        match db {
            OdStatusDb::Pending => OdStatus::Pending,
            OdStatusDb::Approved => OdStatus::Approved,
            OdStatusDb::Rejected => OdStatus::Rejected,
            OdStatusDb::Completed => OdStatus::Completed,
        }
    }
}

impl From<OdStatus> for OdStatusDb {
    fn from(status: OdStatus) -> Self {
        match status {
            OdStatus::Pending => OdStatusDb::Pending,
            OdStatus::Approved => OdStatusDb::Approved,
            OdStatus::Rejected => OdStatusDb::Rejected,
            OdStatus::Completed => OdStatusDb::Completed,
        }
    }
}

/// Database row mapping for the od_requests table.
///
/// Participants and supporting documents are ordered JSONB lists; the
/// participant layout follows the domain `Participant` serialization, with
/// the requester at index 0.
#[derive(Debug, Clone, FromRow)]
pub struct OdRequestEntity {
    pub id: Uuid,
    pub request_id: String,
    pub event_name: String,
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
    pub number_of_days: i64,
    pub venue: String,
    pub status: OdStatusDb,
    pub tutor_name: String,
    pub tutor_email: Option<String>,
    pub tutor_staff_id: Option<String>,
    pub participants: serde_json::Value,
    pub decided_by: Option<String>,
    pub decided_at: Option<DateTime<Utc>>,
    pub decision_comments: Option<String>,
    pub signature_url: Option<String>,
    pub documents: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<OdRequestEntity> for OdRequest {
    type Error = serde_json::Error;

    fn try_from(entity: OdRequestEntity) -> Result<Self, Self::Error> {
        let participants: Vec<Participant> = serde_json::from_value(entity.participants)?;
        let documents: Vec<SupportingDocument> = serde_json::from_value(entity.documents)?;

        let decision = match (entity.decided_by, entity.decided_at) {
            (Some(decided_by), Some(decided_at)) => Some(Decision {
                decided_by,
                decided_at,
                comments: entity.decision_comments,
                signature_url: entity.signature_url,
            }),
            _ => None,
        };

        Ok(OdRequest {
            request_id: entity.request_id,
            event_name: entity.event_name,
            from_date: entity.from_date,
            to_date: entity.to_date,
            number_of_days: entity.number_of_days,
            venue: entity.venue,
            status: entity.status.into(),
            tutor: TutorSnapshot {
                name: entity.tutor_name,
                email: entity.tutor_email,
                staff_id: entity.tutor_staff_id,
            },
            participants,
            decision,
            documents,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::models::InvitationStatus;

    #[test]
    fn test_entity_to_domain_round_trip() {
        let now = Utc::now();
        let participants = vec![Participant {
            register_number: "21CSE042".into(),
            name: "Asha".into(),
            email: "asha@college.edu".into(),
            semester: 5,
            section: Some("A".into()),
            attendance_percentage: Some(91.0),
            is_requester: true,
            status: InvitationStatus::Accepted,
            invitation_id: None,
        }];

        let entity = OdRequestEntity {
            id: Uuid::new_v4(),
            request_id: "OD1709281520123-4831".into(),
            event_name: "Tech Fest".into(),
            from_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            to_date: NaiveDate::from_ymd_opt(2024, 3, 2).unwrap(),
            number_of_days: 2,
            venue: "Anna University".into(),
            status: OdStatusDb::Pending,
            tutor_name: "Dr. Rao".into(),
            tutor_email: Some("rao@college.edu".into()),
            tutor_staff_id: Some("CSE042".into()),
            participants: serde_json::to_value(&participants).unwrap(),
            decided_by: None,
            decided_at: None,
            decision_comments: None,
            signature_url: None,
            documents: serde_json::json!([]),
            created_at: now,
            updated_at: now,
        };

        let request: OdRequest = entity.try_into().unwrap();
        assert_eq!(request.status, OdStatus::Pending);
        assert_eq!(request.participants.len(), 1);
        assert!(request.participants[0].is_requester);
        assert!(request.decision.is_none());
    }

    #[test]
    fn test_decision_requires_both_columns() {
        let now = Utc::now();
        let entity = OdRequestEntity {
            id: Uuid::new_v4(),
            request_id: "OD1-0001".into(),
            event_name: "Tech Fest".into(),
            from_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            to_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            number_of_days: 1,
            venue: "Hall".into(),
            status: OdStatusDb::Approved,
            tutor_name: "Dr. Rao".into(),
            tutor_email: None,
            tutor_staff_id: None,
            participants: serde_json::json!([]),
            decided_by: Some("Dr. Rao".into()),
            decided_at: Some(now),
            decision_comments: Some("Approved for the fest".into()),
            signature_url: None,
            documents: serde_json::json!([]),
            created_at: now,
            updated_at: now,
        };

        let request: OdRequest = entity.try_into().unwrap();
        let decision = request.decision.expect("decision block");
        assert_eq!(decision.decided_by, "Dr. Rao");
        assert_eq!(decision.comments.as_deref(), Some("Approved for the fest"));
    }
}
