//! Invitation entity (database row mapping).

use chrono::{DateTime, NaiveDate, Utc};
use domain::models::{Invitation, InvitationStatus};
use sqlx::FromRow;
use uuid::Uuid;

/// Database enum for invitation status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "invitation_status", rename_all = "lowercase")]
pub enum InvitationStatusDb {
    Pending,
    Accepted,
    Declined,
}

impl From<InvitationStatusDb> for InvitationStatus {
    fn from(db: InvitationStatusDb) -> Self {
        match db {
            InvitationStatusDb::Pending => InvitationStatus::Pending,
            InvitationStatusDb::Accepted => InvitationStatus::Accepted,
            InvitationStatusDb::Declined => InvitationStatus::Declined,
        }
    }
}

impl From<InvitationStatus> for InvitationStatusDb {
    fn from(status: InvitationStatus) -> Self {
        match status {
            InvitationStatus::Pending => InvitationStatusDb::Pending,
            InvitationStatus::Accepted => InvitationStatusDb::Accepted,
            InvitationStatus::Declined => InvitationStatusDb::Declined,
        }
    }
}

/// Database row mapping for the invitations table.
#[derive(Debug, Clone, FromRow)]
pub struct InvitationEntity {
    pub id: Uuid,
    pub od_request_id: String,
    pub register_number: String,
    pub recipient_email: String,
    pub target_name: String,
    pub target_semester: i16,
    pub target_section: Option<String>,
    pub event_name: String,
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
    pub requester_register_number: String,
    pub requester_name: String,
    pub requester_email: String,
    pub status: InvitationStatusDb,
    pub responded_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl From<InvitationEntity> for Invitation {
    fn from(entity: InvitationEntity) -> Self {
        Invitation {
            id: entity.id,
            od_request_id: entity.od_request_id,
            register_number: entity.register_number,
            recipient_email: entity.recipient_email,
            target_name: entity.target_name,
            target_semester: entity.target_semester,
            target_section: entity.target_section,
            event_name: entity.event_name,
            from_date: entity.from_date,
            to_date: entity.to_date,
            requester_register_number: entity.requester_register_number,
            requester_name: entity.requester_name,
            requester_email: entity.requester_email,
            status: entity.status.into(),
            responded_at: entity.responded_at,
            created_at: entity.created_at,
            expires_at: entity.expires_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_db_round_trip() {
        for status in [
            InvitationStatus::Pending,
            InvitationStatus::Accepted,
            InvitationStatus::Declined,
        ] {
            let db: InvitationStatusDb = status.into();
            let back: InvitationStatus = db.into();
            assert_eq!(back, status);
        }
    }
}
