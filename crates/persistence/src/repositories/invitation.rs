//! Invitation repository for database operations.
//!
//! Invitations carry a hard TTL: rows past `expires_at` are treated as
//! deleted by every read path, whatever their status. A background sweep
//! removes them physically.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{InvitationEntity, InvitationStatusDb};
use crate::metrics::QueryTimer;

const INVITATION_COLUMNS: &str = "id, od_request_id, register_number, recipient_email, \
     target_name, target_semester, target_section, event_name, from_date, to_date, \
     requester_register_number, requester_name, requester_email, status, responded_at, \
     created_at, expires_at";

/// Parameters for creating an invitation. The target fields snapshot the
/// invited student's record at send time.
#[derive(Debug, Clone)]
pub struct NewInvitation<'a> {
    pub od_request_id: &'a str,
    pub register_number: &'a str,
    pub recipient_email: &'a str,
    pub target_name: &'a str,
    pub target_semester: i16,
    pub target_section: Option<&'a str>,
    pub event_name: &'a str,
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
    pub requester_register_number: &'a str,
    pub requester_name: &'a str,
    pub requester_email: &'a str,
    pub expires_at: DateTime<Utc>,
}

/// Repository for OD invitations.
#[derive(Clone)]
pub struct InvitationRepository {
    pool: PgPool,
}

impl InvitationRepository {
    /// Creates a new InvitationRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a pending invitation and return the stored row.
    pub async fn create(
        &self,
        invitation: NewInvitation<'_>,
    ) -> Result<InvitationEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_invitation");
        let result = sqlx::query_as::<_, InvitationEntity>(&format!(
            "INSERT INTO invitations \
               (od_request_id, register_number, recipient_email, target_name, target_semester, \
                target_section, event_name, from_date, to_date, requester_register_number, \
                requester_name, requester_email, expires_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13) \
             RETURNING {INVITATION_COLUMNS}"
        ))
        .bind(invitation.od_request_id)
        .bind(invitation.register_number)
        .bind(invitation.recipient_email)
        .bind(invitation.target_name)
        .bind(invitation.target_semester)
        .bind(invitation.target_section)
        .bind(invitation.event_name)
        .bind(invitation.from_date)
        .bind(invitation.to_date)
        .bind(invitation.requester_register_number)
        .bind(invitation.requester_name)
        .bind(invitation.requester_email)
        .bind(invitation.expires_at)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Fetch an unexpired invitation by ID. Expired rows read as absent.
    pub async fn find_active_by_id(
        &self,
        id: Uuid,
    ) -> Result<Option<InvitationEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_active_invitation");
        let result = sqlx::query_as::<_, InvitationEntity>(&format!(
            "SELECT {INVITATION_COLUMNS} FROM invitations \
             WHERE id = $1 AND expires_at > NOW()"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// All unexpired invitations belonging to a draft, any status.
    pub async fn list_for_draft(
        &self,
        od_request_id: &str,
    ) -> Result<Vec<InvitationEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_invitations_for_draft");
        let result = sqlx::query_as::<_, InvitationEntity>(&format!(
            "SELECT {INVITATION_COLUMNS} FROM invitations \
             WHERE od_request_id = $1 AND expires_at > NOW() \
             ORDER BY created_at"
        ))
        .bind(od_request_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Pending, unexpired invitations addressed to a student.
    pub async fn list_pending_for_recipient(
        &self,
        email: &str,
    ) -> Result<Vec<InvitationEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_pending_invitations");
        let result = sqlx::query_as::<_, InvitationEntity>(&format!(
            "SELECT {INVITATION_COLUMNS} FROM invitations \
             WHERE lower(recipient_email) = lower($1) \
               AND status = 'pending' AND expires_at > NOW() \
             ORDER BY created_at DESC"
        ))
        .bind(email)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Record an accept/decline. Compare-and-swap on pending status so a
    /// second response or a response to an expired invitation is a no-op;
    /// returns the updated row when the transition applied.
    pub async fn respond(
        &self,
        id: Uuid,
        status: InvitationStatusDb,
    ) -> Result<Option<InvitationEntity>, sqlx::Error> {
        let timer = QueryTimer::new("respond_to_invitation");
        let result = sqlx::query_as::<_, InvitationEntity>(&format!(
            "UPDATE invitations \
             SET status = $2, responded_at = NOW() \
             WHERE id = $1 AND status = 'pending' AND expires_at > NOW() \
             RETURNING {INVITATION_COLUMNS}"
        ))
        .bind(id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Cancel (delete) an invitation while still pending. Returns affected
    /// row count; 0 means it was already answered, expired, or gone.
    pub async fn delete_pending(&self, id: Uuid) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("delete_pending_invitation");
        let result = sqlx::query(
            "DELETE FROM invitations WHERE id = $1 AND status = 'pending' AND expires_at > NOW()",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        timer.record();
        Ok(result.rows_affected())
    }

    /// Sweep invitations past their TTL. Returns number removed.
    pub async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("delete_expired_invitations");
        let result = sqlx::query("DELETE FROM invitations WHERE expires_at <= $1")
            .bind(now)
            .execute(&self.pool)
            .await?;
        timer.record();
        Ok(result.rows_affected())
    }
}
