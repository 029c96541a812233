//! OD request repository for database operations.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;

use crate::entities::{OdRequestEntity, OdStatusDb};
use crate::metrics::QueryTimer;

const OD_REQUEST_COLUMNS: &str = "id, request_id, event_name, from_date, to_date, \
     number_of_days, venue, status, tutor_name, tutor_email, tutor_staff_id, participants, \
     decided_by, decided_at, decision_comments, signature_url, documents, created_at, updated_at";

/// Parameters for creating an OD request.
#[derive(Debug, Clone)]
pub struct NewOdRequest<'a> {
    pub request_id: &'a str,
    pub event_name: &'a str,
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
    pub number_of_days: i64,
    pub venue: &'a str,
    pub tutor_name: &'a str,
    pub tutor_email: Option<&'a str>,
    pub tutor_staff_id: Option<&'a str>,
    pub participants: serde_json::Value,
    pub documents: serde_json::Value,
}

/// Fields recorded alongside an approve/reject decision.
#[derive(Debug, Clone)]
pub struct DecisionUpdate<'a> {
    pub decided_by: &'a str,
    pub decided_at: DateTime<Utc>,
    pub comments: Option<&'a str>,
    pub signature_url: Option<&'a str>,
}

/// Repository for OD requests.
#[derive(Clone)]
pub struct OdRequestRepository {
    pool: PgPool,
}

impl OdRequestRepository {
    /// Creates a new OdRequestRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a pending request and return the stored row.
    pub async fn create(&self, request: NewOdRequest<'_>) -> Result<OdRequestEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_od_request");
        let result = sqlx::query_as::<_, OdRequestEntity>(&format!(
            "INSERT INTO od_requests \
               (request_id, event_name, from_date, to_date, number_of_days, venue, \
                tutor_name, tutor_email, tutor_staff_id, participants, documents) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
             RETURNING {OD_REQUEST_COLUMNS}"
        ))
        .bind(request.request_id)
        .bind(request.event_name)
        .bind(request.from_date)
        .bind(request.to_date)
        .bind(request.number_of_days)
        .bind(request.venue)
        .bind(request.tutor_name)
        .bind(request.tutor_email)
        .bind(request.tutor_staff_id)
        .bind(request.participants)
        .bind(request.documents)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Fetch a request by its business identifier.
    pub async fn find_by_request_id(
        &self,
        request_id: &str,
    ) -> Result<Option<OdRequestEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_od_request");
        let result = sqlx::query_as::<_, OdRequestEntity>(&format!(
            "SELECT {OD_REQUEST_COLUMNS} FROM od_requests WHERE request_id = $1"
        ))
        .bind(request_id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Whether a request with this identifier exists at all. Used to
    /// distinguish not-found from already-decided after a failed CAS.
    pub async fn exists(&self, request_id: &str) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("od_request_exists");
        let result = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM od_requests WHERE request_id = $1)",
        )
        .bind(request_id)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// All requests where the given register number appears in the
    /// participants list, newest first.
    pub async fn list_for_register_number(
        &self,
        register_number: &str,
    ) -> Result<Vec<OdRequestEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_od_requests_for_student");
        let result = sqlx::query_as::<_, OdRequestEntity>(&format!(
            "SELECT {OD_REQUEST_COLUMNS} FROM od_requests \
             WHERE EXISTS ( \
               SELECT 1 FROM jsonb_array_elements(participants) AS p \
               WHERE upper(p->>'registerNumber') = upper($1) \
             ) \
             ORDER BY created_at DESC"
        ))
        .bind(register_number)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Pending requests routed to a tutor, matched by email when the tutor
    /// reference resolved at submit time, falling back to display name.
    pub async fn list_pending_for_tutor(
        &self,
        tutor_email: &str,
        tutor_name: &str,
    ) -> Result<Vec<OdRequestEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_pending_od_requests_for_tutor");
        let result = sqlx::query_as::<_, OdRequestEntity>(&format!(
            "SELECT {OD_REQUEST_COLUMNS} FROM od_requests \
             WHERE status = 'pending' \
               AND (lower(tutor_email) = lower($1) \
                    OR (tutor_email IS NULL AND lower(tutor_name) = lower($2))) \
             ORDER BY created_at"
        ))
        .bind(tutor_email)
        .bind(tutor_name)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Apply an approve/reject decision. Compare-and-swap on pending status
    /// so concurrent decisions cannot both win; returns the updated row only
    /// when this call made the transition.
    pub async fn decide(
        &self,
        request_id: &str,
        status: OdStatusDb,
        update: DecisionUpdate<'_>,
    ) -> Result<Option<OdRequestEntity>, sqlx::Error> {
        let timer = QueryTimer::new("decide_od_request");
        let result = sqlx::query_as::<_, OdRequestEntity>(&format!(
            "UPDATE od_requests \
             SET status = $2, decided_by = $3, decided_at = $4, decision_comments = $5, \
                 signature_url = $6, updated_at = NOW() \
             WHERE request_id = $1 AND status = 'pending' \
             RETURNING {OD_REQUEST_COLUMNS}"
        ))
        .bind(request_id)
        .bind(status)
        .bind(update.decided_by)
        .bind(update.decided_at)
        .bind(update.comments)
        .bind(update.signature_url)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Mark an approved request completed. CAS on approved status.
    pub async fn complete(&self, request_id: &str) -> Result<Option<OdRequestEntity>, sqlx::Error> {
        let timer = QueryTimer::new("complete_od_request");
        let result = sqlx::query_as::<_, OdRequestEntity>(&format!(
            "UPDATE od_requests \
             SET status = 'completed', updated_at = NOW() \
             WHERE request_id = $1 AND status = 'approved' \
             RETURNING {OD_REQUEST_COLUMNS}"
        ))
        .bind(request_id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }
}
