//! Event repository for database operations.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::entities::EventEntity;
use crate::metrics::QueryTimer;

const EVENT_COLUMNS: &str = "id, name, description, venue, registration_start, \
     registration_end, attachment_name, attachment_path, attachment_content_type, created_at";

/// Parameters for creating an event.
#[derive(Debug, Clone)]
pub struct NewEvent<'a> {
    pub name: &'a str,
    pub description: &'a str,
    pub venue: &'a str,
    pub registration_start: DateTime<Utc>,
    pub registration_end: DateTime<Utc>,
    pub attachment_name: Option<&'a str>,
    pub attachment_path: Option<&'a str>,
    pub attachment_content_type: Option<&'a str>,
}

/// Repository for college events.
#[derive(Clone)]
pub struct EventRepository {
    pool: PgPool,
}

impl EventRepository {
    /// Creates a new EventRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert an event and return the stored row.
    pub async fn create(&self, event: NewEvent<'_>) -> Result<EventEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_event");
        let result = sqlx::query_as::<_, EventEntity>(&format!(
            "INSERT INTO events \
               (name, description, venue, registration_start, registration_end, \
                attachment_name, attachment_path, attachment_content_type) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {EVENT_COLUMNS}"
        ))
        .bind(event.name)
        .bind(event.description)
        .bind(event.venue)
        .bind(event.registration_start)
        .bind(event.registration_end)
        .bind(event.attachment_name)
        .bind(event.attachment_path)
        .bind(event.attachment_content_type)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// All events, newest first.
    pub async fn list_all(&self) -> Result<Vec<EventEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_events");
        let result = sqlx::query_as::<_, EventEntity>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }
}
