//! Event entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::event::EventAttachment;
use domain::models::Event;
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the events table.
#[derive(Debug, Clone, FromRow)]
pub struct EventEntity {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub venue: String,
    pub registration_start: DateTime<Utc>,
    pub registration_end: DateTime<Utc>,
    pub attachment_name: Option<String>,
    pub attachment_path: Option<String>,
    pub attachment_content_type: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<EventEntity> for Event {
    fn from(entity: EventEntity) -> Self {
        let attachment = match (
            entity.attachment_name,
            entity.attachment_path,
            entity.attachment_content_type,
        ) {
            (Some(file_name), Some(file_path), Some(content_type)) => Some(EventAttachment {
                file_name,
                file_path,
                content_type,
            }),
            _ => None,
        };

        Event {
            id: entity.id,
            name: entity.name,
            description: entity.description,
            venue: entity.venue,
            registration_start: entity.registration_start,
            registration_end: entity.registration_end,
            attachment,
            created_at: entity.created_at,
        }
    }
}
