//! Background job that sweeps expired invitations.

use chrono::Utc;
use persistence::repositories::InvitationRepository;
use sqlx::PgPool;

use super::scheduler::{Job, JobFrequency};

/// Deletes invitations past their TTL.
///
/// Read paths already treat expired rows as absent, whatever their status;
/// the sweep removes them physically.
pub struct CleanupInvitationsJob {
    invitations: InvitationRepository,
}

impl CleanupInvitationsJob {
    pub fn new(pool: PgPool) -> Self {
        Self {
            invitations: InvitationRepository::new(pool),
        }
    }
}

#[async_trait::async_trait]
impl Job for CleanupInvitationsJob {
    fn name(&self) -> &'static str {
        "cleanup_invitations"
    }

    fn frequency(&self) -> JobFrequency {
        JobFrequency::Minutes(10)
    }

    async fn execute(&self) -> Result<(), String> {
        let removed = self
            .invitations
            .delete_expired(Utc::now())
            .await
            .map_err(|e| format!("Failed to delete expired invitations: {}", e))?;

        if removed > 0 {
            tracing::info!(removed, "Swept expired invitations");
        }

        Ok(())
    }
}
