//! Background job that sweeps expired one-time reset codes.

use chrono::Utc;
use persistence::repositories::OtpRepository;
use sqlx::PgPool;

use super::scheduler::{Job, JobFrequency};

/// Deletes OTP challenges past their expiry.
///
/// Expiry is already enforced on every read path; the sweep just keeps the
/// table from accumulating dead rows.
pub struct CleanupOtpsJob {
    otps: OtpRepository,
}

impl CleanupOtpsJob {
    pub fn new(pool: PgPool) -> Self {
        Self {
            otps: OtpRepository::new(pool),
        }
    }
}

#[async_trait::async_trait]
impl Job for CleanupOtpsJob {
    fn name(&self) -> &'static str {
        "cleanup_otps"
    }

    fn frequency(&self) -> JobFrequency {
        JobFrequency::Minutes(5)
    }

    async fn execute(&self) -> Result<(), String> {
        let removed = self
            .otps
            .delete_expired(Utc::now())
            .await
            .map_err(|e| format!("Failed to delete expired OTP challenges: {}", e))?;

        if removed > 0 {
            tracing::info!(removed, "Swept expired OTP challenges");
        }

        Ok(())
    }
}
