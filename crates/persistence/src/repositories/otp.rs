//! OTP challenge repository for database operations.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::entities::OtpChallengeEntity;
use crate::metrics::QueryTimer;

/// Repository for one-time password challenges. One active challenge per
/// email; a new request overwrites the previous one.
#[derive(Clone)]
pub struct OtpRepository {
    pool: PgPool,
}

impl OtpRepository {
    /// Creates a new OtpRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Store a hashed challenge, replacing any existing one for the email.
    pub async fn upsert(
        &self,
        email: &str,
        code_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), sqlx::Error> {
        let timer = QueryTimer::new("upsert_otp_challenge");
        sqlx::query(
            r#"
            INSERT INTO otp_challenges (email, code_hash, expires_at)
            VALUES (lower($1), $2, $3)
            ON CONFLICT (email)
            DO UPDATE SET code_hash = $2, expires_at = $3, created_at = NOW()
            "#,
        )
        .bind(email)
        .bind(code_hash)
        .bind(expires_at)
        .execute(&self.pool)
        .await?;
        timer.record();
        Ok(())
    }

    /// Fetch the active challenge for an email, if any.
    pub async fn find_by_email(
        &self,
        email: &str,
    ) -> Result<Option<OtpChallengeEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_otp_challenge");
        let result = sqlx::query_as::<_, OtpChallengeEntity>(
            r#"
            SELECT email, code_hash, expires_at, created_at
            FROM otp_challenges
            WHERE email = lower($1)
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Remove the challenge for an email. Returns affected row count.
    pub async fn delete(&self, email: &str) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("delete_otp_challenge");
        let result = sqlx::query("DELETE FROM otp_challenges WHERE email = lower($1)")
            .bind(email)
            .execute(&self.pool)
            .await?;
        timer.record();
        Ok(result.rows_affected())
    }

    /// Sweep challenges past their expiry. Returns number removed.
    pub async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("delete_expired_otp_challenges");
        let result = sqlx::query("DELETE FROM otp_challenges WHERE expires_at <= $1")
            .bind(now)
            .execute(&self.pool)
            .await?;
        timer.record();
        Ok(result.rows_affected())
    }
}
