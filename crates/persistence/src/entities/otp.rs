//! OTP challenge entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database row mapping for the otp_challenges table.
///
/// Keyed by email: a new forgot-password request overwrites the previous
/// challenge. Only the SHA-256 hash of the code is stored.
#[derive(Debug, Clone, FromRow)]
pub struct OtpChallengeEntity {
    pub email: String,
    pub code_hash: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl OtpChallengeEntity {
    /// Whether the challenge is past its expiry.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_is_expired() {
        let now = Utc::now();
        let challenge = OtpChallengeEntity {
            email: "asha@college.edu".into(),
            code_hash: "abc".into(),
            expires_at: now + Duration::minutes(5),
            created_at: now,
        };
        assert!(!challenge.is_expired(now));
        assert!(challenge.is_expired(now + Duration::minutes(5)));
        assert!(challenge.is_expired(now + Duration::minutes(6)));
    }
}
