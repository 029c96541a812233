//! First-run admin bootstrap.
//!
//! Creates the configured admin account on startup when no admin exists yet.
//! Safe to run on every boot: once an admin is present it does nothing.

use anyhow::{Context, Result};
use persistence::entities::RoleDb;
use persistence::repositories::AccountRepository;
use shared::password::hash_password;
use sqlx::PgPool;

use crate::config::AdminBootstrapConfig;

/// Ensure an admin account exists, creating one from configuration if needed.
pub async fn bootstrap_admin(pool: &PgPool, config: &AdminBootstrapConfig) -> Result<()> {
    if config.bootstrap_email.is_empty() || config.bootstrap_password.is_empty() {
        tracing::debug!("Admin bootstrap not configured, skipping");
        return Ok(());
    }

    let accounts = AccountRepository::new(pool.clone());

    let admin_count = accounts
        .count_admins()
        .await
        .context("Failed to count admin accounts")?;

    if admin_count > 0 {
        tracing::debug!(admin_count, "Admin account already present, skipping bootstrap");
        return Ok(());
    }

    let password_hash =
        hash_password(&config.bootstrap_password).context("Failed to hash bootstrap password")?;

    let account = accounts
        .create_account(
            RoleDb::Admin,
            &config.bootstrap_name,
            &config.bootstrap_email,
            &password_hash,
            None,
            None,
            None,
            None,
            None,
            None,
            None,
        )
        .await;

    match account {
        Ok(account) => {
            tracing::info!(account_id = %account.id, "Bootstrap admin account created");
            Ok(())
        }
        Err(sqlx::Error::Database(db_err)) if db_err.code().as_deref() == Some("23505") => {
            // Another instance won the race.
            tracing::debug!("Admin account created concurrently, skipping");
            Ok(())
        }
        Err(e) => Err(e).context("Failed to create bootstrap admin account"),
    }
}

#[cfg(test)]
mod tests {
    use crate::config::AdminBootstrapConfig;

    #[test]
    fn test_unconfigured_bootstrap_is_noop() {
        let config = AdminBootstrapConfig::default();
        assert!(config.bootstrap_email.is_empty());
        assert!(config.bootstrap_password.is_empty());
    }
}
