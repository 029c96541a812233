//! Account repository for database operations.

use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{AccountEntity, RoleDb, StaffSummaryEntity, StudentSummaryEntity};
use crate::metrics::QueryTimer;

const ACCOUNT_COLUMNS: &str = "id, role, name, email, password_hash, register_number, semester, \
     section, tutor_name, staff_id, department, designation, created_at, updated_at";

/// Repository for account lookups and credential updates.
#[derive(Clone)]
pub struct AccountRepository {
    pool: PgPool,
}

impl AccountRepository {
    /// Creates a new AccountRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find an account by email, any role. Single indexed lookup replacing
    /// the source's student/staff/admin waterfall.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<AccountEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_account_by_email");
        let result = sqlx::query_as::<_, AccountEntity>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE lower(email) = lower($1)"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find an account by email restricted to self-service roles (students
    /// and staff; admins are excluded from password reset).
    pub async fn find_resettable_by_email(
        &self,
        email: &str,
    ) -> Result<Option<AccountEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_resettable_account_by_email");
        let result = sqlx::query_as::<_, AccountEntity>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts \
             WHERE lower(email) = lower($1) AND role IN ('student', 'staff')"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find an account by ID.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<AccountEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_account_by_id");
        let result = sqlx::query_as::<_, AccountEntity>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find a student account by register number.
    pub async fn find_student_by_register_number(
        &self,
        register_number: &str,
    ) -> Result<Option<AccountEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_student_by_register_number");
        let result = sqlx::query_as::<_, AccountEntity>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts \
             WHERE role = 'student' AND upper(register_number) = upper($1)"
        ))
        .bind(register_number)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Prefix/substring search over students by name or register number.
    pub async fn search_students(
        &self,
        query: &str,
        limit: i64,
    ) -> Result<Vec<StudentSummaryEntity>, sqlx::Error> {
        let timer = QueryTimer::new("search_students");
        let pattern = format!("%{}%", query);
        let result = sqlx::query_as::<_, StudentSummaryEntity>(
            r#"
            SELECT register_number, name, email, semester, section
            FROM accounts
            WHERE role = 'student'
              AND (name ILIKE $1 OR register_number ILIKE $1)
            ORDER BY register_number
            LIMIT $2
            "#,
        )
        .bind(pattern)
        .bind(limit)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// List all staff accounts (for tutor selection).
    pub async fn list_staff(&self) -> Result<Vec<StaffSummaryEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_staff");
        let result = sqlx::query_as::<_, StaffSummaryEntity>(
            r#"
            SELECT staff_id, name, email, department, designation
            FROM accounts
            WHERE role = 'staff'
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find a staff account by display name (free-text tutor reference).
    pub async fn find_staff_by_name(
        &self,
        name: &str,
    ) -> Result<Option<AccountEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_staff_by_name");
        let result = sqlx::query_as::<_, AccountEntity>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts \
             WHERE role = 'staff' AND lower(name) = lower($1) \
             ORDER BY created_at \
             LIMIT 1"
        ))
        .bind(name)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Replace the stored password hash. Returns affected row count.
    pub async fn update_password_hash(
        &self,
        email: &str,
        password_hash: &str,
    ) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("update_password_hash");
        let result = sqlx::query(
            r#"
            UPDATE accounts
            SET password_hash = $2, updated_at = NOW()
            WHERE lower(email) = lower($1)
            "#,
        )
        .bind(email)
        .bind(password_hash)
        .execute(&self.pool)
        .await?;
        timer.record();
        Ok(result.rows_affected())
    }

    /// Insert a new account. Role-specific columns may be NULL.
    #[allow(clippy::too_many_arguments)]
    pub async fn create_account(
        &self,
        role: RoleDb,
        name: &str,
        email: &str,
        password_hash: &str,
        register_number: Option<&str>,
        semester: Option<i16>,
        section: Option<&str>,
        tutor_name: Option<&str>,
        staff_id: Option<&str>,
        department: Option<&str>,
        designation: Option<&str>,
    ) -> Result<AccountEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_account");
        let result = sqlx::query_as::<_, AccountEntity>(&format!(
            "INSERT INTO accounts \
               (role, name, email, password_hash, register_number, semester, section, \
                tutor_name, staff_id, department, designation) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
             RETURNING {ACCOUNT_COLUMNS}"
        ))
        .bind(role)
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .bind(register_number)
        .bind(semester)
        .bind(section)
        .bind(tutor_name)
        .bind(staff_id)
        .bind(department)
        .bind(designation)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Count admin accounts (used by startup bootstrap).
    pub async fn count_admins(&self) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("count_admins");
        let result =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM accounts WHERE role = 'admin'")
                .fetch_one(&self.pool)
                .await;
        timer.record();
        result
    }
}

#[cfg(test)]
mod tests {
    // AccountRepository queries require a database connection and are covered
    // by the integration tests under crates/api/tests.
}
