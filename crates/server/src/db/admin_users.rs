//! Admin account repository.

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};

use civic_desk_core::{AdminRole, AdminUser, AdminUserId, Email};

use super::RepositoryError;
use crate::store::AdminAccount;

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct AdminUserRow {
    id: String,
    username: String,
    password_hash: String,
    name: String,
    email: String,
    role: AdminRole,
    department: Option<String>,
    assigned_complaints: i32,
    completed_complaints: i32,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<AdminUserRow> for AdminAccount {
    type Error = RepositoryError;

    fn try_from(row: AdminUserRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Self {
            user: AdminUser {
                id: AdminUserId::new(row.id),
                username: row.username,
                name: row.name,
                email,
                role: row.role,
                department: row.department,
                assigned_complaints: row.assigned_complaints,
                completed_complaints: row.completed_complaints,
                is_active: row.is_active,
                created_at: row.created_at,
                updated_at: row.updated_at,
            },
            password_hash: row.password_hash,
        })
    }
}

fn into_user(row: AdminUserRow) -> Result<AdminUser, RepositoryError> {
    AdminAccount::try_from(row).map(|account| account.user)
}

/// Field named by a unique constraint or index on `admin_users`.
fn conflicting_field(constraint: Option<&str>) -> &'static str {
    match constraint {
        Some("admin_users_username_key") => "username",
        Some("admin_users_pkey") => "id",
        // admin_users_email_lower_key
        _ => "email",
    }
}

fn map_unique_violation(e: sqlx::Error) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_unique_violation()
    {
        let what = conflicting_field(db_err.constraint());
        return RepositoryError::Conflict(format!("{what} already exists"));
    }
    RepositoryError::Database(e)
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for admin account reads.
pub struct AdminUserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AdminUserRepository<'a> {
    /// Create a new admin user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Find an account by username and role, including its password hash.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn find_account(
        &self,
        username: &str,
        role: AdminRole,
    ) -> Result<Option<AdminAccount>, RepositoryError> {
        let row = sqlx::query_as::<_, AdminUserRow>(
            r"
            SELECT id, username, password_hash, name, email, role, department,
                   assigned_complaints, completed_complaints, is_active,
                   created_at, updated_at
            FROM admin_users
            WHERE username = $1 AND role = $2
            ",
        )
        .bind(username)
        .bind(role)
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Get an account by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn get_by_id(&self, id: &AdminUserId) -> Result<Option<AdminUser>, RepositoryError> {
        let row = sqlx::query_as::<_, AdminUserRow>(
            r"
            SELECT id, username, password_hash, name, email, role, department,
                   assigned_complaints, completed_complaints, is_active,
                   created_at, updated_at
            FROM admin_users
            WHERE id = $1
            ",
        )
        .bind(id.as_str())
        .fetch_optional(self.pool)
        .await?;

        row.map(into_user).transpose()
    }

    /// Active Lower Admins, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn list_workers(
        &self,
        department: Option<&str>,
    ) -> Result<Vec<AdminUser>, RepositoryError> {
        let rows = sqlx::query_as::<_, AdminUserRow>(
            r"
            SELECT id, username, password_hash, name, email, role, department,
                   assigned_complaints, completed_complaints, is_active,
                   created_at, updated_at
            FROM admin_users
            WHERE role = 'Lower Admin'
              AND is_active
              AND ($1::text IS NULL OR LOWER(department) = LOWER($1))
            ORDER BY created_at DESC, id
            ",
        )
        .bind(department.map(str::trim))
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(into_user).collect()
    }
}

// =============================================================================
// Transactional helpers
// =============================================================================

/// Get an account by id inside a transaction.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
/// Returns `RepositoryError::DataCorruption` if the data is invalid.
pub async fn fetch(
    conn: &mut PgConnection,
    id: &AdminUserId,
) -> Result<Option<AdminUser>, RepositoryError> {
    let row = sqlx::query_as::<_, AdminUserRow>(
        r"
        SELECT id, username, password_hash, name, email, role, department,
               assigned_complaints, completed_complaints, is_active,
               created_at, updated_at
        FROM admin_users
        WHERE id = $1
        ",
    )
    .bind(id.as_str())
    .fetch_optional(&mut *conn)
    .await?;

    row.map(into_user).transpose()
}

/// Get an account by id and lock its row until the transaction ends.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
/// Returns `RepositoryError::DataCorruption` if the data is invalid.
pub async fn lock(
    conn: &mut PgConnection,
    id: &AdminUserId,
) -> Result<Option<AdminUser>, RepositoryError> {
    let row = sqlx::query_as::<_, AdminUserRow>(
        r"
        SELECT id, username, password_hash, name, email, role, department,
               assigned_complaints, completed_complaints, is_active,
               created_at, updated_at
        FROM admin_users
        WHERE id = $1
        FOR UPDATE
        ",
    )
    .bind(id.as_str())
    .fetch_optional(&mut *conn)
    .await?;

    row.map(into_user).transpose()
}

/// Insert a new account.
///
/// # Errors
///
/// Returns `RepositoryError::Conflict` if the username or email already exists.
/// Returns `RepositoryError::Database` for other database errors.
pub async fn insert(
    conn: &mut PgConnection,
    user: &AdminUser,
    password_hash: &str,
) -> Result<(), RepositoryError> {
    sqlx::query(
        r"
        INSERT INTO admin_users (
            id, username, password_hash, name, email, role, department,
            assigned_complaints, completed_complaints, is_active,
            created_at, updated_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
        ",
    )
    .bind(user.id.as_str())
    .bind(&user.username)
    .bind(password_hash)
    .bind(&user.name)
    .bind(user.email.as_str())
    .bind(user.role)
    .bind(user.department.as_deref())
    .bind(user.assigned_complaints)
    .bind(user.completed_complaints)
    .bind(user.is_active)
    .bind(user.created_at)
    .bind(user.updated_at)
    .execute(&mut *conn)
    .await
    .map_err(map_unique_violation)?;

    Ok(())
}

/// Insert or replace an account, keyed by id. Used for seeding.
///
/// # Errors
///
/// Returns `RepositoryError::Conflict` if another account holds the username
/// or email. Returns `RepositoryError::Database` for other database errors.
pub async fn upsert(
    conn: &mut PgConnection,
    user: &AdminUser,
    password_hash: &str,
) -> Result<(), RepositoryError> {
    sqlx::query(
        r"
        INSERT INTO admin_users (
            id, username, password_hash, name, email, role, department,
            assigned_complaints, completed_complaints, is_active,
            created_at, updated_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
        ON CONFLICT (id) DO UPDATE SET
            username = EXCLUDED.username,
            password_hash = EXCLUDED.password_hash,
            name = EXCLUDED.name,
            email = EXCLUDED.email,
            role = EXCLUDED.role,
            department = EXCLUDED.department,
            assigned_complaints = EXCLUDED.assigned_complaints,
            completed_complaints = EXCLUDED.completed_complaints,
            is_active = EXCLUDED.is_active,
            updated_at = EXCLUDED.updated_at
        ",
    )
    .bind(user.id.as_str())
    .bind(&user.username)
    .bind(password_hash)
    .bind(&user.name)
    .bind(user.email.as_str())
    .bind(user.role)
    .bind(user.department.as_deref())
    .bind(user.assigned_complaints)
    .bind(user.completed_complaints)
    .bind(user.is_active)
    .bind(user.created_at)
    .bind(user.updated_at)
    .execute(&mut *conn)
    .await
    .map_err(map_unique_violation)?;

    Ok(())
}

/// Persist the editable profile fields of an account.
///
/// # Errors
///
/// Returns `RepositoryError::Conflict` if the email already exists.
/// Returns `RepositoryError::Database` for other database errors.
pub async fn save_profile(conn: &mut PgConnection, user: &AdminUser) -> Result<(), RepositoryError> {
    sqlx::query(
        r"
        UPDATE admin_users
        SET name = $2, email = $3, department = $4, is_active = $5, updated_at = $6
        WHERE id = $1
        ",
    )
    .bind(user.id.as_str())
    .bind(&user.name)
    .bind(user.email.as_str())
    .bind(user.department.as_deref())
    .bind(user.is_active)
    .bind(user.updated_at)
    .execute(&mut *conn)
    .await
    .map_err(map_unique_violation)?;

    Ok(())
}

/// Adjust an account's complaint counters, never going below zero.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the update fails.
pub async fn adjust_counters(
    conn: &mut PgConnection,
    id: &AdminUserId,
    assigned: i32,
    completed: i32,
    now: DateTime<Utc>,
) -> Result<(), RepositoryError> {
    sqlx::query(
        r"
        UPDATE admin_users
        SET assigned_complaints = GREATEST(assigned_complaints + $2, 0),
            completed_complaints = GREATEST(completed_complaints + $3, 0),
            updated_at = $4
        WHERE id = $1
        ",
    )
    .bind(id.as_str())
    .bind(assigned)
    .bind(completed)
    .bind(now)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflicting_field_names() {
        assert_eq!(conflicting_field(Some("admin_users_username_key")), "username");
        assert_eq!(conflicting_field(Some("admin_users_pkey")), "id");
        assert_eq!(conflicting_field(Some("admin_users_email_lower_key")), "email");
        assert_eq!(conflicting_field(None), "email");
    }
}
