//! Citizen repository.

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};

use civic_desk_core::{Citizen, CitizenFilter, CitizenId, Email};

use super::{RepositoryError, like_pattern};

#[derive(Debug, sqlx::FromRow)]
struct CitizenRow {
    id: String,
    name: String,
    email: String,
    phone: String,
    total_complaints: i32,
    resolved_complaints: i32,
    joined_date: DateTime<Utc>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<CitizenRow> for Citizen {
    type Error = RepositoryError;

    fn try_from(row: CitizenRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Self {
            id: CitizenId::new(row.id),
            name: row.name,
            email,
            phone: row.phone,
            total_complaints: row.total_complaints,
            resolved_complaints: row.resolved_complaints,
            joined_date: row.joined_date,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Repository for citizen reads.
pub struct CitizenRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CitizenRepository<'a> {
    /// Create a new citizen repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Citizens matching `filter`, in id order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn list(&self, filter: &CitizenFilter) -> Result<Vec<Citizen>, RepositoryError> {
        let rows = sqlx::query_as::<_, CitizenRow>(
            r"
            SELECT id, name, email, phone, total_complaints, resolved_complaints,
                   joined_date, created_at, updated_at
            FROM citizens
            WHERE $1::text IS NULL
               OR name ILIKE $1 OR email ILIKE $1 OR phone ILIKE $1 OR id ILIKE $1
            ORDER BY id
            ",
        )
        .bind(filter.search.as_deref().map(like_pattern))
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Get a citizen by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn get_by_id(&self, id: &CitizenId) -> Result<Option<Citizen>, RepositoryError> {
        let row = sqlx::query_as::<_, CitizenRow>(
            r"
            SELECT id, name, email, phone, total_complaints, resolved_complaints,
                   joined_date, created_at, updated_at
            FROM citizens
            WHERE id = $1
            ",
        )
        .bind(id.as_str())
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }
}

/// Count a newly filed complaint against a citizen and return the updated
/// record, or `None` if the citizen does not exist.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the update fails.
/// Returns `RepositoryError::DataCorruption` if the data is invalid.
pub async fn bump_total(
    conn: &mut PgConnection,
    id: &CitizenId,
    now: DateTime<Utc>,
) -> Result<Option<Citizen>, RepositoryError> {
    let row = sqlx::query_as::<_, CitizenRow>(
        r"
        UPDATE citizens
        SET total_complaints = total_complaints + 1, updated_at = $2
        WHERE id = $1
        RETURNING id, name, email, phone, total_complaints, resolved_complaints,
                  joined_date, created_at, updated_at
        ",
    )
    .bind(id.as_str())
    .bind(now)
    .fetch_optional(&mut *conn)
    .await?;

    row.map(TryInto::try_into).transpose()
}

/// Adjust a citizen's resolved counter, never going below zero.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the update fails.
pub async fn adjust_resolved(
    conn: &mut PgConnection,
    id: &CitizenId,
    delta: i32,
    now: DateTime<Utc>,
) -> Result<(), RepositoryError> {
    sqlx::query(
        r"
        UPDATE citizens
        SET resolved_complaints = GREATEST(resolved_complaints + $2, 0), updated_at = $3
        WHERE id = $1
        ",
    )
    .bind(id.as_str())
    .bind(delta)
    .bind(now)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Insert or replace a citizen, keyed by id. Used for seeding.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the insert fails.
pub async fn upsert(conn: &mut PgConnection, citizen: &Citizen) -> Result<(), RepositoryError> {
    sqlx::query(
        r"
        INSERT INTO citizens (
            id, name, email, phone, total_complaints, resolved_complaints,
            joined_date, created_at, updated_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        ON CONFLICT (id) DO UPDATE SET
            name = EXCLUDED.name,
            email = EXCLUDED.email,
            phone = EXCLUDED.phone,
            total_complaints = EXCLUDED.total_complaints,
            resolved_complaints = EXCLUDED.resolved_complaints,
            joined_date = EXCLUDED.joined_date,
            updated_at = EXCLUDED.updated_at
        ",
    )
    .bind(citizen.id.as_str())
    .bind(&citizen.name)
    .bind(citizen.email.as_str())
    .bind(&citizen.phone)
    .bind(citizen.total_complaints)
    .bind(citizen.resolved_complaints)
    .bind(citizen.joined_date)
    .bind(citizen.created_at)
    .bind(citizen.updated_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}
