//! Complaint repository.
//!
//! Reads go through [`ComplaintRepository`]; workflow writes use the free
//! functions below inside a transaction opened by the store.

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};

use civic_desk_core::{
    AdminUserId, Analytics, CitizenId, Complaint, ComplaintFilter, ComplaintId, ComplaintPriority,
    ComplaintStatus, CounterEffects, DepartmentStats, Email, PageRequest, format_resolution_time,
};

use super::{RepositoryError, admin_users, citizens, like_pattern};

#[derive(Debug, sqlx::FromRow)]
struct ComplaintRow {
    id: String,
    title: String,
    description: String,
    category: String,
    department: String,
    priority: ComplaintPriority,
    status: ComplaintStatus,
    user_id: String,
    user_email: String,
    user_phone: String,
    assigned_to: Option<String>,
    assigned_worker: Option<String>,
    proof_images: Vec<String>,
    remarks: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ComplaintRow> for Complaint {
    type Error = RepositoryError;

    fn try_from(row: ComplaintRow) -> Result<Self, Self::Error> {
        let user_email = Email::parse(&row.user_email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Self {
            id: ComplaintId::new(row.id),
            title: row.title,
            description: row.description,
            category: row.category,
            department: row.department,
            priority: row.priority,
            status: row.status,
            user_id: CitizenId::new(row.user_id),
            user_email,
            user_phone: row.user_phone,
            assigned_to: row.assigned_to.map(AdminUserId::new),
            assigned_worker: row.assigned_worker,
            proof_images: row.proof_images,
            remarks: row.remarks,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct DepartmentRow {
    department: String,
    total: i64,
    completed: i64,
    pending: i64,
    in_progress: i64,
}

#[derive(Debug, sqlx::FromRow)]
struct SummaryRow {
    critical: i64,
    average_secs: Option<f64>,
}

/// Filter values bound as `$1..$5` by the listing queries.
struct FilterBinds {
    search: Option<String>,
    status: Option<ComplaintStatus>,
    department: Option<String>,
    priority: Option<ComplaintPriority>,
    assigned_to: Option<String>,
}

impl From<&ComplaintFilter> for FilterBinds {
    fn from(filter: &ComplaintFilter) -> Self {
        Self {
            search: filter.search.as_deref().map(like_pattern),
            status: filter.status,
            department: filter.department.clone(),
            priority: filter.priority,
            assigned_to: filter.assigned_to.as_ref().map(|id| id.as_str().to_owned()),
        }
    }
}

/// Repository for complaint reads.
pub struct ComplaintRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ComplaintRepository<'a> {
    /// Create a new complaint repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Number of complaints matching `filter`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self, filter: &ComplaintFilter) -> Result<i64, RepositoryError> {
        let binds = FilterBinds::from(filter);
        let total = sqlx::query_scalar::<_, i64>(
            r"
            SELECT COUNT(*)
            FROM complaints
            WHERE ($1::text IS NULL
                   OR title ILIKE $1 OR id ILIKE $1 OR user_email ILIKE $1 OR description ILIKE $1)
              AND ($2::complaint_status IS NULL OR status = $2)
              AND ($3::text IS NULL OR LOWER(department) = LOWER($3))
              AND ($4::complaint_priority IS NULL OR priority = $4)
              AND ($5::text IS NULL OR assigned_to = $5)
            ",
        )
        .bind(binds.search)
        .bind(binds.status)
        .bind(binds.department)
        .bind(binds.priority)
        .bind(binds.assigned_to)
        .fetch_one(self.pool)
        .await?;

        Ok(total)
    }

    /// One page of complaints matching `filter`, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn list(
        &self,
        filter: &ComplaintFilter,
        page: PageRequest,
    ) -> Result<Vec<Complaint>, RepositoryError> {
        let binds = FilterBinds::from(filter);
        let rows = sqlx::query_as::<_, ComplaintRow>(
            r"
            SELECT id, title, description, category, department, priority, status,
                   user_id, user_email, user_phone, assigned_to, assigned_worker,
                   proof_images, remarks, created_at, updated_at
            FROM complaints
            WHERE ($1::text IS NULL
                   OR title ILIKE $1 OR id ILIKE $1 OR user_email ILIKE $1 OR description ILIKE $1)
              AND ($2::complaint_status IS NULL OR status = $2)
              AND ($3::text IS NULL OR LOWER(department) = LOWER($3))
              AND ($4::complaint_priority IS NULL OR priority = $4)
              AND ($5::text IS NULL OR assigned_to = $5)
            ORDER BY created_at DESC, id DESC
            LIMIT $6 OFFSET $7
            ",
        )
        .bind(binds.search)
        .bind(binds.status)
        .bind(binds.department)
        .bind(binds.priority)
        .bind(binds.assigned_to)
        .bind(i64::from(page.limit))
        .bind(page.offset())
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Get a complaint by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn get_by_id(&self, id: &ComplaintId) -> Result<Option<Complaint>, RepositoryError> {
        let row = sqlx::query_as::<_, ComplaintRow>(
            r"
            SELECT id, title, description, category, department, priority, status,
                   user_id, user_email, user_phone, assigned_to, assigned_worker,
                   proof_images, remarks, created_at, updated_at
            FROM complaints
            WHERE id = $1
            ",
        )
        .bind(id.as_str())
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Dashboard analytics computed in SQL.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn analytics(&self) -> Result<Analytics, RepositoryError> {
        let departments = sqlx::query_as::<_, DepartmentRow>(
            r#"
            SELECT department,
                   COUNT(*) AS total,
                   COUNT(*) FILTER (WHERE status = 'Completed') AS completed,
                   COUNT(*) FILTER (WHERE status = 'Pending') AS pending,
                   COUNT(*) FILTER (WHERE status = 'In Progress') AS in_progress
            FROM complaints
            GROUP BY department
            ORDER BY department COLLATE "C"
            "#,
        )
        .fetch_all(self.pool)
        .await?;

        let summary = sqlx::query_as::<_, SummaryRow>(
            r"
            SELECT COUNT(*) FILTER (WHERE priority = 'Critical') AS critical,
                   (AVG(EXTRACT(EPOCH FROM (updated_at - created_at)))
                        FILTER (WHERE status = 'Completed'))::float8 AS average_secs
            FROM complaints
            ",
        )
        .fetch_one(self.pool)
        .await?;

        let mut analytics = Analytics {
            critical_complaints: summary.critical,
            average_resolution_time: format_resolution_time(summary.average_secs),
            ..Analytics::default()
        };
        for row in departments {
            analytics.total_complaints += row.total;
            analytics.completed_complaints += row.completed;
            analytics.pending_complaints += row.pending;
            analytics.in_progress_complaints += row.in_progress;
            analytics.department_stats.push(DepartmentStats {
                department: row.department,
                total: row.total,
                completed: row.completed,
                pending: row.pending,
                in_progress: row.in_progress,
            });
        }
        Ok(analytics)
    }
}

/// Get a complaint and lock its row until the transaction ends.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
/// Returns `RepositoryError::DataCorruption` if the data is invalid.
pub async fn lock(
    conn: &mut PgConnection,
    id: &ComplaintId,
) -> Result<Option<Complaint>, RepositoryError> {
    let row = sqlx::query_as::<_, ComplaintRow>(
        r"
        SELECT id, title, description, category, department, priority, status,
               user_id, user_email, user_phone, assigned_to, assigned_worker,
               proof_images, remarks, created_at, updated_at
        FROM complaints
        WHERE id = $1
        FOR UPDATE
        ",
    )
    .bind(id.as_str())
    .fetch_optional(&mut *conn)
    .await?;

    row.map(TryInto::try_into).transpose()
}

/// Insert a new complaint.
///
/// # Errors
///
/// Returns `RepositoryError::Conflict` if the id already exists.
/// Returns `RepositoryError::Database` for other database errors.
pub async fn insert(conn: &mut PgConnection, complaint: &Complaint) -> Result<(), RepositoryError> {
    sqlx::query(
        r"
        INSERT INTO complaints (
            id, title, description, category, department, priority, status,
            user_id, user_email, user_phone, assigned_to, assigned_worker,
            proof_images, remarks, created_at, updated_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
        ",
    )
    .bind(complaint.id.as_str())
    .bind(&complaint.title)
    .bind(&complaint.description)
    .bind(&complaint.category)
    .bind(&complaint.department)
    .bind(complaint.priority)
    .bind(complaint.status)
    .bind(complaint.user_id.as_str())
    .bind(complaint.user_email.as_str())
    .bind(&complaint.user_phone)
    .bind(complaint.assigned_to.as_ref().map(AdminUserId::as_str))
    .bind(complaint.assigned_worker.as_deref())
    .bind(&complaint.proof_images)
    .bind(&complaint.remarks)
    .bind(complaint.created_at)
    .bind(complaint.updated_at)
    .execute(&mut *conn)
    .await
    .map_err(|e| {
        if let sqlx::Error::Database(ref db_err) = e
            && db_err.is_unique_violation()
        {
            return RepositoryError::Conflict("complaint already exists".to_owned());
        }
        RepositoryError::Database(e)
    })?;

    Ok(())
}

/// Insert or replace a complaint, keyed by id. Used for seeding.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the insert fails.
pub async fn upsert(conn: &mut PgConnection, complaint: &Complaint) -> Result<(), RepositoryError> {
    sqlx::query(
        r"
        INSERT INTO complaints (
            id, title, description, category, department, priority, status,
            user_id, user_email, user_phone, assigned_to, assigned_worker,
            proof_images, remarks, created_at, updated_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
        ON CONFLICT (id) DO UPDATE SET
            title = EXCLUDED.title,
            description = EXCLUDED.description,
            category = EXCLUDED.category,
            department = EXCLUDED.department,
            priority = EXCLUDED.priority,
            status = EXCLUDED.status,
            user_id = EXCLUDED.user_id,
            user_email = EXCLUDED.user_email,
            user_phone = EXCLUDED.user_phone,
            assigned_to = EXCLUDED.assigned_to,
            assigned_worker = EXCLUDED.assigned_worker,
            proof_images = EXCLUDED.proof_images,
            remarks = EXCLUDED.remarks,
            created_at = EXCLUDED.created_at,
            updated_at = EXCLUDED.updated_at
        ",
    )
    .bind(complaint.id.as_str())
    .bind(&complaint.title)
    .bind(&complaint.description)
    .bind(&complaint.category)
    .bind(&complaint.department)
    .bind(complaint.priority)
    .bind(complaint.status)
    .bind(complaint.user_id.as_str())
    .bind(complaint.user_email.as_str())
    .bind(&complaint.user_phone)
    .bind(complaint.assigned_to.as_ref().map(AdminUserId::as_str))
    .bind(complaint.assigned_worker.as_deref())
    .bind(&complaint.proof_images)
    .bind(&complaint.remarks)
    .bind(complaint.created_at)
    .bind(complaint.updated_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Persist the fields a workflow transition may change.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the update fails.
pub async fn save(conn: &mut PgConnection, complaint: &Complaint) -> Result<(), RepositoryError> {
    sqlx::query(
        r"
        UPDATE complaints
        SET department = $2,
            status = $3,
            assigned_to = $4,
            assigned_worker = $5,
            proof_images = $6,
            remarks = $7,
            updated_at = $8
        WHERE id = $1
        ",
    )
    .bind(complaint.id.as_str())
    .bind(&complaint.department)
    .bind(complaint.status)
    .bind(complaint.assigned_to.as_ref().map(AdminUserId::as_str))
    .bind(complaint.assigned_worker.as_deref())
    .bind(&complaint.proof_images)
    .bind(&complaint.remarks)
    .bind(complaint.updated_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Apply worker and citizen counter changes from a transition.
///
/// Worker rows are updated in id order so concurrent reassignments lock
/// them consistently.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if an update fails.
pub async fn apply_effects(
    conn: &mut PgConnection,
    effects: &CounterEffects,
    now: DateTime<Utc>,
) -> Result<(), RepositoryError> {
    let mut workers: Vec<_> = effects.workers.iter().collect();
    workers.sort_by(|a, b| a.worker_id.cmp(&b.worker_id));

    for change in workers {
        admin_users::adjust_counters(conn, &change.worker_id, change.assigned, change.completed, now)
            .await?;
    }
    if let Some((citizen_id, delta)) = &effects.citizen_resolved {
        citizens::adjust_resolved(conn, citizen_id, *delta, now).await?;
    }
    Ok(())
}
