//! `PostgreSQL` store adapter.
//!
//! ## Tables
//!
//! - `admin_users` - Main and Lower Admin accounts with argon2 password hashes
//! - `citizens` - Members of the public who file complaints
//! - `complaints` - Complaint records, proof file names as `TEXT[]`
//! - `id_counters` - Per-collection sequence behind `CMP###`/`USER###`/`workerN`
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and run via:
//! ```bash
//! cargo run -p civic-desk-cli -- migrate
//! ```
//!
//! Workflow mutations lock the complaint row with `SELECT ... FOR UPDATE` and
//! apply the counter effects in the same transaction.

pub mod admin_users;
pub mod citizens;
pub mod complaints;
pub mod counters;
pub mod seed;

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use civic_desk_core::domain::workflow;
use civic_desk_core::{
    AdminRole, AdminUser, AdminUserId, Analytics, Citizen, CitizenFilter, CitizenId, Complaint,
    ComplaintDraft, ComplaintFilter, ComplaintId, IdSequence, NewWorker, PageRequest, StatusUpdate,
    WorkerUpdate,
};

pub use admin_users::AdminUserRepository;
pub use citizens::CitizenRepository;
pub use complaints::ComplaintRepository;

use crate::store::{AdminAccount, ComplaintSlice, Store, StoreError};

/// Embedded schema migrations.
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

impl From<RepositoryError> for StoreError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Database(e) => Self::Backend(e.to_string()),
            RepositoryError::DataCorruption(msg) => Self::DataCorruption(msg),
            RepositoryError::Conflict(msg) => Self::Conflict(msg),
        }
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        RepositoryError::from(err).into()
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Escape `term` for use inside an `ILIKE` pattern and wrap it in `%`.
#[must_use]
pub fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Store adapter backed by `PostgreSQL`.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Wrap an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn find_account(
        &self,
        username: &str,
        role: AdminRole,
    ) -> Result<Option<AdminAccount>, StoreError> {
        Ok(AdminUserRepository::new(&self.pool)
            .find_account(username, role)
            .await?)
    }

    async fn get_admin(&self, id: &AdminUserId) -> Result<Option<AdminUser>, StoreError> {
        Ok(AdminUserRepository::new(&self.pool).get_by_id(id).await?)
    }

    async fn list_workers(&self, department: Option<&str>) -> Result<Vec<AdminUser>, StoreError> {
        Ok(AdminUserRepository::new(&self.pool)
            .list_workers(department)
            .await?)
    }

    async fn create_worker(
        &self,
        worker: NewWorker,
        password_hash: String,
    ) -> Result<AdminUser, StoreError> {
        let mut tx = self.pool.begin().await?;
        let id = AdminUserId::new(counters::next_id(&mut tx, IdSequence::Workers).await?);
        let user = worker.into_admin_user(id, Utc::now());
        admin_users::insert(&mut tx, &user, &password_hash).await?;
        tx.commit().await?;
        Ok(user)
    }

    async fn update_worker(
        &self,
        id: &AdminUserId,
        update: &WorkerUpdate,
    ) -> Result<AdminUser, StoreError> {
        let mut tx = self.pool.begin().await?;
        let mut worker = admin_users::lock(&mut tx, id)
            .await?
            .filter(|u| u.role == AdminRole::LowerAdmin)
            .ok_or(StoreError::NotFound("Worker"))?;

        update.apply(&mut worker, Utc::now())?;
        admin_users::save_profile(&mut tx, &worker).await?;
        tx.commit().await?;
        Ok(worker)
    }

    async fn list_citizens(&self, filter: &CitizenFilter) -> Result<Vec<Citizen>, StoreError> {
        Ok(CitizenRepository::new(&self.pool).list(filter).await?)
    }

    async fn get_citizen(&self, id: &CitizenId) -> Result<Option<Citizen>, StoreError> {
        Ok(CitizenRepository::new(&self.pool).get_by_id(id).await?)
    }

    async fn list_complaints(
        &self,
        filter: &ComplaintFilter,
        page: PageRequest,
    ) -> Result<ComplaintSlice, StoreError> {
        let repo = ComplaintRepository::new(&self.pool);
        let total = repo.count(filter).await?;
        let complaints = repo.list(filter, page).await?;
        Ok(ComplaintSlice { complaints, total })
    }

    async fn get_complaint(&self, id: &ComplaintId) -> Result<Option<Complaint>, StoreError> {
        Ok(ComplaintRepository::new(&self.pool).get_by_id(id).await?)
    }

    async fn create_complaint(&self, draft: ComplaintDraft) -> Result<Complaint, StoreError> {
        let draft = draft.validate()?;
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let citizen = citizens::bump_total(&mut tx, &draft.user_id, now)
            .await?
            .ok_or(StoreError::NotFound("User"))?;
        let id = ComplaintId::new(counters::next_id(&mut tx, IdSequence::Complaints).await?);
        let complaint = draft.into_complaint(id, citizen.email, citizen.phone, now);
        complaints::insert(&mut tx, &complaint).await?;

        tx.commit().await?;
        Ok(complaint)
    }

    async fn assign_complaint(
        &self,
        id: &ComplaintId,
        worker_id: &AdminUserId,
    ) -> Result<Complaint, StoreError> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;
        let mut complaint = complaints::lock(&mut tx, id)
            .await?
            .ok_or(StoreError::NotFound("Complaint"))?;
        let worker = admin_users::fetch(&mut tx, worker_id)
            .await?
            .ok_or(StoreError::NotFound("Worker"))?;

        let effects = workflow::assign(&mut complaint, &worker, now)?;
        complaints::save(&mut tx, &complaint).await?;
        complaints::apply_effects(&mut tx, &effects, now).await?;
        tx.commit().await?;
        Ok(complaint)
    }

    async fn transfer_complaint(
        &self,
        id: &ComplaintId,
        department: &str,
    ) -> Result<Complaint, StoreError> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;
        let mut complaint = complaints::lock(&mut tx, id)
            .await?
            .ok_or(StoreError::NotFound("Complaint"))?;

        let effects = workflow::transfer(&mut complaint, department, now)?;
        complaints::save(&mut tx, &complaint).await?;
        complaints::apply_effects(&mut tx, &effects, now).await?;
        tx.commit().await?;
        Ok(complaint)
    }

    async fn update_complaint_status(
        &self,
        id: &ComplaintId,
        actor: &AdminUser,
        update: &StatusUpdate,
    ) -> Result<Complaint, StoreError> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;
        let mut complaint = complaints::lock(&mut tx, id)
            .await?
            .ok_or(StoreError::NotFound("Complaint"))?;

        let effects = workflow::update_status(&mut complaint, actor, update, now)?;
        complaints::save(&mut tx, &complaint).await?;
        complaints::apply_effects(&mut tx, &effects, now).await?;
        tx.commit().await?;
        Ok(complaint)
    }

    async fn analytics(&self) -> Result<Analytics, StoreError> {
        Ok(ComplaintRepository::new(&self.pool).analytics().await?)
    }
}
