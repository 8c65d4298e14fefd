//! Persistence port for the complaint desk.
//!
//! Handlers talk to an `Arc<dyn Store>`. Two adapters implement it:
//!
//! - [`crate::db::PgStore`] - `PostgreSQL` through sqlx
//! - [`MemoryStore`] - in-process, seeded from the fixture data set
//!
//! Workflow mutations load the complaint, apply the transition from
//! `civic_desk_core::domain::workflow`, and persist the complaint together
//! with the returned counter effects as one unit.

pub mod memory;

use async_trait::async_trait;
use thiserror::Error;

use civic_desk_core::{
    AdminRole, AdminUser, AdminUserId, Analytics, Citizen, CitizenFilter, CitizenId, Complaint,
    ComplaintDraft, ComplaintFilter, ComplaintId, NewWorker, PageRequest, StatusUpdate,
    ValidationError, WorkerUpdate, WorkflowError,
};

pub use memory::MemoryStore;

/// Errors reported by store adapters.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Requested entity does not exist (names the entity, e.g. "Complaint").
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Uniqueness or state conflict.
    #[error("{0}")]
    Conflict(String),

    /// Workflow transition refused.
    #[error(transparent)]
    Workflow(#[from] WorkflowError),

    /// Input failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Stored data could not be mapped back into domain types.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// The backend itself failed.
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// An admin account with its password hash, as needed for login.
#[derive(Clone)]
pub struct AdminAccount {
    pub user: AdminUser,
    pub password_hash: String,
}

impl std::fmt::Debug for AdminAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminAccount")
            .field("user", &self.user)
            .field("password_hash", &"[REDACTED]")
            .finish()
    }
}

/// One page of complaints and the total number of matches.
#[derive(Debug, Clone)]
pub struct ComplaintSlice {
    pub complaints: Vec<Complaint>,
    pub total: i64,
}

/// Persistence port.
#[async_trait]
pub trait Store: Send + Sync {
    /// Check that the backend is reachable.
    async fn ping(&self) -> Result<(), StoreError>;

    // ---- admin accounts -------------------------------------------------

    /// Find an account by username and role, including its password hash.
    async fn find_account(
        &self,
        username: &str,
        role: AdminRole,
    ) -> Result<Option<AdminAccount>, StoreError>;

    /// Fetch an account by id.
    async fn get_admin(&self, id: &AdminUserId) -> Result<Option<AdminUser>, StoreError>;

    /// Active Lower Admins, newest first, optionally limited to one department.
    async fn list_workers(&self, department: Option<&str>) -> Result<Vec<AdminUser>, StoreError>;

    /// Create a Lower Admin. Username and email must be unique.
    async fn create_worker(
        &self,
        worker: NewWorker,
        password_hash: String,
    ) -> Result<AdminUser, StoreError>;

    /// Update a Lower Admin. Main Admin accounts are reported as not found.
    async fn update_worker(
        &self,
        id: &AdminUserId,
        update: &WorkerUpdate,
    ) -> Result<AdminUser, StoreError>;

    // ---- citizens -------------------------------------------------------

    /// Citizens matching `filter`, in id order.
    async fn list_citizens(&self, filter: &CitizenFilter) -> Result<Vec<Citizen>, StoreError>;

    async fn get_citizen(&self, id: &CitizenId) -> Result<Option<Citizen>, StoreError>;

    // ---- complaints -----------------------------------------------------

    /// Complaints matching `filter`, newest first, one page at a time.
    async fn list_complaints(
        &self,
        filter: &ComplaintFilter,
        page: PageRequest,
    ) -> Result<ComplaintSlice, StoreError>;

    async fn get_complaint(&self, id: &ComplaintId) -> Result<Option<Complaint>, StoreError>;

    /// File a complaint for an existing citizen and bump their total.
    async fn create_complaint(&self, draft: ComplaintDraft) -> Result<Complaint, StoreError>;

    /// Assign a complaint to a worker.
    async fn assign_complaint(
        &self,
        id: &ComplaintId,
        worker_id: &AdminUserId,
    ) -> Result<Complaint, StoreError>;

    /// Move a complaint to another department.
    async fn transfer_complaint(
        &self,
        id: &ComplaintId,
        department: &str,
    ) -> Result<Complaint, StoreError>;

    /// Apply a status update on behalf of `actor`.
    async fn update_complaint_status(
        &self,
        id: &ComplaintId,
        actor: &AdminUser,
        update: &StatusUpdate,
    ) -> Result<Complaint, StoreError>;

    /// Dashboard analytics over every complaint.
    async fn analytics(&self) -> Result<Analytics, StoreError>;
}
