//! Worker (Lower Admin) management commands.
//!
//! # Usage
//!
//! ```bash
//! # Create a worker; the password is read from DESK_WORKER_PASSWORD when
//! # --password is omitted
//! desk-cli worker create -u mike.wilson -n "Mike Wilson" \
//!     -e mike.wilson@municipality.gov -d "Public Works"
//!
//! # List active workers
//! desk-cli worker list -d "Water Department"
//! ```

use civic_desk_core::WorkerDraft;
use civic_desk_server::db::PgStore;
use civic_desk_server::services::auth::hash_password;
use civic_desk_server::store::Store;

use super::{CommandError, connect};

/// Create a worker account.
///
/// # Errors
///
/// Returns an error for invalid fields, a taken username or email, or a
/// database failure.
pub async fn create(draft: WorkerDraft) -> Result<(), CommandError> {
    let worker = draft.validate()?;
    let password_hash = hash_password(&worker.password)?;

    let store = PgStore::new(connect().await?);
    tracing::info!("Creating worker: {} ({})", worker.username, worker.department);
    let created = store.create_worker(worker, password_hash).await?;

    tracing::info!(
        "Worker created successfully! ID: {}, Username: {}, Department: {}",
        created.id,
        created.username,
        created.department.as_deref().unwrap_or("-"),
    );
    Ok(())
}

/// Log every active worker, optionally limited to one department.
///
/// # Errors
///
/// Returns an error if the database is unreachable.
pub async fn list(department: Option<&str>) -> Result<(), CommandError> {
    let store = PgStore::new(connect().await?);
    let workers = store.list_workers(department).await?;

    for worker in &workers {
        tracing::info!(
            id = %worker.id,
            username = %worker.username,
            department = worker.department.as_deref().unwrap_or("-"),
            assigned = worker.assigned_complaints,
            completed = worker.completed_complaints,
            "{}",
            worker.name
        );
    }
    tracing::info!(count = workers.len(), "Workers listed");
    Ok(())
}
