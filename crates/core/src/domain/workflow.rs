//! Complaint workflow transitions.
//!
//! Each transition mutates a [`Complaint`] in place and returns the
//! [`CounterEffects`] the caller must apply to worker and citizen counters in
//! the same unit of work. Nothing here touches storage.

use chrono::{DateTime, Utc};

use super::{AdminUser, Complaint, StatusUpdate};
use crate::types::{AdminRole, AdminUserId, CitizenId, ComplaintStatus};

/// Why a transition was refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorkflowError {
    /// Completed complaints cannot be reassigned or transferred.
    #[error("complaint is already completed")]
    AlreadyCompleted,

    /// The target account is not a Lower Admin.
    #[error("{0} is not a worker account")]
    NotAWorker(AdminUserId),

    /// The target worker is deactivated.
    #[error("worker {0} is inactive")]
    WorkerInactive(AdminUserId),

    /// The worker belongs to another department.
    #[error("worker belongs to {worker_department}, complaint is in {complaint_department}")]
    DepartmentMismatch {
        worker_department: String,
        complaint_department: String,
    },

    /// Transfer destination is blank.
    #[error("department is required")]
    EmptyDepartment,

    /// Status cannot be set through a status update.
    #[error("status cannot be set to {0}")]
    StatusNotSettable(ComplaintStatus),

    /// A Lower Admin tried to update someone else's complaint.
    #[error("complaint not found or not assigned to you")]
    NotAssignee,

    /// A proof reference is not a bare file name.
    #[error("invalid proof file name: {0}")]
    InvalidProofName(String),
}

/// Change to a worker's counters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerCounterChange {
    pub worker_id: AdminUserId,
    /// Delta for `assignedComplaints`.
    pub assigned: i32,
    /// Delta for `completedComplaints`.
    pub completed: i32,
}

/// Counter updates produced by a transition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CounterEffects {
    pub workers: Vec<WorkerCounterChange>,
    /// Citizen whose `resolvedComplaints` changes, with the delta.
    pub citizen_resolved: Option<(CitizenId, i32)>,
}

impl CounterEffects {
    /// Whether applying these effects is a no-op.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.workers.is_empty() && self.citizen_resolved.is_none()
    }

    fn worker(&mut self, worker_id: AdminUserId, assigned: i32, completed: i32) {
        self.workers.push(WorkerCounterChange {
            worker_id,
            assigned,
            completed,
        });
    }
}

/// Assign `complaint` to `worker`.
///
/// The complaint moves to `In Progress`. The new worker's assigned count goes
/// up and a different previous assignee's goes down; reassigning to the same
/// worker leaves counters alone.
///
/// # Errors
///
/// Returns an error if the complaint is completed, or the worker is not an
/// active Lower Admin of the complaint's department.
pub fn assign(
    complaint: &mut Complaint,
    worker: &AdminUser,
    now: DateTime<Utc>,
) -> Result<CounterEffects, WorkflowError> {
    if complaint.status == ComplaintStatus::Completed {
        return Err(WorkflowError::AlreadyCompleted);
    }
    if worker.role != AdminRole::LowerAdmin {
        return Err(WorkflowError::NotAWorker(worker.id.clone()));
    }
    if !worker.is_active {
        return Err(WorkflowError::WorkerInactive(worker.id.clone()));
    }
    if !worker.works_in(&complaint.department) {
        return Err(WorkflowError::DepartmentMismatch {
            worker_department: worker.department.clone().unwrap_or_default(),
            complaint_department: complaint.department.clone(),
        });
    }

    let mut effects = CounterEffects::default();
    if !complaint.is_assigned_to(&worker.id) {
        if let Some(previous) = complaint.assigned_to.clone() {
            effects.worker(previous, -1, 0);
        }
        effects.worker(worker.id.clone(), 1, 0);
    }

    complaint.assigned_to = Some(worker.id.clone());
    complaint.assigned_worker = Some(worker.name.clone());
    complaint.status = ComplaintStatus::InProgress;
    complaint.updated_at = now;
    Ok(effects)
}

/// Move `complaint` to `department`, clearing the assignee and resetting it
/// to `Pending`.
///
/// # Errors
///
/// Returns an error if the department is blank or the complaint is
/// completed.
pub fn transfer(
    complaint: &mut Complaint,
    department: &str,
    now: DateTime<Utc>,
) -> Result<CounterEffects, WorkflowError> {
    let department = department.trim();
    if department.is_empty() {
        return Err(WorkflowError::EmptyDepartment);
    }
    if complaint.status == ComplaintStatus::Completed {
        return Err(WorkflowError::AlreadyCompleted);
    }

    let mut effects = CounterEffects::default();
    if let Some(previous) = complaint.assigned_to.take() {
        effects.worker(previous, -1, 0);
    }

    department.clone_into(&mut complaint.department);
    complaint.assigned_worker = None;
    complaint.status = ComplaintStatus::Pending;
    complaint.updated_at = now;
    Ok(effects)
}

/// Apply a status update made by `actor`.
///
/// Proof names are appended and remarks replaced. Entering `Completed` moves
/// the assignee's count from assigned to completed and bumps the citizen's
/// resolved count; leaving `Completed` reverses that, so counters change
/// exactly once per transition.
///
/// # Errors
///
/// Returns an error if the status is `Pending`, a Lower Admin is not the
/// assignee, or a proof name is not a bare file name.
pub fn update_status(
    complaint: &mut Complaint,
    actor: &AdminUser,
    update: &StatusUpdate,
    now: DateTime<Utc>,
) -> Result<CounterEffects, WorkflowError> {
    if actor.role == AdminRole::LowerAdmin && !complaint.is_assigned_to(&actor.id) {
        return Err(WorkflowError::NotAssignee);
    }
    if !update.status.is_worker_settable() {
        return Err(WorkflowError::StatusNotSettable(update.status));
    }
    for name in &update.proof_images {
        validate_proof_name(name)?;
    }

    let was_completed = complaint.status == ComplaintStatus::Completed;
    let now_completed = update.status == ComplaintStatus::Completed;

    let mut effects = CounterEffects::default();
    if was_completed != now_completed {
        let delta = if now_completed { 1 } else { -1 };
        if let Some(worker) = complaint.assigned_to.clone() {
            effects.worker(worker, -delta, delta);
        }
        effects.citizen_resolved = Some((complaint.user_id.clone(), delta));
    }

    complaint.status = update.status;
    complaint
        .proof_images
        .extend(update.proof_images.iter().map(|n| n.trim().to_owned()));
    update.remarks.trim().clone_into(&mut complaint.remarks);
    complaint.updated_at = now;
    Ok(effects)
}

/// Check that `name` is a bare file name as produced by the upload endpoint.
///
/// # Errors
///
/// Returns [`WorkflowError::InvalidProofName`] for empty names, names with
/// path separators, and `.`/`..`.
pub fn validate_proof_name(name: &str) -> Result<(), WorkflowError> {
    let trimmed = name.trim();
    if trimmed.is_empty()
        || trimmed == "."
        || trimmed == ".."
        || trimmed.contains(['/', '\\'])
        || trimmed.contains('\0')
    {
        return Err(WorkflowError::InvalidProofName(name.to_owned()));
    }
    Ok(())
}
