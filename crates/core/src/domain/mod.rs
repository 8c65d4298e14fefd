//! Domain records and the rules that mutate them.
//!
//! Records mirror the rows the dashboard displays. The [`workflow`] module is
//! the only place that changes a complaint's assignment or status; storage
//! adapters load a record, call into it, persist the result and apply the
//! returned [`CounterEffects`].

pub mod admin_user;
pub mod analytics;
pub mod citizen;
pub mod complaint;
pub mod filter;
pub mod payloads;
pub mod workflow;

pub use admin_user::{AdminUser, MIN_PASSWORD_LENGTH, NewWorker, WorkerDraft, WorkerUpdate};
pub use analytics::{Analytics, DepartmentStats, format_resolution_time};
pub use citizen::Citizen;
pub use complaint::{Complaint, ComplaintDraft};
pub use filter::{CitizenFilter, ComplaintFilter, FilterError, contains_ignore_case};
pub use payloads::{
    AssignRequest, ComplaintListQuery, ComplaintPage, LoginRequest, LoginResponse,
    StatusUpdate, TransferRequest, UploadResult,
};
pub use workflow::{CounterEffects, WorkerCounterChange, WorkflowError};

/// Error raised when an input record fails validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {reason}")]
pub struct ValidationError {
    /// Field that failed validation (wire name).
    pub field: &'static str,
    /// Human readable reason.
    pub reason: String,
}

impl ValidationError {
    /// Create a validation error for `field`.
    #[must_use]
    pub fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

/// Trim `value` and reject it when nothing is left.
///
/// # Errors
///
/// Returns a [`ValidationError`] naming `field` when the trimmed value is empty.
pub fn require_text(field: &'static str, value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::new(field, "is required"));
    }
    Ok(trimmed.to_owned())
}
