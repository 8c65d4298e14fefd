//! Admin and worker accounts.

use core::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ValidationError, require_text};
use crate::types::{AdminRole, AdminUserId, Email};

/// Minimum length for account passwords.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// An admin account as exposed over the API.
///
/// The password hash lives only in storage and never appears here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUser {
    pub id: AdminUserId,
    pub username: String,
    pub name: String,
    pub email: Email,
    pub role: AdminRole,
    /// Department for Lower Admins; `None` for Main Admins.
    #[serde(default)]
    pub department: Option<String>,
    pub assigned_complaints: i32,
    pub completed_complaints: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AdminUser {
    /// Whether this account has full dashboard access.
    #[must_use]
    pub fn is_main_admin(&self) -> bool {
        self.role == AdminRole::MainAdmin
    }

    /// Whether this account belongs to `department`, ignoring case.
    #[must_use]
    pub fn works_in(&self, department: &str) -> bool {
        self.department
            .as_deref()
            .is_some_and(|d| d.trim().eq_ignore_ascii_case(department.trim()))
    }
}

/// Request body for creating a Lower Admin.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerDraft {
    pub username: String,
    pub password: String,
    pub name: String,
    pub email: String,
    pub department: String,
}

impl fmt::Debug for WorkerDraft {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkerDraft")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("department", &self.department)
            .finish()
    }
}

/// A [`WorkerDraft`] that passed validation.
#[derive(Clone, PartialEq, Eq)]
pub struct NewWorker {
    pub username: String,
    pub password: String,
    pub name: String,
    pub email: Email,
    pub department: String,
}

impl fmt::Debug for NewWorker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewWorker")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("email", &self.email)
            .field("department", &self.department)
            .finish_non_exhaustive()
    }
}

impl WorkerDraft {
    /// Validate and normalize the draft.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] when a field is blank, the username
    /// contains whitespace, the password is shorter than
    /// [`MIN_PASSWORD_LENGTH`], or the email does not parse.
    pub fn validate(self) -> Result<NewWorker, ValidationError> {
        let username = require_text("username", &self.username)?;
        if username.chars().any(char::is_whitespace) {
            return Err(ValidationError::new("username", "cannot contain whitespace"));
        }
        if self.password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(ValidationError::new(
                "password",
                format!("must be at least {MIN_PASSWORD_LENGTH} characters"),
            ));
        }
        let email =
            Email::parse(&self.email).map_err(|e| ValidationError::new("email", e.to_string()))?;
        Ok(NewWorker {
            username,
            password: self.password,
            name: require_text("name", &self.name)?,
            email,
            department: require_text("department", &self.department)?,
        })
    }
}

impl NewWorker {
    /// Build the account record for this worker.
    #[must_use]
    pub fn into_admin_user(self, id: AdminUserId, now: DateTime<Utc>) -> AdminUser {
        AdminUser {
            id,
            username: self.username,
            name: self.name,
            email: self.email,
            role: AdminRole::LowerAdmin,
            department: Some(self.department),
            assigned_complaints: 0,
            completed_complaints: 0,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update of a worker account. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl WorkerUpdate {
    /// Whether the update changes nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.department.is_none()
            && self.is_active.is_none()
    }

    /// Validate the update and apply it to `worker`.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] when a provided text field is blank or
    /// the email does not parse. `worker` is untouched on error.
    pub fn apply(&self, worker: &mut AdminUser, now: DateTime<Utc>) -> Result<(), ValidationError> {
        let name = self
            .name
            .as_deref()
            .map(|n| require_text("name", n))
            .transpose()?;
        let email = self
            .email
            .as_deref()
            .map(|e| Email::parse(e).map_err(|err| ValidationError::new("email", err.to_string())))
            .transpose()?;
        let department = self
            .department
            .as_deref()
            .map(|d| require_text("department", d))
            .transpose()?;

        if let Some(name) = name {
            worker.name = name;
        }
        if let Some(email) = email {
            worker.email = email;
        }
        if let Some(department) = department {
            worker.department = Some(department);
        }
        if let Some(active) = self.is_active {
            worker.is_active = active;
        }
        worker.updated_at = now;
        Ok(())
    }
}
