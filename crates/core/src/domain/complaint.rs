//! Complaint record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ValidationError, require_text};
use crate::types::{AdminUserId, CitizenId, ComplaintId, ComplaintPriority, ComplaintStatus, Email};

/// A citizen-submitted service request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Complaint {
    pub id: ComplaintId,
    pub title: String,
    pub description: String,
    pub category: String,
    pub department: String,
    pub priority: ComplaintPriority,
    pub status: ComplaintStatus,
    pub user_id: CitizenId,
    pub user_email: Email,
    pub user_phone: String,
    /// Worker currently responsible, if any.
    #[serde(default)]
    pub assigned_to: Option<AdminUserId>,
    /// Display name of `assigned_to`, copied at assignment time.
    #[serde(default)]
    pub assigned_worker: Option<String>,
    /// Stored upload names, in the order they were attached.
    #[serde(default)]
    pub proof_images: Vec<String>,
    #[serde(default)]
    pub remarks: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Complaint {
    /// Whether `worker` is the current assignee.
    #[must_use]
    pub fn is_assigned_to(&self, worker: &AdminUserId) -> bool {
        self.assigned_to.as_ref() == Some(worker)
    }

    /// Whether the assignee's `assignedComplaints` counter currently
    /// includes this complaint.
    ///
    /// Completion moves the complaint from the assigned to the completed
    /// counter, so only open, assigned complaints are counted.
    #[must_use]
    pub fn counts_as_assigned(&self) -> bool {
        self.assigned_to.is_some() && self.status != ComplaintStatus::Completed
    }
}

/// Input for filing a new complaint on behalf of a citizen.
///
/// Email and phone are not part of the draft; they are copied from the
/// citizen record when the complaint is stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplaintDraft {
    pub title: String,
    pub description: String,
    pub category: String,
    pub department: String,
    pub priority: ComplaintPriority,
    pub user_id: CitizenId,
}

impl ComplaintDraft {
    /// Trim text fields and reject empty ones.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] for the first blank field.
    pub fn validate(self) -> Result<Self, ValidationError> {
        let user_id = require_text("userId", self.user_id.as_str())?;
        Ok(Self {
            title: require_text("title", &self.title)?,
            description: require_text("description", &self.description)?,
            category: require_text("category", &self.category)?,
            department: require_text("department", &self.department)?,
            priority: self.priority,
            user_id: CitizenId::new(user_id),
        })
    }

    /// Build the stored record for this draft.
    #[must_use]
    pub fn into_complaint(
        self,
        id: ComplaintId,
        user_email: Email,
        user_phone: String,
        now: DateTime<Utc>,
    ) -> Complaint {
        Complaint {
            id,
            title: self.title,
            description: self.description,
            category: self.category,
            department: self.department,
            priority: self.priority,
            status: ComplaintStatus::Pending,
            user_id: self.user_id,
            user_email,
            user_phone,
            assigned_to: None,
            assigned_worker: None,
            proof_images: Vec::new(),
            remarks: String::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn draft() -> ComplaintDraft {
        ComplaintDraft {
            title: "  Fallen tree ".to_owned(),
            description: "Tree blocking the footpath".to_owned(),
            category: "Parks".to_owned(),
            department: "Parks & Recreation".to_owned(),
            priority: ComplaintPriority::Medium,
            user_id: CitizenId::new("USER002"),
        }
    }

    #[test]
    fn test_draft_validation_trims() {
        let draft = draft().validate().unwrap();
        assert_eq!(draft.title, "Fallen tree");
    }

    #[test]
    fn test_draft_validation_rejects_blank() {
        let mut bad = draft();
        bad.description = "   ".to_owned();
        let err = bad.validate().unwrap_err();
        assert_eq!(err.field, "description");
    }

    #[test]
    fn test_new_complaint_starts_pending_and_unassigned() {
        let now = Utc::now();
        let complaint = draft().validate().unwrap().into_complaint(
            ComplaintId::new("CMP006"),
            Email::parse("sarah.smith@email.com").unwrap(),
            "+1234567891".to_owned(),
            now,
        );
        assert_eq!(complaint.status, ComplaintStatus::Pending);
        assert!(complaint.assigned_to.is_none());
        assert!(!complaint.counts_as_assigned());
        assert_eq!(complaint.created_at, complaint.updated_at);
    }

    #[test]
    fn test_wire_field_names_are_camel_case() {
        let complaint = draft().validate().unwrap().into_complaint(
            ComplaintId::new("CMP006"),
            Email::parse("sarah.smith@email.com").unwrap(),
            "+1234567891".to_owned(),
            Utc::now(),
        );
        let json = serde_json::to_value(&complaint).unwrap();
        assert_eq!(json["userEmail"], "sarah.smith@email.com");
        assert_eq!(json["status"], "Pending");
        assert!(json["assignedTo"].is_null());
        assert!(json["proofImages"].as_array().unwrap().is_empty());
    }
}
