//! Citizen record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{CitizenId, Email};

/// A member of the public who files complaints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Citizen {
    pub id: CitizenId,
    pub name: String,
    pub email: Email,
    pub phone: String,
    /// Complaints filed by this citizen.
    pub total_complaints: i32,
    /// Complaints filed by this citizen that reached `Completed`.
    pub resolved_complaints: i32,
    pub joined_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
