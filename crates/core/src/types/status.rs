//! Status, priority and role enums.
//!
//! Wire values are the human-readable labels used by the dashboard
//! (`"In Progress"`, `"Main Admin"`). Parsing is lenient about case and
//! separators so query strings like `?status=in_progress` work.

use serde::{Deserialize, Serialize};

/// Error returned when an enum label cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {kind}: {value}")]
pub struct ParseLabelError {
    /// Which enum was being parsed.
    pub kind: &'static str,
    /// The rejected input.
    pub value: String,
}

/// Lower-case a label and fold `_`/`-` into spaces.
fn normalize_label(s: &str) -> String {
    s.trim()
        .chars()
        .map(|c| match c {
            '_' | '-' => ' ',
            other => other.to_ascii_lowercase(),
        })
        .collect()
}

/// Lifecycle status of a complaint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(feature = "postgres", sqlx(type_name = "complaint_status"))]
pub enum ComplaintStatus {
    #[default]
    Pending,
    #[serde(rename = "In Progress")]
    #[cfg_attr(feature = "postgres", sqlx(rename = "In Progress"))]
    InProgress,
    Completed,
}

impl ComplaintStatus {
    /// All statuses in workflow order.
    pub const ALL: [Self; 3] = [Self::Pending, Self::InProgress, Self::Completed];

    /// Display label, identical to the wire value.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::InProgress => "In Progress",
            Self::Completed => "Completed",
        }
    }

    /// Whether a worker may move a complaint into this status.
    ///
    /// Returning a complaint to `Pending` only happens through a transfer.
    #[must_use]
    pub const fn is_worker_settable(self) -> bool {
        matches!(self, Self::InProgress | Self::Completed)
    }
}

impl std::fmt::Display for ComplaintStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for ComplaintStatus {
    type Err = ParseLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_label(s).as_str() {
            "pending" => Ok(Self::Pending),
            "in progress" | "inprogress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            _ => Err(ParseLabelError {
                kind: "status",
                value: s.to_owned(),
            }),
        }
    }
}

/// Urgency of a complaint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(feature = "postgres", sqlx(type_name = "complaint_priority"))]
pub enum ComplaintPriority {
    Critical,
    High,
    Medium,
    Low,
}

impl ComplaintPriority {
    /// All priorities from most to least urgent.
    pub const ALL: [Self; 4] = [Self::Critical, Self::High, Self::Medium, Self::Low];

    /// Display label, identical to the wire value.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Critical => "Critical",
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }
}

impl std::fmt::Display for ComplaintPriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for ComplaintPriority {
    type Err = ParseLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_label(s).as_str() {
            "critical" => Ok(Self::Critical),
            "high" => Ok(Self::High),
            "medium" => Ok(Self::Medium),
            "low" => Ok(Self::Low),
            _ => Err(ParseLabelError {
                kind: "priority",
                value: s.to_owned(),
            }),
        }
    }
}

/// Admin role with different permission levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(feature = "postgres", sqlx(type_name = "admin_role"))]
pub enum AdminRole {
    /// Sees every complaint, citizen and worker; assigns and transfers.
    #[serde(rename = "Main Admin")]
    #[cfg_attr(feature = "postgres", sqlx(rename = "Main Admin"))]
    MainAdmin,
    /// Department worker; sees and updates only their assigned complaints.
    #[serde(rename = "Lower Admin")]
    #[cfg_attr(feature = "postgres", sqlx(rename = "Lower Admin"))]
    LowerAdmin,
}

impl AdminRole {
    /// Display label, identical to the wire value.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::MainAdmin => "Main Admin",
            Self::LowerAdmin => "Lower Admin",
        }
    }
}

impl std::fmt::Display for AdminRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for AdminRole {
    type Err = ParseLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_label(s).as_str() {
            "main admin" | "mainadmin" => Ok(Self::MainAdmin),
            "lower admin" | "loweradmin" | "worker" => Ok(Self::LowerAdmin),
            _ => Err(ParseLabelError {
                kind: "admin role",
                value: s.to_owned(),
            }),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_status_wire_values() {
        assert_eq!(
            serde_json::to_string(&ComplaintStatus::InProgress).unwrap(),
            "\"In Progress\""
        );
        let parsed: ComplaintStatus = serde_json::from_str("\"Completed\"").unwrap();
        assert_eq!(parsed, ComplaintStatus::Completed);
    }

    #[test]
    fn test_status_parse_is_lenient() {
        for input in ["pending", "PENDING", " Pending "] {
            assert_eq!(input.parse::<ComplaintStatus>().unwrap(), ComplaintStatus::Pending);
        }
        for input in ["in progress", "In Progress", "in_progress", "in-progress", "inprogress"] {
            assert_eq!(
                input.parse::<ComplaintStatus>().unwrap(),
                ComplaintStatus::InProgress
            );
        }
        assert!("done".parse::<ComplaintStatus>().is_err());
    }

    #[test]
    fn test_worker_settable_statuses() {
        assert!(!ComplaintStatus::Pending.is_worker_settable());
        assert!(ComplaintStatus::InProgress.is_worker_settable());
        assert!(ComplaintStatus::Completed.is_worker_settable());
    }

    #[test]
    fn test_priority_parse() {
        assert_eq!("critical".parse::<ComplaintPriority>().unwrap(), ComplaintPriority::Critical);
        assert_eq!("Low".parse::<ComplaintPriority>().unwrap(), ComplaintPriority::Low);
        let err = "urgent".parse::<ComplaintPriority>().unwrap_err();
        assert_eq!(err.to_string(), "invalid priority: urgent");
    }

    #[test]
    fn test_role_round_trip_labels() {
        assert_eq!(
            serde_json::to_string(&AdminRole::LowerAdmin).unwrap(),
            "\"Lower Admin\""
        );
        assert_eq!("main_admin".parse::<AdminRole>().unwrap(), AdminRole::MainAdmin);
        assert_eq!(AdminRole::MainAdmin.to_string(), "Main Admin");
    }
}
