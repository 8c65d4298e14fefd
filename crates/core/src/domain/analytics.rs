//! Dashboard analytics.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::Complaint;
use crate::types::{ComplaintPriority, ComplaintStatus};

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Per-department complaint counts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentStats {
    pub department: String,
    pub total: i64,
    pub completed: i64,
    pub pending: i64,
    pub in_progress: i64,
}

impl DepartmentStats {
    fn count(&mut self, status: ComplaintStatus) {
        self.total += 1;
        match status {
            ComplaintStatus::Pending => self.pending += 1,
            ComplaintStatus::InProgress => self.in_progress += 1,
            ComplaintStatus::Completed => self.completed += 1,
        }
    }
}

/// Summary shown on the Main Admin dashboard.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Analytics {
    pub total_complaints: i64,
    pub pending_complaints: i64,
    pub in_progress_complaints: i64,
    pub completed_complaints: i64,
    pub critical_complaints: i64,
    /// Mean time from filing to last update over completed complaints.
    pub average_resolution_time: String,
    /// Sorted by department name.
    pub department_stats: Vec<DepartmentStats>,
}

impl Analytics {
    /// Compute analytics over a full complaint set.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn from_complaints<'a>(complaints: impl IntoIterator<Item = &'a Complaint>) -> Self {
        let mut analytics = Self::default();
        let mut departments: BTreeMap<String, DepartmentStats> = BTreeMap::new();
        let mut resolution_secs = 0_i64;

        for complaint in complaints {
            analytics.total_complaints += 1;
            match complaint.status {
                ComplaintStatus::Pending => analytics.pending_complaints += 1,
                ComplaintStatus::InProgress => analytics.in_progress_complaints += 1,
                ComplaintStatus::Completed => {
                    analytics.completed_complaints += 1;
                    resolution_secs += (complaint.updated_at - complaint.created_at).num_seconds();
                }
            }
            if complaint.priority == ComplaintPriority::Critical {
                analytics.critical_complaints += 1;
            }
            departments
                .entry(complaint.department.clone())
                .or_insert_with(|| DepartmentStats {
                    department: complaint.department.clone(),
                    ..DepartmentStats::default()
                })
                .count(complaint.status);
        }

        let average = (analytics.completed_complaints > 0)
            .then(|| resolution_secs as f64 / analytics.completed_complaints as f64);
        analytics.average_resolution_time = format_resolution_time(average);
        analytics.department_stats = departments.into_values().collect();
        analytics
    }
}

/// Render a mean resolution time in seconds as `"<x.y> days"`.
///
/// `None` (nothing completed yet) renders as `"N/A"`.
#[must_use]
pub fn format_resolution_time(average_secs: Option<f64>) -> String {
    average_secs.map_or_else(
        || "N/A".to_owned(),
        |secs| format!("{:.1} days", secs.max(0.0) / SECONDS_PER_DAY),
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;
    use crate::fixtures;

    #[test]
    fn test_fixture_analytics() {
        let now = Utc::now();
        let analytics = Analytics::from_complaints(&fixtures::complaints(now));

        assert_eq!(analytics.total_complaints, 5);
        assert_eq!(analytics.pending_complaints, 2);
        assert_eq!(analytics.in_progress_complaints, 2);
        assert_eq!(analytics.completed_complaints, 1);
        assert_eq!(analytics.critical_complaints, 2);
        // CMP003: filed 3d16h ago, closed 11h ago.
        assert_eq!(analytics.average_resolution_time, "3.2 days");

        let names: Vec<_> = analytics
            .department_stats
            .iter()
            .map(|d| d.department.as_str())
            .collect();
        assert_eq!(
            names,
            vec!["Public Works", "Traffic Management", "Waste Management", "Water Department"]
        );
        let public_works = &analytics.department_stats[0];
        assert_eq!(public_works.total, 2);
        assert_eq!(public_works.in_progress, 2);
    }

    #[test]
    fn test_empty_analytics() {
        let analytics = Analytics::from_complaints(std::iter::empty());
        assert_eq!(analytics.total_complaints, 0);
        assert_eq!(analytics.average_resolution_time, "N/A");
        assert!(analytics.department_stats.is_empty());
    }

    #[test]
    fn test_format_resolution_time() {
        let secs = Duration::hours(60).num_seconds();
        #[allow(clippy::cast_precision_loss)]
        let formatted = format_resolution_time(Some(secs as f64));
        assert_eq!(formatted, "2.5 days");
        assert_eq!(format_resolution_time(None), "N/A");
    }

    #[test]
    fn test_wire_names() {
        let json = serde_json::to_value(Analytics::from_complaints(&fixtures::complaints(Utc::now())))
            .unwrap();
        assert!(json["averageResolutionTime"].is_string());
        assert!(json["departmentStats"][0]["inProgress"].is_number());
    }
}
