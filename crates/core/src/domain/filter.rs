//! Case-insensitive search and filter predicates.
//!
//! The in-memory store and client-side views use these directly; the
//! PostgreSQL adapter expresses the same predicates with `ILIKE`.

use super::{Citizen, Complaint, ComplaintListQuery};
use crate::types::{AdminUserId, ComplaintPriority, ComplaintStatus, ParseLabelError};

/// Error building a filter from query parameters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error(transparent)]
pub struct FilterError(#[from] ParseLabelError);

/// Whether `haystack` contains `needle`, ignoring case.
#[must_use]
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Treat blank values and `all` as "no filter".
fn active(value: Option<&str>) -> Option<&str> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("all"))
}

/// Filter over complaints. `None` fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComplaintFilter {
    /// Substring of title, id, citizen email or description.
    pub search: Option<String>,
    pub status: Option<ComplaintStatus>,
    pub department: Option<String>,
    pub priority: Option<ComplaintPriority>,
    /// Restrict to one assignee. Set for Lower Admins.
    pub assigned_to: Option<AdminUserId>,
}

impl ComplaintFilter {
    /// Build a filter from raw query parameters.
    ///
    /// # Errors
    ///
    /// Returns a [`FilterError`] if `status` or `priority` is not a known
    /// label (other than `all`).
    pub fn from_query(query: &ComplaintListQuery) -> Result<Self, FilterError> {
        Ok(Self {
            search: active(query.search.as_deref()).map(str::to_owned),
            status: active(query.status.as_deref())
                .map(str::parse)
                .transpose()?,
            department: active(query.department.as_deref()).map(str::to_owned),
            priority: active(query.priority.as_deref())
                .map(str::parse)
                .transpose()?,
            assigned_to: None,
        })
    }

    /// Restrict the filter to complaints assigned to `worker`.
    #[must_use]
    pub fn for_assignee(mut self, worker: AdminUserId) -> Self {
        self.assigned_to = Some(worker);
        self
    }

    /// Whether `complaint` passes every active predicate.
    #[must_use]
    pub fn matches(&self, complaint: &Complaint) -> bool {
        if let Some(worker) = &self.assigned_to {
            if !complaint.is_assigned_to(worker) {
                return false;
            }
        }
        if self.status.is_some_and(|s| s != complaint.status) {
            return false;
        }
        if self.priority.is_some_and(|p| p != complaint.priority) {
            return false;
        }
        if let Some(department) = &self.department {
            if !complaint.department.eq_ignore_ascii_case(department) {
                return false;
            }
        }
        self.search.as_deref().is_none_or(|q| {
            contains_ignore_case(&complaint.title, q)
                || contains_ignore_case(complaint.id.as_str(), q)
                || contains_ignore_case(complaint.user_email.as_str(), q)
                || contains_ignore_case(&complaint.description, q)
        })
    }

    /// Matching complaints, newest first.
    #[must_use]
    pub fn apply<'a>(&self, complaints: impl IntoIterator<Item = &'a Complaint>) -> Vec<&'a Complaint> {
        let mut matched: Vec<_> = complaints.into_iter().filter(|c| self.matches(c)).collect();
        matched.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        matched
    }
}

/// Filter over citizens.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CitizenFilter {
    /// Substring of name, email, phone or id.
    pub search: Option<String>,
}

impl CitizenFilter {
    /// Filter on a free-text search term. Blank terms match everything.
    #[must_use]
    pub fn search(term: Option<&str>) -> Self {
        Self {
            search: active(term).map(str::to_owned),
        }
    }

    #[must_use]
    pub fn matches(&self, citizen: &Citizen) -> bool {
        self.search.as_deref().is_none_or(|q| {
            contains_ignore_case(&citizen.name, q)
                || contains_ignore_case(citizen.email.as_str(), q)
                || contains_ignore_case(&citizen.phone, q)
                || contains_ignore_case(citizen.id.as_str(), q)
        })
    }

    /// Matching citizens, in id order.
    #[must_use]
    pub fn apply<'a>(&self, citizens: impl IntoIterator<Item = &'a Citizen>) -> Vec<&'a Citizen> {
        let mut matched: Vec<_> = citizens.into_iter().filter(|c| self.matches(c)).collect();
        matched.sort_by(|a, b| a.id.cmp(&b.id));
        matched
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::fixtures;

    fn query(status: Option<&str>) -> ComplaintListQuery {
        ComplaintListQuery {
            status: status.map(str::to_owned),
            ..ComplaintListQuery::default()
        }
    }

    #[test]
    fn test_status_filter_is_case_insensitive() {
        let complaints = fixtures::complaints(Utc::now());
        let filter = ComplaintFilter::from_query(&query(Some("pending"))).unwrap();
        let ids: Vec<_> = filter.apply(&complaints).iter().map(|c| c.id.as_str()).collect();

        let expected = complaints
            .iter()
            .filter(|c| c.status.label().eq_ignore_ascii_case("pending"))
            .count();
        assert_eq!(ids.len(), expected);
        assert_eq!(ids, vec!["CMP005", "CMP002"]);
    }

    #[test]
    fn test_all_disables_filter() {
        let complaints = fixtures::complaints(Utc::now());
        let q = ComplaintListQuery {
            status: Some("all".to_owned()),
            department: Some("ALL".to_owned()),
            priority: Some(String::new()),
            ..ComplaintListQuery::default()
        };
        let filter = ComplaintFilter::from_query(&q).unwrap();
        assert_eq!(filter, ComplaintFilter::default());
        assert_eq!(filter.apply(&complaints).len(), complaints.len());
    }

    #[test]
    fn test_unknown_status_is_an_error() {
        assert!(ComplaintFilter::from_query(&query(Some("closed"))).is_err());
    }

    #[test]
    fn test_search_matches_several_fields() {
        let complaints = fixtures::complaints(Utc::now());
        let search = |term: &str| {
            let filter = ComplaintFilter {
                search: Some(term.to_owned()),
                ..ComplaintFilter::default()
            };
            filter
                .apply(&complaints)
                .iter()
                .map(|c| c.id.as_str().to_owned())
                .collect::<Vec<_>>()
        };
        assert_eq!(search("street light"), vec!["CMP001"]);
        assert_eq!(search("cmp003"), vec!["CMP003"]);
        assert_eq!(search("EMMA.DAVIS"), vec!["CMP004"]);
        assert_eq!(search("central park"), vec!["CMP002"]);
    }

    #[test]
    fn test_department_and_assignee_filters() {
        let complaints = fixtures::complaints(Utc::now());
        let filter = ComplaintFilter {
            department: Some("public works".to_owned()),
            ..ComplaintFilter::default()
        };
        assert_eq!(filter.apply(&complaints).len(), 2);

        let mine = ComplaintFilter::default().for_assignee(AdminUserId::new("worker1"));
        let ids: Vec<_> = mine.apply(&complaints).iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["CMP004", "CMP001"]);
    }

    #[test]
    fn test_citizen_search() {
        let citizens = fixtures::citizens(Utc::now());
        let by = |term: &str| CitizenFilter::search(Some(term)).apply(&citizens).len();
        assert_eq!(by("sarah"), 1);
        assert_eq!(by("+123456789"), 5);
        assert_eq!(by("user004"), 1);
        assert_eq!(by("EMAIL.COM"), 5);
        assert_eq!(by("nobody"), 0);
        assert_eq!(CitizenFilter::search(None).apply(&citizens).len(), 5);
    }
}
