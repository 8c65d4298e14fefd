//! Municipal departments and complaint categories.
//!
//! Departments are free text in storage so new ones can be introduced by a
//! transfer, but the dashboard offers this fixed list.

/// Departments known to the dashboard.
pub const DEPARTMENTS: [&str; 6] = [
    "Public Works",
    "Water Department",
    "Waste Management",
    "Traffic Management",
    "Parks & Recreation",
    "Building & Safety",
];

/// Complaint categories known to the dashboard.
pub const CATEGORIES: [&str; 6] = [
    "Infrastructure",
    "Water",
    "Sanitation",
    "Traffic",
    "Parks",
    "Building",
];

/// Whether `name` matches a known department, ignoring case.
#[must_use]
pub fn is_known_department(name: &str) -> bool {
    let name = name.trim();
    DEPARTMENTS.iter().any(|d| d.eq_ignore_ascii_case(name))
}
