//! Seed data set.
//!
//! Five citizens, five complaints and five admin accounts (one Main Admin and
//! four department workers). Timestamps are relative to `now` so the
//! dashboard always shows recent activity after seeding.

use chrono::{DateTime, Duration, NaiveDate, Utc};

use crate::domain::{AdminUser, Citizen, Complaint};
use crate::types::{
    AdminRole, AdminUserId, CitizenId, ComplaintId, ComplaintPriority, ComplaintStatus, Email,
};

/// Password of the fixture Main Admin.
pub const ADMIN_PASSWORD: &str = "admin123";
/// Password shared by the fixture workers.
pub const WORKER_PASSWORD: &str = "worker123";

/// An admin account together with its plaintext fixture password.
///
/// Consumers hash the password before storing the account.
#[derive(Debug, Clone)]
pub struct FixtureAdmin {
    pub user: AdminUser,
    pub password: &'static str,
}

fn date(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map_or(DateTime::UNIX_EPOCH, |d| d.and_utc())
}

fn ago(now: DateTime<Utc>, days: i64, hours: i64) -> DateTime<Utc> {
    now - Duration::days(days) - Duration::hours(hours)
}

/// The fixture admin accounts.
#[must_use]
pub fn admins(now: DateTime<Utc>) -> Vec<FixtureAdmin> {
    let admin = FixtureAdmin {
        user: AdminUser {
            id: AdminUserId::new("admin"),
            username: "admin".to_owned(),
            name: "System Administrator".to_owned(),
            email: Email::from_trusted("admin@system.com"),
            role: AdminRole::MainAdmin,
            department: None,
            assigned_complaints: 0,
            completed_complaints: 0,
            is_active: true,
            created_at: now,
            updated_at: now,
        },
        password: ADMIN_PASSWORD,
    };

    let workers = [
        ("worker1", "mike.wilson", "Mike Wilson", "Public Works", 2, 15),
        ("worker2", "lisa.chen", "Lisa Chen", "Waste Management", 0, 12),
        ("worker3", "david.kumar", "David Kumar", "Water Department", 0, 8),
        ("worker4", "ana.rodriguez", "Ana Rodriguez", "Traffic Management", 0, 10),
    ];

    std::iter::once(admin)
        .chain(workers.into_iter().map(
            |(id, username, name, department, assigned, completed)| FixtureAdmin {
                user: AdminUser {
                    id: AdminUserId::new(id),
                    username: username.to_owned(),
                    name: name.to_owned(),
                    email: Email::from_trusted(&format!("{username}@admin.com")),
                    role: AdminRole::LowerAdmin,
                    department: Some(department.to_owned()),
                    assigned_complaints: assigned,
                    completed_complaints: completed,
                    is_active: true,
                    created_at: now,
                    updated_at: now,
                },
                password: WORKER_PASSWORD,
            },
        ))
        .collect()
}

/// The fixture citizens.
#[must_use]
pub fn citizens(now: DateTime<Utc>) -> Vec<Citizen> {
    let rows = [
        ("USER001", "John Doe", "john.doe", "+1234567890", 3, 2, date(2024, 6, 15)),
        ("USER002", "Sarah Smith", "sarah.smith", "+1234567891", 1, 0, date(2024, 8, 22)),
        ("USER003", "Robert Johnson", "robert.johnson", "+1234567892", 5, 4, date(2024, 3, 10)),
        ("USER004", "Emma Davis", "emma.davis", "+1234567893", 2, 1, date(2024, 9, 5)),
        ("USER005", "James Wilson", "james.wilson", "+1234567894", 1, 0, date(2024, 11, 18)),
    ];

    rows.into_iter()
        .map(|(id, name, mailbox, phone, total, resolved, joined)| Citizen {
            id: CitizenId::new(id),
            name: name.to_owned(),
            email: Email::from_trusted(&format!("{mailbox}@email.com")),
            phone: phone.to_owned(),
            total_complaints: total,
            resolved_complaints: resolved,
            joined_date: joined,
            created_at: now,
            updated_at: now,
        })
        .collect()
}

/// The fixture complaints, oldest first.
#[must_use]
#[allow(clippy::too_many_lines)]
pub fn complaints(now: DateTime<Utc>) -> Vec<Complaint> {
    let citizen = |n: u8| {
        let (mailbox, phone) = match n {
            1 => ("john.doe", "+1234567890"),
            2 => ("sarah.smith", "+1234567891"),
            3 => ("robert.johnson", "+1234567892"),
            4 => ("emma.davis", "+1234567893"),
            _ => ("james.wilson", "+1234567894"),
        };
        (
            CitizenId::new(format!("USER{n:03}")),
            Email::from_trusted(&format!("{mailbox}@email.com")),
            phone.to_owned(),
        )
    };

    let mut rows = Vec::with_capacity(5);

    let (user_id, user_email, user_phone) = citizen(3);
    rows.push(Complaint {
        id: ComplaintId::new("CMP003"),
        title: "Garbage Collection Missed".to_owned(),
        description: "Garbage not collected for 3 days in residential area".to_owned(),
        category: "Sanitation".to_owned(),
        department: "Waste Management".to_owned(),
        priority: ComplaintPriority::Medium,
        status: ComplaintStatus::Completed,
        user_id,
        user_email,
        user_phone,
        assigned_to: Some(AdminUserId::new("worker2")),
        assigned_worker: Some("Lisa Chen".to_owned()),
        proof_images: vec!["proof1.jpg".to_owned(), "proof2.jpg".to_owned()],
        remarks: "Area cleaned, schedule updated".to_owned(),
        created_at: ago(now, 3, 16),
        updated_at: ago(now, 0, 11),
    });

    let (user_id, user_email, user_phone) = citizen(1);
    rows.push(Complaint {
        id: ComplaintId::new("CMP001"),
        title: "Street Light Not Working".to_owned(),
        description: "Street light on Main Street has been broken for 2 weeks".to_owned(),
        category: "Infrastructure".to_owned(),
        department: "Public Works".to_owned(),
        priority: ComplaintPriority::High,
        status: ComplaintStatus::InProgress,
        user_id,
        user_email,
        user_phone,
        assigned_to: Some(AdminUserId::new("worker1")),
        assigned_worker: Some("Mike Wilson".to_owned()),
        proof_images: Vec::new(),
        remarks: "Work started, parts ordered".to_owned(),
        created_at: ago(now, 2, 10),
        updated_at: ago(now, 1, 14),
    });

    let (user_id, user_email, user_phone) = citizen(4);
    rows.push(Complaint {
        id: ComplaintId::new("CMP004"),
        title: "Road Pothole Repair".to_owned(),
        description: "Large pothole on Oak Avenue causing traffic issues".to_owned(),
        category: "Infrastructure".to_owned(),
        department: "Public Works".to_owned(),
        priority: ComplaintPriority::High,
        status: ComplaintStatus::InProgress,
        user_id,
        user_email,
        user_phone,
        assigned_to: Some(AdminUserId::new("worker1")),
        assigned_worker: Some("Mike Wilson".to_owned()),
        proof_images: Vec::new(),
        remarks: "Materials arranged, work scheduled for tomorrow".to_owned(),
        created_at: ago(now, 1, 12),
        updated_at: ago(now, 0, 9),
    });

    let (user_id, user_email, user_phone) = citizen(2);
    rows.push(Complaint {
        id: ComplaintId::new("CMP002"),
        title: "Water Leakage in Park".to_owned(),
        description: "Major water pipe leak causing flooding in Central Park".to_owned(),
        category: "Water".to_owned(),
        department: "Water Department".to_owned(),
        priority: ComplaintPriority::Critical,
        status: ComplaintStatus::Pending,
        user_id,
        user_email,
        user_phone,
        assigned_to: None,
        assigned_worker: None,
        proof_images: Vec::new(),
        remarks: String::new(),
        created_at: ago(now, 0, 8),
        updated_at: ago(now, 0, 8),
    });

    let (user_id, user_email, user_phone) = citizen(5);
    rows.push(Complaint {
        id: ComplaintId::new("CMP005"),
        title: "Broken Traffic Signal".to_owned(),
        description: "Traffic light at 5th and Main intersection not functioning".to_owned(),
        category: "Traffic".to_owned(),
        department: "Traffic Management".to_owned(),
        priority: ComplaintPriority::Critical,
        status: ComplaintStatus::Pending,
        user_id,
        user_email,
        user_phone,
        assigned_to: None,
        assigned_worker: None,
        proof_images: Vec::new(),
        remarks: String::new(),
        created_at: ago(now, 0, 2),
        updated_at: ago(now, 0, 2),
    });

    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::IdSequence;

    #[test]
    fn test_fixture_sizes_match_id_floors() {
        let now = Utc::now();
        assert_eq!(complaints(now).len() as i64, IdSequence::Complaints.fixture_floor());
        assert_eq!(citizens(now).len() as i64, IdSequence::Citizens.fixture_floor());
        let workers = admins(now)
            .into_iter()
            .filter(|a| a.user.role == AdminRole::LowerAdmin)
            .count();
        assert_eq!(workers as i64, IdSequence::Workers.fixture_floor());
    }

    #[test]
    fn test_fixture_emails_are_valid() {
        let now = Utc::now();
        for admin in admins(now) {
            assert!(Email::parse(admin.user.email.as_str()).is_ok());
        }
        for citizen in citizens(now) {
            assert!(Email::parse(citizen.email.as_str()).is_ok());
        }
    }

    #[test]
    fn test_complaint_emails_match_citizens() {
        let now = Utc::now();
        let citizens = citizens(now);
        for complaint in complaints(now) {
            let owner = citizens.iter().find(|c| c.id == complaint.user_id);
            assert_eq!(owner.map(|c| &c.email), Some(&complaint.user_email));
        }
    }

    #[test]
    fn test_assigned_complaints_belong_to_worker_department() {
        let now = Utc::now();
        let admins = admins(now);
        for complaint in complaints(now) {
            if let Some(worker_id) = &complaint.assigned_to {
                let worker = admins.iter().find(|a| &a.user.id == worker_id);
                assert!(worker.is_some_and(|w| w.user.works_in(&complaint.department)));
            }
        }
    }

    #[test]
    fn test_fixture_dates() {
        assert_eq!(date(2024, 6, 15).to_rfc3339(), "2024-06-15T00:00:00+00:00");
    }
}
