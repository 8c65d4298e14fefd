//! In-memory store adapter.
//!
//! Holds every table behind one async mutex, so each operation is atomic
//! with respect to the others. Used with `DESK_STORE=memory` and in tests.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use civic_desk_core::domain::workflow;
use civic_desk_core::{
    AdminRole, AdminUser, AdminUserId, Analytics, Citizen, CitizenFilter, CitizenId, Complaint,
    ComplaintDraft, ComplaintFilter, ComplaintId, CounterEffects, IdSequence, NewWorker,
    PageRequest, StatusUpdate, WorkerUpdate, fixtures,
};

use super::{AdminAccount, ComplaintSlice, Store, StoreError};
use crate::services::auth::{AuthError, hash_password};

#[derive(Default)]
struct Tables {
    admins: BTreeMap<AdminUserId, AdminAccount>,
    citizens: BTreeMap<CitizenId, Citizen>,
    complaints: BTreeMap<ComplaintId, Complaint>,
    counters: HashMap<IdSequence, i64>,
}

impl Tables {
    fn next_id(&mut self, sequence: IdSequence) -> String {
        let counter = self.counters.entry(sequence).or_insert(0);
        *counter += 1;
        sequence.format(*counter)
    }

    fn apply(&mut self, effects: &CounterEffects, now: DateTime<Utc>) {
        for change in &effects.workers {
            if let Some(account) = self.admins.get_mut(&change.worker_id) {
                let user = &mut account.user;
                user.assigned_complaints = (user.assigned_complaints + change.assigned).max(0);
                user.completed_complaints = (user.completed_complaints + change.completed).max(0);
                user.updated_at = now;
            }
        }
        if let Some((citizen_id, delta)) = &effects.citizen_resolved {
            if let Some(citizen) = self.citizens.get_mut(citizen_id) {
                citizen.resolved_complaints = (citizen.resolved_complaints + delta).max(0);
                citizen.updated_at = now;
            }
        }
    }

    fn complaint(&self, id: &ComplaintId) -> Result<Complaint, StoreError> {
        self.complaints
            .get(id)
            .cloned()
            .ok_or(StoreError::NotFound("Complaint"))
    }

    fn email_taken(&self, email: &str, except: Option<&AdminUserId>) -> bool {
        self.admins.values().any(|a| {
            Some(&a.user.id) != except && a.user.email.as_str().eq_ignore_ascii_case(email)
        })
    }
}

/// Store adapter keeping everything in process memory.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    /// An empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A store holding the fixture data set, with fixture passwords hashed.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::PasswordHash` if hashing a fixture password fails.
    pub fn seeded() -> Result<Self, AuthError> {
        let now = Utc::now();
        let mut tables = Tables::default();

        let mut hashes: HashMap<&'static str, String> = HashMap::new();
        for fixture in fixtures::admins(now) {
            let password_hash = match hashes.get(fixture.password) {
                Some(hash) => hash.clone(),
                None => {
                    let hash = hash_password(fixture.password)?;
                    hashes.insert(fixture.password, hash.clone());
                    hash
                }
            };
            tables.admins.insert(
                fixture.user.id.clone(),
                AdminAccount {
                    user: fixture.user,
                    password_hash,
                },
            );
        }
        for citizen in fixtures::citizens(now) {
            tables.citizens.insert(citizen.id.clone(), citizen);
        }
        for complaint in fixtures::complaints(now) {
            tables.complaints.insert(complaint.id.clone(), complaint);
        }
        for sequence in [IdSequence::Complaints, IdSequence::Citizens, IdSequence::Workers] {
            tables.counters.insert(sequence, sequence.fixture_floor());
        }

        Ok(Self {
            tables: Mutex::new(tables),
        })
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn find_account(
        &self,
        username: &str,
        role: AdminRole,
    ) -> Result<Option<AdminAccount>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .admins
            .values()
            .find(|a| a.user.username == username && a.user.role == role)
            .cloned())
    }

    async fn get_admin(&self, id: &AdminUserId) -> Result<Option<AdminUser>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables.admins.get(id).map(|a| a.user.clone()))
    }

    async fn list_workers(&self, department: Option<&str>) -> Result<Vec<AdminUser>, StoreError> {
        let tables = self.tables.lock().await;
        let mut workers: Vec<AdminUser> = tables
            .admins
            .values()
            .map(|a| &a.user)
            .filter(|u| u.role == AdminRole::LowerAdmin && u.is_active)
            .filter(|u| department.is_none_or(|d| u.works_in(d)))
            .cloned()
            .collect();
        workers.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(workers)
    }

    async fn create_worker(
        &self,
        worker: NewWorker,
        password_hash: String,
    ) -> Result<AdminUser, StoreError> {
        let mut tables = self.tables.lock().await;
        if tables.admins.values().any(|a| a.user.username == worker.username) {
            return Err(StoreError::Conflict("username already exists".to_owned()));
        }
        if tables.email_taken(worker.email.as_str(), None) {
            return Err(StoreError::Conflict("email already exists".to_owned()));
        }

        let id = AdminUserId::new(tables.next_id(IdSequence::Workers));
        let user = worker.into_admin_user(id.clone(), Utc::now());
        tables.admins.insert(
            id,
            AdminAccount {
                user: user.clone(),
                password_hash,
            },
        );
        Ok(user)
    }

    async fn update_worker(
        &self,
        id: &AdminUserId,
        update: &WorkerUpdate,
    ) -> Result<AdminUser, StoreError> {
        let mut tables = self.tables.lock().await;
        if let Some(email) = &update.email {
            if tables.email_taken(email.trim(), Some(id)) {
                return Err(StoreError::Conflict("email already exists".to_owned()));
            }
        }

        let account = tables
            .admins
            .get_mut(id)
            .filter(|a| a.user.role == AdminRole::LowerAdmin)
            .ok_or(StoreError::NotFound("Worker"))?;
        update.apply(&mut account.user, Utc::now())?;
        Ok(account.user.clone())
    }

    async fn list_citizens(&self, filter: &CitizenFilter) -> Result<Vec<Citizen>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(filter
            .apply(tables.citizens.values())
            .into_iter()
            .cloned()
            .collect())
    }

    async fn get_citizen(&self, id: &CitizenId) -> Result<Option<Citizen>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables.citizens.get(id).cloned())
    }

    async fn list_complaints(
        &self,
        filter: &ComplaintFilter,
        page: PageRequest,
    ) -> Result<ComplaintSlice, StoreError> {
        let tables = self.tables.lock().await;
        let matched = filter.apply(tables.complaints.values());
        let total = i64::try_from(matched.len())
            .map_err(|e| StoreError::Backend(format!("complaint count overflow: {e}")))?;
        Ok(ComplaintSlice {
            complaints: page.slice(&matched).into_iter().cloned().collect(),
            total,
        })
    }

    async fn get_complaint(&self, id: &ComplaintId) -> Result<Option<Complaint>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables.complaints.get(id).cloned())
    }

    async fn create_complaint(&self, draft: ComplaintDraft) -> Result<Complaint, StoreError> {
        let draft = draft.validate()?;
        let now = Utc::now();
        let mut tables = self.tables.lock().await;

        let citizen = tables
            .citizens
            .get_mut(&draft.user_id)
            .ok_or(StoreError::NotFound("User"))?;
        citizen.total_complaints += 1;
        citizen.updated_at = now;
        let (email, phone) = (citizen.email.clone(), citizen.phone.clone());

        let id = ComplaintId::new(tables.next_id(IdSequence::Complaints));
        let complaint = draft.into_complaint(id.clone(), email, phone, now);
        tables.complaints.insert(id, complaint.clone());
        Ok(complaint)
    }

    async fn assign_complaint(
        &self,
        id: &ComplaintId,
        worker_id: &AdminUserId,
    ) -> Result<Complaint, StoreError> {
        let now = Utc::now();
        let mut tables = self.tables.lock().await;
        let mut complaint = tables.complaint(id)?;
        let worker = tables
            .admins
            .get(worker_id)
            .map(|a| a.user.clone())
            .ok_or(StoreError::NotFound("Worker"))?;

        let effects = workflow::assign(&mut complaint, &worker, now)?;
        tables.apply(&effects, now);
        tables.complaints.insert(id.clone(), complaint.clone());
        Ok(complaint)
    }

    async fn transfer_complaint(
        &self,
        id: &ComplaintId,
        department: &str,
    ) -> Result<Complaint, StoreError> {
        let now = Utc::now();
        let mut tables = self.tables.lock().await;
        let mut complaint = tables.complaint(id)?;

        let effects = workflow::transfer(&mut complaint, department, now)?;
        tables.apply(&effects, now);
        tables.complaints.insert(id.clone(), complaint.clone());
        Ok(complaint)
    }

    async fn update_complaint_status(
        &self,
        id: &ComplaintId,
        actor: &AdminUser,
        update: &StatusUpdate,
    ) -> Result<Complaint, StoreError> {
        let now = Utc::now();
        let mut tables = self.tables.lock().await;
        let mut complaint = tables.complaint(id)?;

        let effects = workflow::update_status(&mut complaint, actor, update, now)?;
        tables.apply(&effects, now);
        tables.complaints.insert(id.clone(), complaint.clone());
        Ok(complaint)
    }

    async fn analytics(&self) -> Result<Analytics, StoreError> {
        let tables = self.tables.lock().await;
        Ok(Analytics::from_complaints(tables.complaints.values()))
    }
}
