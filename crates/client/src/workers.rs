//! Worker (Lower Admin) management endpoints.

use reqwest::Method;
use tracing::instrument;

use civic_desk_core::{AdminUser, AdminUserId, WorkerDraft, WorkerUpdate};

use crate::{ApiClient, ClientError};

/// Worker management endpoints (Main Admin only).
#[derive(Debug, Clone, Copy)]
pub struct Workers<'a> {
    client: &'a ApiClient,
}

impl<'a> Workers<'a> {
    pub(crate) const fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Active workers, optionally limited to one department.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Api` with status 403 for Lower Admins.
    pub async fn list(&self, department: Option<&str>) -> Result<Vec<AdminUser>, ClientError> {
        let query: Vec<(&str, &str)> = department
            .map(|d| ("department", d))
            .into_iter()
            .collect();
        let request = self
            .client
            .request(Method::GET, &["api", "admin", "workers"], &query)?;
        self.client.send(request).await?.into_data()
    }

    /// Create a worker account.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Api` with status 400 for invalid fields or 409
    /// for a taken username or email.
    #[instrument(skip(self, draft), fields(username = %draft.username))]
    pub async fn create(&self, draft: &WorkerDraft) -> Result<AdminUser, ClientError> {
        let request = self
            .client
            .request(Method::POST, &["api", "admin", "workers"], &[])?
            .json(draft);
        self.client.send(request).await?.into_data()
    }

    /// Change some of a worker's fields.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Validation` for an empty update without
    /// contacting the server.
    #[instrument(skip(self))]
    pub async fn update(
        &self,
        id: &AdminUserId,
        update: &WorkerUpdate,
    ) -> Result<AdminUser, ClientError> {
        if update.is_empty() {
            return Err(ClientError::Validation("No fields to update".to_owned()));
        }
        let request = self
            .client
            .request(Method::PUT, &["api", "admin", "workers", id.as_str()], &[])?
            .json(update);
        self.client.send(request).await?.into_data()
    }

    /// Deactivate a worker. Their account stays on record.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Api` with status 404 for an unknown worker.
    #[instrument(skip(self))]
    pub async fn deactivate(&self, id: &AdminUserId) -> Result<AdminUser, ClientError> {
        let request = self
            .client
            .request(Method::DELETE, &["api", "admin", "workers", id.as_str()], &[])?;
        self.client.send(request).await?.into_data()
    }
}
