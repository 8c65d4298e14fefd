//! Complaint endpoints and the status update form.

use reqwest::Method;
use tracing::instrument;

use civic_desk_core::{
    Analytics, AssignRequest, Complaint, ComplaintDraft, ComplaintId, ComplaintListQuery,
    ComplaintPage, ComplaintStatus, StatusUpdate, TransferRequest,
};

use crate::{ApiClient, ClientError};

/// Status update form as filled in by a worker.
///
/// The status starts unselected; submitting without choosing one is rejected
/// before any request is made.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusForm {
    pub status: Option<ComplaintStatus>,
    pub remarks: String,
    /// Names returned by [`Uploads::proof`](crate::Uploads::proof).
    pub proof_images: Vec<String>,
}

impl StatusForm {
    /// Form with a status already chosen.
    #[must_use]
    pub fn with_status(status: ComplaintStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    /// Validate into the request body.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Validation("Please select a status")` when no
    /// status was chosen.
    pub fn into_request(self) -> Result<StatusUpdate, ClientError> {
        let status = self
            .status
            .ok_or_else(|| ClientError::Validation("Please select a status".to_owned()))?;
        Ok(StatusUpdate {
            status,
            remarks: self.remarks,
            proof_images: self.proof_images,
        })
    }
}

/// Complaint endpoints.
#[derive(Debug, Clone, Copy)]
pub struct Complaints<'a> {
    client: &'a ApiClient,
}

impl<'a> Complaints<'a> {
    pub(crate) const fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// One page of complaints matching `query`.
    ///
    /// Lower Admins only ever see complaints assigned to them.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Api` for an invalid filter or page.
    #[instrument(skip(self))]
    pub async fn list(&self, query: &ComplaintListQuery) -> Result<ComplaintPage, ClientError> {
        let page = query.page.map(|p| p.to_string());
        let limit = query.limit.map(|l| l.to_string());
        let pairs: Vec<(&str, &str)> = [
            ("page", page.as_deref()),
            ("limit", limit.as_deref()),
            ("search", query.search.as_deref()),
            ("status", query.status.as_deref()),
            ("department", query.department.as_deref()),
            ("priority", query.priority.as_deref()),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.map(|v| (key, v)))
        .collect();

        let request = self
            .client
            .request(Method::GET, &["api", "complaints"], &pairs)?;
        self.client.send(request).await?.into_data()
    }

    /// Complaint detail.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Api` with status 404 for unknown or foreign
    /// complaints.
    pub async fn get(&self, id: &ComplaintId) -> Result<Complaint, ClientError> {
        let request = self
            .client
            .request(Method::GET, &["api", "complaints", id.as_str()], &[])?;
        self.client.send(request).await?.into_data()
    }

    /// File a complaint on behalf of a citizen.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Api` for blank fields or an unknown citizen.
    #[instrument(skip(self, draft), fields(user_id = %draft.user_id))]
    pub async fn create(&self, draft: &ComplaintDraft) -> Result<Complaint, ClientError> {
        let request = self
            .client
            .request(Method::POST, &["api", "complaints"], &[])?
            .json(draft);
        self.client.send(request).await?.into_data()
    }

    /// Assign a complaint to the worker with id `worker_id`.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Validation` for a blank worker id without
    /// contacting the server.
    #[instrument(skip(self))]
    pub async fn assign(&self, id: &ComplaintId, worker_id: &str) -> Result<Complaint, ClientError> {
        let worker_id = required(worker_id, "Please select a worker")?;
        let body = AssignRequest {
            worker_id: worker_id.into(),
        };
        let request = self
            .client
            .request(Method::PUT, &["api", "complaints", id.as_str(), "assign"], &[])?
            .json(&body);
        self.client.send(request).await?.into_data()
    }

    /// Move a complaint to another department.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Validation` for a blank department without
    /// contacting the server.
    #[instrument(skip(self))]
    pub async fn transfer(
        &self,
        id: &ComplaintId,
        department: &str,
    ) -> Result<Complaint, ClientError> {
        let department = required(department, "Please select a department")?;
        let body = TransferRequest {
            department: department.to_owned(),
        };
        let request = self
            .client
            .request(Method::PUT, &["api", "complaints", id.as_str(), "transfer"], &[])?
            .json(&body);
        self.client.send(request).await?.into_data()
    }

    /// Submit a status update.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Validation("Please select a status")` without
    /// contacting the server when the form has no status.
    #[instrument(skip(self, form))]
    pub async fn update_status(
        &self,
        id: &ComplaintId,
        form: StatusForm,
    ) -> Result<Complaint, ClientError> {
        let body = form.into_request()?;
        let request = self
            .client
            .request(Method::PUT, &["api", "complaints", id.as_str(), "status"], &[])?
            .json(&body);
        self.client.send(request).await?.into_data()
    }

    /// Dashboard statistics (Main Admin only).
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Api` with status 403 for Lower Admins.
    pub async fn analytics(&self) -> Result<Analytics, ClientError> {
        let request = self
            .client
            .request(Method::GET, &["api", "complaints", "analytics"], &[])?;
        self.client.send(request).await?.into_data()
    }
}

fn required<'v>(value: &'v str, message: &str) -> Result<&'v str, ClientError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ClientError::Validation(message.to_owned()));
    }
    Ok(value)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_status_form_requires_status() {
        let err = StatusForm::default().into_request().unwrap_err();
        assert_eq!(err.to_string(), "Please select a status");

        let form = StatusForm {
            remarks: "Pothole filled".to_owned(),
            proof_images: vec!["a.jpg".to_owned()],
            ..StatusForm::with_status(ComplaintStatus::Completed)
        };
        let body = form.into_request().unwrap();
        assert_eq!(body.status, ComplaintStatus::Completed);
        assert_eq!(body.proof_images, ["a.jpg"]);
    }

    #[test]
    fn test_required_trims() {
        assert_eq!(required(" worker3 ", "x").unwrap(), "worker3");
        assert!(matches!(required("   ", "Please select a worker"), Err(ClientError::Validation(m)) if m == "Please select a worker"));
    }

    #[tokio::test]
    async fn test_invalid_forms_send_nothing() {
        let client = ApiClient::new("http://127.0.0.1:9").unwrap();
        let id = ComplaintId::new("CMP001");
        let complaints = client.complaints();

        assert!(matches!(
            complaints.update_status(&id, StatusForm::default()).await,
            Err(ClientError::Validation(_))
        ));
        assert!(matches!(
            complaints.assign(&id, "").await,
            Err(ClientError::Validation(_))
        ));
        assert!(matches!(
            complaints.transfer(&id, " ").await,
            Err(ClientError::Validation(_))
        ));
    }
}
