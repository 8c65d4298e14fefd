//! Citizen endpoints.

use reqwest::Method;

use civic_desk_core::{Citizen, CitizenId};

use crate::{ApiClient, ClientError};

/// Citizen endpoints (Main Admin only).
#[derive(Debug, Clone, Copy)]
pub struct Users<'a> {
    client: &'a ApiClient,
}

impl<'a> Users<'a> {
    pub(crate) const fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// All citizens, optionally filtered by a free-text term.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Api` with status 403 for Lower Admins.
    pub async fn list(&self, search: Option<&str>) -> Result<Vec<Citizen>, ClientError> {
        let query: Vec<(&str, &str)> = search.map(|s| ("search", s)).into_iter().collect();
        let request = self.client.request(Method::GET, &["api", "users"], &query)?;
        self.client.send(request).await?.into_data()
    }

    /// Citizens matching `term` by name, email, phone or id.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Api` with status 403 for Lower Admins.
    pub async fn search(&self, term: &str) -> Result<Vec<Citizen>, ClientError> {
        let request = self
            .client
            .request(Method::GET, &["api", "users", "search"], &[("q", term)])?;
        self.client.send(request).await?.into_data()
    }

    /// One citizen.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Api` with status 404 for an unknown id.
    pub async fn get(&self, id: &CitizenId) -> Result<Citizen, ClientError> {
        let request = self
            .client
            .request(Method::GET, &["api", "users", id.as_str()], &[])?;
        self.client.send(request).await?.into_data()
    }
}
