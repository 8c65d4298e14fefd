//! Login, logout and the current admin.

use reqwest::Method;
use tracing::instrument;

use civic_desk_core::{AdminRole, AdminUser, LoginRequest, LoginResponse};

use crate::{ApiClient, ClientError};

/// Authentication endpoints.
#[derive(Debug, Clone, Copy)]
pub struct Auth<'a> {
    client: &'a ApiClient,
}

impl<'a> Auth<'a> {
    pub(crate) const fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Sign in and keep the returned token for later requests.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Validation` for a blank username or password
    /// without contacting the server, and `ClientError::Unauthorized` for
    /// rejected credentials.
    #[instrument(skip(self, password))]
    pub async fn login(
        &self,
        username: &str,
        password: &str,
        role: AdminRole,
    ) -> Result<LoginResponse, ClientError> {
        let body = login_request(username, password, role)?;
        let request = self
            .client
            .request(Method::POST, &["api", "auth", "login"], &[])?
            .json(&body);

        let response: LoginResponse = self.client.send(request).await?.into_data()?;
        self.client.set_token(response.token.clone()).await;
        tracing::info!(user_id = %response.user.id, "signed in");
        Ok(response)
    }

    /// Sign out. The local token is cleared even if the server call fails.
    ///
    /// # Errors
    ///
    /// Returns the server or transport error, after clearing the token.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<(), ClientError> {
        if !self.client.is_authenticated().await {
            return Ok(());
        }
        let request = self
            .client
            .request(Method::POST, &["api", "auth", "logout"], &[])?;
        let result = self.client.send::<serde_json::Value>(request).await;
        self.client.clear_token().await;
        result.map(|_| ())
    }

    /// The signed-in admin.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Unauthorized` when the session is gone.
    pub async fn me(&self) -> Result<AdminUser, ClientError> {
        let request = self.client.request(Method::GET, &["api", "auth", "me"], &[])?;
        self.client.send(request).await?.into_data()
    }
}

fn login_request(
    username: &str,
    password: &str,
    role: AdminRole,
) -> Result<LoginRequest, ClientError> {
    let username = username.trim();
    if username.is_empty() || password.is_empty() {
        return Err(ClientError::Validation(
            "Username and password are required".to_owned(),
        ));
    }
    Ok(LoginRequest {
        username: username.to_owned(),
        password: password.to_owned(),
        role,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_login_request_requires_credentials() {
        for (username, password) in [("", "admin123"), ("  ", "admin123"), ("admin", "")] {
            assert!(matches!(
                login_request(username, password, AdminRole::MainAdmin),
                Err(ClientError::Validation(_))
            ));
        }

        let req = login_request(" admin ", "admin123", AdminRole::MainAdmin).unwrap();
        assert_eq!(req.username, "admin");
    }

    #[tokio::test]
    async fn test_blank_login_sends_nothing() {
        // Port 9 is discard; a request would fail with a transport error.
        let client = ApiClient::new("http://127.0.0.1:9").unwrap();
        let err = client
            .auth()
            .login("", "", AdminRole::LowerAdmin)
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Validation(_)));
    }

    #[tokio::test]
    async fn test_logout_without_session_is_local() {
        let client = ApiClient::new("http://127.0.0.1:9").unwrap();
        assert!(client.auth().logout().await.is_ok());
    }
}
