//! Civic Desk Client - typed access to the complaint dashboard API.
//!
//! One [`ApiClient`] holds the base URL and the bearer token of the signed-in
//! admin. Endpoints are grouped into handles:
//!
//! - [`ApiClient::auth`] - login, logout, current admin
//! - [`ApiClient::complaints`] - listing, detail, assign, transfer, status, analytics
//! - [`ApiClient::users`] - citizen listing and search
//! - [`ApiClient::workers`] - Lower Admin management
//! - [`ApiClient::uploads`] - proof-of-work uploads
//!
//! Every call unwraps the response envelope. A `success: false` body becomes
//! [`ClientError::Api`]; a 401 clears the stored token and becomes
//! [`ClientError::Unauthorized`]. Requests are never retried.
//!
//! # Example
//!
//! ```rust,ignore
//! use civic_desk_client::ApiClient;
//! use civic_desk_core::AdminRole;
//!
//! let client = ApiClient::new("http://localhost:8001")?;
//! client.auth().login("admin", "admin123", AdminRole::MainAdmin).await?;
//! let page = client.complaints().list(&Default::default()).await?;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

mod auth;
mod complaints;
mod envelope;
mod error;
mod uploads;
mod users;
mod workers;

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use reqwest::{Method, RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::{DeserializeOwned, IgnoredAny};
use tokio::sync::RwLock;
use tracing::instrument;
use url::Url;

pub use auth::Auth;
pub use complaints::{Complaints, StatusForm};
pub use error::ClientError;
pub use uploads::{MAX_FILES_PER_UPLOAD, ProofFile, Uploads};
pub use users::Users;
pub use workers::Workers;

use envelope::{Envelope, Reply};

/// Default request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for the complaint dashboard REST API.
///
/// Cheap to clone; clones share the HTTP connection pool and the session.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    http: reqwest::Client,
    base_url: Url,
    token: RwLock<Option<SecretString>>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url.as_str())
            .field("token", &"[REDACTED]")
            .finish()
    }
}

impl ApiClient {
    /// Create a client for the API served at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Url` if `base_url` is not an absolute http(s)
    /// URL, or `ClientError::Http` if the HTTP client cannot be built.
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    /// Create a client with a custom request timeout.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::new`].
    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let base_url = Url::parse(base_url)?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(ClientError::Url(url::ParseError::RelativeUrlWithCannotBeABaseBase));
        }

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                http,
                base_url,
                token: RwLock::new(None),
            }),
        })
    }

    /// Base URL requests are resolved against.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Authentication endpoints.
    #[must_use]
    pub const fn auth(&self) -> Auth<'_> {
        Auth::new(self)
    }

    /// Complaint endpoints.
    #[must_use]
    pub const fn complaints(&self) -> Complaints<'_> {
        Complaints::new(self)
    }

    /// Citizen endpoints (Main Admin only).
    #[must_use]
    pub const fn users(&self) -> Users<'_> {
        Users::new(self)
    }

    /// Worker management endpoints (Main Admin only).
    #[must_use]
    pub const fn workers(&self) -> Workers<'_> {
        Workers::new(self)
    }

    /// Proof upload endpoint.
    #[must_use]
    pub const fn uploads(&self) -> Uploads<'_> {
        Uploads::new(self)
    }

    /// Use `token` for subsequent requests.
    pub async fn set_token(&self, token: impl Into<String>) {
        *self.inner.token.write().await = Some(SecretString::from(token.into()));
    }

    /// Forget the stored token.
    pub async fn clear_token(&self) {
        *self.inner.token.write().await = None;
    }

    /// Whether a token is stored.
    pub async fn is_authenticated(&self) -> bool {
        self.inner.token.read().await.is_some()
    }

    /// URL of `/uploads/{name}` for a stored proof file.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Url` if the base URL cannot carry a path.
    pub fn upload_url(&self, name: &str) -> Result<Url, ClientError> {
        self.endpoint(&["uploads", name], &[])
    }

    /// Resolve path segments and query pairs against the base URL.
    fn endpoint(&self, segments: &[&str], query: &[(&str, &str)]) -> Result<Url, ClientError> {
        let mut url = self.inner.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ClientError::Url(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .extend(segments);
        url.set_query(None);
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    /// Start a request to an API endpoint.
    fn request(
        &self,
        method: Method,
        segments: &[&str],
        query: &[(&str, &str)],
    ) -> Result<RequestBuilder, ClientError> {
        let url = self.endpoint(segments, query)?;
        Ok(self.inner.http.request(method, url))
    }

    /// Attach the session token, send, and unwrap the envelope.
    #[instrument(skip(self, request))]
    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<Reply<T>, ClientError> {
        let request = match self.inner.token.read().await.as_ref() {
            Some(token) => request.bearer_auth(token.expose_secret()),
            None => request,
        };

        let response = request.send().await?;
        let reply = self.handle_response(response).await?;
        tracing::debug!(message = %reply.message, "API request succeeded");
        Ok(reply)
    }

    /// Turn a response into data or an error.
    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<Reply<T>, ClientError> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(self.handle_error_status(status, &body).await);
        }

        let envelope: Envelope<T> = serde_json::from_str(&body)
            .map_err(|e| ClientError::Parse(format!("Failed to parse response: {e}")))?;

        match envelope.success {
            Some(true) => Ok(Reply {
                data: envelope.data,
                message: envelope.message.unwrap_or_default(),
            }),
            Some(false) => Err(ClientError::Api {
                status,
                message: envelope
                    .failure_message()
                    .unwrap_or_else(|| failed_with(status)),
            }),
            None => Err(ClientError::Parse(
                "response is missing the success flag".to_owned(),
            )),
        }
    }

    /// Map an error status to a `ClientError`, clearing the session on 401.
    async fn handle_error_status(&self, status: StatusCode, body: &str) -> ClientError {
        let message = serde_json::from_str::<Envelope<IgnoredAny>>(body)
            .ok()
            .and_then(|env| env.failure_message())
            .unwrap_or_else(|| failed_with(status));

        if status == StatusCode::UNAUTHORIZED {
            if self.is_authenticated().await {
                tracing::warn!("session rejected by the server, clearing token");
            }
            self.clear_token().await;
            return ClientError::Unauthorized(message);
        }

        tracing::debug!(status = %status, error = %message, "API request failed");
        ClientError::Api { status, message }
    }
}

fn failed_with(status: StatusCode) -> String {
    format!("Request failed with status {status}")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_segments() {
        let client = ApiClient::new("http://localhost:8001").unwrap();
        let url = client.endpoint(&["api", "complaints", "CMP001"], &[]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8001/api/complaints/CMP001");

        let client = ApiClient::new("https://city.example/dashboard/").unwrap();
        let url = client
            .endpoint(&["api", "complaints"], &[("status", "In Progress")])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://city.example/dashboard/api/complaints?status=In+Progress"
        );
    }

    #[test]
    fn test_endpoint_escapes_ids() {
        let client = ApiClient::new("http://localhost:8001").unwrap();
        let url = client.endpoint(&["api", "users", "a/b"], &[]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8001/api/users/a%2Fb");
    }

    #[test]
    fn test_rejects_non_http_base() {
        assert!(ApiClient::new("mailto:admin@example.com").is_err());
        assert!(ApiClient::new("not a url").is_err());
    }

    #[tokio::test]
    async fn test_token_lifecycle() {
        let client = ApiClient::new("http://localhost:8001").unwrap();
        assert!(!client.is_authenticated().await);
        client.set_token("abc").await;
        assert!(client.is_authenticated().await);
        assert!(!format!("{client:?}").contains("abc"));
        client.clear_token().await;
        assert!(!client.is_authenticated().await);
    }
}
