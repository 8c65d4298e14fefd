//! Integration tests for Civic Desk.
//!
//! Each test starts its own server on an ephemeral port with the in-memory
//! store (seeded with the fixture data set) and drives it through
//! `civic-desk-client`, so no database is needed.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p civic-desk-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `auth_flow` - login, session lookup, logout and forced logout
//! - `complaint_workflow` - assign, transfer, filters, status updates
//! - `lower_admin_scope` - what a worker can and cannot see
//! - `worker_management` - creating and deactivating workers, citizens
//! - `uploads` - proof uploads and their limits

#![allow(clippy::missing_panics_doc, clippy::expect_used)]

use std::path::{Path, PathBuf};

use secrecy::SecretString;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use civic_desk_client::ApiClient;
use civic_desk_core::AdminRole;
use civic_desk_server::config::ServerConfig;

/// Password of the fixture Main Admin.
pub const ADMIN_PASSWORD: &str = "admin123";
/// Password shared by the fixture workers.
pub const WORKER_PASSWORD: &str = "worker123";

const TEST_JWT_SECRET: &str = "kP9#vR2$wX7!mN4@qL8&tY3*zB6^hJ5%";

/// A running server backed by a fresh in-memory store.
pub struct TestServer {
    base_url: String,
    upload_dir: PathBuf,
    handle: JoinHandle<()>,
}

impl TestServer {
    /// Start a server with the default test configuration.
    pub async fn start() -> Self {
        Self::start_with(|_| {}).await
    }

    /// Start a server after adjusting its configuration.
    pub async fn start_with(configure: impl FnOnce(&mut ServerConfig)) -> Self {
        let upload_dir =
            std::env::temp_dir().join(format!("civic-desk-it-{}", uuid::Uuid::new_v4()));
        let mut config =
            ServerConfig::in_memory(SecretString::from(TEST_JWT_SECRET), upload_dir.clone());
        configure(&mut config);

        let state = civic_desk_server::build_state(config)
            .await
            .expect("build server state");
        let app = civic_desk_server::app(state);

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind ephemeral port");
        let addr = listener.local_addr().expect("local address");
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("test server");
        });

        Self {
            base_url: format!("http://{addr}"),
            upload_dir,
            handle,
        }
    }

    /// Base URL of the running server.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Directory uploads are written to.
    #[must_use]
    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    /// A client with no session.
    #[must_use]
    pub fn client(&self) -> ApiClient {
        ApiClient::new(&self.base_url).expect("client for test server")
    }

    /// A client signed in as the fixture Main Admin.
    pub async fn main_admin(&self) -> ApiClient {
        self.signed_in("admin", ADMIN_PASSWORD, AdminRole::MainAdmin)
            .await
    }

    /// A client signed in as the fixture worker `username`.
    pub async fn worker(&self, username: &str) -> ApiClient {
        self.signed_in(username, WORKER_PASSWORD, AdminRole::LowerAdmin)
            .await
    }

    async fn signed_in(&self, username: &str, password: &str, role: AdminRole) -> ApiClient {
        let client = self.client();
        client
            .auth()
            .login(username, password, role)
            .await
            .expect("fixture login");
        client
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
        let _ = std::fs::remove_dir_all(&self.upload_dir);
    }
}
