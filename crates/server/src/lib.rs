//! Civic Desk server library.
//!
//! REST API for the complaint dashboard: a Main Admin assigns and transfers
//! complaints, Lower Admins (department workers) update status and attach
//! proof. Exposed as a library so the CLI and the integration tests can build
//! the same router and store the binary runs.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;
pub mod store;

use std::sync::Arc;

use axum::{
    Router,
    http::{HeaderValue, Method, header},
};
use thiserror::Error;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    services::ServeDir,
    trace::{DefaultOnResponse, OnResponse, TraceLayer},
};
use tracing::Span;

use config::{CorsOrigins, ServerConfig, StoreBackend};
use services::AuthError;
use state::AppState;
use store::{MemoryStore, Store};

/// Errors that can occur while assembling the application.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to connect to database: {0}")]
    Database(#[from] sqlx::Error),

    #[error("failed to seed in-memory store: {0}")]
    Seed(#[from] AuthError),

    #[error("failed to create upload directory: {0}")]
    Uploads(#[from] std::io::Error),
}

/// Open the store selected by `config`.
///
/// # Errors
///
/// Returns `StartupError` if the database is unreachable or the fixture
/// passwords cannot be hashed.
pub async fn open_store(config: &ServerConfig) -> Result<Arc<dyn Store>, StartupError> {
    match &config.store {
        StoreBackend::Postgres { database_url } => {
            let pool = db::create_pool(database_url).await?;
            tracing::info!("Database pool created");
            Ok(Arc::new(db::PgStore::new(pool)))
        }
        StoreBackend::Memory => {
            let store = MemoryStore::seeded()?;
            tracing::info!("In-memory store seeded from fixtures");
            Ok(Arc::new(store))
        }
    }
}

/// Build application state: open the store and prepare the upload directory.
///
/// # Errors
///
/// Returns `StartupError` if the store cannot be opened or the upload
/// directory cannot be created.
pub async fn build_state(config: ServerConfig) -> Result<AppState, StartupError> {
    let store = open_store(&config).await?;
    let state = AppState::new(config, store);
    state.uploads().ensure_dir().await?;
    Ok(state)
}

fn cors_layer(origins: &CorsOrigins) -> CorsLayer {
    let allow_origin = match origins {
        CorsOrigins::Any => AllowOrigin::from(Any),
        CorsOrigins::List(list) => AllowOrigin::list(
            list.iter()
                .filter_map(|origin| HeaderValue::from_str(origin).ok()),
        ),
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}

/// Build the full HTTP application for `state`.
///
/// Sentry layers are not included; the binary adds them outermost.
pub fn app(state: AppState) -> Router {
    let config = state.config();
    let uploads = ServeDir::new(state.uploads().dir());

    Router::new()
        .merge(routes::routes(config.max_upload_bytes))
        .nest_service("/uploads", uploads)
        .layer(axum::middleware::from_fn(
            middleware::request_id_middleware,
        ))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        admin_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .layer(cors_layer(&config.cors_origins))
        .with_state(state)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use secrecy::SecretString;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::*;

    const SECRET: &str = "aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6%";

    fn test_app() -> Router {
        let dir = std::env::temp_dir().join(format!("civic-desk-router-{}", uuid::Uuid::new_v4()));
        let config = ServerConfig::in_memory(SecretString::from(SECRET), dir);
        let store: Arc<dyn Store> = Arc::new(MemoryStore::seeded().unwrap());
        app(AppState::new(config, store))
    }

    async fn call(
        app: &Router,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    async fn login(app: &Router, username: &str, password: &str, role: &str) -> String {
        let (status, json) = call(
            app,
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "username": username, "password": password, "role": role })),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{json}");
        json["data"]["token"].as_str().unwrap().to_owned()
    }

    #[tokio::test]
    async fn test_banner_and_health() {
        let app = test_app();
        let (status, json) = call(&app, "GET", "/api/", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["message"], "Admin Dashboard API is running");

        let (status, _) = call(&app, "GET", "/api/health/ready", None, None).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_login_rejects_wrong_role() {
        let app = test_app();
        let (status, json) = call(
            &app,
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "username": "admin", "password": "admin123", "role": "Lower Admin" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "Invalid credentials");
    }

    #[tokio::test]
    async fn test_missing_token_is_unauthorized() {
        let app = test_app();
        let (status, json) = call(&app, "GET", "/api/complaints", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json["success"], false);

        let (status, _) = call(&app, "GET", "/api/complaints", Some("not-a-token"), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_assign_sets_worker_and_status() {
        let app = test_app();
        let token = login(&app, "admin", "admin123", "Main Admin").await;

        let (status, json) = call(
            &app,
            "PUT",
            "/api/complaints/CMP002/assign",
            Some(&token),
            Some(json!({ "workerId": "worker3" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{json}");
        assert_eq!(json["data"]["status"], "In Progress");
        assert_eq!(json["data"]["assignedTo"], "worker3");
        assert_eq!(json["data"]["assignedWorker"], "David Kumar");
    }

    #[tokio::test]
    async fn test_transfer_clears_assignee() {
        let app = test_app();
        let token = login(&app, "admin", "admin123", "Main Admin").await;

        let (status, json) = call(
            &app,
            "PUT",
            "/api/complaints/CMP001/transfer",
            Some(&token),
            Some(json!({ "department": "Water Department" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{json}");
        assert_eq!(json["data"]["department"], "Water Department");
        assert_eq!(json["data"]["status"], "Pending");
        assert!(json["data"]["assignedTo"].is_null());
        assert!(json["data"]["assignedWorker"].is_null());
    }

    #[tokio::test]
    async fn test_status_filter_is_case_insensitive() {
        let app = test_app();
        let token = login(&app, "admin", "admin123", "Main Admin").await;

        let (status, json) = call(
            &app,
            "GET",
            "/api/complaints?status=pending",
            Some(&token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let complaints = json["data"]["complaints"].as_array().unwrap();
        assert!(!complaints.is_empty());
        assert!(complaints.iter().all(|c| c["status"] == "Pending"));
        assert_eq!(
            json["data"]["pagination"]["total"].as_u64().unwrap(),
            complaints.len() as u64
        );

        let (status, _) = call(&app, "GET", "/api/complaints?status=bogus", Some(&token), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_lower_admin_scope() {
        let app = test_app();
        let token = login(&app, "mike.wilson", "worker123", "Lower Admin").await;

        let (status, json) = call(&app, "GET", "/api/complaints", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        let complaints = json["data"]["complaints"].as_array().unwrap();
        assert!(complaints.iter().all(|c| c["assignedTo"] == "worker1"));

        let (status, json) = call(&app, "GET", "/api/complaints/CMP002", Some(&token), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"], "Complaint not found or not assigned to you");

        let (status, json) = call(&app, "GET", "/api/admin/workers", Some(&token), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(json["error"], "Main Admin access required");

        let (status, json) = call(
            &app,
            "PUT",
            "/api/complaints/CMP002/status",
            Some(&token),
            Some(json!({ "status": "Completed", "remarks": "done" })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"], "Complaint not found or not assigned to you");
    }

    #[tokio::test]
    async fn test_logout_revokes_token() {
        let app = test_app();
        let token = login(&app, "admin", "admin123", "Main Admin").await;

        let (status, _) = call(&app, "GET", "/api/auth/me", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = call(&app, "POST", "/api/auth/logout", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = call(&app, "GET", "/api/auth/me", Some(&token), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = call(&app, "POST", "/api/auth/logout", None, None).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_malformed_body_uses_envelope() {
        let app = test_app();
        let token = login(&app, "admin", "admin123", "Main Admin").await;

        let (status, json) = call(
            &app,
            "PUT",
            "/api/complaints/CMP002/assign",
            Some(&token),
            Some(json!({ "worker": "worker3" })),
        )
        .await;
        assert!(status.is_client_error());
        assert_eq!(json["success"], false);
        assert!(json["error"].is_string());
    }
}
