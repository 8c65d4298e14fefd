//! Banner and health checks.

use axum::{Json, Router, extract::State, http::StatusCode, routing::get};

use civic_desk_core::ApiResponse;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api", get(banner))
        .route("/api/", get(banner))
        .route("/api/health", get(health))
        .route("/api/health/ready", get(readiness))
}

async fn banner() -> Json<ApiResponse<()>> {
    Json(ApiResponse::done("Admin Dashboard API is running"))
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the store is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match state.store().ping().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
