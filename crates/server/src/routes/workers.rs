//! Worker (Lower Admin) management handlers. Main Admin only.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, put},
};
use serde::Deserialize;
use tracing::instrument;

use civic_desk_core::{AdminUser, AdminUserId, ApiResponse, WorkerDraft, WorkerUpdate};

use super::{ApiJson, ApiPath, ApiQuery, ApiResult};
use crate::{
    error::AppError, middleware::RequireMainAdmin, services::auth::hash_password,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/admin/workers", get(list).post(create))
        .route("/api/admin/workers/{id}", put(update).delete(deactivate))
}

/// `GET /api/admin/workers` query.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub department: Option<String>,
}

/// Active workers, newest first.
///
/// # Errors
///
/// Returns 403 for Lower Admins.
#[instrument(skip(_admin, state))]
pub async fn list(
    RequireMainAdmin(_admin): RequireMainAdmin,
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ListQuery>,
) -> ApiResult<Vec<AdminUser>> {
    let department = query
        .department
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty() && !d.eq_ignore_ascii_case("all"));
    let workers = state.store().list_workers(department).await?;
    Ok(Json(ApiResponse::ok(workers, "Workers retrieved successfully")))
}

/// Create a Lower Admin account.
///
/// # Errors
///
/// Returns 400 for invalid fields and 409 when the username or email is taken.
#[instrument(skip(admin, state, draft), fields(admin_id = %admin.id, username = %draft.username))]
pub async fn create(
    RequireMainAdmin(admin): RequireMainAdmin,
    State(state): State<AppState>,
    ApiJson(draft): ApiJson<WorkerDraft>,
) -> Result<(StatusCode, Json<ApiResponse<AdminUser>>), AppError> {
    let worker = draft.validate()?;
    let password_hash = hash_password(&worker.password)?;
    let created = state.store().create_worker(worker, password_hash).await?;
    tracing::info!(worker_id = %created.id, "worker created");

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(created, "Worker created successfully")),
    ))
}

/// Partial update of a worker.
///
/// # Errors
///
/// Returns 400 for an empty or invalid update, 404 for an unknown worker and
/// 409 when the new email is taken.
#[instrument(skip(admin, state), fields(admin_id = %admin.id))]
pub async fn update(
    RequireMainAdmin(admin): RequireMainAdmin,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<AdminUserId>,
    ApiJson(update): ApiJson<WorkerUpdate>,
) -> ApiResult<AdminUser> {
    if update.is_empty() {
        return Err(AppError::BadRequest("No fields to update".to_owned()));
    }

    let worker = state.store().update_worker(&id, &update).await?;
    tracing::info!(worker_id = %worker.id, "worker updated");
    Ok(Json(ApiResponse::ok(worker, "Worker updated successfully")))
}

/// Deactivate a worker. The account and its history are kept.
///
/// # Errors
///
/// Returns 404 for an unknown worker.
#[instrument(skip(admin, state), fields(admin_id = %admin.id))]
pub async fn deactivate(
    RequireMainAdmin(admin): RequireMainAdmin,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<AdminUserId>,
) -> ApiResult<AdminUser> {
    let update = WorkerUpdate {
        is_active: Some(false),
        ..WorkerUpdate::default()
    };
    let worker = state.store().update_worker(&id, &update).await?;
    tracing::info!(worker_id = %worker.id, "worker deactivated");
    Ok(Json(ApiResponse::ok(worker, "Worker deactivated successfully")))
}
