//! Citizen handlers (Main Admin only).

use axum::{Json, Router, extract::State, routing::get};
use serde::Deserialize;
use tracing::instrument;

use civic_desk_core::{ApiResponse, Citizen, CitizenFilter, CitizenId};

use super::{ApiPath, ApiQuery, ApiResult};
use crate::{error::AppError, middleware::RequireMainAdmin, state::AppState};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/users", get(list))
        .route("/api/users/search", get(search))
        .route("/api/users/{id}", get(show))
}

/// `GET /api/users` query.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub search: Option<String>,
}

/// `GET /api/users/search` query.
#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

/// Citizen listing with an optional free-text filter.
///
/// # Errors
///
/// Returns 403 for Lower Admins.
#[instrument(skip(_admin, state))]
pub async fn list(
    RequireMainAdmin(_admin): RequireMainAdmin,
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ListQuery>,
) -> ApiResult<Vec<Citizen>> {
    let filter = CitizenFilter::search(query.search.as_deref());
    let citizens = state.store().list_citizens(&filter).await?;
    Ok(Json(ApiResponse::ok(citizens, "Users retrieved successfully")))
}

/// Citizens matching `q` on name, email, phone or id.
///
/// # Errors
///
/// Returns 403 for Lower Admins.
#[instrument(skip(_admin, state))]
pub async fn search(
    RequireMainAdmin(_admin): RequireMainAdmin,
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<SearchQuery>,
) -> ApiResult<Vec<Citizen>> {
    let filter = CitizenFilter::search(query.q.as_deref());
    let citizens = state.store().list_citizens(&filter).await?;
    Ok(Json(ApiResponse::ok(citizens, "Users retrieved successfully")))
}

/// Citizen detail.
///
/// # Errors
///
/// Returns 404 for an unknown citizen.
#[instrument(skip(_admin, state))]
pub async fn show(
    RequireMainAdmin(_admin): RequireMainAdmin,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<CitizenId>,
) -> ApiResult<Citizen> {
    let citizen = state
        .store()
        .get_citizen(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_owned()))?;
    Ok(Json(ApiResponse::ok(citizen, "User retrieved successfully")))
}
