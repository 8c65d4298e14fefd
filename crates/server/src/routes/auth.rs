//! Login, logout and current-admin handlers.

use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use tracing::instrument;

use civic_desk_core::{AdminUser, ApiResponse, LoginRequest, LoginResponse};

use super::{ApiJson, ApiResult};
use crate::{
    error::AppError,
    middleware::{BearerToken, CurrentAdmin},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/logout", post(logout))
        .route("/api/auth/me", get(me))
}

/// Exchange username, password and role for a bearer token.
///
/// # Errors
///
/// Returns 400 for blank credentials and 401 for anything that does not
/// match an active account.
#[instrument(skip_all, fields(username = %request.username, role = %request.role))]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> ApiResult<LoginResponse> {
    if request.username.trim().is_empty() || request.password.is_empty() {
        return Err(AppError::BadRequest(
            "Username and password are required".to_owned(),
        ));
    }

    let (token, user) = state.auth().login(&request).await.inspect_err(|e| {
        tracing::info!(error = %e, "login rejected");
    })?;

    tracing::info!(admin_id = %user.id, "admin logged in");
    Ok(Json(ApiResponse::ok(
        LoginResponse { token, user },
        "Login successful",
    )))
}

/// Revoke the presented token. Without a token this is a no-op.
pub async fn logout(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
) -> Json<ApiResponse<()>> {
    if let Some(token) = token {
        state.tokens().revoke(&token).await;
    }
    Json(ApiResponse::done("Logged out successfully"))
}

/// The signed-in admin.
///
/// # Errors
///
/// Returns 401 without a valid token.
pub async fn me(CurrentAdmin(admin): CurrentAdmin) -> ApiResult<AdminUser> {
    Ok(Json(ApiResponse::ok(admin, "User retrieved successfully")))
}
