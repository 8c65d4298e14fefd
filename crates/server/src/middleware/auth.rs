//! Authentication extractors.
//!
//! Handlers name the access they need in their signature: `CurrentAdmin` for
//! any signed-in account, `RequireMainAdmin` for Main Admin endpoints.

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};

use civic_desk_core::AdminUser;

use crate::error::{AppError, set_sentry_user};
use crate::state::AppState;

/// Raw bearer token from the `Authorization` header, if any.
///
/// Never rejects; logout uses it so that a missing token is a no-op.
pub struct BearerToken(pub Option<String>);

impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(bearer_token(parts).map(str::to_owned)))
    }
}

/// Extractor that requires a signed-in, active admin of either role.
///
/// # Example
///
/// ```rust,ignore
/// async fn me(CurrentAdmin(admin): CurrentAdmin) -> impl IntoResponse {
///     Json(admin)
/// }
/// ```
pub struct CurrentAdmin(pub AdminUser);

impl FromRequestParts<AppState> for CurrentAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)
            .ok_or_else(|| AppError::Unauthorized("Authentication required".to_owned()))?;

        let admin = state.auth().authenticate(token).await?;
        set_sentry_user(admin.id.as_str(), Some(admin.email.as_str()));
        tracing::Span::current().record("admin_id", admin.id.as_str());

        Ok(Self(admin))
    }
}

/// Extractor that requires a signed-in Main Admin.
///
/// Lower Admins are rejected with 403.
pub struct RequireMainAdmin(pub AdminUser);

impl FromRequestParts<AppState> for RequireMainAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let CurrentAdmin(admin) = CurrentAdmin::from_request_parts(parts, state).await?;

        if !admin.is_main_admin() {
            return Err(AppError::Forbidden("Main Admin access required".to_owned()));
        }

        Ok(Self(admin))
    }
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    let value = parts.headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}
