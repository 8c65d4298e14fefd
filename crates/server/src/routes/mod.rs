//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /api                        - Service banner
//! GET  /api/health                 - Liveness check
//! GET  /api/health/ready           - Readiness check (store reachable)
//!
//! # Auth
//! POST /api/auth/login             - Exchange credentials for a bearer token
//! POST /api/auth/logout            - Revoke the presented token
//! GET  /api/auth/me                - Current admin
//!
//! # Complaints
//! GET  /api/complaints             - Paginated, filtered listing (own only for workers)
//! POST /api/complaints             - File a complaint (Main Admin)
//! GET  /api/complaints/analytics   - Dashboard analytics (Main Admin)
//! GET  /api/complaints/{id}        - Complaint detail (own only for workers)
//! PUT  /api/complaints/{id}/assign   - Assign to a worker (Main Admin)
//! PUT  /api/complaints/{id}/transfer - Move to another department (Main Admin)
//! PUT  /api/complaints/{id}/status   - Status update with proof
//!
//! # Citizens (Main Admin)
//! GET  /api/users                  - Listing with optional `search`
//! GET  /api/users/search?q=        - Search
//! GET  /api/users/{id}             - Citizen detail
//!
//! # Workers (Main Admin)
//! GET    /api/admin/workers        - Active workers
//! POST   /api/admin/workers        - Create a worker
//! PUT    /api/admin/workers/{id}   - Partial update
//! DELETE /api/admin/workers/{id}   - Deactivate
//!
//! # Uploads
//! POST /api/upload/proof           - Multipart proof files (field `files`)
//! ```

pub mod auth;
pub mod complaints;
pub mod health;
pub mod upload;
pub mod users;
pub mod workers;

use axum::{
    Json, Router,
    extract::{FromRequest, FromRequestParts, Path, Query},
};

use civic_desk_core::ApiResponse;

use crate::{error::AppError, state::AppState};

/// Handler result carrying an enveloped payload.
pub type ApiResult<T> = Result<Json<ApiResponse<T>>, AppError>;

/// JSON body whose rejections render as the error envelope.
#[derive(FromRequest)]
#[from_request(via(Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// Query string whose rejections render as the error envelope.
#[derive(FromRequestParts)]
#[from_request(via(Query), rejection(AppError))]
pub struct ApiQuery<T>(pub T);

/// Path parameters whose rejections render as the error envelope.
#[derive(FromRequestParts)]
#[from_request(via(Path), rejection(AppError))]
pub struct ApiPath<T>(pub T);

/// Build the complete API router.
///
/// `max_upload_bytes` sizes the body limit of the upload route.
pub fn routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(auth::router())
        .merge(complaints::router())
        .merge(users::router())
        .merge(workers::router())
        .merge(upload::router(max_upload_bytes))
}
