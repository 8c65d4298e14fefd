//! Complaint handlers.
//!
//! Lower Admins only ever see complaints assigned to them; anything else
//! reads as not found.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, put},
};
use tracing::instrument;

use civic_desk_core::{
    Analytics, ApiResponse, AssignRequest, Complaint, ComplaintDraft, ComplaintFilter, ComplaintId,
    ComplaintListQuery, ComplaintPage, PageRequest, Pagination, StatusUpdate, TransferRequest,
};

use super::{ApiJson, ApiPath, ApiQuery, ApiResult};
use crate::{
    error::AppError,
    middleware::{CurrentAdmin, RequireMainAdmin},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/complaints", get(list).post(create))
        .route("/api/complaints/analytics", get(analytics))
        .route("/api/complaints/{id}", get(show))
        .route("/api/complaints/{id}/assign", put(assign))
        .route("/api/complaints/{id}/transfer", put(transfer))
        .route("/api/complaints/{id}/status", put(update_status))
}

/// Paginated complaint listing, newest first.
///
/// # Errors
///
/// Returns 400 for unknown status/priority filters or out-of-range paging.
#[instrument(skip(admin, state), fields(admin_id = %admin.id))]
pub async fn list(
    CurrentAdmin(admin): CurrentAdmin,
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ComplaintListQuery>,
) -> ApiResult<ComplaintPage> {
    let page = PageRequest::new(query.page, query.limit)?;
    let mut filter = ComplaintFilter::from_query(&query)?;
    if !admin.is_main_admin() {
        filter = filter.for_assignee(admin.id.clone());
    }

    let slice = state.store().list_complaints(&filter, page).await?;
    let pagination = Pagination::new(page, slice.total);

    Ok(Json(ApiResponse::ok(
        ComplaintPage {
            complaints: slice.complaints,
            pagination,
        },
        "Complaints retrieved successfully",
    )))
}

/// Complaint detail.
///
/// # Errors
///
/// Returns 404 if the complaint does not exist or, for a Lower Admin, is not
/// assigned to them.
#[instrument(skip(admin, state), fields(admin_id = %admin.id))]
pub async fn show(
    CurrentAdmin(admin): CurrentAdmin,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<ComplaintId>,
) -> ApiResult<Complaint> {
    let complaint = state
        .store()
        .get_complaint(&id)
        .await?
        .filter(|c| admin.is_main_admin() || c.is_assigned_to(&admin.id))
        .ok_or_else(|| {
            let message = if admin.is_main_admin() {
                "Complaint not found"
            } else {
                "Complaint not found or not assigned to you"
            };
            AppError::NotFound(message.to_owned())
        })?;

    Ok(Json(ApiResponse::ok(
        complaint,
        "Complaint retrieved successfully",
    )))
}

/// File a complaint on behalf of a citizen.
///
/// # Errors
///
/// Returns 400 for blank fields and 404 for an unknown citizen.
#[instrument(skip(admin, state, draft), fields(admin_id = %admin.id, user_id = %draft.user_id))]
pub async fn create(
    RequireMainAdmin(admin): RequireMainAdmin,
    State(state): State<AppState>,
    ApiJson(draft): ApiJson<ComplaintDraft>,
) -> Result<(StatusCode, Json<ApiResponse<Complaint>>), AppError> {
    let complaint = state.store().create_complaint(draft).await?;
    tracing::info!(complaint_id = %complaint.id, "complaint created");

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(complaint, "Complaint created successfully")),
    ))
}

/// Assign a complaint to a worker.
///
/// # Errors
///
/// Returns 404 for an unknown complaint or worker, 400 when the worker cannot
/// take it and 409 when the complaint is already completed.
#[instrument(skip(admin, state, body), fields(admin_id = %admin.id, worker_id = %body.worker_id))]
pub async fn assign(
    RequireMainAdmin(admin): RequireMainAdmin,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<ComplaintId>,
    ApiJson(body): ApiJson<AssignRequest>,
) -> ApiResult<Complaint> {
    if body.worker_id.as_str().trim().is_empty() {
        return Err(AppError::BadRequest("Please select a worker".to_owned()));
    }

    let complaint = state
        .store()
        .assign_complaint(&id, &body.worker_id)
        .await?;
    tracing::info!(complaint_id = %complaint.id, "complaint assigned");

    Ok(Json(ApiResponse::ok(
        complaint,
        "Complaint assigned successfully",
    )))
}

/// Move a complaint to another department.
///
/// # Errors
///
/// Returns 404 for an unknown complaint, 400 for a blank department and 409
/// when the complaint is already completed.
#[instrument(skip(admin, state), fields(admin_id = %admin.id))]
pub async fn transfer(
    RequireMainAdmin(admin): RequireMainAdmin,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<ComplaintId>,
    ApiJson(body): ApiJson<TransferRequest>,
) -> ApiResult<Complaint> {
    let complaint = state
        .store()
        .transfer_complaint(&id, &body.department)
        .await?;
    tracing::info!(complaint_id = %complaint.id, department = %complaint.department, "complaint transferred");

    Ok(Json(ApiResponse::ok(
        complaint,
        "Complaint transferred successfully",
    )))
}

/// Status update with remarks and proof files.
///
/// # Errors
///
/// Returns 404 when a Lower Admin is not the assignee and 400 for a status
/// workers cannot set or a malformed proof name.
#[instrument(skip(admin, state, update), fields(admin_id = %admin.id, status = %update.status))]
pub async fn update_status(
    CurrentAdmin(admin): CurrentAdmin,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<ComplaintId>,
    ApiJson(update): ApiJson<StatusUpdate>,
) -> ApiResult<Complaint> {
    let complaint = state
        .store()
        .update_complaint_status(&id, &admin, &update)
        .await?;
    tracing::info!(
        complaint_id = %complaint.id,
        proofs = update.proof_images.len(),
        "complaint status updated"
    );

    Ok(Json(ApiResponse::ok(
        complaint,
        "Complaint status updated successfully",
    )))
}

/// Dashboard analytics.
///
/// # Errors
///
/// Returns 403 for Lower Admins.
#[instrument(skip_all)]
pub async fn analytics(
    RequireMainAdmin(_admin): RequireMainAdmin,
    State(state): State<AppState>,
) -> ApiResult<Analytics> {
    let analytics = state.store().analytics().await?;
    Ok(Json(ApiResponse::ok(
        analytics,
        "Analytics retrieved successfully",
    )))
}
