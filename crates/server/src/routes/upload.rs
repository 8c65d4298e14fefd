//! Proof upload handler.

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, State, multipart::MultipartRejection},
    routing::post,
};
use tracing::instrument;

use civic_desk_core::{ApiResponse, UploadResult};

use super::ApiResult;
use crate::{
    error::AppError,
    middleware::CurrentAdmin,
    services::{PendingFile, UploadStore},
    state::AppState,
};

/// Multipart field carrying proof files.
pub const FILES_FIELD: &str = "files";

/// Most files accepted in one request.
pub const MAX_FILES_PER_REQUEST: usize = 10;

/// Allowance for multipart boundaries and part headers.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Build the upload router with a body limit sized for `max_file_bytes`.
pub fn router(max_file_bytes: usize) -> Router<AppState> {
    let body_limit = max_file_bytes
        .saturating_mul(MAX_FILES_PER_REQUEST)
        .saturating_add(MULTIPART_OVERHEAD);

    Router::new()
        .route("/api/upload/proof", post(upload_proof))
        .layer(DefaultBodyLimit::max(body_limit))
}

/// Store proof files and return their generated names.
///
/// Every `files` part must be an image or video within the per-file limit.
/// Parts under other field names are ignored. The whole batch is checked
/// before anything is written, so a rejected request stores no files.
///
/// # Errors
///
/// Returns 400 for a missing or unsupported file and 413 for an oversized one.
#[instrument(skip_all, fields(admin_id = %admin.id))]
pub async fn upload_proof(
    CurrentAdmin(admin): CurrentAdmin,
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<UploadResult> {
    let mut multipart = multipart?;
    let uploads = state.uploads();
    let mut pending = Vec::new();

    while let Some(mut field) = multipart.next_field().await? {
        if field.name() != Some(FILES_FIELD) {
            continue;
        }
        if pending.len() == MAX_FILES_PER_REQUEST {
            return Err(AppError::BadRequest(format!(
                "At most {MAX_FILES_PER_REQUEST} files per upload"
            )));
        }

        UploadStore::check_content_type(field.content_type()).inspect_err(|e| {
            tracing::info!(error = %e, "upload rejected");
        })?;
        let original = field.file_name().map(str::to_owned);

        let mut bytes = Vec::new();
        while let Some(chunk) = field.chunk().await? {
            bytes.extend_from_slice(&chunk);
            uploads.check_size(bytes.len())?;
        }
        pending.push(PendingFile::new(original, bytes));
    }

    let files = uploads.save_batch(&pending).await?;
    for (name, file) in files.iter().zip(&pending) {
        tracing::info!(file = %name, size = file.len(), "file uploaded");
    }

    Ok(Json(ApiResponse::ok(
        UploadResult { files },
        "Files uploaded successfully",
    )))
}
