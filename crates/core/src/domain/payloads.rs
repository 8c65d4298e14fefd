//! Request and response bodies shared by the server and the client.

use core::fmt;

use serde::{Deserialize, Serialize};

use super::{AdminUser, Complaint};
use crate::envelope::Pagination;
use crate::types::{AdminRole, AdminUserId, ComplaintStatus};

/// `POST /api/auth/login` body.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
    pub role: AdminRole,
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("role", &self.role)
            .finish()
    }
}

/// `POST /api/auth/login` response data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: AdminUser,
}

/// `PUT /api/complaints/:id/assign` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignRequest {
    pub worker_id: AdminUserId,
}

/// `PUT /api/complaints/:id/transfer` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferRequest {
    pub department: String,
}

/// `PUT /api/complaints/:id/status` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdate {
    pub status: ComplaintStatus,
    /// Replaces the complaint's remarks.
    #[serde(default)]
    pub remarks: String,
    /// Names returned by the upload endpoint, appended to the proof list.
    #[serde(default)]
    pub proof_images: Vec<String>,
}

/// Query string of `GET /api/complaints`.
///
/// Filters are kept as raw strings so `all` and lenient spellings can be
/// interpreted by [`ComplaintFilter::from_query`](super::ComplaintFilter::from_query).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplaintListQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
}

/// `GET /api/complaints` response data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplaintPage {
    pub complaints: Vec<Complaint>,
    pub pagination: Pagination,
}

/// `POST /api/upload/proof` response data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResult {
    /// Stored file names, in upload order.
    pub files: Vec<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_status_update_defaults() {
        let update: StatusUpdate = serde_json::from_str(r#"{"status":"Completed"}"#).unwrap();
        assert_eq!(update.status, ComplaintStatus::Completed);
        assert!(update.remarks.is_empty());
        assert!(update.proof_images.is_empty());
    }

    #[test]
    fn test_assign_request_wire_name() {
        let body: AssignRequest =
            serde_json::from_str(r#"{"workerId":"worker3","workerName":"David Kumar"}"#).unwrap();
        assert_eq!(body.worker_id.as_str(), "worker3");
    }

    #[test]
    fn test_login_request_debug_redacts_password() {
        let req = LoginRequest {
            username: "admin".to_owned(),
            password: "admin123".to_owned(),
            role: AdminRole::MainAdmin,
        };
        assert!(!format!("{req:?}").contains("admin123"));
    }
}
