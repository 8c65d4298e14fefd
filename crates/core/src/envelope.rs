//! JSON response envelope and pagination.
//!
//! Every API response has the shape
//! `{"success": bool, "data": ..., "message": "...", "error": ...}`.

use serde::{Deserialize, Serialize};

/// Response wrapper used by every endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(default)]
    pub data: Option<T>,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Successful response carrying `data`.
    pub fn ok(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: message.into(),
            error: None,
        }
    }

    /// Successful response with a message only.
    pub fn done(message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: None,
            message: message.into(),
            error: None,
        }
    }

    /// Failed response carrying a human-readable error.
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: String::new(),
            error: Some(error.into()),
        }
    }
}

/// Largest page size a client may request.
pub const MAX_PAGE_SIZE: u32 = 100;
/// Page size used when none is given.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Invalid pagination parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PaginationError {
    #[error("page must be at least 1")]
    PageOutOfRange,
    #[error("limit must be between 1 and {MAX_PAGE_SIZE}")]
    LimitOutOfRange,
}

/// A validated page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    /// Validate optional `page`/`limit` query values.
    ///
    /// # Errors
    ///
    /// Returns an error when `page` is 0 or `limit` is outside
    /// `1..=MAX_PAGE_SIZE`.
    pub fn new(page: Option<u32>, limit: Option<u32>) -> Result<Self, PaginationError> {
        let page = page.unwrap_or(1);
        let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE);
        if page == 0 {
            return Err(PaginationError::PageOutOfRange);
        }
        if limit == 0 || limit > MAX_PAGE_SIZE {
            return Err(PaginationError::LimitOutOfRange);
        }
        Ok(Self { page, limit })
    }

    /// Number of rows to skip.
    #[must_use]
    pub fn offset(self) -> i64 {
        (i64::from(self.page) - 1) * i64::from(self.limit)
    }

    /// Slice one page out of an already ordered collection.
    #[must_use]
    pub fn slice<T: Clone>(self, items: &[T]) -> Vec<T> {
        let offset = usize::try_from(self.offset()).unwrap_or(usize::MAX);
        items
            .iter()
            .skip(offset)
            .take(self.limit as usize)
            .cloned()
            .collect()
    }
}

/// Pagination metadata returned alongside a page of results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: i64,
    pub pages: i64,
}

impl Pagination {
    /// Metadata for `request` over `total` matching rows.
    #[must_use]
    pub fn new(request: PageRequest, total: i64) -> Self {
        let limit = i64::from(request.limit);
        Self {
            page: request.page,
            limit: request.limit,
            total,
            pages: (total + limit - 1) / limit,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_page_request_defaults() {
        let req = PageRequest::new(None, None).unwrap();
        assert_eq!(req, PageRequest::default());
        assert_eq!(req.offset(), 0);
    }

    #[test]
    fn test_page_request_bounds() {
        assert_eq!(PageRequest::new(Some(0), None), Err(PaginationError::PageOutOfRange));
        assert_eq!(PageRequest::new(None, Some(0)), Err(PaginationError::LimitOutOfRange));
        assert_eq!(PageRequest::new(None, Some(101)), Err(PaginationError::LimitOutOfRange));
        assert!(PageRequest::new(Some(3), Some(100)).is_ok());
    }

    #[test]
    fn test_pages_round_up() {
        let req = PageRequest::new(Some(2), Some(2)).unwrap();
        assert_eq!(req.offset(), 2);
        assert_eq!(Pagination::new(req, 5).pages, 3);
        assert_eq!(Pagination::new(req, 0).pages, 0);
        assert_eq!(req.slice(&[1, 2, 3, 4, 5]), vec![3, 4]);
    }

    #[test]
    fn test_envelope_shape() {
        let json = serde_json::to_value(ApiResponse::ok(7, "Seven")).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["data"], 7);
        assert!(json["error"].is_null());

        let json = serde_json::to_value(ApiResponse::<()>::failure("Invalid credentials")).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "Invalid credentials");
    }

    #[test]
    fn test_envelope_tolerates_missing_fields() {
        let parsed: ApiResponse<u8> = serde_json::from_str(r#"{"success":true}"#).unwrap();
        assert!(parsed.data.is_none());
        assert!(parsed.message.is_empty());
    }
}
