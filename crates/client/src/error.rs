//! Error types for the dashboard API client.

use reqwest::StatusCode;
use thiserror::Error;

/// Errors that can occur when talking to the dashboard API.
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed before a response arrived.
    #[error("{0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with `success: false` or an error status.
    #[error("{message}")]
    Api {
        /// HTTP status of the response.
        status: StatusCode,
        /// Message taken from the response body.
        message: String,
    },

    /// The session is missing or expired. The stored token has been cleared.
    #[error("{0}")]
    Unauthorized(String),

    /// A form was rejected before any request was sent.
    #[error("{0}")]
    Validation(String),

    /// The response body was not the expected envelope.
    #[error("parse error: {0}")]
    Parse(String),

    /// The configured base URL cannot be joined with an endpoint path.
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

impl ClientError {
    /// HTTP status carried by the error, if the server answered.
    #[must_use]
    pub const fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Unauthorized(_) => Some(StatusCode::UNAUTHORIZED),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_error_display() {
        let err = ClientError::Api {
            status: StatusCode::NOT_FOUND,
            message: "Complaint not found".to_string(),
        };
        assert_eq!(err.to_string(), "Complaint not found");
        assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));

        let err = ClientError::Validation("Please select a status".to_string());
        assert_eq!(err.to_string(), "Please select a status");
        assert_eq!(err.status(), None);
    }
}
