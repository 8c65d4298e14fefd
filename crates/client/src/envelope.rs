//! Unwrapping of the `{success, data, message, error}` envelope.

use serde::Deserialize;

/// Response body as the client reads it.
///
/// Looser than [`civic_desk_core::ApiResponse`]: every field is optional and
/// a `detail` field is accepted so error bodies from proxies and other
/// frameworks still yield a readable message.
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<T> {
    pub success: Option<bool>,
    pub data: Option<T>,
    pub message: Option<String>,
    pub error: Option<String>,
    pub detail: Option<serde_json::Value>,
}

impl<T> Envelope<T> {
    /// Best message describing a failure: `detail`, then `error`, then
    /// `message`.
    pub fn failure_message(&self) -> Option<String> {
        let detail = self.detail.as_ref().map(|d| match d {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        });

        detail
            .into_iter()
            .chain(self.error.clone())
            .chain(self.message.clone())
            .find(|m| !m.trim().is_empty())
    }
}

/// Unwrapped successful response.
#[derive(Debug)]
pub(crate) struct Reply<T> {
    pub data: Option<T>,
    pub message: String,
}

impl<T> Reply<T> {
    /// The `data` field, which the endpoint is expected to return.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Parse` when the envelope carried no data.
    pub fn into_data(self) -> Result<T, crate::ClientError> {
        self.data
            .ok_or_else(|| crate::ClientError::Parse("response carried no data".to_owned()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde::de::IgnoredAny;

    use super::*;

    /// Payload type without a `Default` impl.
    #[derive(Debug, Deserialize, PartialEq, Eq)]
    struct Counter {
        total: u32,
    }

    fn parse(body: &str) -> Envelope<IgnoredAny> {
        serde_json::from_str(body).unwrap()
    }

    #[test]
    fn test_failure_message_precedence() {
        let env = parse(r#"{"success":false,"error":"Complaint not found","message":"x"}"#);
        assert_eq!(env.failure_message().as_deref(), Some("Complaint not found"));

        let env = parse(r#"{"detail":"Not authenticated","message":"x"}"#);
        assert_eq!(env.failure_message().as_deref(), Some("Not authenticated"));

        let env = parse(r#"{"success":false,"detail":"Token expired","error":"Unauthorized"}"#);
        assert_eq!(env.failure_message().as_deref(), Some("Token expired"));

        let env = parse(r#"{"success":false,"detail":" ","error":"Worker not found"}"#);
        assert_eq!(env.failure_message().as_deref(), Some("Worker not found"));

        let env = parse(r#"{"success":false,"error":"","message":"Try again"}"#);
        assert_eq!(env.failure_message().as_deref(), Some("Try again"));

        assert_eq!(parse("{}").failure_message(), None);
    }

    #[test]
    fn test_structured_detail_is_stringified() {
        let env = parse(r#"{"detail":[{"loc":["body","status"]}]}"#);
        assert!(env.failure_message().unwrap().contains("status"));
    }

    #[test]
    fn test_data_without_default_impl() {
        let env: Envelope<Counter> =
            serde_json::from_str(r#"{"success":true,"data":{"total":3},"message":"ok"}"#).unwrap();
        assert_eq!(env.data, Some(Counter { total: 3 }));

        let env: Envelope<Counter> = serde_json::from_str(r#"{"success":false}"#).unwrap();
        assert!(env.data.is_none());
        assert!(env.message.is_none());
    }
}
