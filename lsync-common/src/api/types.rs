//! Shared API response types

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Error body returned by every lsync service
///
/// Serialized as `{"error": {"code": ..., "message": ..., "details": ...}}`.
///
/// # Examples
///
/// ```
/// use lsync_common::api::types::ErrorResponse;
///
/// let error = ErrorResponse::new("GATE_MISMATCH", "Incorrect passcode");
/// let json = serde_json::to_value(&error).unwrap();
/// assert_eq!(json["error"]["code"], "GATE_MISMATCH");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Machine-readable error identifier
    pub code: String,
    /// Human-readable message (shown to the user as a toast)
    pub message: String,
    /// Additional error details (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
                details: None,
            },
        }
    }

    /// Error with structured details (e.g. the export kept for retry)
    pub fn with_details(code: impl Into<String>, message: impl Into<String>, details: Value) -> Self {
        let mut response = Self::new(code, message);
        response.error.details = Some(details);
        response
    }
}
