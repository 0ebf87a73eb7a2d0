//! API error bodies
//!
//! The server reports failures in a few shapes; all of them reduce to an
//! optional human-readable message.

use serde::Deserialize;

/// Structured error body (`{"error": {"code": ..., "message": ...}}`)
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub code: Option<String>,
    pub message: String,
}

/// Every error body shape the server is known to send
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum ErrorPayload {
    Flat { message: String },
    Nested { error: ErrorBody },
    Plain { error: String },
}

/// Server-provided message from a failed response body, if any
pub fn extract_error_message(body: &[u8]) -> Option<String> {
    let payload: ErrorPayload = serde_json::from_slice(body).ok()?;
    let message = match payload {
        ErrorPayload::Flat { message } => message,
        ErrorPayload::Nested { error } => error.message,
        ErrorPayload::Plain { error } => error,
    };
    let message = message.trim().to_string();
    (!message.is_empty()).then_some(message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_message() {
        let body = br#"{"message": "Invalid credentials"}"#;
        assert_eq!(extract_error_message(body).as_deref(), Some("Invalid credentials"));
    }

    #[test]
    fn test_nested_message() {
        let body =
            br#"{"request_id": "r1", "error": {"code": "BAD_REQUEST", "message": "Amount too low"}}"#;
        assert_eq!(extract_error_message(body).as_deref(), Some("Amount too low"));
    }

    #[test]
    fn test_plain_error_string() {
        let body = br#"{"error": "Unauthorized"}"#;
        assert_eq!(extract_error_message(body).as_deref(), Some("Unauthorized"));
    }

    #[test]
    fn test_missing_or_blank_message() {
        assert_eq!(extract_error_message(b"<html>502</html>"), None);
        assert_eq!(extract_error_message(b""), None);
        assert_eq!(extract_error_message(br#"{"message": "  "}"#), None);
        assert_eq!(extract_error_message(br#"{"status": 500}"#), None);
    }
}
