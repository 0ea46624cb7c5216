use serde::{Deserialize, Serialize};

/// Body of every non-2xx response except upstream pass-through errors,
/// which carry the provider's own payload.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ErrorResponse {
    /// Stable machine-readable code, e.g. `INVALID_OR_EXPIRED`.
    pub error: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn details_are_omitted_when_absent() {
        let body = serde_json::to_value(ErrorResponse::new("NOT_FOUND", "User")).unwrap();
        assert_eq!(body, serde_json::json!({ "error": "NOT_FOUND", "message": "User" }));
    }

    #[test]
    fn details_round_trip() {
        let raw = r#"{"error":"INVALID_INPUT","message":"bad","details":"line 1"}"#;
        let parsed: ErrorResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed, ErrorResponse::new("INVALID_INPUT", "bad").with_details("line 1"));
    }
}
