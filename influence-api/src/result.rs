use serde::{Deserialize, Serialize};

/// HTTP status codes represented as an enum
/// This is WASM-compatible and doesn't depend on `axum::http::StatusCode`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusCode {
    Ok = 200,
    Created = 201,
    NoContent = 204,
    BadRequest = 400,
    Unauthorized = 401,
    NotFound = 404,
    Conflict = 409,
    InternalServerError = 500,
}

/// Generic API response wrapper
///
/// The backend wraps this in a type that implements Axum's `IntoResponse`.
///
/// ```rust
/// use influence_api::{AppResponse, StatusCode};
///
/// let response = AppResponse::ok("data");
/// assert_eq!(response.status, StatusCode::Ok);
///
/// let response: AppResponse<()> = AppResponse::no_content();
/// assert!(response.data.is_none());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppResponse<T> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    pub status: StatusCode,
}

impl<T> AppResponse<T> {
    pub fn new(status: StatusCode, data: T) -> Self {
        Self {
            status,
            data: Some(data),
        }
    }

    pub fn empty(status: StatusCode) -> Self {
        Self { status, data: None }
    }

    /// 200 OK with data
    pub fn ok(data: T) -> Self {
        Self::new(StatusCode::Ok, data)
    }

    /// 201 Created with data
    pub fn created(data: T) -> Self {
        Self::new(StatusCode::Created, data)
    }
}

impl AppResponse<()> {
    /// 204 No Content
    pub fn no_content() -> Self {
        Self::empty(StatusCode::NoContent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MagicLinkRequest, TokenPair};

    #[test]
    fn created_response_carries_data() {
        let pair = TokenPair {
            access: "a".to_string(),
            refresh: "r".to_string(),
        };
        let response = AppResponse::created(pair.clone());
        assert_eq!(response.status, StatusCode::Created);
        assert_eq!(response.data, Some(pair));
    }

    #[test]
    fn no_content_response_is_empty() {
        let response = AppResponse::no_content();
        assert_eq!(response.status, StatusCode::NoContent);
        assert!(response.data.is_none());
    }

    #[test]
    fn magic_link_request_accepts_missing_fields() {
        let request: MagicLinkRequest = serde_json::from_str("{}").unwrap();
        assert!(request.email.is_none());
        assert!(request.user_type.is_none());
    }
}
