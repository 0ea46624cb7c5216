// src/error.rs

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use influence_api::ErrorResponse;

#[derive(Debug, Clone, thiserror::Error)]
pub enum AppError {
    // === Repository errors ===
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Already exists: {0}")]
    Duplicate(String),
    #[error("Database error: {0}")]
    DatabaseError(String),

    // === Authentication errors ===
    /// Magic link lookup or redemption failed. Deliberately carries no detail.
    #[error("Invalid or expired token")]
    InvalidOrExpired,
    #[error("Invalid token")]
    InvalidToken,
    #[error("Invalid email format")]
    InvalidEmail,
    #[error("Magic link delivery failed: {0}")]
    DeliveryFailed(String),

    // === Credential errors ===
    #[error("Token generation failed: {0}")]
    TokenGenerationFailed(String),
    #[error("Invalid token format")]
    InvalidTokenFormat,

    // === Validation errors ===
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // === Upstream (OAuth provider, Graph API) ===
    /// Upstream error payload, returned to the caller unchanged.
    #[error("Upstream error: {0}")]
    Upstream(serde_json::Value),

    #[error("Unauthorized: {0}")]
    UnauthorizedAction(String),

    // === Internal errors ===
    #[error("Internal server error: {0}")]
    InternalServerError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let AppError::Upstream(payload) = self {
            tracing::warn!(%payload, "Upstream call failed");
            return (StatusCode::BAD_REQUEST, Json(payload)).into_response();
        }

        let (status, error_code, message, internal_detail) = self.get_error_info();

        if let Some(ref detail) = internal_detail {
            tracing::error!(error_code, %status, detail, "Internal server error");
        }

        (status, Json(ErrorResponse::new(error_code, message))).into_response()
    }
}

impl AppError {
    /// Status, public code, public message and the detail kept for logs.
    fn get_error_info(&self) -> (StatusCode, &'static str, String, Option<String>) {
        match self {
            // 404 Not Found
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone(), None),

            // 409 Conflict
            AppError::Duplicate(msg) => {
                (StatusCode::CONFLICT, "DUPLICATE_ENTRY", msg.clone(), None)
            }

            // 401 Unauthorized
            AppError::InvalidOrExpired => (
                StatusCode::UNAUTHORIZED,
                "INVALID_OR_EXPIRED",
                "Invalid or expired token".to_string(),
                None,
            ),
            AppError::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                "INVALID_TOKEN",
                "Token is invalid or expired".to_string(),
                None,
            ),
            AppError::UnauthorizedAction(msg) => {
                (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone(), None)
            }

            // 400 Bad Request
            AppError::InvalidEmail => (
                StatusCode::BAD_REQUEST,
                "INVALID_EMAIL",
                "Invalid email format".to_string(),
                None,
            ),
            AppError::ValidationError(msg) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                msg.clone(),
                None,
            ),
            AppError::InvalidInput(msg) => {
                (StatusCode::BAD_REQUEST, "INVALID_INPUT", msg.clone(), None)
            }
            AppError::InvalidTokenFormat => (
                StatusCode::BAD_REQUEST,
                "INVALID_TOKEN_FORMAT",
                "Token format is invalid".to_string(),
                None,
            ),
            AppError::Upstream(payload) => (
                StatusCode::BAD_REQUEST,
                "UPSTREAM_ERROR",
                payload.to_string(),
                None,
            ),

            // 500 Internal Server Error
            AppError::DeliveryFailed(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "DELIVERY_FAILED",
                "The magic link email could not be sent".to_string(),
                Some(msg.clone()),
            ),
            AppError::TokenGenerationFailed(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "TOKEN_ERROR",
                "An error occurred while generating token".to_string(),
                Some(msg.clone()),
            ),
            AppError::DatabaseError(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "DATABASE_ERROR",
                "An error occurred with the database".to_string(),
                Some(msg.clone()),
            ),
            AppError::InternalServerError(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal server error occurred".to_string(),
                Some(msg.clone()),
            ),
        }
    }

    // === Helper constructors ===
    pub fn not_found(msg: impl Into<String>) -> Self {
        AppError::NotFound(msg.into())
    }

    pub fn duplicate(msg: impl Into<String>) -> Self {
        AppError::Duplicate(msg.into())
    }

    pub fn database(msg: impl Into<String>) -> Self {
        AppError::DatabaseError(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::InternalServerError(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::ValidationError(msg.into())
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        AppError::InvalidInput(msg.into())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        AppError::UnauthorizedAction(msg.into())
    }

    /// Upstream failure described by a plain message.
    pub fn upstream(msg: impl Into<String>) -> Self {
        AppError::Upstream(serde_json::json!({ "error": msg.into() }))
    }

    pub fn token_generation_failed(msg: impl Into<String>) -> Self {
        AppError::TokenGenerationFailed(msg.into())
    }

    #[cfg(test)]
    pub fn status_code(&self) -> StatusCode {
        self.get_error_info().0
    }
}

// === Conversions from other error types ===

impl From<crate::db::error::RepositoryError> for AppError {
    fn from(err: crate::db::error::RepositoryError) -> Self {
        use crate::db::error::RepositoryError;

        match err {
            RepositoryError::NotFound(msg) => AppError::not_found(msg),
            RepositoryError::UniqueViolation(msg) => AppError::duplicate(msg),
            RepositoryError::PoolError(msg)
            | RepositoryError::ForeignKeyViolation(msg)
            | RepositoryError::DatabaseError(msg) => AppError::database(msg),
        }
    }
}

impl From<crate::auth::jwt::JwtError> for AppError {
    fn from(err: crate::auth::jwt::JwtError) -> Self {
        use crate::auth::jwt::JwtError;

        match err {
            JwtError::GenerationFailed(e) => AppError::token_generation_failed(e.to_string()),
            JwtError::VerificationFailed(_) | JwtError::WrongTokenType { .. } => {
                AppError::InvalidToken
            }
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::invalid_input(format!("JSON error: {}", err))
    }
}

impl From<axum::extract::rejection::JsonRejection> for AppError {
    fn from(err: axum::extract::rejection::JsonRejection) -> Self {
        AppError::invalid_input(format!("Invalid JSON: {}", err.body_text()))
    }
}
