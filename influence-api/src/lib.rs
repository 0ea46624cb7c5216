//! # influence-api
//!
//! Shared API types for the influence-backend service.
//! This crate is designed to be WASM-compatible and can be used in both
//! backend (Rust) and frontend (WASM/TypeScript via wasm-bindgen) applications.
//!
//! ## Features
//!
//! - Request DTOs (`MagicLinkRequest`, `SocialCallbackRequest`, etc.)
//! - Response DTOs (`MagicLinkAuthResponse`, `UserResponse`, etc.)
//! - Error response format (`ErrorResponse`)
//! - Generic response wrapper (`AppResponse`)
//!
//! ## Example
//!
//! ```rust
//! use influence_api::MagicLinkRequest;
//!
//! let request = MagicLinkRequest {
//!     email: Some("user@example.com".to_string()),
//!     user_type: Some("influencer".to_string()),
//! };
//! ```

pub mod error;
pub mod requests;
pub mod responses;
pub mod result;

// Re-exports for convenient access
pub use error::ErrorResponse;
pub use requests::*;
pub use responses::*;
pub use result::{AppResponse, StatusCode};
