use serde::{Deserialize, Serialize};

// Fields are optional so that a missing value surfaces as a validation
// error with a readable message instead of a body rejection.

// -------- REQUEST DTOs --------
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct MagicLinkRequest {
    pub email: Option<String>,
    pub user_type: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct MagicLinkVerifyRequest {
    pub token: Option<String>,
    pub email: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct SocialCallbackRequest {
    pub code: Option<String>,
    pub user_type: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct TokenRefreshRequest {
    pub refresh: String,
}

/// Partial profile update; absent fields are left untouched.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub username: Option<String>,
    pub image: Option<String>,
    pub user_type: Option<String>,
}
