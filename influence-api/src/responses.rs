use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Signed access/refresh credential pair
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct MagicLinkSentResponse {
    pub success: bool,
    pub message: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct MagicLinkAuthResponse {
    pub id: Uuid,
    pub email: Option<String>,
    pub token: TokenPair,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SocialAuthResponse {
    pub id: Uuid,
    pub email: Option<String>,
    pub name: Option<String>,
    pub image: Option<String>,
    pub token: TokenPair,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct AccessTokenResponse {
    pub access: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct AuthorizationUrlResponse {
    pub url: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct LinkedAccountResponse {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub account_type: String,
    pub description: Option<String>,
    pub provider: String,
    pub provider_account_id: String,
    pub user_type: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct UserResponse {
    pub id: Uuid,
    pub name: Option<String>,
    pub username: String,
    pub user_type: String,
    pub email: Option<String>,
    pub email_verified: Option<DateTime<Utc>>,
    pub image: Option<String>,
    pub accounts: Vec<LinkedAccountResponse>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
