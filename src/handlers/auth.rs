use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::{HeaderMap, HeaderValue, header},
};
use influence_api::{
    AccessTokenResponse, AuthorizationUrlResponse, MagicLinkAuthResponse, MagicLinkRequest,
    MagicLinkSentResponse, MagicLinkVerifyRequest, SocialAuthResponse, SocialCallbackRequest,
    TokenRefreshRequest,
};

use crate::error::AppError;
use crate::response::AppResponse;
use crate::state::AppState;

fn required(value: Option<String>, field: &str) -> Result<String, AppError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| AppError::validation(format!("{field} is required")))
}

fn no_store() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    headers
}

/// POST /auth/magic-link/request
pub async fn request_magic_link(
    State(state): State<AppState>,
    payload: Result<Json<MagicLinkRequest>, JsonRejection>,
) -> Result<AppResponse<MagicLinkSentResponse>, AppError> {
    let Json(payload) = payload?;
    let email = required(payload.email, "Email")?;

    let expires_at = state
        .magic_links
        .issue(&email, payload.user_type.as_deref())
        .await?;

    Ok(AppResponse::ok(MagicLinkSentResponse {
        success: true,
        message: "Magic link sent to your email".to_string(),
        expires_at,
    }))
}

/// POST /auth/magic-link/verify
pub async fn verify_magic_link(
    State(state): State<AppState>,
    payload: Result<Json<MagicLinkVerifyRequest>, JsonRejection>,
) -> Result<AppResponse<MagicLinkAuthResponse>, AppError> {
    let Json(payload) = payload?;
    let token = required(payload.token, "Token")?;
    let email = required(payload.email, "Email")?;

    let user = state.magic_links.verify(&email, &token)?;
    let token = state.minter.mint(&user)?;

    Ok(AppResponse::created(MagicLinkAuthResponse {
        id: user.id,
        email: user.email,
        token,
    })
    .with_headers(no_store()))
}

/// GET /auth/social/login
pub async fn social_login_url(
    State(state): State<AppState>,
) -> Result<AppResponse<AuthorizationUrlResponse>, AppError> {
    let url = state.social.authorization_url()?;
    Ok(AppResponse::ok(AuthorizationUrlResponse { url }))
}

/// POST /auth/social/callback
pub async fn social_callback(
    State(state): State<AppState>,
    payload: Result<Json<SocialCallbackRequest>, JsonRejection>,
) -> Result<AppResponse<SocialAuthResponse>, AppError> {
    let Json(payload) = payload?;
    let code = required(payload.code, "Code")?;

    let user = state
        .social
        .link_social_account(&code, payload.user_type.as_deref())
        .await?;
    let token = state.minter.mint(&user)?;

    Ok(AppResponse::ok(SocialAuthResponse {
        id: user.id,
        email: user.email,
        name: user.name,
        image: user.image,
        token,
    })
    .with_headers(no_store()))
}

/// POST /auth/token/refresh
pub async fn refresh_token(
    State(state): State<AppState>,
    payload: Result<Json<TokenRefreshRequest>, JsonRejection>,
) -> Result<AppResponse<AccessTokenResponse>, AppError> {
    let Json(payload) = payload?;
    let access = state.jwt.refresh_access(payload.refresh.trim())?;

    Ok(AppResponse::ok(AccessTokenResponse { access }).with_headers(no_store()))
}
