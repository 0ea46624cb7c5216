use std::collections::HashMap;

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde_json::Value;

use crate::auth::extractors::AuthClaims;
use crate::error::AppError;
use crate::instagram::insights::{AccountSummary, Demographics, MAX_ENGAGEMENT_MONTHS, MAX_GROWTH_DAYS};
use crate::instagram::service::{CurrentMonthLikes, FollowerGrowth, PostEngagements};
use crate::state::AppState;

const DEFAULT_GROWTH_DAYS: u32 = 30;
const DEFAULT_ENGAGEMENT_MONTHS: u32 = 6;

/// Positive integer query parameter capped at `max`; anything unparseable
/// falls back to `default`.
fn positive_param(params: &HashMap<String, String>, key: &str, default: u32, max: u32) -> u32 {
    params
        .get(key)
        .and_then(|v| v.trim().parse::<u32>().ok())
        .filter(|v| *v > 0)
        .map_or(default, |v| v.min(max))
}

/// GET /instagram/media
pub async fn media(claims: AuthClaims, State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    Ok(Json(state.instagram.media(&claims).await?))
}

/// GET /instagram/media/{media_id}
pub async fn media_details(
    claims: AuthClaims,
    State(state): State<AppState>,
    Path(media_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    Ok(Json(state.instagram.media_details(&claims, &media_id).await?))
}

/// GET /instagram/insights/account
pub async fn account_insights(
    claims: AuthClaims,
    State(state): State<AppState>,
) -> Result<Json<AccountSummary>, AppError> {
    Ok(Json(state.instagram.account_insights(&claims).await?))
}

/// GET /instagram/insights/followers-growth?days=30
pub async fn followers_growth(
    claims: AuthClaims,
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<FollowerGrowth>, AppError> {
    let days = positive_param(&params, "days", DEFAULT_GROWTH_DAYS, MAX_GROWTH_DAYS);
    Ok(Json(state.instagram.followers_growth(&claims, days).await?))
}

/// GET /instagram/insights/post-engagements?months=6
pub async fn post_engagements(
    claims: AuthClaims,
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<PostEngagements>, AppError> {
    let months = positive_param(&params, "months", DEFAULT_ENGAGEMENT_MONTHS, MAX_ENGAGEMENT_MONTHS);
    Ok(Json(state.instagram.post_engagements(&claims, months).await?))
}

/// GET /instagram/insights/current-month-likes
pub async fn current_month_likes(
    claims: AuthClaims,
    State(state): State<AppState>,
) -> Result<Json<CurrentMonthLikes>, AppError> {
    Ok(Json(state.instagram.current_month_likes(&claims).await?))
}

/// GET /instagram/insights/demographics
pub async fn demographics(
    claims: AuthClaims,
    State(state): State<AppState>,
) -> Result<Json<Demographics>, AppError> {
    Ok(Json(state.instagram.demographics(&claims).await?))
}
