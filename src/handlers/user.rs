use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use influence_api::{UpdateProfileRequest, UserResponse};

use crate::auth::extractors::AuthClaims;
use crate::error::AppError;
use crate::response::AppResponse;
use crate::state::AppState;

/// GET /users/me
pub async fn get_current_user(
    claims: AuthClaims,
    State(state): State<AppState>,
) -> Result<AppResponse<UserResponse>, AppError> {
    let user = state.profile.current(claims.sub)?;
    Ok(AppResponse::ok(user))
}

/// PATCH /users/me
pub async fn update_current_user(
    claims: AuthClaims,
    State(state): State<AppState>,
    payload: Result<Json<UpdateProfileRequest>, JsonRejection>,
) -> Result<AppResponse<UserResponse>, AppError> {
    let Json(payload) = payload?;
    let user = state.profile.update(claims.sub, payload)?;
    Ok(AppResponse::ok(user))
}
