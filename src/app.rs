// src/app.rs

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::handlers::auth::{
    refresh_token, request_magic_link, social_callback, social_login_url, verify_magic_link,
};
use crate::handlers::health::health;
use crate::handlers::instagram;
use crate::handlers::user::{get_current_user, update_current_user};
use crate::state::AppState;

/// Public authentication endpoints.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/magic-link/request", post(request_magic_link))
        .route("/magic-link/verify", post(verify_magic_link))
        .route("/social/login", get(social_login_url))
        .route("/social/callback", post(social_callback))
        .route("/token/refresh", post(refresh_token))
}

pub fn user_routes() -> Router<AppState> {
    Router::new().route("/me", get(get_current_user).patch(update_current_user))
}

pub fn instagram_routes() -> Router<AppState> {
    Router::new()
        .route("/media", get(instagram::media))
        .route("/media/{media_id}", get(instagram::media_details))
        .route("/insights/account", get(instagram::account_insights))
        .route("/insights/followers-growth", get(instagram::followers_growth))
        .route("/insights/post-engagements", get(instagram::post_engagements))
        .route("/insights/current-month-likes", get(instagram::current_month_likes))
        .route("/insights/demographics", get(instagram::demographics))
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/auth", auth_routes())
        .nest("/users", user_routes())
        .nest("/instagram", instagram_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
