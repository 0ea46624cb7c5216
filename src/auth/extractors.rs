use axum::extract::{FromRef, FromRequestParts};
use axum::http::{header, request::Parts};
use uuid::Uuid;

use crate::auth::jwt::{Claims, JwtManager, TokenType};
use crate::error::AppError;

/// Claims of a verified `Authorization: Bearer <access token>` header.
///
/// Handlers receive this explicitly and pass it down; there is no ambient
/// "current user".
#[derive(Debug, Clone)]
pub struct AuthClaims {
    pub sub: Uuid,
    pub email: Option<String>,
    pub user_type: String,
    pub provider: Option<String>,
    pub provider_account_id: Option<String>,
}

impl From<Claims> for AuthClaims {
    fn from(c: Claims) -> Self {
        Self {
            sub: c.sub,
            email: c.identity.email,
            user_type: c.identity.user_type,
            provider: c.identity.provider,
            provider_account_id: c.identity.provider_account_id,
        }
    }
}

impl<S> FromRequestParts<S> for AuthClaims
where
    JwtManager: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let jwt_manager = JwtManager::from_ref(state);

        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .ok_or_else(|| AppError::unauthorized("Missing Authorization header"))?;

        let auth_str = auth_header
            .to_str()
            .map_err(|_| AppError::InvalidTokenFormat)?;

        let token = auth_str
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(AppError::InvalidTokenFormat)?;

        let claims = jwt_manager.verify_typed(token, TokenType::Access)?;

        Ok(AuthClaims::from(claims))
    }
}
