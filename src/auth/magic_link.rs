//! Passwordless sign-in: issue a single-use token by email, redeem it once.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::auth::identity::find_or_create_by_email;
use crate::auth::user_type::UserType;
use crate::db::models::magic_link::NewMagicLink;
use crate::db::models::user::User;
use crate::db::repositories::{MAGIC_LINKS_TOKEN_KEY, MagicLinkRepository, UserRepository};
use crate::error::AppError;
use crate::mailer::{MagicLinkMailer, MagicLinkMessage};

pub const MAGIC_LINK_TTL_HOURS: i64 = 24;

const TOKEN_ATTEMPTS: usize = 3;

#[derive(Clone)]
pub struct MagicLinkService {
    users: Arc<dyn UserRepository>,
    links: Arc<dyn MagicLinkRepository>,
    mailer: Arc<dyn MagicLinkMailer>,
    ttl: Duration,
}

impl MagicLinkService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        links: Arc<dyn MagicLinkRepository>,
        mailer: Arc<dyn MagicLinkMailer>,
    ) -> Self {
        Self {
            users,
            links,
            mailer,
            ttl: Duration::hours(MAGIC_LINK_TTL_HOURS),
        }
    }

    /// Creates (or reuses) the identity for `email`, stores a fresh token and
    /// mails it. Returns the token expiry; the token itself only travels by
    /// email.
    ///
    /// When delivery fails the token row is deleted again. The identity is kept.
    pub async fn issue(
        &self,
        email: &str,
        requested_user_type: Option<&str>,
    ) -> Result<DateTime<Utc>, AppError> {
        let email = normalize_email(email);
        if !is_valid_email(&email) {
            return Err(AppError::InvalidEmail);
        }
        let user_type = UserType::from_request(requested_user_type)?;

        let local_part = email.split('@').next().unwrap_or_default();
        let user = find_or_create_by_email(self.users.as_ref(), &email, local_part, None, user_type)?;

        let expires_at = Utc::now() + self.ttl;
        let (link_id, token) = self.store_token(user.id, &email, user_type, expires_at)?;

        let message = MagicLinkMessage {
            email: email.clone(),
            token,
            user_type,
            expires_at,
        };

        if let Err(e) = self.mailer.send_magic_link(&message).await {
            tracing::warn!(user_id = %user.id, error = %e, "Magic link delivery failed, revoking token");
            if let Err(rollback) = self.links.delete(link_id) {
                tracing::error!(%link_id, error = %rollback, "Failed to delete undelivered magic link");
            }
            return Err(AppError::DeliveryFailed(e.to_string()));
        }

        tracing::info!(user_id = %user.id, %expires_at, "Magic link issued");
        Ok(expires_at)
    }

    fn store_token(
        &self,
        user_id: Uuid,
        email: &str,
        user_type: UserType,
        expires_at: DateTime<Utc>,
    ) -> Result<(Uuid, Uuid), AppError> {
        for _ in 0..TOKEN_ATTEMPTS {
            let new_link = NewMagicLink {
                user_id,
                token: Uuid::new_v4(),
                email: email.to_string(),
                user_type: user_type.as_str().to_string(),
                expires_at,
            };

            match self.links.create(&new_link) {
                Ok(link) => return Ok((link.id, link.token)),
                Err(e) if e.violates(MAGIC_LINKS_TOKEN_KEY) => continue,
                Err(e) => return Err(e.into()),
            }
        }

        Err(AppError::internal("could not generate a unique magic link token"))
    }

    /// Redeems `token` for `email`. Every failure (unknown email, malformed,
    /// wrong, used or expired token) is the same `InvalidOrExpired`.
    pub fn verify(&self, email: &str, token: &str) -> Result<User, AppError> {
        let email = normalize_email(email);
        let Ok(token) = Uuid::parse_str(token.trim()) else {
            return Err(AppError::InvalidOrExpired);
        };

        let user = self
            .users
            .find_by_email(&email)?
            .ok_or(AppError::InvalidOrExpired)?;

        if !self.links.consume(user.id, &email, token, Utc::now())? {
            tracing::info!(user_id = %user.id, "Magic link rejected");
            return Err(AppError::InvalidOrExpired);
        }

        tracing::info!(user_id = %user.id, "Magic link redeemed");
        Ok(user)
    }
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !domain.contains("..")
        && !email.chars().any(char::is_whitespace)
}
