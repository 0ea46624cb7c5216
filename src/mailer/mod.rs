//! Out-of-band delivery of magic links.
//!
//! [`ResendMailer`] posts to the Resend HTTP API; [`LogMailer`] only logs the
//! link and is meant for local development without an API key.

pub mod log;
pub mod resend;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Url;
use uuid::Uuid;

use crate::auth::user_type::UserType;

pub use log::LogMailer;
pub use resend::ResendMailer;

#[derive(Debug, thiserror::Error)]
pub enum MailerError {
    #[error("Mail transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Mail provider rejected the message (status={status}): {body}")]
    Rejected { status: u16, body: String },
    #[error("Invalid magic link URL: {0}")]
    InvalidUrl(String),
}

#[derive(Debug, Clone)]
pub struct MagicLinkMessage {
    pub email: String,
    pub token: Uuid,
    pub user_type: UserType,
    pub expires_at: DateTime<Utc>,
}

#[async_trait]
pub trait MagicLinkMailer: Send + Sync {
    /// Any `Err` counts as a delivery failure.
    async fn send_magic_link(&self, message: &MagicLinkMessage) -> Result<(), MailerError>;
}

/// `{frontend_url}/auth/magic-link-verify?token=..&email=..&type=..`
pub fn magic_link_url(frontend_url: &str, message: &MagicLinkMessage) -> Result<Url, MailerError> {
    let base = format!("{}/auth/magic-link-verify", frontend_url.trim_end_matches('/'));
    let token = message.token.to_string();

    Url::parse_with_params(
        &base,
        &[
            ("token", token.as_str()),
            ("email", message.email.as_str()),
            ("type", message.user_type.as_str()),
        ],
    )
    .map_err(|e| MailerError::InvalidUrl(e.to_string()))
}

pub(crate) fn render_magic_link_html(app_name: &str, link: &Url, user_type: UserType, valid_hours: i64) -> String {
    let href = link.as_str().replace('&', "&amp;");
    format!(
        "<!DOCTYPE html>\
<html><body style=\"font-family:sans-serif\">\
<h2>Sign in to {app_name}</h2>\
<p>Click the button below to sign in as {user_type}.</p>\
<p><a href=\"{href}\" style=\"padding:10px 18px;background:#111;color:#fff;text-decoration:none;border-radius:6px\">Sign in</a></p>\
<p>This link is valid for {valid_hours} hours and can be used once.</p>\
<p>If you did not request it, you can ignore this email.</p>\
</body></html>"
    )
}
