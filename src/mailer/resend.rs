use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use super::{
    MagicLinkMailer, MagicLinkMessage, MailerError, magic_link_url, render_magic_link_html,
};
use crate::auth::magic_link::MAGIC_LINK_TTL_HOURS;

pub const RESEND_API_URL: &str = "https://api.resend.com/emails";

#[derive(Debug, Serialize)]
struct ResendEmail<'a> {
    from: &'a str,
    to: Vec<&'a str>,
    subject: String,
    html: String,
}

pub struct ResendMailer {
    client: Client,
    endpoint: String,
    api_key: String,
    from: String,
    app_name: String,
    frontend_url: String,
}

impl ResendMailer {
    pub fn new(
        client: Client,
        api_key: impl Into<String>,
        from: impl Into<String>,
        app_name: impl Into<String>,
        frontend_url: impl Into<String>,
    ) -> Self {
        Self {
            client,
            endpoint: RESEND_API_URL.to_string(),
            api_key: api_key.into(),
            from: from.into(),
            app_name: app_name.into(),
            frontend_url: frontend_url.into(),
        }
    }

    #[cfg(test)]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[async_trait]
impl MagicLinkMailer for ResendMailer {
    async fn send_magic_link(&self, message: &MagicLinkMessage) -> Result<(), MailerError> {
        let link = magic_link_url(&self.frontend_url, message)?;

        let body = ResendEmail {
            from: &self.from,
            to: vec![message.email.as_str()],
            subject: format!("Login to {}", self.app_name),
            html: render_magic_link_html(
                &self.app_name,
                &link,
                message.user_type,
                MAGIC_LINK_TTL_HOURS,
            ),
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            tracing::debug!(email = %message.email, "Magic link email accepted by Resend");
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(MailerError::Rejected {
            status: status.as_u16(),
            body,
        })
    }
}
