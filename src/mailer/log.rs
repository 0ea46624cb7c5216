use async_trait::async_trait;

use super::{MagicLinkMailer, MagicLinkMessage, MailerError, magic_link_url};

/// Development mailer: logs the link instead of sending it.
pub struct LogMailer {
    frontend_url: String,
}

impl LogMailer {
    pub fn new(frontend_url: impl Into<String>) -> Self {
        Self {
            frontend_url: frontend_url.into(),
        }
    }
}

#[async_trait]
impl MagicLinkMailer for LogMailer {
    async fn send_magic_link(&self, message: &MagicLinkMessage) -> Result<(), MailerError> {
        let link = magic_link_url(&self.frontend_url, message)?;
        tracing::info!(
            email = %message.email,
            user_type = %message.user_type,
            expires_at = %message.expires_at,
            %link,
            "Magic link (not sent, no mail provider configured)"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use super::*;
    use crate::auth::user_type::UserType;

    #[tokio::test]
    async fn log_mailer_always_succeeds() {
        let mailer = LogMailer::new("http://localhost:3000");
        let message = MagicLinkMessage {
            email: "a@x.com".to_string(),
            token: Uuid::new_v4(),
            user_type: UserType::Influencer,
            expires_at: Utc::now(),
        };

        assert!(mailer.send_magic_link(&message).await.is_ok());
    }
}
