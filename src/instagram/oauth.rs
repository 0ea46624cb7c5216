use async_trait::async_trait;
use reqwest::{Client, Url};
use serde_json::Value;

use super::{GRAPH_API_VERSION, send_json};
use crate::auth::social::{LongLivedToken, OAuthProvider, ProviderProfile, ShortLivedToken};
use crate::error::AppError;

pub const PROVIDER_NAME: &str = "instagram";

const SCOPES: &str = "instagram_business_basic,instagram_business_manage_insights";

#[derive(Debug, Clone)]
pub struct InstagramEndpoints {
    pub authorize_url: String,
    /// Host of the short-lived token exchange.
    pub api_url: String,
    pub graph_url: String,
}

impl Default for InstagramEndpoints {
    fn default() -> Self {
        Self {
            authorize_url: "https://www.instagram.com/oauth/authorize".to_string(),
            api_url: "https://api.instagram.com".to_string(),
            graph_url: "https://graph.instagram.com".to_string(),
        }
    }
}

impl InstagramEndpoints {
    /// All three hosts pointed at one base URL.
    #[cfg(test)]
    pub fn local(base: &str) -> Self {
        Self {
            authorize_url: format!("{base}/oauth/authorize"),
            api_url: base.to_string(),
            graph_url: base.to_string(),
        }
    }
}

/// Instagram Login (business) as an [`OAuthProvider`].
pub struct InstagramOAuth {
    client: Client,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
    endpoints: InstagramEndpoints,
}

impl InstagramOAuth {
    pub fn new(
        client: Client,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uri: impl Into<String>,
        endpoints: InstagramEndpoints,
    ) -> Self {
        Self {
            client,
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_uri: redirect_uri.into(),
            endpoints,
        }
    }
}

#[async_trait]
impl OAuthProvider for InstagramOAuth {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    fn authorization_url(&self) -> Result<String, AppError> {
        let url = Url::parse_with_params(
            &self.endpoints.authorize_url,
            &[
                ("client_id", self.client_id.as_str()),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("response_type", "code"),
                ("scope", SCOPES),
            ],
        )
        .map_err(|e| AppError::internal(format!("invalid authorize URL: {e}")))?;

        Ok(url.into())
    }

    async fn exchange_code(&self, code: &str) -> Result<ShortLivedToken, AppError> {
        let request = self
            .client
            .post(format!("{}/oauth/access_token", self.endpoints.api_url))
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("grant_type", "authorization_code"),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("code", code),
            ]);

        let body = send_json(request).await?;
        // Newer responses wrap the token in `data: [..]`.
        let token = match body.get("data").and_then(Value::as_array) {
            Some(items) => items.first().cloned().unwrap_or(Value::Null),
            None => body.clone(),
        };

        let access_token = string_field(&token, "access_token");
        let provider_account_id = string_field(&token, "user_id");
        match (access_token, provider_account_id) {
            (Some(access_token), Some(provider_account_id)) => Ok(ShortLivedToken {
                access_token,
                provider_account_id,
            }),
            _ => Err(AppError::Upstream(body)),
        }
    }

    async fn upgrade_token(&self, short_lived: &ShortLivedToken) -> Result<LongLivedToken, AppError> {
        let request = self
            .client
            .get(format!("{}/access_token", self.endpoints.graph_url))
            .query(&[
                ("grant_type", "ig_exchange_token"),
                ("client_secret", self.client_secret.as_str()),
                ("access_token", short_lived.access_token.as_str()),
            ]);

        let body = send_json(request).await?;
        let Some(access_token) = string_field(&body, "access_token") else {
            return Err(AppError::Upstream(body));
        };

        Ok(LongLivedToken {
            access_token,
            token_type: string_field(&body, "token_type"),
            expires_in: body.get("expires_in").and_then(Value::as_i64),
        })
    }

    async fn fetch_profile(&self, access_token: &str) -> Result<ProviderProfile, AppError> {
        let request = self
            .client
            .get(format!("{}/{GRAPH_API_VERSION}/me", self.endpoints.graph_url))
            .query(&[
                ("fields", "user_id,username,name,profile_picture_url"),
                ("access_token", access_token),
            ]);

        let body = send_json(request).await?;
        let Some(username) = string_field(&body, "username") else {
            return Err(AppError::Upstream(body));
        };

        Ok(ProviderProfile {
            username,
            name: string_field(&body, "name"),
            picture: string_field(&body, "profile_picture_url"),
        })
    }
}

/// Reads `key` as a string; numeric ids are stringified.
fn string_field(body: &Value, key: &str) -> Option<String> {
    match body.get(key)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
