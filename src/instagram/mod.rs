//! Instagram: OAuth login provider, Graph API client and the analytics
//! endpoints built on top of them.

pub mod accounts;
pub mod graph;
pub mod insights;
pub mod oauth;
pub mod service;

use reqwest::RequestBuilder;
use serde_json::{Value, json};

use crate::error::AppError;

pub use graph::GraphClient;
pub use oauth::{InstagramEndpoints, InstagramOAuth};
pub use service::InstagramService;

pub const GRAPH_API_VERSION: &str = "v22.0";

/// Sends `request` and returns its JSON body.
///
/// Transport failures, non-success statuses and bodies carrying `error` or
/// `error_type` become [`AppError::Upstream`] with the upstream payload.
pub(crate) async fn send_json(request: RequestBuilder) -> Result<Value, AppError> {
    let response = request
        .send()
        .await
        .map_err(|e| AppError::upstream(e.to_string()))?;

    let status = response.status();
    let bytes = response
        .bytes()
        .await
        .map_err(|e| AppError::upstream(e.to_string()))?;

    let body: Value = serde_json::from_slice(&bytes).unwrap_or_else(|_| {
        json!({ "error": format!("Non-JSON response from upstream (status {status})") })
    });

    if is_error_payload(&body) {
        return Err(AppError::Upstream(body));
    }
    if !status.is_success() {
        return Err(AppError::Upstream(json!({
            "error": format!("Upstream returned status {status}"),
            "details": body,
        })));
    }

    Ok(body)
}

pub(crate) fn is_error_payload(body: &Value) -> bool {
    body.get("error").is_some() || body.get("error_type").is_some()
}

#[cfg(test)]
pub(crate) mod testing {
    use axum::Router;

    /// Serves `app` on an ephemeral local port and returns its base URL.
    pub async fn spawn(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
        format!("http://{addr}")
    }
}
