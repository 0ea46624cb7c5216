use chrono::{DateTime, Utc};
use reqwest::Client;
use serde_json::Value;

use super::{GRAPH_API_VERSION, send_json};
use crate::error::AppError;

const MEDIA_FIELDS: &str = "id,media_type,media_url,like_count,permalink,thumbnail_url,timestamp,username";
const CHILDREN_FIELDS: &str = "id,media_type,media_url,thumbnail_url";
const ACCOUNT_METRICS: &str = "accounts_engaged,follower_count,online_followers,reach,total_interactions,likes,comments,shares,saves";
const MEDIA_METRICS: &str = "likes,comments,shares,saved,reach";

/// Thin Instagram Graph API client. Every call returns the upstream JSON.
#[derive(Clone)]
pub struct GraphClient {
    client: Client,
    base_url: String,
}

impl GraphClient {
    pub fn new(client: Client, graph_url: &str) -> Self {
        Self {
            client,
            base_url: format!("{}/{GRAPH_API_VERSION}", graph_url.trim_end_matches('/')),
        }
    }

    async fn get(&self, path: &str, access_token: &str, params: &[(&str, String)]) -> Result<Value, AppError> {
        let request = self
            .client
            .get(format!("{}/{path}", self.base_url))
            .query(params)
            .query(&[("access_token", access_token)]);

        send_json(request).await
    }

    pub async fn user_media(&self, ig_id: &str, access_token: &str) -> Result<Value, AppError> {
        self.get(&format!("{ig_id}/media"), access_token, &[]).await
    }

    /// Media ids and timestamps, newest first.
    pub async fn recent_media(&self, ig_id: &str, access_token: &str, limit: u32) -> Result<Value, AppError> {
        let params = [
            ("fields", "id,timestamp".to_string()),
            ("limit", limit.to_string()),
        ];
        self.get(&format!("{ig_id}/media"), access_token, &params).await
    }

    pub async fn media_details(&self, media_id: &str, access_token: &str) -> Result<Value, AppError> {
        let params = [("fields", format!("{MEDIA_FIELDS},children{{{CHILDREN_FIELDS}}}"))];
        self.get(media_id, access_token, &params).await
    }

    pub async fn media_insights(&self, media_id: &str, access_token: &str) -> Result<Value, AppError> {
        let params = [("metric", MEDIA_METRICS.to_string())];
        self.get(&format!("{media_id}/insights"), access_token, &params).await
    }

    pub async fn account_insights(&self, ig_id: &str, access_token: &str) -> Result<Value, AppError> {
        let params = [
            ("metric", ACCOUNT_METRICS.to_string()),
            ("period", "day".to_string()),
            ("metric_type", "total_value".to_string()),
        ];
        self.get(&format!("{ig_id}/insights"), access_token, &params).await
    }

    /// Daily values of `metric` between `since` and `until`.
    pub async fn daily_series(
        &self,
        ig_id: &str,
        access_token: &str,
        metric: &str,
        since: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Value, AppError> {
        let params = [
            ("metric", metric.to_string()),
            ("period", "day".to_string()),
            ("metric_type", "time_series".to_string()),
            ("since", since.timestamp().to_string()),
            ("until", until.timestamp().to_string()),
        ];
        self.get(&format!("{ig_id}/insights"), access_token, &params).await
    }

    pub async fn follower_demographics(&self, ig_id: &str, access_token: &str) -> Result<Value, AppError> {
        let params = [
            ("metric", "follower_demographics".to_string()),
            ("period", "lifetime".to_string()),
            ("timeframe", "this_month".to_string()),
            ("breakdown", "country,city,gender,age".to_string()),
            ("metric_type", "total_value".to_string()),
        ];
        self.get(&format!("{ig_id}/insights"), access_token, &params).await
    }
}
