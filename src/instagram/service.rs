use std::sync::Arc;

use chrono::{Duration, Utc};
use serde::Serialize;
use serde_json::Value;

use super::accounts::{InstagramAccess, access_for, resolve_account};
use super::graph::GraphClient;
use super::insights::{
    self, AccountSummary, DataPoint, Demographics, MAX_GROWTH_DAYS, MediaEngagement,
    MonthlyBuckets, MonthlyEngagement,
};
use crate::auth::extractors::AuthClaims;
use crate::db::repositories::LinkedAccountRepository;
use crate::error::AppError;

const SUMMARY_POSTS: usize = 10;
const ENGAGEMENT_MEDIA_LIMIT: u32 = 50;

#[derive(Debug, Serialize)]
pub struct FollowerGrowth {
    pub follower_growth: Vec<DataPoint>,
}

#[derive(Debug, Serialize)]
pub struct PostEngagements {
    pub post_engagements_by_month: Vec<MonthlyEngagement>,
}

#[derive(Debug, Serialize)]
pub struct CurrentMonthLikes {
    pub current_month_likes: Vec<DataPoint>,
}

/// Analytics on behalf of the caller's linked Instagram account.
#[derive(Clone)]
pub struct InstagramService {
    accounts: Arc<dyn LinkedAccountRepository>,
    graph: GraphClient,
}

impl InstagramService {
    pub fn new(accounts: Arc<dyn LinkedAccountRepository>, graph: GraphClient) -> Self {
        Self { accounts, graph }
    }

    fn access(&self, claims: &AuthClaims) -> Result<InstagramAccess, AppError> {
        let account = resolve_account(self.accounts.as_ref(), claims.sub, claims.provider.as_deref())?;
        access_for(&account)
    }

    pub async fn media(&self, claims: &AuthClaims) -> Result<Value, AppError> {
        let access = self.access(claims)?;
        self.graph.user_media(&access.ig_id, &access.access_token).await
    }

    pub async fn media_details(&self, claims: &AuthClaims, media_id: &str) -> Result<Value, AppError> {
        let access = self.access(claims)?;
        self.graph.media_details(media_id, &access.access_token).await
    }

    pub async fn account_insights(&self, claims: &AuthClaims) -> Result<AccountSummary, AppError> {
        let access = self.access(claims)?;
        let token = access.access_token.as_str();

        let raw = self.graph.account_insights(&access.ig_id, token).await?;
        let media = self.graph.user_media(&access.ig_id, token).await?;

        let mut posts = Vec::new();
        let mut missing_likes = 0_usize;
        for media_id in media_ids(&media).take(SUMMARY_POSTS) {
            let like_count = match self.graph.media_details(media_id, token).await {
                Ok(details) => details.get("like_count").and_then(Value::as_i64),
                Err(e) => {
                    tracing::warn!(media_id, error = %e, "Media details unavailable");
                    None
                }
            };
            if like_count.is_none() {
                missing_likes += 1;
            }
            let media_insights = self.media_insights_or_empty(media_id, token).await;
            posts.push(MediaEngagement::from_insights(&media_insights, like_count.or(Some(0))));
        }

        if missing_likes > 0 {
            tracing::info!(
                ig_id = %access.ig_id,
                posts = posts.len(),
                missing_likes,
                "Account summary counted posts without a like count as zero"
            );
        }
        Ok(insights::summarize_account(raw, &posts))
    }

    pub async fn followers_growth(&self, claims: &AuthClaims, days: u32) -> Result<FollowerGrowth, AppError> {
        let access = self.access(claims)?;
        let now = Utc::now();
        let days = days.min(MAX_GROWTH_DAYS);

        let raw = self
            .graph
            .daily_series(
                &access.ig_id,
                &access.access_token,
                "follower_count",
                now - Duration::days(i64::from(days)),
                now,
            )
            .await?;

        Ok(FollowerGrowth {
            follower_growth: insights::time_series(&raw, "follower_count"),
        })
    }

    pub async fn post_engagements(&self, claims: &AuthClaims, months: u32) -> Result<PostEngagements, AppError> {
        let access = self.access(claims)?;
        let token = access.access_token.as_str();

        let media = self
            .graph
            .recent_media(&access.ig_id, token, ENGAGEMENT_MEDIA_LIMIT)
            .await?;

        let mut buckets = MonthlyBuckets::new(Utc::now(), months);
        for item in media_items(&media) {
            let (Some(id), Some(published)) = (
                item.get("id").and_then(Value::as_str),
                item.get("timestamp")
                    .and_then(Value::as_str)
                    .and_then(insights::parse_media_timestamp),
            ) else {
                continue;
            };
            let Some(month) = buckets.bucket_for(published) else {
                continue;
            };

            let media_insights = self.media_insights_or_empty(id, token).await;
            let engagement = MediaEngagement::from_insights(&media_insights, None).total();
            buckets.record(&month, engagement);
        }

        Ok(PostEngagements {
            post_engagements_by_month: buckets.into_sorted(),
        })
    }

    pub async fn current_month_likes(&self, claims: &AuthClaims) -> Result<CurrentMonthLikes, AppError> {
        let access = self.access(claims)?;
        let now = Utc::now();

        let raw = self
            .graph
            .daily_series(
                &access.ig_id,
                &access.access_token,
                "likes",
                insights::start_of_month(now),
                now,
            )
            .await?;

        Ok(CurrentMonthLikes {
            current_month_likes: insights::time_series(&raw, "likes"),
        })
    }

    pub async fn demographics(&self, claims: &AuthClaims) -> Result<Demographics, AppError> {
        let access = self.access(claims)?;
        let raw = self
            .graph
            .follower_demographics(&access.ig_id, &access.access_token)
            .await?;

        Ok(insights::demographics(&raw))
    }

    /// Per-post insights count as zero when the Graph API refuses them
    /// (e.g. metrics unsupported for a media type).
    async fn media_insights_or_empty(&self, media_id: &str, token: &str) -> Value {
        match self.graph.media_insights(media_id, token).await {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(media_id, error = %e, "Media insights unavailable");
                Value::Null
            }
        }
    }
}

fn media_items(media: &Value) -> impl Iterator<Item = &Value> {
    media.get("data").and_then(Value::as_array).into_iter().flatten()
}

fn media_ids(media: &Value) -> impl Iterator<Item = &str> {
    media_items(media).filter_map(|m| m.get("id").and_then(Value::as_str))
}
