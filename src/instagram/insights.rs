//! Shapes Graph API insight payloads into the analytics responses.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Duration, TimeZone, Utc};
use serde::Serialize;
use serde_json::Value;

/// Widest follower-growth window, in days.
pub const MAX_GROWTH_DAYS: u32 = 90;
/// Widest post-engagement window, in months.
pub const MAX_ENGAGEMENT_MONTHS: u32 = 24;

/// Per-post engagement counters.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MediaEngagement {
    pub likes: i64,
    pub comments: i64,
    pub saves: i64,
    pub shares: i64,
}

impl MediaEngagement {
    /// Reads `likes`, `comments`, `saved` and `shares` from a media insights
    /// payload. `like_count` from the media details wins for likes when given.
    pub fn from_insights(insights: &Value, like_count: Option<i64>) -> Self {
        Self {
            likes: like_count.unwrap_or_else(|| media_metric(insights, "likes")),
            comments: media_metric(insights, "comments"),
            saves: media_metric(insights, "saved"),
            shares: media_metric(insights, "shares"),
        }
    }

    pub fn total(&self) -> i64 {
        self.likes + self.comments + self.saves + self.shares
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AccountSummary {
    pub follower_count: i64,
    pub avg_likes: f64,
    pub avg_comments: f64,
    pub avg_saves: f64,
    pub avg_shares: f64,
    pub engagement_rate: f64,
    pub raw_insights: Value,
}

/// Averages over `posts` and engagement rate as a percentage of followers.
pub fn summarize_account(raw_insights: Value, posts: &[MediaEngagement]) -> AccountSummary {
    let follower_count = follower_count(&raw_insights);
    let avg = |pick: fn(&MediaEngagement) -> i64| -> f64 {
        if posts.is_empty() {
            return 0.0;
        }
        posts.iter().map(pick).sum::<i64>() as f64 / posts.len() as f64
    };

    let avg_likes = avg(|p| p.likes);
    let avg_comments = avg(|p| p.comments);
    let avg_saves = avg(|p| p.saves);
    let avg_shares = avg(|p| p.shares);

    let engagement_rate = if follower_count > 0 {
        (avg_likes + avg_comments + avg_saves + avg_shares) / follower_count as f64 * 100.0
    } else {
        0.0
    };

    AccountSummary {
        follower_count,
        avg_likes,
        avg_comments,
        avg_saves,
        avg_shares,
        engagement_rate,
        raw_insights,
    }
}

/// `follower_count.total_value.value` of an account insights payload.
pub fn follower_count(insights: &Value) -> i64 {
    metrics(insights)
        .find(|m| m.get("name").and_then(Value::as_str) == Some("follower_count"))
        .and_then(|m| m.pointer("/total_value/value"))
        .and_then(Value::as_i64)
        .unwrap_or(0)
}

/// First value of a media metric, 0 when missing.
pub fn media_metric(insights: &Value, name: &str) -> i64 {
    metrics(insights)
        .find(|m| m.get("name").and_then(Value::as_str) == Some(name))
        .and_then(|m| m.pointer("/values/0/value"))
        .and_then(Value::as_i64)
        .unwrap_or(0)
}

fn metrics(insights: &Value) -> impl Iterator<Item = &Value> {
    insights
        .get("data")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DataPoint {
    pub date: String,
    pub value: Value,
}

/// `{date: end_time, value}` points of `metric` in a time series payload.
pub fn time_series(insights: &Value, metric: &str) -> Vec<DataPoint> {
    metrics(insights)
        .filter(|m| m.get("name").and_then(Value::as_str) == Some(metric))
        .flat_map(|m| m.get("values").and_then(Value::as_array).into_iter().flatten())
        .map(|v| DataPoint {
            date: v
                .get("end_time")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            value: v.get("value").cloned().unwrap_or(Value::from(0)),
        })
        .collect()
}

pub fn start_of_month(now: DateTime<Utc>) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(now.year(), now.month(), 1, 0, 0, 0)
        .single()
        .unwrap_or(now)
}

/// Graph timestamps look like `2024-05-01T12:00:00+0000`.
pub fn parse_media_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%z")
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MonthlyEngagement {
    pub month: String,
    pub average_engagement: f64,
    pub post_count: i64,
}

/// Month buckets (`YYYY-MM`) stepping back 30 days at a time from `now`,
/// at most [`MAX_ENGAGEMENT_MONTHS`] of them.
#[derive(Debug)]
pub struct MonthlyBuckets {
    cutoff: DateTime<Utc>,
    buckets: BTreeMap<String, (i64, i64)>,
}

impl MonthlyBuckets {
    pub fn new(now: DateTime<Utc>, months: u32) -> Self {
        let months = i64::from(months.min(MAX_ENGAGEMENT_MONTHS));
        let buckets = (0..months)
            .map(|idx| ((now - Duration::days(30 * idx)).format("%Y-%m").to_string(), (0, 0)))
            .collect();

        Self {
            cutoff: now - Duration::days(30 * months),
            buckets,
        }
    }

    /// Bucket key for a post published at `at`, if it falls in the window.
    pub fn bucket_for(&self, at: DateTime<Utc>) -> Option<String> {
        if at < self.cutoff {
            return None;
        }
        let key = at.format("%Y-%m").to_string();
        self.buckets.contains_key(&key).then_some(key)
    }

    pub fn record(&mut self, key: &str, engagement: i64) {
        if let Some((count, total)) = self.buckets.get_mut(key) {
            *count += 1;
            *total += engagement;
        }
    }

    /// Average engagement per post, sorted by month.
    pub fn into_sorted(self) -> Vec<MonthlyEngagement> {
        self.buckets
            .into_iter()
            .map(|(month, (count, total))| MonthlyEngagement {
                month,
                average_engagement: if count > 0 { total as f64 / count as f64 } else { 0.0 },
                post_count: count,
            })
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CountryValue {
    pub country: String,
    pub value: Value,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CityValue {
    pub city: String,
    pub value: Value,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct GenderValue {
    pub gender: String,
    pub value: Value,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AgeGenderValue {
    pub gender: String,
    pub age: String,
    pub value: Value,
}

#[derive(Debug, Clone, Serialize, PartialEq, Default)]
pub struct Demographics {
    pub countries: Vec<CountryValue>,
    pub cities: Vec<CityValue>,
    pub gender_split: Vec<GenderValue>,
    pub age_gender_split: Vec<AgeGenderValue>,
}

/// Splits `follower_demographics` breakdowns by their dimension keys.
pub fn demographics(insights: &Value) -> Demographics {
    let mut out = Demographics::default();

    let breakdowns = metrics(insights)
        .filter(|m| m.get("name").and_then(Value::as_str) == Some("follower_demographics"))
        .flat_map(|m| {
            m.pointer("/total_value/breakdowns")
                .and_then(Value::as_array)
                .into_iter()
                .flatten()
        });

    for breakdown in breakdowns {
        let keys: Vec<&str> = breakdown
            .get("dimension_keys")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .filter_map(Value::as_str)
            .collect();
        let position = |name: &str| keys.iter().position(|k| *k == name);
        let results: Vec<(Vec<String>, Value)> = breakdown
            .get("results")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .map(|r| {
                let dims = r
                    .get("dimension_values")
                    .and_then(Value::as_array)
                    .into_iter()
                    .flatten()
                    .map(|v| v.as_str().unwrap_or_default().to_string())
                    .collect();
                (dims, r.get("value").cloned().unwrap_or(Value::from(0)))
            })
            .collect();

        if let Some(idx) = position("country") {
            out.countries = results
                .iter()
                .map(|(d, v)| CountryValue { country: dim(d, idx), value: v.clone() })
                .collect();
        }
        if let Some(idx) = position("city") {
            out.cities = results
                .iter()
                .map(|(d, v)| CityValue { city: dim(d, idx), value: v.clone() })
                .collect();
        }
        match (position("gender"), position("age")) {
            (Some(g), None) => {
                out.gender_split = results
                    .iter()
                    .map(|(d, v)| GenderValue { gender: dim(d, g), value: v.clone() })
                    .collect();
            }
            (Some(g), Some(a)) => {
                out.age_gender_split = results
                    .iter()
                    .map(|(d, v)| AgeGenderValue {
                        gender: dim(d, g),
                        age: dim(d, a),
                        value: v.clone(),
                    })
                    .collect();
            }
            _ => {}
        }
    }

    out
}

fn dim(dims: &[String], idx: usize) -> String {
    dims.get(idx).cloned().unwrap_or_default()
}
