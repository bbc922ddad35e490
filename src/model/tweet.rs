// src/model/tweet.rs
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// A tweet as merged in the entity cache.
///
/// `id` is the cache key and always present; everything else depends on
/// the field selection the payloads were fetched with.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Tweet {
    pub id: String,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub author_id: Option<String>,
    #[serde(default)]
    pub conversation_id: Option<String>,
    #[serde(default)]
    pub in_reply_to_user_id: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub lang: Option<String>,
    #[serde(default)]
    pub possibly_sensitive: Option<bool>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub public_metrics: Option<TweetPublicMetrics>,
    #[serde(default)]
    pub referenced_tweets: Option<Vec<ReferencedTweet>>,
    #[serde(default)]
    pub attachments: Option<TweetAttachments>,
    #[serde(default)]
    pub geo: Option<serde_json::Value>,
}

/// Engagement counters attached when `public_metrics` is selected.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct TweetPublicMetrics {
    #[serde(default)]
    pub retweet_count: u64,
    #[serde(default)]
    pub reply_count: u64,
    #[serde(default)]
    pub like_count: u64,
    #[serde(default)]
    pub quote_count: u64,
}

/// Link to a tweet this tweet replies to, quotes, or retweets.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ReferencedTweet {
    #[serde(rename = "type")]
    pub relation: String,
    pub id: String,
}

/// Keys of attached media and polls, resolvable through the cache.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct TweetAttachments {
    #[serde(default)]
    pub media_keys: Vec<String>,
    #[serde(default)]
    pub poll_ids: Vec<String>,
}
