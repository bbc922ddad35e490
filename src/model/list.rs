// src/model/list.rs
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// A Twitter list as merged in the entity cache.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct TwitterList {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub owner_id: Option<String>,
    #[serde(default)]
    pub member_count: Option<u64>,
    #[serde(default)]
    pub follower_count: Option<u64>,
    #[serde(default)]
    pub private: Option<bool>,
}
