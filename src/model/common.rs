// src/model/common.rs
//! Entities that only ever arrive through `includes` side-tables.

use serde::Deserialize;

/// An attached photo, video, or GIF. Keyed by `media_key`, not `id`.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Media {
    pub media_key: String,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub preview_image_url: Option<String>,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub duration_ms: Option<u64>,
    #[serde(default)]
    pub alt_text: Option<String>,
}

/// A tagged location.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Place {
    pub id: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub country_code: Option<String>,
    #[serde(default)]
    pub place_type: Option<String>,
    #[serde(default)]
    pub geo: Option<serde_json::Value>,
}

/// An attached poll.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Poll {
    pub id: String,
    #[serde(default)]
    pub options: Vec<PollOption>,
    #[serde(default)]
    pub duration_minutes: Option<u32>,
    #[serde(default)]
    pub end_datetime: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default)]
    pub voting_status: Option<String>,
}

/// One poll choice with its running tally.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct PollOption {
    pub position: u32,
    pub label: String,
    #[serde(default)]
    pub votes: u64,
}
