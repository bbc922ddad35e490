// src/api/envelope.rs
//! The decoded shape of one API response.
//!
//! Every v2 response — a page, a single-object lookup, or one streamed
//! record — is an envelope: a primary `data` payload (object or array),
//! an optional `includes` side-table of referenced objects, optional
//! pagination `meta`, and on filtered-stream records the set of
//! `matching_rules` that caused delivery.

use crate::error::AppError;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

/// One decoded API response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Envelope {
    /// Primary payload: a single object, an array of objects, or absent
    /// on a legitimately empty page.
    #[serde(default)]
    pub data: Option<Value>,

    /// Side-table of objects referenced by the primary payload.
    #[serde(default)]
    pub includes: Option<Includes>,

    /// Pagination metadata.
    #[serde(default)]
    pub meta: Option<ResponseMeta>,

    /// Partial errors reported alongside (or instead of) data.
    #[serde(default)]
    pub errors: Option<Vec<Value>>,

    /// On filtered-stream records: which rules matched this tweet.
    #[serde(default)]
    pub matching_rules: Option<Vec<MatchingRuleRef>>,
}

/// The `includes` side-table, one list per entity kind.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Includes {
    #[serde(default)]
    pub tweets: Vec<Value>,
    #[serde(default)]
    pub users: Vec<Value>,
    #[serde(default)]
    pub media: Vec<Value>,
    #[serde(default)]
    pub places: Vec<Value>,
    #[serde(default)]
    pub polls: Vec<Value>,
}

/// Pagination metadata attached to page responses.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct ResponseMeta {
    #[serde(default)]
    pub next_token: Option<String>,
    #[serde(default)]
    pub previous_token: Option<String>,
    #[serde(default)]
    pub result_count: Option<u64>,
    #[serde(default)]
    pub newest_id: Option<String>,
    #[serde(default)]
    pub oldest_id: Option<String>,
}

/// Abbreviated rule reference on a streamed tweet.
///
/// Older stream payloads carried numeric rule ids; the deserializer
/// accepts both and normalizes to the string form used as cache key.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct MatchingRuleRef {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub tag: Option<String>,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "rule id must be a string or number, got {}",
            other
        ))),
    }
}

impl Envelope {
    /// Returns the primary payload as an ordered list of raw objects.
    ///
    /// A missing `data` field is only legitimate when `meta` reports
    /// zero results (the documented empty-page shape); anything else is
    /// a [`AppError::MalformedResponse`], never a silent empty page.
    pub fn primary_objects(&self) -> Result<Vec<&Map<String, Value>>, AppError> {
        match &self.data {
            Some(Value::Object(obj)) => Ok(vec![obj]),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| {
                    item.as_object().ok_or_else(|| {
                        AppError::MalformedResponse(
                            "primary payload array contains a non-object entry".to_string(),
                        )
                    })
                })
                .collect(),
            Some(other) => Err(AppError::MalformedResponse(format!(
                "primary payload must be an object or array, got {}",
                other
            ))),
            None if self.reports_zero_results() => Ok(Vec::new()),
            None => Err(AppError::MalformedResponse(match &self.errors {
                Some(errors) if !errors.is_empty() => format!(
                    "response carries no data field; errors: {}",
                    Value::Array(errors.clone())
                ),
                _ => "response carries no data field and no zero-result meta".to_string(),
            })),
        }
    }

    fn reports_zero_results(&self) -> bool {
        self.meta
            .as_ref()
            .is_some_and(|meta| meta.result_count == Some(0))
    }
}
