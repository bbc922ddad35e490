// src/model/stream_rule.rs
use serde::Deserialize;

/// A filtered-stream matching rule.
///
/// Rules arrive in two shapes: the full form from the rules endpoint
/// (id, value, optional tag) and the abbreviated `matching_rules`
/// reference on streamed tweets (id, tag). Both merge into the same
/// cache entry, so a streamed reference picks up the `value` of a
/// previously listed rule.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct StreamRule {
    pub id: String,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub tag: Option<String>,
}
