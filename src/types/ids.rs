// src/types/ids.rs
use super::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;

/// Strong typing for identifiers with phantom types.
///
/// Twitter v2 identifiers are opaque decimal strings (snowflake ids),
/// unique within an entity kind and stable across requests. The phantom
/// marker stops a tweet id from being passed where a user id belongs.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Id<T> {
    value: String,
    _phantom: PhantomData<T>,
}

/// Marker types for different identifier kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TweetMarker;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserMarker;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListMarker;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleMarker;

/// Type aliases for specific identifier types
pub type TweetId = Id<TweetMarker>;
pub type UserId = Id<UserMarker>;
pub type ListId = Id<ListMarker>;
pub type RuleId = Id<RuleMarker>;

impl<T> Id<T> {
    /// Parses and validates a raw identifier string.
    ///
    /// Snowflake ids are non-empty strings of ASCII digits. Anything
    /// else is rejected before it can reach a URL path.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::InvalidId(
                "identifier must not be empty".to_string(),
            ));
        }
        if !trimmed.chars().all(|c| c.is_ascii_digit()) {
            return Err(ValidationError::InvalidId(format!(
                "identifier must be a decimal snowflake, got: {}",
                trimmed
            )));
        }
        Ok(Self {
            value: trimmed.to_string(),
            _phantom: PhantomData,
        })
    }

    /// Wraps an identifier already known to be well-formed (internal use).
    pub(crate) fn from_raw(value: String) -> Self {
        Self {
            value,
            _phantom: PhantomData,
        }
    }

    /// Returns the identifier as a string reference.
    pub fn as_str(&self) -> &str {
        &self.value
    }
}

impl<T> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl<T> Serialize for Id<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.value.serialize(serializer)
    }
}

impl<'de, T> Deserialize<'de> for Id<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Ok(Self::from_raw(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_snowflake_ids() {
        let id = TweetId::parse("1460323737035677698").unwrap();
        assert_eq!(id.as_str(), "1460323737035677698");

        let id = UserId::parse("  2244994945  ").unwrap();
        assert_eq!(id.as_str(), "2244994945");
    }

    #[test]
    fn rejects_non_snowflake_input() {
        assert!(TweetId::parse("").is_err());
        assert!(TweetId::parse("not-a-number").is_err());
        assert!(UserId::parse("12 34").is_err());
    }
}
