// src/types/fields.rs
//! Field-selection configuration.
//!
//! Twitter v2 returns minimal objects unless the caller opts into extra
//! fields (`tweet.fields=created_at,...`) and expansions
//! (`expansions=author_id,...`). One [`FieldSelection`] is configured per
//! client and threaded verbatim into every query built by every book and
//! stream connection.

use crate::api::EntityKind;

/// Optional field lists and expansions, each independently optional.
///
/// Empty lists are simply not sent; the API then applies its defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldSelection {
    pub tweet_fields: Vec<String>,
    pub user_fields: Vec<String>,
    pub media_fields: Vec<String>,
    pub place_fields: Vec<String>,
    pub poll_fields: Vec<String>,
    pub tweet_expansions: Vec<String>,
    pub user_expansions: Vec<String>,
}

impl FieldSelection {
    /// A selection requesting nothing beyond the API defaults.
    pub fn none() -> Self {
        Self::default()
    }

    /// Appends the configured field parameters to a request query.
    ///
    /// Which expansion list applies depends on the primary entity kind
    /// of the request: tweet-shaped responses take tweet expansions,
    /// user-shaped responses take user expansions, and list responses
    /// take neither.
    pub fn apply_to_query(&self, query: &mut Vec<(String, String)>, primary: EntityKind) {
        push_joined(query, "tweet.fields", &self.tweet_fields);
        push_joined(query, "user.fields", &self.user_fields);
        push_joined(query, "media.fields", &self.media_fields);
        push_joined(query, "place.fields", &self.place_fields);
        push_joined(query, "poll.fields", &self.poll_fields);

        let expansions = match primary {
            EntityKind::Tweet => &self.tweet_expansions,
            EntityKind::User => &self.user_expansions,
            _ => return,
        };
        push_joined(query, "expansions", expansions);
    }
}

fn push_joined(query: &mut Vec<(String, String)>, param: &str, values: &[String]) {
    if !values.is_empty() {
        query.push((param.to_string(), values.join(",")));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn selection() -> FieldSelection {
        FieldSelection {
            tweet_fields: vec!["created_at".into(), "lang".into()],
            user_fields: vec!["username".into()],
            tweet_expansions: vec!["author_id".into()],
            user_expansions: vec!["pinned_tweet_id".into()],
            ..FieldSelection::default()
        }
    }

    #[test]
    fn renders_comma_joined_field_params() {
        let mut query = Vec::new();
        selection().apply_to_query(&mut query, EntityKind::Tweet);
        assert_eq!(
            query,
            vec![
                ("tweet.fields".to_string(), "created_at,lang".to_string()),
                ("user.fields".to_string(), "username".to_string()),
                ("expansions".to_string(), "author_id".to_string()),
            ]
        );
    }

    #[test]
    fn expansions_follow_the_primary_kind() {
        let mut query = Vec::new();
        selection().apply_to_query(&mut query, EntityKind::User);
        assert!(query.contains(&("expansions".to_string(), "pinned_tweet_id".to_string())));

        let mut query = Vec::new();
        selection().apply_to_query(&mut query, EntityKind::List);
        assert!(!query.iter().any(|(k, _)| k == "expansions"));
    }

    #[test]
    fn empty_selection_adds_nothing() {
        let mut query = Vec::new();
        FieldSelection::none().apply_to_query(&mut query, EntityKind::Tweet);
        assert!(query.is_empty());
    }
}
