// src/types/mod.rs
//! Domain types shared across the client: strongly-typed identifiers,
//! credential wrappers, and the field-selection configuration threaded
//! into every request.

mod auth;
mod fields;
mod ids;

pub use auth::{AuthMode, BearerToken, Credentials};
pub use fields::FieldSelection;
pub use ids::{Id, ListId, ListMarker, RuleId, RuleMarker, TweetId, TweetMarker, UserId, UserMarker};

use thiserror::Error;

/// Validation errors raised while constructing domain types from caller
/// input, before any transport call is made.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid identifier: {0}")]
    InvalidId(String),

    #[error("Invalid token: {0}")]
    InvalidToken(String),
}
