// src/model/mod.rs
//! Typed read views over cached entities.
//!
//! Every model field except the cache key is optional: the API only
//! returns what the field selection asked for, and the entity cache
//! merges partial payloads additively. Decoding a cached entity into one
//! of these views never invents data — absent fields stay `None`.

mod common;
mod list;
mod stream_rule;
mod tweet;
mod user;

pub use common::{Media, Place, Poll, PollOption};
pub use list::TwitterList;
pub use stream_rule::StreamRule;
pub use tweet::{ReferencedTweet, Tweet, TweetAttachments, TweetPublicMetrics};
pub use user::{User, UserPublicMetrics};
