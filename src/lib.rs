// src/lib.rs
//! tweetbook library — a client core for the Twitter API v2.
//!
//! # Public API
//!
//! The library exposes types organized by concern:
//! - **Error handling** — `AppError`, `TwitterErrorKind`, `ValidationError`
//! - **Configuration** — `CommandLineInput`, `RunConfig`, `FieldSelection`
//! - **Domain model** — `Tweet`, `User`, `TwitterList`, `Media`, `StreamRule`, etc.
//! - **Domain types** — `TweetId`, `UserId`, `BearerToken`, `Credentials`
//! - **API core** — `Book`, `PaginationCursor`, `EntityStore`, `StreamConsumer`, `Transport`
//! - **Client façade** — `TwitterClient`, `ClientOptions`, `StreamEvent`

mod api;
mod client;
mod config;
mod constants;
mod error;
mod model;
mod types;

// --- Error Handling ---
pub use crate::error::{AppError, Result, TwitterErrorKind};
pub use crate::types::ValidationError;

// --- Configuration ---
pub use crate::config::{CommandLineInput, RunConfig, RunMode};

// --- Domain Model ---
pub use crate::model::{
    Media, Place, Poll, PollOption, ReferencedTweet, StreamRule, Tweet, TweetAttachments,
    TweetPublicMetrics, TwitterList, User, UserPublicMetrics,
};

// --- Domain Types ---
pub use crate::types::{
    AuthMode, BearerToken, Credentials, FieldSelection, Id, ListId, RuleId, TweetId, UserId,
};

// --- API Core ---
pub use crate::api::{
    fetch_all_pages, Book, BookKind, BookOptions, ByteStream, CachedEntity, CachedRef,
    CursorState, EntityKind, EntityStore, Envelope, Includes, LineBuffer, MatchingRuleRef, Page,
    PaginationCursor, RangeBounds, ResponseMeta, StreamConsumer, StreamKind, Transport,
    TwitterHttpClient,
};

// --- Client Façade ---
pub use crate::api::StreamEvent;
pub use crate::client::{ClientOptions, EventSubscription, TwitterClient};

// --- Constants ---
pub use crate::constants::{MAX_RESULTS_PER_PAGE, TWITTER_API_BASE_URL};
