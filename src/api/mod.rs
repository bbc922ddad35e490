// src/api/mod.rs
//! Twitter API interaction — pagination, caching, and streaming.
//!
//! This module provides a data-oriented interface to the Twitter API v2,
//! with clear separation between I/O operations, envelope decoding, and
//! cache/pagination logic. Business logic depends on the [`Transport`]
//! trait, never on HTTP details.

pub mod book;
pub mod client;
pub mod cursor;
pub mod envelope;
pub mod store;
pub mod stream;

use crate::error::AppError;
use crate::types::AuthMode;
use bytes::Bytes;
use futures::Stream;
use std::pin::Pin;

/// A chunked response body as the stream consumer sees it.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, AppError>> + Send>>;

/// The ability to perform an authorized call against the API.
///
/// This is the fundamental seam for I/O: page fetches return one decoded
/// JSON document, stream opens return a live byte stream. Signing, retry
/// policy, and rate-limit back-off all live behind this trait.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    /// Performs one request and decodes the complete JSON body.
    async fn request(
        &self,
        method: reqwest::Method,
        path: &str,
        query: &[(String, String)],
        auth: AuthMode,
    ) -> Result<serde_json::Value, AppError>;

    /// Opens a long-lived streaming response body.
    async fn open_stream(
        &self,
        path: &str,
        query: &[(String, String)],
        auth: AuthMode,
    ) -> Result<ByteStream, AppError>;
}

// Re-export the public interface
pub use book::{fetch_all_pages, Book, BookKind, BookOptions, Page};
pub use client::TwitterHttpClient;
pub use cursor::{CursorState, PaginationCursor, RangeBounds};
pub use envelope::{Envelope, Includes, MatchingRuleRef, ResponseMeta};
pub use store::{CachedEntity, CachedRef, EntityKind, EntityStore};
pub use stream::{LineBuffer, StreamConsumer, StreamEvent, StreamKind};
