// src/client.rs
//! The client façade — one entity store, any number of books, and up to
//! two persistent stream connections.
//!
//! The client is the only component aware of the active capability tier
//! (app-only bearer vs. full user-context): it gates the user-context
//! book variants, the `users/me` resolution step at login, and which
//! stream consumers are started.

use crate::api::{
    fetch_all_pages, Book, BookKind, BookOptions, CachedRef, EntityKind, Envelope, EntityStore,
    Page, StreamConsumer, StreamEvent, StreamKind, Transport, TwitterHttpClient,
};
use crate::constants::FILTERED_STREAM_RULES_PATH;
use crate::error::AppError;
use crate::model::{StreamRule, Tweet, User};
use crate::types::{AuthMode, Credentials, FieldSelection, TweetId, UserId};
use reqwest::Method;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Which near-real-time deliveries a client subscribes to at login.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventSubscription {
    FilteredTweets,
    SampledTweets,
}

impl EventSubscription {
    fn stream_kind(self) -> StreamKind {
        match self {
            EventSubscription::FilteredTweets => StreamKind::Filtered,
            EventSubscription::SampledTweets => StreamKind::Sampled,
        }
    }
}

/// Construction-time options for a client.
#[derive(Debug, Clone, Default)]
pub struct ClientOptions {
    /// Stream subscriptions to start at login: zero, one, or both.
    pub events: Vec<EventSubscription>,
    /// Field selection threaded into every request this client builds.
    pub fields: FieldSelection,
}

/// A Twitter API v2 client: shared entity cache, book factory, and
/// stream ownership.
pub struct TwitterClient {
    transport: Arc<dyn Transport>,
    store: EntityStore,
    fields: FieldSelection,
    subscriptions: Vec<EventSubscription>,
    user_context: bool,
    me: Option<CachedRef>,
    events_tx: mpsc::UnboundedSender<StreamEvent>,
    events_rx: Option<mpsc::UnboundedReceiver<StreamEvent>>,
    stream_tasks: Vec<JoinHandle<()>>,
}

impl TwitterClient {
    /// Builds a client over the real HTTP transport.
    pub fn new(credentials: Credentials, options: ClientOptions) -> Result<Self, AppError> {
        let user_context = credentials.has_user_context();
        let transport = Arc::new(TwitterHttpClient::new(credentials)?);
        Ok(Self::with_transport(transport, user_context, options))
    }

    /// Builds a client over any transport implementation. The caller
    /// states whether the transport can perform user-context calls.
    pub fn with_transport(
        transport: Arc<dyn Transport>,
        user_context: bool,
        options: ClientOptions,
    ) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            transport,
            store: EntityStore::new(),
            fields: options.fields,
            subscriptions: options.events,
            user_context,
            me: None,
            events_tx,
            events_rx: Some(events_rx),
            stream_tasks: Vec::new(),
        }
    }

    /// The shared entity cache. Lives as long as this client.
    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    /// The authenticated user, once `login` has resolved it.
    pub fn me(&self) -> Option<CachedRef> {
        self.me.clone()
    }

    /// Takes the receiving end of the ordered event channel. Events are
    /// published per stream record in per-connection order.
    pub fn take_events(&mut self) -> Option<mpsc::UnboundedReceiver<StreamEvent>> {
        self.events_rx.take()
    }

    /// Constructs a book, validating the variant's required options
    /// eagerly and gating user-context variants by capability tier.
    pub fn create_book(&self, kind: BookKind, options: BookOptions) -> Result<Book, AppError> {
        if kind.route().auth == AuthMode::UserContext && !self.user_context {
            return Err(AppError::MissingConfiguration(format!(
                "{} requires user-context credentials",
                kind.name()
            )));
        }
        Book::new(
            kind,
            options,
            Arc::clone(&self.transport),
            self.store.clone(),
            self.fields.clone(),
        )
    }

    /// Constructs a book from its conventional name (`"SearchTweetsBook"`).
    pub fn create_book_by_name(&self, name: &str, options: BookOptions) -> Result<Book, AppError> {
        let kind = BookKind::from_name(name)
            .ok_or_else(|| AppError::InvalidArgument(format!("unknown book variant: {}", name)))?;
        self.create_book(kind, options)
    }

    /// Drains a freshly constructed book to exhaustion.
    pub async fn fetch_book(
        &self,
        kind: BookKind,
        options: BookOptions,
        max_pages: Option<u32>,
    ) -> Result<Page, AppError> {
        let mut book = self.create_book(kind, options)?;
        fetch_all_pages(&mut book, max_pages).await
    }

    /// Resolves the authenticated user (user-context tier only), starts
    /// the subscribed stream consumers, then emits [`StreamEvent::Ready`].
    pub async fn login(&mut self) -> Result<(), AppError> {
        if self.user_context {
            self.resolve_me().await?;
        }
        for subscription in self.subscriptions.clone() {
            self.start_stream(subscription.stream_kind()).await?;
        }
        let _ = self.events_tx.send(StreamEvent::Ready);
        Ok(())
    }

    /// Waits for every started stream consumer to end. Streams are not
    /// restarted here; reconnection policy belongs to the caller.
    pub async fn join_streams(&mut self) {
        for task in self.stream_tasks.drain(..) {
            if let Err(e) = task.await {
                log::warn!("stream task ended abnormally: {}", e);
            }
        }
    }

    async fn resolve_me(&mut self) -> Result<(), AppError> {
        let mut query = Vec::new();
        self.fields.apply_to_query(&mut query, EntityKind::User);
        let raw = self
            .transport
            .request(Method::GET, "users/me", &query, AuthMode::UserContext)
            .await
            .map_err(|e| AppError::LoginFailure(e.to_string()))?;
        let envelope: Envelope = serde_json::from_value(raw)
            .map_err(|e| AppError::LoginFailure(format!("undecodable users/me response: {}", e)))?;
        let me = self
            .store
            .upsert_envelope(EntityKind::User, &envelope)
            .map_err(|e| AppError::LoginFailure(e.to_string()))?
            .into_iter()
            .next()
            .ok_or_else(|| {
                AppError::LoginFailure("users/me returned no user object".to_string())
            })?;
        log::info!("logged in as user {}", me.read().id());
        self.me = Some(me);
        Ok(())
    }

    async fn start_stream(&mut self, kind: StreamKind) -> Result<(), AppError> {
        if kind == StreamKind::Filtered {
            let rules = self.refresh_stream_rules().await?;
            log::debug!("filtered stream: {} active rules cached", rules.len());
        }

        let mut query = Vec::new();
        self.fields.apply_to_query(&mut query, EntityKind::Tweet);
        let body = self
            .transport
            .open_stream(kind.path(), &query, AuthMode::AppOnly)
            .await?;

        let consumer = StreamConsumer::new(kind, self.store.clone(), self.events_tx.clone());
        self.stream_tasks.push(tokio::spawn(consumer.run(body)));
        Ok(())
    }

    /// Fetches the active filtered-stream rule set and caches it, so
    /// filtered events can resolve matching-rule ids to their metadata.
    pub async fn refresh_stream_rules(&self) -> Result<Vec<StreamRule>, AppError> {
        let raw = self
            .transport
            .request(Method::GET, FILTERED_STREAM_RULES_PATH, &[], AuthMode::AppOnly)
            .await?;
        let envelope: Envelope = serde_json::from_value(raw)?;
        // An empty rule set arrives with no data field at all.
        if envelope.data.is_none() {
            return Ok(Vec::new());
        }
        self.store
            .upsert_envelope(EntityKind::StreamRule, &envelope)?
            .into_iter()
            .map(|rule| rule.read().decode())
            .collect()
    }

    /// Fetches one tweet by id through the shared cache.
    pub async fn fetch_tweet(&self, id: &TweetId) -> Result<CachedRef, AppError> {
        self.fetch_single(EntityKind::Tweet, &format!("tweets/{}", id))
            .await
    }

    /// Fetches one user by id through the shared cache.
    pub async fn fetch_user(&self, id: &UserId) -> Result<CachedRef, AppError> {
        self.fetch_single(EntityKind::User, &format!("users/{}", id))
            .await
    }

    /// Fetches one user by handle through the shared cache.
    pub async fn fetch_user_by_username(&self, username: &str) -> Result<CachedRef, AppError> {
        let username = username.trim().trim_start_matches('@');
        if username.is_empty()
            || !username.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(AppError::InvalidArgument(format!(
                "invalid username: {:?}",
                username
            )));
        }
        self.fetch_single(EntityKind::User, &format!("users/by/username/{}", username))
            .await
    }

    async fn fetch_single(&self, kind: EntityKind, path: &str) -> Result<CachedRef, AppError> {
        let mut query = Vec::new();
        self.fields.apply_to_query(&mut query, kind);
        let raw = self
            .transport
            .request(Method::GET, path, &query, AuthMode::AppOnly)
            .await?;
        let envelope: Envelope = serde_json::from_value(raw)?;
        self.store
            .upsert_envelope(kind, &envelope)?
            .into_iter()
            .next()
            .ok_or_else(|| {
                AppError::MalformedResponse(format!("{} returned no primary object", path))
            })
    }

    /// Cache-only lookup of a tweet's typed view. Never fetches.
    pub fn cached_tweet(&self, id: &str) -> Option<Result<Tweet, AppError>> {
        self.store.tweet(id)
    }

    /// Cache-only lookup of a user's typed view. Never fetches.
    pub fn cached_user(&self, id: &str) -> Option<Result<User, AppError>> {
        self.store.user(id)
    }
}
