// src/api/book.rs
//! Books — stateful paginators, one per resource/query shape.
//!
//! A book owns a [`PaginationCursor`], issues one HTTP call per page,
//! funnels every raw page through the entity store, and returns the
//! decoded, cached page as an ordered identifier-keyed mapping. The
//! nineteen variants differ only in endpoint, query shape, and primary
//! entity kind, so they are described by a data-driven route table
//! rather than one type each.

use super::cursor::{CursorState, PaginationCursor, RangeBounds};
use super::envelope::Envelope;
use super::store::{CachedRef, EntityKind, EntityStore};
use super::Transport;
use crate::constants::MAX_RESULTS_PER_PAGE;
use crate::error::AppError;
use crate::types::FieldSelection;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use reqwest::Method;
use std::sync::Arc;

use crate::types::AuthMode;

/// One fetched page: cached entities keyed by identifier, insertion
/// order equal to API response order.
pub type Page = IndexMap<String, CachedRef>;

/// The paginated query shapes the client can open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BookKind {
    SearchTweets,
    ComposedTweets,
    Mentions,
    HomeTimeline,
    LikedTweets,
    QuoteTweets,
    ListTweets,
    Followers,
    Followings,
    Blocks,
    Mutes,
    LikingUsers,
    RetweetedBy,
    ListMembers,
    ListFollowers,
    OwnedLists,
    PinnedLists,
    FollowedLists,
    ListMemberships,
}

/// How a route's path is anchored: a fixed endpoint, or a segment under
/// a parent user, tweet, or list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteAnchor {
    /// Fixed path; the variant takes a search query instead of a parent.
    Fixed(&'static str),
    /// `users/{parent}/{segment}`
    User(&'static str),
    /// `tweets/{parent}/{segment}`
    Tweet(&'static str),
    /// `lists/{parent}/{segment}`
    List(&'static str),
}

/// Everything that distinguishes one book variant from another.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookRoute {
    pub anchor: RouteAnchor,
    /// Entity kind of the primary payload.
    pub primary: EntityKind,
    /// Continuation parameter name (`next_token` on search,
    /// `pagination_token` on everything else).
    pub token_param: &'static str,
    /// Whether identifier/timestamp range bounds apply to this route.
    pub time_bounds: bool,
    pub auth: AuthMode,
}

impl BookKind {
    /// The route table: endpoint, query shape, and extracted kind per
    /// variant.
    pub fn route(self) -> BookRoute {
        use AuthMode::{AppOnly, UserContext};
        use EntityKind::{List, Tweet, User};
        use RouteAnchor as A;

        let route = |anchor, primary, token_param, time_bounds, auth| BookRoute {
            anchor,
            primary,
            token_param,
            time_bounds,
            auth,
        };

        match self {
            Self::SearchTweets => route(
                A::Fixed("tweets/search/recent"),
                Tweet,
                "next_token",
                true,
                AppOnly,
            ),
            Self::ComposedTweets => route(A::User("tweets"), Tweet, "pagination_token", true, AppOnly),
            Self::Mentions => route(A::User("mentions"), Tweet, "pagination_token", true, AppOnly),
            Self::HomeTimeline => route(
                A::User("timelines/reverse_chronological"),
                Tweet,
                "pagination_token",
                true,
                UserContext,
            ),
            Self::LikedTweets => route(
                A::User("liked_tweets"),
                Tweet,
                "pagination_token",
                false,
                AppOnly,
            ),
            Self::QuoteTweets => route(
                A::Tweet("quote_tweets"),
                Tweet,
                "pagination_token",
                false,
                AppOnly,
            ),
            Self::ListTweets => route(A::List("tweets"), Tweet, "pagination_token", false, AppOnly),
            Self::Followers => route(A::User("followers"), User, "pagination_token", false, AppOnly),
            Self::Followings => route(A::User("following"), User, "pagination_token", false, AppOnly),
            Self::Blocks => route(A::User("blocking"), User, "pagination_token", false, UserContext),
            Self::Mutes => route(A::User("muting"), User, "pagination_token", false, UserContext),
            Self::LikingUsers => route(
                A::Tweet("liking_users"),
                User,
                "pagination_token",
                false,
                AppOnly,
            ),
            Self::RetweetedBy => route(
                A::Tweet("retweeted_by"),
                User,
                "pagination_token",
                false,
                AppOnly,
            ),
            Self::ListMembers => route(A::List("members"), User, "pagination_token", false, AppOnly),
            Self::ListFollowers => route(A::List("followers"), User, "pagination_token", false, AppOnly),
            Self::OwnedLists => route(A::User("owned_lists"), List, "pagination_token", false, AppOnly),
            Self::PinnedLists => route(
                A::User("pinned_lists"),
                List,
                "pagination_token",
                false,
                UserContext,
            ),
            Self::FollowedLists => route(
                A::User("followed_lists"),
                List,
                "pagination_token",
                false,
                AppOnly,
            ),
            Self::ListMemberships => route(
                A::User("list_memberships"),
                List,
                "pagination_token",
                false,
                AppOnly,
            ),
        }
    }

    /// Resolves a variant from its conventional name, with or without
    /// the `Book` suffix.
    pub fn from_name(name: &str) -> Option<Self> {
        let stem = name.strip_suffix("Book").unwrap_or(name);
        let kind = match stem {
            "SearchTweets" => Self::SearchTweets,
            "ComposedTweets" => Self::ComposedTweets,
            "Mentions" => Self::Mentions,
            "HomeTimeline" => Self::HomeTimeline,
            "LikedTweets" => Self::LikedTweets,
            "QuoteTweets" => Self::QuoteTweets,
            "ListTweets" => Self::ListTweets,
            "Followers" => Self::Followers,
            "Followings" => Self::Followings,
            "Blocks" => Self::Blocks,
            "Mutes" => Self::Mutes,
            "LikingUsers" => Self::LikingUsers,
            "RetweetedBy" => Self::RetweetedBy,
            "ListMembers" => Self::ListMembers,
            "ListFollowers" => Self::ListFollowers,
            "OwnedLists" => Self::OwnedLists,
            "PinnedLists" => Self::PinnedLists,
            "FollowedLists" => Self::FollowedLists,
            "ListMemberships" => Self::ListMemberships,
            _ => return None,
        };
        Some(kind)
    }

    /// Conventional name, `Book` suffix included.
    pub fn name(self) -> &'static str {
        match self {
            Self::SearchTweets => "SearchTweetsBook",
            Self::ComposedTweets => "ComposedTweetsBook",
            Self::Mentions => "MentionsBook",
            Self::HomeTimeline => "HomeTimelineBook",
            Self::LikedTweets => "LikedTweetsBook",
            Self::QuoteTweets => "QuoteTweetsBook",
            Self::ListTweets => "ListTweetsBook",
            Self::Followers => "FollowersBook",
            Self::Followings => "FollowingsBook",
            Self::Blocks => "BlocksBook",
            Self::Mutes => "MutesBook",
            Self::LikingUsers => "LikingUsersBook",
            Self::RetweetedBy => "RetweetedByBook",
            Self::ListMembers => "ListMembersBook",
            Self::ListFollowers => "ListFollowersBook",
            Self::OwnedLists => "OwnedListsBook",
            Self::PinnedLists => "PinnedListsBook",
            Self::FollowedLists => "FollowedListsBook",
            Self::ListMemberships => "ListMembershipsBook",
        }
    }
}

/// Caller-supplied options for constructing a book.
///
/// Which fields are required depends on the variant: search takes a
/// `query`, parent-scoped variants take a `parent_id`. Range bounds and
/// the page-size cap are immutable for the book's lifetime.
#[derive(Debug, Clone, Default)]
pub struct BookOptions {
    /// Search query string (`SearchTweets` only).
    pub query: Option<String>,
    /// Parent user/tweet/list identifier for scoped variants.
    pub parent_id: Option<String>,
    pub max_results_per_page: Option<u32>,
    pub since_id: Option<String>,
    pub until_id: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
}

impl BookOptions {
    /// Options for a search book.
    pub fn search(query: impl Into<String>) -> Self {
        Self {
            query: Some(query.into()),
            ..Self::default()
        }
    }

    /// Options for a parent-scoped book.
    pub fn for_parent(parent_id: impl Into<String>) -> Self {
        Self {
            parent_id: Some(parent_id.into()),
            ..Self::default()
        }
    }

    pub fn max_results_per_page(mut self, cap: u32) -> Self {
        self.max_results_per_page = Some(cap);
        self
    }

    pub fn id_range(mut self, since_id: impl Into<String>, until_id: impl Into<String>) -> Self {
        self.since_id = Some(since_id.into());
        self.until_id = Some(until_id.into());
        self
    }

    pub fn time_range(mut self, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        self.start_time = Some(start);
        self.end_time = Some(end);
        self
    }
}

/// A stateful paginator bound to one query/endpoint shape.
///
/// `fetch_next_page` takes `&mut self`, which is the single-flight
/// guard: two in-flight fetches on the same book cannot be expressed,
/// so the stale-token hazard of concurrent calls is ruled out at
/// compile time.
pub struct Book {
    kind: BookKind,
    route: BookRoute,
    path: String,
    search_query: Option<String>,
    cursor: PaginationCursor,
    fields: FieldSelection,
    store: EntityStore,
    transport: Arc<dyn Transport>,
}

impl Book {
    /// Validates options against the variant's requirements and builds
    /// the book. Validation failures are [`AppError::InvalidArgument`],
    /// raised before any transport call.
    pub fn new(
        kind: BookKind,
        options: BookOptions,
        transport: Arc<dyn Transport>,
        store: EntityStore,
        fields: FieldSelection,
    ) -> Result<Self, AppError> {
        let route = kind.route();
        let path = build_path(kind, route.anchor, &options)?;

        let search_query = match route.anchor {
            RouteAnchor::Fixed(_) => {
                let query = options
                    .query
                    .as_deref()
                    .map(str::trim)
                    .filter(|q| !q.is_empty())
                    .ok_or_else(|| {
                        AppError::InvalidArgument(format!(
                            "{} requires a non-empty search query",
                            kind.name()
                        ))
                    })?;
                Some(query.to_string())
            }
            _ => None,
        };

        if let Some(cap) = options.max_results_per_page {
            if cap == 0 || cap > MAX_RESULTS_PER_PAGE {
                return Err(AppError::InvalidArgument(format!(
                    "max_results_per_page must be between 1 and {}, got {}",
                    MAX_RESULTS_PER_PAGE, cap
                )));
            }
        }

        let cursor = PaginationCursor::new(RangeBounds {
            since_id: options.since_id,
            until_id: options.until_id,
            start_time: options.start_time,
            end_time: options.end_time,
            max_results: options.max_results_per_page,
        });

        Ok(Self {
            kind,
            route,
            path,
            search_query,
            cursor,
            fields,
            store,
            transport,
        })
    }

    pub fn kind(&self) -> BookKind {
        self.kind
    }

    /// Whether the most recent page carried a continuation token.
    pub fn has_more(&self) -> bool {
        self.cursor.has_more()
    }

    pub fn cursor_state(&self) -> CursorState {
        self.cursor.state()
    }

    /// Fetches the next page, updates the cache, and returns it as an
    /// ordered identifier-keyed mapping.
    ///
    /// Fails with [`AppError::PaginationExhausted`] once the token chain
    /// has run out — on that call and every call after it. A failed
    /// fetch (transport or malformed envelope) leaves the cursor
    /// unchanged.
    pub async fn fetch_next_page(&mut self) -> Result<Page, AppError> {
        self.cursor.ensure_can_fetch()?;

        let query = self.build_query();
        let raw = self
            .transport
            .request(Method::GET, &self.path, &query, self.route.auth)
            .await?;
        let envelope: Envelope = serde_json::from_value(raw)?;

        // Cache before advancing: a malformed envelope must not move
        // the cursor.
        let primaries = self.store.upsert_envelope(self.route.primary, &envelope)?;
        self.cursor.advance(envelope.meta.as_ref());

        let mut page = Page::with_capacity(primaries.len());
        for entity in primaries {
            let id = entity.read().id().to_string();
            page.insert(id, entity);
        }
        log::debug!(
            "{}: fetched page of {} ({})",
            self.kind.name(),
            page.len(),
            if self.has_more() { "has more" } else { "exhausted" }
        );
        Ok(page)
    }

    fn build_query(&self) -> Vec<(String, String)> {
        let mut query = Vec::new();
        if let Some(search_query) = &self.search_query {
            query.push(("query".to_string(), search_query.clone()));
        }
        self.cursor
            .apply_to_query(&mut query, self.route.token_param, self.route.time_bounds);
        self.fields.apply_to_query(&mut query, self.route.primary);
        query
    }
}

fn build_path(kind: BookKind, anchor: RouteAnchor, options: &BookOptions) -> Result<String, AppError> {
    let parent = || {
        options
            .parent_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty() && id.chars().all(|c| c.is_ascii_digit()))
            .ok_or_else(|| {
                AppError::InvalidArgument(format!(
                    "{} requires a parent identifier (decimal snowflake)",
                    kind.name()
                ))
            })
    };

    Ok(match anchor {
        RouteAnchor::Fixed(path) => path.to_string(),
        RouteAnchor::User(segment) => format!("users/{}/{}", parent()?, segment),
        RouteAnchor::Tweet(segment) => format!("tweets/{}/{}", parent()?, segment),
        RouteAnchor::List(segment) => format!("lists/{}/{}", parent()?, segment),
    })
}

/// Drains a book to exhaustion (or an optional page cap), merging every
/// page into one ordered mapping. Duplicate identifiers across pages
/// collapse onto the same cached entity without reordering.
pub async fn fetch_all_pages(book: &mut Book, max_pages: Option<u32>) -> Result<Page, AppError> {
    let mut all = Page::new();
    let mut pages_fetched = 0u32;

    loop {
        if let Some(max) = max_pages {
            if pages_fetched >= max {
                log::debug!("reached maximum page limit: {}", max);
                break;
            }
        }

        let page = book.fetch_next_page().await?;
        pages_fetched += 1;
        for (id, entity) in page {
            all.entry(id).or_insert(entity);
        }

        if !book.has_more() {
            break;
        }
    }

    Ok(all)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn route_table_covers_all_variants_by_name() {
        let kinds = [
            BookKind::SearchTweets,
            BookKind::ComposedTweets,
            BookKind::Mentions,
            BookKind::HomeTimeline,
            BookKind::LikedTweets,
            BookKind::QuoteTweets,
            BookKind::ListTweets,
            BookKind::Followers,
            BookKind::Followings,
            BookKind::Blocks,
            BookKind::Mutes,
            BookKind::LikingUsers,
            BookKind::RetweetedBy,
            BookKind::ListMembers,
            BookKind::ListFollowers,
            BookKind::OwnedLists,
            BookKind::PinnedLists,
            BookKind::FollowedLists,
            BookKind::ListMemberships,
        ];
        assert_eq!(kinds.len(), 19);
        for kind in kinds {
            assert_eq!(BookKind::from_name(kind.name()), Some(kind));
            // Route lookup must not panic for any variant.
            let _ = kind.route();
        }
        assert_eq!(BookKind::from_name("SearchTweets"), Some(BookKind::SearchTweets));
        assert_eq!(BookKind::from_name("NoSuchBook"), None);
    }

    #[test]
    fn search_route_uses_next_token_and_time_bounds() {
        let route = BookKind::SearchTweets.route();
        assert_eq!(route.anchor, RouteAnchor::Fixed("tweets/search/recent"));
        assert_eq!(route.token_param, "next_token");
        assert!(route.time_bounds);
        assert_eq!(route.primary, EntityKind::Tweet);
    }

    #[test]
    fn user_context_routes_are_marked() {
        for kind in [BookKind::Blocks, BookKind::Mutes, BookKind::HomeTimeline, BookKind::PinnedLists] {
            assert_eq!(kind.route().auth, AuthMode::UserContext);
        }
        assert_eq!(BookKind::Followers.route().auth, AuthMode::AppOnly);
    }

    #[test]
    fn scoped_paths_are_built_from_the_parent() {
        let options = BookOptions::for_parent("2244994945");
        let path = build_path(
            BookKind::Followers,
            BookKind::Followers.route().anchor,
            &options,
        )
        .unwrap();
        assert_eq!(path, "users/2244994945/followers");

        let path = build_path(
            BookKind::QuoteTweets,
            BookKind::QuoteTweets.route().anchor,
            &BookOptions::for_parent("1"),
        )
        .unwrap();
        assert_eq!(path, "tweets/1/quote_tweets");
    }

    #[test]
    fn missing_required_options_fail_eagerly() {
        let err = build_path(
            BookKind::Followers,
            BookKind::Followers.route().anchor,
            &BookOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, AppError::InvalidArgument(_)));

        let err = build_path(
            BookKind::ListTweets,
            BookKind::ListTweets.route().anchor,
            &BookOptions::for_parent("not-a-snowflake"),
        )
        .unwrap_err();
        assert!(matches!(err, AppError::InvalidArgument(_)));
    }
}
