// src/api/cursor.rs
//! Pagination cursor — the state machine behind every book.
//!
//! Pagination is strictly forward through the token chain the API hands
//! back: `NotStarted` → `HasMore` ⇄ fetch → `Exhausted`, and `Exhausted`
//! is terminal. The cursor also owns the immutable range bounds applied
//! to every page request of one book.

use super::envelope::ResponseMeta;
use crate::error::AppError;
use chrono::{DateTime, SecondsFormat, Utc};

/// Derived pagination state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorState {
    /// No fetch issued yet; "no token" here means "not started".
    NotStarted,
    /// The most recent page carried a continuation token.
    HasMore,
    /// At least one fetch done and no token remains. Terminal.
    Exhausted,
}

/// Immutable range filters applied to every page of one book.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RangeBounds {
    pub since_id: Option<String>,
    pub until_id: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub max_results: Option<u32>,
}

/// Tracks pagination progress for one book instance.
#[derive(Debug, Clone)]
pub struct PaginationCursor {
    token: Option<String>,
    initial_fetch_done: bool,
    bounds: RangeBounds,
}

impl PaginationCursor {
    pub fn new(bounds: RangeBounds) -> Self {
        Self {
            token: None,
            initial_fetch_done: false,
            bounds,
        }
    }

    pub fn state(&self) -> CursorState {
        match (self.initial_fetch_done, &self.token) {
            (false, _) => CursorState::NotStarted,
            (true, Some(_)) => CursorState::HasMore,
            (true, None) => CursorState::Exhausted,
        }
    }

    /// Whether the most recent page carried a continuation token.
    pub fn has_more(&self) -> bool {
        self.state() == CursorState::HasMore
    }

    pub fn bounds(&self) -> &RangeBounds {
        &self.bounds
    }

    /// The exhaustion guard, checked before any transport call is made.
    pub fn ensure_can_fetch(&self) -> Result<(), AppError> {
        match self.state() {
            CursorState::Exhausted => Err(AppError::PaginationExhausted),
            _ => Ok(()),
        }
    }

    /// Applies the continuation token and range bounds to a page query.
    ///
    /// The token parameter name varies by endpoint (`next_token` for
    /// search, `pagination_token` for timelines); identifier bounds are
    /// only valid on timeline-shaped endpoints and are gated by
    /// `time_bounds`.
    pub fn apply_to_query(
        &self,
        query: &mut Vec<(String, String)>,
        token_param: &str,
        time_bounds: bool,
    ) {
        if let Some(token) = &self.token {
            query.push((token_param.to_string(), token.clone()));
        }
        if time_bounds {
            if let Some(since_id) = &self.bounds.since_id {
                query.push(("since_id".to_string(), since_id.clone()));
            }
            if let Some(until_id) = &self.bounds.until_id {
                query.push(("until_id".to_string(), until_id.clone()));
            }
            if let Some(start_time) = &self.bounds.start_time {
                query.push((
                    "start_time".to_string(),
                    start_time.to_rfc3339_opts(SecondsFormat::Secs, true),
                ));
            }
            if let Some(end_time) = &self.bounds.end_time {
                query.push((
                    "end_time".to_string(),
                    end_time.to_rfc3339_opts(SecondsFormat::Secs, true),
                ));
            }
        }
        if let Some(max_results) = self.bounds.max_results {
            query.push(("max_results".to_string(), max_results.to_string()));
        }
    }

    /// Advances state from a successful page's metadata.
    ///
    /// Called only after a fetch resolves; a failed fetch never touches
    /// the cursor. A zero-result page still updates state from its
    /// metadata: with a token it stays `HasMore`, without one it is
    /// `Exhausted` in the same call.
    pub fn advance(&mut self, meta: Option<&ResponseMeta>) {
        self.initial_fetch_done = true;
        self.token = meta.and_then(|m| m.next_token.clone());
    }
}
