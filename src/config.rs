// src/config.rs
use crate::client::{ClientOptions, EventSubscription};
use crate::error::AppError;
use crate::types::{BearerToken, Credentials, FieldSelection};
use chrono::{DateTime, Utc};
use clap::Parser;

/// Parsed and validated command-line input.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct CommandLineInput {
    /// Search query for the recent-search book (e.g. "rust lang -is:retweet")
    pub query: Option<String>,

    /// Watch a live stream instead of searching: "filtered" or "sampled"
    #[arg(long, conflicts_with = "query")]
    pub stream: Option<String>,

    /// App-only bearer token (defaults to $TWITTER_BEARER_TOKEN)
    #[arg(long)]
    pub bearer_token: Option<String>,

    /// User access token, enabling user-context endpoints (defaults to
    /// $TWITTER_USER_TOKEN when set)
    #[arg(long)]
    pub user_token: Option<String>,

    /// Results per page, 1-100
    #[arg(long, default_value_t = 100)]
    pub page_size: u32,

    /// Stop after this many pages (default: drain to exhaustion)
    #[arg(long)]
    pub max_pages: Option<u32>,

    /// Only results newer than this tweet id
    #[arg(long)]
    pub since_id: Option<String>,

    /// Only results older than this tweet id
    #[arg(long)]
    pub until_id: Option<String>,

    /// Only results after this RFC 3339 timestamp
    #[arg(long)]
    pub start_time: Option<String>,

    /// Only results before this RFC 3339 timestamp
    #[arg(long)]
    pub end_time: Option<String>,

    /// Extra tweet fields to request, comma-separated
    #[arg(long, default_value = "created_at,author_id,lang")]
    pub tweet_fields: String,

    /// Extra user fields to request, comma-separated
    #[arg(long, default_value = "username,name")]
    pub user_fields: String,

    /// Expansions to request on tweet responses, comma-separated
    #[arg(long, default_value = "author_id")]
    pub tweet_expansions: String,

    /// Enable verbose logging (debug level)
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

/// What one invocation does.
#[derive(Debug, Clone)]
pub enum RunMode {
    /// Drain the recent-search book for a query.
    Search { query: String },
    /// Hold one stream connection open and print its events.
    Watch(EventSubscription),
}

/// Validated runtime configuration assembled from CLI input and the
/// environment.
#[derive(Debug)]
pub struct RunConfig {
    pub credentials: Credentials,
    pub client_options: ClientOptions,
    pub mode: RunMode,
    pub page_size: u32,
    pub max_pages: Option<u32>,
    pub since_id: Option<String>,
    pub until_id: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
}

impl CommandLineInput {
    /// Resolves tokens and validates the input into a run configuration.
    pub fn into_config(self) -> Result<RunConfig, AppError> {
        let bearer = self
            .bearer_token
            .or_else(|| std::env::var("TWITTER_BEARER_TOKEN").ok())
            .ok_or_else(|| {
                AppError::MissingConfiguration(
                    "no bearer token: pass --bearer-token or set TWITTER_BEARER_TOKEN".to_string(),
                )
            })?;
        let bearer = BearerToken::new(bearer)?;

        let user_token = self
            .user_token
            .or_else(|| std::env::var("TWITTER_USER_TOKEN").ok());
        let credentials = match user_token {
            Some(token) => Credentials::with_user_context(bearer, BearerToken::new(token)?),
            None => Credentials::app_only(bearer),
        };

        let mode = match (&self.query, self.stream.as_deref()) {
            (Some(query), None) => RunMode::Search {
                query: query.clone(),
            },
            (None, Some("filtered")) => RunMode::Watch(EventSubscription::FilteredTweets),
            (None, Some("sampled")) => RunMode::Watch(EventSubscription::SampledTweets),
            (None, Some(other)) => {
                return Err(AppError::InvalidArgument(format!(
                    "unknown stream kind: {} (expected \"filtered\" or \"sampled\")",
                    other
                )))
            }
            (None, None) => {
                return Err(AppError::InvalidArgument(
                    "nothing to do: pass a search query or --stream".to_string(),
                ))
            }
            (Some(_), Some(_)) => unreachable!("clap conflicts_with prevents this"),
        };

        let fields = FieldSelection {
            tweet_fields: split_list(&self.tweet_fields),
            user_fields: split_list(&self.user_fields),
            tweet_expansions: split_list(&self.tweet_expansions),
            ..FieldSelection::default()
        };
        let events = match mode {
            RunMode::Watch(subscription) => vec![subscription],
            RunMode::Search { .. } => Vec::new(),
        };

        Ok(RunConfig {
            credentials,
            client_options: ClientOptions { events, fields },
            mode,
            page_size: self.page_size,
            max_pages: self.max_pages,
            since_id: self.since_id,
            until_id: self.until_id,
            start_time: parse_timestamp("start_time", self.start_time.as_deref())?,
            end_time: parse_timestamp("end_time", self.end_time.as_deref())?,
        })
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|field| !field.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_timestamp(name: &str, raw: Option<&str>) -> Result<Option<DateTime<Utc>>, AppError> {
    raw.map(|value| {
        DateTime::parse_from_rfc3339(value)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| AppError::InvalidArgument(format!("invalid {}: {}", name, e)))
    })
    .transpose()
}
