// src/error.rs
//! Application error types with structured error handling.
//!
//! Error types form the vocabulary for failure modes in the system.
//! Each error variant tells the story of what went wrong and where,
//! enabling composable recovery strategies.

use std::fmt;
use thiserror::Error;

/// Twitter API error classes as a typed vocabulary.
///
/// Instead of matching against magic strings from the `title` field of
/// an error body, the domain vocabulary is encoded in the type system.
/// Each variant tells you exactly what the API reported and enables
/// pattern-based recovery without stringly-typed dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TwitterErrorKind {
    /// API rate limit exceeded — back off and retry
    RateLimited,
    /// The requested resource does not exist or is inaccessible
    NotFound,
    /// Credentials are invalid or expired
    Unauthorized,
    /// Credentials lack permission for this resource
    Forbidden,
    /// Request parameters failed the API's validation
    InvalidRequest,
    /// Twitter internal server error
    InternalError,
    /// Twitter is temporarily unavailable
    ServiceUnavailable,
    /// HTTP status code fallback when the error body is unparseable
    HttpStatus(u16),
    /// An error title this client doesn't recognize yet
    Unknown(String),
}

impl TwitterErrorKind {
    /// Parse the `title` of a v2 problem-details error body into the
    /// typed vocabulary.
    pub fn from_title(title: &str) -> Self {
        match title {
            "Too Many Requests" => Self::RateLimited,
            "Not Found Error" => Self::NotFound,
            "Unauthorized" => Self::Unauthorized,
            "Forbidden" => Self::Forbidden,
            "Invalid Request" => Self::InvalidRequest,
            "Internal Server Error" => Self::InternalError,
            "Service Unavailable" => Self::ServiceUnavailable,
            other => Self::Unknown(other.to_string()),
        }
    }

    /// Create from an HTTP status code when the error body is unparseable.
    pub fn from_http_status(status: u16) -> Self {
        match status {
            401 => Self::Unauthorized,
            403 => Self::Forbidden,
            404 => Self::NotFound,
            429 => Self::RateLimited,
            503 => Self::ServiceUnavailable,
            other => Self::HttpStatus(other),
        }
    }

    /// Whether this error is transient and worth retrying.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::RateLimited | Self::ServiceUnavailable | Self::InternalError
        )
    }

    /// Whether this error means the resource simply doesn't exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }
}

impl fmt::Display for TwitterErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RateLimited => write!(f, "rate_limited"),
            Self::NotFound => write!(f, "not_found"),
            Self::Unauthorized => write!(f, "unauthorized"),
            Self::Forbidden => write!(f, "forbidden"),
            Self::InvalidRequest => write!(f, "invalid_request"),
            Self::InternalError => write!(f, "internal_server_error"),
            Self::ServiceUnavailable => write!(f, "service_unavailable"),
            Self::HttpStatus(code) => write!(f, "http_{}", code),
            Self::Unknown(title) => write!(f, "{}", title),
        }
    }
}

/// Main application error type.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Missing configuration: {0}")]
    MissingConfiguration(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Fetch called on a book whose token chain has run out. A book in
    /// this state reports the same condition on every subsequent call.
    #[error("Pagination exhausted: no further pages are available")]
    PaginationExhausted,

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Login failed: {0}")]
    LoginFailure(String),

    #[error("Network failure: {0}")]
    NetworkFailure(#[from] reqwest::Error),

    #[error("Twitter API returned an error ({kind}, status {status}): {message}")]
    ApiService {
        kind: TwitterErrorKind,
        message: String,
        status: u16,
    },

    #[error("Filesystem IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {message}")]
    InternalError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error(transparent)]
    ValidationError(#[from] crate::types::ValidationError),
}

// Allow converting from anyhow::Error, preserving the message
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalError {
            message: err.to_string(),
            source: None,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::MalformedResponse(err.to_string())
    }
}

/// Result type alias for convenience
pub type Result<T, E = AppError> = std::result::Result<T, E>;
