// src/types/auth.rs
//! Credential wrappers and the per-call auth mode selector.
//!
//! Secrets live behind accessor methods only: neither `Debug` nor
//! `Display` ever prints token material, so credentials can flow through
//! logs and error messages without leaking.

use super::ValidationError;
use std::fmt;

/// An OAuth 2.0 bearer token, either app-only or a user access token.
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken(String);

impl BearerToken {
    /// Validates and wraps a raw token string.
    pub fn new(token: impl Into<String>) -> Result<Self, ValidationError> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(ValidationError::InvalidToken(
                "bearer token must not be empty".to_string(),
            ));
        }
        if token.chars().any(char::is_whitespace) {
            return Err(ValidationError::InvalidToken(
                "bearer token must not contain whitespace".to_string(),
            ));
        }
        Ok(Self(token))
    }

    /// Returns the secret token material for request signing.
    pub fn reveal(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BearerToken(***)")
    }
}

impl fmt::Display for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "***")
    }
}

/// Which credential a call is signed with.
///
/// The core selects the mode per call; how the token was obtained
/// (app-only grant, user authorization flow) is not its concern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    /// App-only bearer token — read-only public data.
    AppOnly,
    /// A user access token — required for blocks, mutes, home timelines
    /// and the `users/me` login step.
    UserContext,
}

/// The active credential set for one client.
#[derive(Debug, Clone)]
pub struct Credentials {
    bearer: BearerToken,
    user_access: Option<BearerToken>,
}

impl Credentials {
    /// App-only credentials: public endpoints only.
    pub fn app_only(bearer: BearerToken) -> Self {
        Self {
            bearer,
            user_access: None,
        }
    }

    /// Full credentials with a user access token.
    pub fn with_user_context(bearer: BearerToken, user_access: BearerToken) -> Self {
        Self {
            bearer,
            user_access: Some(user_access),
        }
    }

    /// Whether user-context calls are possible with this credential set.
    pub fn has_user_context(&self) -> bool {
        self.user_access.is_some()
    }

    /// Resolves the token for a given auth mode, or `None` when the
    /// credential tier doesn't support it.
    pub fn token_for(&self, mode: AuthMode) -> Option<&BearerToken> {
        match mode {
            AuthMode::AppOnly => Some(&self.bearer),
            AuthMode::UserContext => self.user_access.as_ref(),
        }
    }
}
