// src/api/client.rs
//! Pure HTTP transport for the Twitter API v2.
//!
//! This module provides a thin wrapper around reqwest implementing the
//! [`Transport`] seam. It handles authentication headers and basic
//! request/response decoding without pagination or business logic —
//! retry, back-off, and reconnection policy are deliberately absent.

use super::{ByteStream, Transport};
use crate::constants::TWITTER_API_BASE_URL;
use crate::error::{AppError, TwitterErrorKind};
use crate::types::{AuthMode, BearerToken, Credentials};
use futures::{StreamExt, TryStreamExt};
use reqwest::{Client, Method, Response};
use serde::Deserialize;
use serde_json::Value;

/// A thin wrapper around a reqwest [`Client`] for v2 API requests.
#[derive(Debug, Clone)]
pub struct TwitterHttpClient {
    client: Client,
    credentials: Credentials,
}

/// The v2 problem-details error body.
#[derive(Debug, Deserialize)]
struct ProblemDetails {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    detail: Option<String>,
}

impl TwitterHttpClient {
    /// Creates a new transport over the given credential set.
    pub fn new(credentials: Credentials) -> Result<Self, AppError> {
        let client = Client::builder().build()?;
        Ok(Self {
            client,
            credentials,
        })
    }

    /// Whether user-context calls are possible with the held credentials.
    pub fn has_user_context(&self) -> bool {
        self.credentials.has_user_context()
    }

    fn token_for(&self, auth: AuthMode) -> Result<&BearerToken, AppError> {
        self.credentials.token_for(auth).ok_or_else(|| {
            AppError::MissingConfiguration(
                "this call requires user-context credentials, but only an app-only bearer token is configured"
                    .to_string(),
            )
        })
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        query: &[(String, String)],
        auth: AuthMode,
    ) -> Result<Response, AppError> {
        let url = format!("{}/{}", TWITTER_API_BASE_URL, path);
        log::debug!("{} {} ({} query params)", method, url, query.len());

        let token = self.token_for(auth)?;
        let response = self
            .client
            .request(method, url)
            .query(query)
            .bearer_auth(token.reveal())
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        // Non-2xx: decode the problem-details body into the typed
        // error vocabulary, falling back to the raw status code.
        let body = response.text().await.unwrap_or_default();
        let (kind, message) = match serde_json::from_str::<ProblemDetails>(&body) {
            Ok(problem) => {
                let kind = problem
                    .title
                    .as_deref()
                    .map(TwitterErrorKind::from_title)
                    .unwrap_or_else(|| TwitterErrorKind::from_http_status(status.as_u16()));
                let message = problem
                    .detail
                    .or(problem.title)
                    .unwrap_or_else(|| status.to_string());
                (kind, message)
            }
            Err(_) => (
                TwitterErrorKind::from_http_status(status.as_u16()),
                status.to_string(),
            ),
        };
        log::warn!("API error on {}: {} ({})", path, message, kind);
        Err(AppError::ApiService {
            kind,
            message,
            status: status.as_u16(),
        })
    }
}

#[async_trait::async_trait]
impl Transport for TwitterHttpClient {
    async fn request(
        &self,
        method: Method,
        path: &str,
        query: &[(String, String)],
        auth: AuthMode,
    ) -> Result<Value, AppError> {
        let response = self.send(method, path, query, auth).await?;
        Ok(response.json().await?)
    }

    async fn open_stream(
        &self,
        path: &str,
        query: &[(String, String)],
        auth: AuthMode,
    ) -> Result<ByteStream, AppError> {
        let response = self.send(Method::GET, path, query, auth).await?;
        log::info!("stream connection open: {}", path);
        let stream = response
            .bytes_stream()
            .map_err(AppError::NetworkFailure)
            .boxed();
        Ok(stream)
    }
}
