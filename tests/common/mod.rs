// tests/common/mod.rs
//! Shared test support: a scripted in-memory transport.
#![allow(dead_code)]

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Arc;
use tweetbook::{AppError, AuthMode, ByteStream, Transport, TwitterErrorKind};

/// One request as the transport saw it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub path: String,
    pub query: Vec<(String, String)>,
    pub auth: AuthMode,
}

/// A transport that replays queued JSON bodies and byte-chunk scripts,
/// recording every call it receives.
#[derive(Default)]
pub struct StubTransport {
    responses: Mutex<VecDeque<Value>>,
    stream_scripts: Mutex<VecDeque<Vec<Vec<u8>>>>,
    requests: Mutex<Vec<RecordedRequest>>,
    stream_opens: Mutex<Vec<RecordedRequest>>,
}

impl StubTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Queues the next JSON response body.
    pub fn push_response(&self, body: Value) {
        self.responses.lock().push_back(body);
    }

    /// Queues the chunk script for the next stream open.
    pub fn push_stream(&self, chunks: &[&[u8]]) {
        self.stream_scripts
            .lock()
            .push_back(chunks.iter().map(|c| c.to_vec()).collect());
    }

    pub fn recorded_requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().clone()
    }

    pub fn recorded_stream_opens(&self) -> Vec<RecordedRequest> {
        self.stream_opens.lock().clone()
    }
}

fn record(path: &str, query: &[(String, String)], auth: AuthMode) -> RecordedRequest {
    RecordedRequest {
        path: path.to_string(),
        query: query.to_vec(),
        auth,
    }
}

#[async_trait]
impl Transport for StubTransport {
    async fn request(
        &self,
        _method: reqwest::Method,
        path: &str,
        query: &[(String, String)],
        auth: AuthMode,
    ) -> Result<Value, AppError> {
        self.requests.lock().push(record(path, query, auth));
        self.responses.lock().pop_front().ok_or_else(|| AppError::ApiService {
            kind: TwitterErrorKind::ServiceUnavailable,
            message: "stub transport has no response queued".to_string(),
            status: 503,
        })
    }

    async fn open_stream(
        &self,
        path: &str,
        query: &[(String, String)],
        auth: AuthMode,
    ) -> Result<ByteStream, AppError> {
        self.stream_opens.lock().push(record(path, query, auth));
        let chunks = self.stream_scripts.lock().pop_front().ok_or_else(|| {
            AppError::ApiService {
                kind: TwitterErrorKind::ServiceUnavailable,
                message: "stub transport has no stream script queued".to_string(),
                status: 503,
            }
        })?;
        let stream =
            futures::stream::iter(chunks.into_iter().map(|c| Ok::<Bytes, AppError>(Bytes::from(c))));
        Ok(Box::pin(stream))
    }
}
