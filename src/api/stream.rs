// src/api/stream.rs
//! Stream consumers — near-real-time tweet delivery.
//!
//! A consumer owns one long-lived chunked response body carrying
//! newline-delimited JSON records. Bytes are reassembled into complete
//! lines (a record may span any number of transport chunks), blank
//! keep-alive lines are skipped, and each decoded record is routed
//! through the entity store before exactly one event is published on the
//! ordered event channel. A record that fails to decode is logged and
//! dropped; it never terminates the connection.

use super::envelope::Envelope;
use super::store::{CachedRef, EntityKind, EntityStore};
use super::ByteStream;
use crate::constants::{
    FILTERED_STREAM_PATH, SAMPLED_STREAM_PATH, STREAM_LINE_BUFFER_CAPACITY,
};
use crate::error::AppError;
use crate::model::StreamRule;
use futures::StreamExt;
use serde_json::{Map, Value};
use std::fmt;
use tokio::sync::mpsc;

/// Which persistent connection a consumer drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    /// Rule-matched delivery (`tweets/search/stream`).
    Filtered,
    /// ~1% sample of all tweets (`tweets/sample/stream`).
    Sampled,
}

impl StreamKind {
    pub fn path(self) -> &'static str {
        match self {
            StreamKind::Filtered => FILTERED_STREAM_PATH,
            StreamKind::Sampled => SAMPLED_STREAM_PATH,
        }
    }
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamKind::Filtered => write!(f, "filtered"),
            StreamKind::Sampled => write!(f, "sampled"),
        }
    }
}

/// Domain events delivered on the client's ordered event channel.
#[derive(Debug, Clone)]
pub enum StreamEvent {
    /// Login finished; books and streams are live.
    Ready,
    /// One tweet arrived on the filtered stream, with the rules (an
    /// order-independent set) that caused delivery, each resolved to
    /// its cached metadata where known.
    FilteredTweetCreate {
        tweet: CachedRef,
        matching_rules: Vec<StreamRule>,
    },
    /// One tweet arrived on the sampled stream.
    SampledTweetCreate { tweet: CachedRef },
}

/// Reassembles newline-delimited records from arbitrary chunk splits.
#[derive(Debug, Default)]
pub struct LineBuffer {
    buf: Vec<u8>,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self {
            buf: Vec::with_capacity(STREAM_LINE_BUFFER_CAPACITY),
        }
    }

    /// Appends one transport chunk and returns every line it completed.
    /// A trailing partial line stays buffered for the next chunk.
    pub fn push_chunk(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buf.extend_from_slice(chunk);

        let mut lines = Vec::new();
        while let Some(pos) = self.buf.iter().position(|&b| b == b'\n') {
            let mut line: Vec<u8> = self.buf.drain(..=pos).collect();
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            match String::from_utf8(line) {
                Ok(text) => lines.push(text),
                Err(e) => log::warn!("dropping non-UTF-8 stream line: {}", e),
            }
        }
        lines
    }

    /// Drains whatever is buffered once the connection has ended; the
    /// final record of a stream may lack its terminator.
    pub fn take_remainder(&mut self) -> Option<String> {
        if self.buf.is_empty() {
            return None;
        }
        let rest = std::mem::take(&mut self.buf);
        match String::from_utf8(rest) {
            Ok(text) => Some(text),
            Err(e) => {
                log::warn!("dropping non-UTF-8 stream remainder: {}", e);
                None
            }
        }
    }
}

/// Consumes one persistent connection for the lifetime of its body.
///
/// Consumers are started by the client at login time and do not
/// reconnect on their own; restart policy belongs to the caller.
pub struct StreamConsumer {
    kind: StreamKind,
    store: EntityStore,
    events: mpsc::UnboundedSender<StreamEvent>,
}

impl StreamConsumer {
    pub fn new(
        kind: StreamKind,
        store: EntityStore,
        events: mpsc::UnboundedSender<StreamEvent>,
    ) -> Self {
        Self {
            kind,
            store,
            events,
        }
    }

    /// Runs until the body ends or the transport reports an error.
    pub async fn run(self, mut body: ByteStream) {
        let mut buffer = LineBuffer::new();
        while let Some(chunk) = body.next().await {
            match chunk {
                Ok(chunk) => {
                    for line in buffer.push_chunk(&chunk) {
                        self.consume_line(&line);
                    }
                }
                Err(e) => {
                    log::warn!("{} stream transport failure: {}", self.kind, e);
                    break;
                }
            }
        }
        if let Some(rest) = buffer.take_remainder() {
            self.consume_line(&rest);
        }
        log::info!("{} stream connection ended", self.kind);
    }

    /// Decodes and routes one complete line. Blank lines are keep-alive
    /// heartbeats; undecodable lines are reported and dropped.
    fn consume_line(&self, line: &str) {
        if line.trim().is_empty() {
            log::trace!("{} stream heartbeat", self.kind);
            return;
        }

        let envelope: Envelope = match serde_json::from_str(line) {
            Ok(envelope) => envelope,
            Err(e) => {
                log::warn!("{} stream: dropping undecodable record: {}", self.kind, e);
                return;
            }
        };

        if let Err(e) = self.route_envelope(&envelope) {
            log::warn!("{} stream: dropping record: {}", self.kind, e);
        }
    }

    fn route_envelope(&self, envelope: &Envelope) -> Result<(), AppError> {
        // Rule references are cached before resolution so that the tag
        // on the wire merges with any previously listed rule value.
        if let Some(rule_refs) = &envelope.matching_rules {
            for rule in rule_refs {
                let mut payload = Map::new();
                payload.insert("id".to_string(), Value::String(rule.id.clone()));
                if let Some(tag) = &rule.tag {
                    payload.insert("tag".to_string(), Value::String(tag.clone()));
                }
                self.store.upsert(EntityKind::StreamRule, &payload)?;
            }
        }

        let primaries = self.store.upsert_envelope(EntityKind::Tweet, envelope)?;
        for tweet in primaries {
            let event = match self.kind {
                StreamKind::Filtered => StreamEvent::FilteredTweetCreate {
                    tweet,
                    matching_rules: self.resolve_rules(envelope),
                },
                StreamKind::Sampled => StreamEvent::SampledTweetCreate { tweet },
            };
            if self.events.send(event).is_err() {
                log::debug!("{} stream: event receiver dropped", self.kind);
            }
        }
        Ok(())
    }

    fn resolve_rules(&self, envelope: &Envelope) -> Vec<StreamRule> {
        envelope
            .matching_rules
            .iter()
            .flatten()
            .map(|rule| {
                self.store
                    .stream_rule(&rule.id)
                    .and_then(Result::ok)
                    .unwrap_or_else(|| StreamRule {
                        id: rule.id.clone(),
                        value: None,
                        tag: rule.tag.clone(),
                    })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn record_split_across_chunks_is_reassembled() {
        let mut buffer = LineBuffer::new();
        assert!(buffer.push_chunk(br#"{"data":{"id":"1""#).is_empty());
        let lines = buffer.push_chunk(b"}}\n");
        assert_eq!(lines, vec![r#"{"data":{"id":"1"}}"#.to_string()]);
    }

    #[test]
    fn one_chunk_may_complete_many_lines() {
        let mut buffer = LineBuffer::new();
        let lines = buffer.push_chunk(b"a\r\n\nb\nc");
        assert_eq!(lines, vec!["a".to_string(), String::new(), "b".to_string()]);
        assert_eq!(buffer.take_remainder(), Some("c".to_string()));
        assert_eq!(buffer.take_remainder(), None);
    }

    fn consumer(kind: StreamKind) -> (StreamConsumer, mpsc::UnboundedReceiver<StreamEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (StreamConsumer::new(kind, EntityStore::new(), tx), rx)
    }

    #[test]
    fn filtered_record_emits_one_event_with_resolved_rules() {
        let (consumer, mut rx) = consumer(StreamKind::Filtered);

        // Prime the rule cache the way the login step does.
        let mut rule = Map::new();
        rule.insert("id".to_string(), Value::String("42".to_string()));
        rule.insert("value".to_string(), Value::String("rust lang".to_string()));
        consumer.store.upsert(EntityKind::StreamRule, &rule).unwrap();

        consumer.consume_line(
            r#"{"data":{"id":"7","text":"hi"},"matching_rules":[{"id":"42","tag":"rust"}]}"#,
        );

        match rx.try_recv().unwrap() {
            StreamEvent::FilteredTweetCreate {
                tweet,
                matching_rules,
            } => {
                assert_eq!(tweet.read().id(), "7");
                assert_eq!(matching_rules.len(), 1);
                assert_eq!(matching_rules[0].id, "42");
                // Resolved against the cache: value from the listed
                // rule, tag merged in from the wire.
                assert_eq!(matching_rules[0].value.as_deref(), Some("rust lang"));
                assert_eq!(matching_rules[0].tag.as_deref(), Some("rust"));
            }
            other => panic!("unexpected event: {:?}", other),
        }
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn undecodable_record_is_skipped_and_stream_continues() {
        let (consumer, mut rx) = consumer(StreamKind::Sampled);
        consumer.consume_line(r#"{"data": garbage"#);
        assert!(rx.try_recv().is_err());

        consumer.consume_line(r#"{"data":{"id":"8"}}"#);
        assert!(matches!(
            rx.try_recv().unwrap(),
            StreamEvent::SampledTweetCreate { .. }
        ));
    }

    #[test]
    fn heartbeats_emit_nothing() {
        let (consumer, mut rx) = consumer(StreamKind::Sampled);
        consumer.consume_line("");
        consumer.consume_line("  ");
        assert!(rx.try_recv().is_err());
    }
}
