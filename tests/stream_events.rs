// tests/stream_events.rs
//! Stream consumption end to end: login starts the subscribed
//! consumers, records are reassembled across chunk boundaries, and one
//! event is delivered per consumed record.

mod common;

use common::StubTransport;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;
use tweetbook::{ClientOptions, EventSubscription, StreamEvent, TwitterClient};

#[tokio::test]
async fn filtered_stream_delivers_ordered_events_with_resolved_rules() {
    let transport = StubTransport::new();
    // Rule listing, primed before the stream opens.
    transport.push_response(json!({
        "data": [{"id": "42", "value": "rust lang", "tag": "rust"}],
        "meta": {"sent": "2023-04-01T00:00:00Z"}
    }));
    transport.push_stream(&[
        // One record split mid-token across two chunks.
        br#"{"data":{"id":"1","text":"fir"#,
        br#"st"},"matching_rules":[{"id":"42","tag":"rust"}]}"#,
        b"\n",
        // Keep-alive heartbeat.
        b"\n",
        // Undecodable record: dropped, connection continues.
        b"this is not json\n",
        br#"{"data":{"id":"2","text":"second"},"matching_rules":[{"id":"99"}]}"#,
        b"\n",
    ]);

    let stub = Arc::clone(&transport);
    let mut client = TwitterClient::with_transport(
        stub,
        false,
        ClientOptions {
            events: vec![EventSubscription::FilteredTweets],
            fields: Default::default(),
        },
    );
    let mut events = client.take_events().unwrap();

    client.login().await.unwrap();
    client.join_streams().await;

    assert!(matches!(events.recv().await, Some(StreamEvent::Ready)));

    match events.recv().await.unwrap() {
        StreamEvent::FilteredTweetCreate {
            tweet,
            matching_rules,
        } => {
            assert_eq!(tweet.read().id(), "1");
            assert_eq!(
                tweet.read().field("text"),
                Some(&serde_json::Value::String("first".to_string()))
            );
            // Rule 42 resolves against the primed cache.
            assert_eq!(matching_rules.len(), 1);
            assert_eq!(matching_rules[0].value.as_deref(), Some("rust lang"));
            assert_eq!(matching_rules[0].tag.as_deref(), Some("rust"));
        }
        other => panic!("unexpected event: {:?}", other),
    }

    match events.recv().await.unwrap() {
        StreamEvent::FilteredTweetCreate {
            tweet,
            matching_rules,
        } => {
            assert_eq!(tweet.read().id(), "2");
            // Rule 99 was never listed: the wire reference stands in.
            assert_eq!(matching_rules[0].id, "99");
            assert_eq!(matching_rules[0].value, None);
        }
        other => panic!("unexpected event: {:?}", other),
    }

    // The malformed line and heartbeats produced nothing further; the
    // channel closes once the client (and its sender) is dropped.
    drop(client);
    assert!(events.recv().await.is_none());

    // The rules endpoint was hit before the stream was opened.
    let requests = transport.recorded_requests();
    assert_eq!(requests[0].path, "tweets/search/stream/rules");
    let opens = transport.recorded_stream_opens();
    assert_eq!(opens.len(), 1);
    assert_eq!(opens[0].path, "tweets/search/stream");
}

#[tokio::test]
async fn sampled_stream_emits_bare_tweet_events_and_caches_includes() {
    let transport = StubTransport::new();
    transport.push_stream(&[
        br#"{"data":{"id":"7","text":"hi","author_id":"5"},"includes":{"users":[{"id":"5","username":"sam"}]}}"#,
        b"\n",
    ]);

    let stub = Arc::clone(&transport);
    let mut client = TwitterClient::with_transport(
        stub,
        false,
        ClientOptions {
            events: vec![EventSubscription::SampledTweets],
            fields: Default::default(),
        },
    );
    let mut events = client.take_events().unwrap();
    client.login().await.unwrap();
    client.join_streams().await;

    assert!(matches!(events.recv().await, Some(StreamEvent::Ready)));
    match events.recv().await.unwrap() {
        StreamEvent::SampledTweetCreate { tweet } => {
            assert_eq!(tweet.read().id(), "7");
        }
        other => panic!("unexpected event: {:?}", other),
    }

    // Side-table objects from stream records land in the shared cache.
    let user = client.cached_user("5").unwrap().unwrap();
    assert_eq!(user.username.as_deref(), Some("sam"));

    // No rules call for the sampled stream.
    assert!(transport.recorded_requests().is_empty());
}

#[tokio::test]
async fn final_unterminated_record_is_still_delivered() {
    let transport = StubTransport::new();
    transport.push_stream(&[br#"{"data":{"id":"3"}}"#]);

    let mut client = TwitterClient::with_transport(
        transport,
        false,
        ClientOptions {
            events: vec![EventSubscription::SampledTweets],
            fields: Default::default(),
        },
    );
    let mut events = client.take_events().unwrap();
    client.login().await.unwrap();
    client.join_streams().await;

    assert!(matches!(events.recv().await, Some(StreamEvent::Ready)));
    assert!(matches!(
        events.recv().await,
        Some(StreamEvent::SampledTweetCreate { .. })
    ));
}
