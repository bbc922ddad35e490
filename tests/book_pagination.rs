// tests/book_pagination.rs
//! End-to-end pagination behavior of books against a scripted transport.

mod common;

use common::StubTransport;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;
use tweetbook::{
    AppError, BookKind, BookOptions, ClientOptions, CursorState, FieldSelection, TwitterClient,
};

fn client(transport: Arc<StubTransport>) -> TwitterClient {
    TwitterClient::with_transport(transport, false, ClientOptions::default())
}

fn param<'a>(query: &'a [(String, String)], key: &str) -> Option<&'a str> {
    query
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

#[tokio::test]
async fn search_book_returns_an_ordered_cached_page() {
    let transport = StubTransport::new();
    transport.push_response(json!({
        "data": [
            {"id": "3", "text": "third", "author_id": "77"},
            {"id": "1", "text": "first"},
            {"id": "2", "text": "second"}
        ],
        "includes": {"users": [{"id": "77", "username": "ferris"}]},
        "meta": {"result_count": 3, "next_token": "t1"}
    }));

    let client = client(Arc::clone(&transport));
    let mut book = client
        .create_book_by_name(
            "SearchTweetsBook",
            BookOptions::search("rust").max_results_per_page(10),
        )
        .unwrap();

    let page = book.fetch_next_page().await.unwrap();
    assert_eq!(page.len(), 3);
    // Insertion order equals response order, not identifier order.
    let ids: Vec<_> = page.keys().cloned().collect();
    assert_eq!(ids, vec!["3", "1", "2"]);
    assert!(book.has_more());

    // The includes-only user is cached and addressable.
    let user = client.cached_user("77").unwrap().unwrap();
    assert_eq!(user.username.as_deref(), Some("ferris"));

    let requests = transport.recorded_requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].path, "tweets/search/recent");
    assert_eq!(param(&requests[0].query, "query"), Some("rust"));
    assert_eq!(param(&requests[0].query, "max_results"), Some("10"));
    assert_eq!(param(&requests[0].query, "next_token"), None);
}

#[tokio::test]
async fn token_chain_walks_to_exhaustion_and_stays_there() {
    let transport = StubTransport::new();
    transport.push_response(json!({
        "data": [{"id": "1"}],
        "meta": {"result_count": 1, "next_token": "t1"}
    }));
    transport.push_response(json!({
        "data": [{"id": "2"}],
        "meta": {"result_count": 1}
    }));

    let client = client(Arc::clone(&transport));
    let mut book = client
        .create_book(BookKind::SearchTweets, BookOptions::search("rust"))
        .unwrap();

    book.fetch_next_page().await.unwrap();
    assert!(book.has_more());

    book.fetch_next_page().await.unwrap();
    assert_eq!(book.cursor_state(), CursorState::Exhausted);

    // The second request resumed from the stored token.
    let requests = transport.recorded_requests();
    assert_eq!(param(&requests[1].query, "next_token"), Some("t1"));

    // Every further call reports exhaustion; no transport call is made.
    for _ in 0..2 {
        assert!(matches!(
            book.fetch_next_page().await,
            Err(AppError::PaginationExhausted)
        ));
    }
    assert_eq!(transport.recorded_requests().len(), 2);
}

#[tokio::test]
async fn zero_result_page_is_empty_and_exhausts_in_the_same_call() {
    let transport = StubTransport::new();
    transport.push_response(json!({"meta": {"result_count": 0}}));

    let client = client(transport);
    let mut book = client
        .create_book(BookKind::SearchTweets, BookOptions::search("nothing"))
        .unwrap();

    let page = book.fetch_next_page().await.unwrap();
    assert!(page.is_empty());
    assert_eq!(book.cursor_state(), CursorState::Exhausted);
}

#[tokio::test]
async fn range_bounds_ride_along_on_every_page_unchanged() {
    let transport = StubTransport::new();
    transport.push_response(json!({
        "data": [{"id": "150"}],
        "meta": {"result_count": 1, "next_token": "t1"}
    }));
    transport.push_response(json!({
        "data": [{"id": "180"}],
        "meta": {"result_count": 1}
    }));

    let client = client(Arc::clone(&transport));
    let mut book = client
        .create_book(
            BookKind::SearchTweets,
            BookOptions::search("rust").id_range("100", "200"),
        )
        .unwrap();
    book.fetch_next_page().await.unwrap();
    book.fetch_next_page().await.unwrap();

    for request in transport.recorded_requests() {
        assert_eq!(param(&request.query, "since_id"), Some("100"));
        assert_eq!(param(&request.query, "until_id"), Some("200"));
    }
}

#[tokio::test]
async fn failed_fetch_leaves_the_cursor_unchanged() {
    let transport = StubTransport::new();
    // First response is malformed: no data, no zero-result meta.
    transport.push_response(json!({"meta": {"result_count": 2}}));

    let client = client(Arc::clone(&transport));
    let mut book = client
        .create_book(BookKind::SearchTweets, BookOptions::search("rust"))
        .unwrap();

    assert!(matches!(
        book.fetch_next_page().await,
        Err(AppError::MalformedResponse(_))
    ));
    assert_eq!(book.cursor_state(), CursorState::NotStarted);

    // Transport failure (empty queue) also leaves the cursor alone.
    assert!(matches!(
        book.fetch_next_page().await,
        Err(AppError::ApiService { .. })
    ));
    assert_eq!(book.cursor_state(), CursorState::NotStarted);

    // A later good page proceeds from the untouched state.
    transport.push_response(json!({
        "data": [{"id": "1"}],
        "meta": {"result_count": 1}
    }));
    let page = book.fetch_next_page().await.unwrap();
    assert_eq!(page.len(), 1);
}

#[tokio::test]
async fn duplicate_identifiers_across_pages_share_one_entity() {
    let transport = StubTransport::new();
    transport.push_response(json!({
        "data": [{"id": "9", "text": "early", "lang": "en"}],
        "meta": {"result_count": 1, "next_token": "t1"}
    }));
    transport.push_response(json!({
        "data": [{"id": "9", "text": "edited"}],
        "meta": {"result_count": 1}
    }));

    let client = client(transport);
    let mut book = client
        .create_book(BookKind::SearchTweets, BookOptions::search("rust"))
        .unwrap();

    let first = book.fetch_next_page().await.unwrap();
    let held = first.get("9").unwrap().clone();
    let second = book.fetch_next_page().await.unwrap();

    assert!(Arc::ptr_eq(&held, second.get("9").unwrap()));
    // The held reference observed the later page's merge.
    assert_eq!(
        held.read().field("text"),
        Some(&serde_json::Value::String("edited".to_string()))
    );
    assert_eq!(
        held.read().field("lang"),
        Some(&serde_json::Value::String("en".to_string()))
    );
}

#[tokio::test]
async fn field_selection_is_threaded_into_every_request() {
    let transport = StubTransport::new();
    transport.push_response(json!({"meta": {"result_count": 0}}));

    let options = ClientOptions {
        events: Vec::new(),
        fields: FieldSelection {
            tweet_fields: vec!["created_at".into(), "lang".into()],
            tweet_expansions: vec!["author_id".into()],
            ..FieldSelection::default()
        },
    };
    let stub = Arc::clone(&transport);
    let client = TwitterClient::with_transport(stub, false, options);
    let mut book = client
        .create_book(BookKind::SearchTweets, BookOptions::search("rust"))
        .unwrap();
    book.fetch_next_page().await.unwrap();

    let requests = transport.recorded_requests();
    assert_eq!(param(&requests[0].query, "tweet.fields"), Some("created_at,lang"));
    assert_eq!(param(&requests[0].query, "expansions"), Some("author_id"));
}
