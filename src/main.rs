// src/main.rs

// Specific imports
use tweetbook::{
    AppError, BookKind, BookOptions, CommandLineInput, RunConfig, RunMode, StreamEvent, Tweet,
    TwitterClient,
};
use clap::Parser;
use log::LevelFilter;
use log4rs::{
    append::console::ConsoleAppender,
    append::file::FileAppender,
    config::{Appender, Root},
    encode::pattern::PatternEncoder,
    filter::threshold::ThresholdFilter,
    Config,
};
use std::fs;

/// Sets up logging configuration.
fn setup_logging(verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let log_level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };

    let log_file_path = std::env::temp_dir().join("tweetbook.log");
    if let Some(parent) = log_file_path.parent() {
        fs::create_dir_all(parent)?;
    }

    let pattern = if verbose {
        "{d(%Y-%m-%d %H:%M:%S)} [{l}] - {m}{n}"
    } else {
        "{m}{n}"
    };

    let stdout_appender = ConsoleAppender::builder()
        .encoder(Box::new(PatternEncoder::new(pattern)))
        .build();

    let file_appender = FileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(
            "{d(%Y-%m-%d %H:%M:%S)} [{l}] - {m}{n}",
        )))
        .build(&log_file_path)?;

    let config = Config::builder()
        .appender(Appender::builder().build("stdout", Box::new(stdout_appender)))
        .appender(
            Appender::builder()
                .filter(Box::new(ThresholdFilter::new(LevelFilter::Debug)))
                .build("file", Box::new(file_appender)),
        )
        .build(
            Root::builder()
                .appender("stdout")
                .appender("file")
                .build(log_level),
        )?;

    log4rs::init_config(config)?;
    log::info!("Logging initialized. Log file: {}", log_file_path.display());
    Ok(())
}

/// Drains the recent-search book for the configured query and prints
/// each cached tweet.
async fn run_search(config: &RunConfig, query: String) -> Result<(), AppError> {
    let client = TwitterClient::new(config.credentials.clone(), config.client_options.clone())?;

    let options = BookOptions {
        query: Some(query),
        max_results_per_page: Some(config.page_size),
        since_id: config.since_id.clone(),
        until_id: config.until_id.clone(),
        start_time: config.start_time,
        end_time: config.end_time,
        ..BookOptions::default()
    };
    let page = client
        .fetch_book(BookKind::SearchTweets, options, config.max_pages)
        .await?;

    for (id, entity) in &page {
        let tweet: Tweet = entity.read().decode()?;
        let author = tweet
            .author_id
            .as_deref()
            .and_then(|author_id| client.cached_user(author_id))
            .and_then(Result::ok)
            .and_then(|user| user.username)
            .unwrap_or_else(|| "?".to_string());
        println!("{} @{}: {}", id, author, tweet.text.unwrap_or_default());
    }
    log::info!("fetched {} tweets", page.len());
    Ok(())
}

/// Holds one stream connection open and prints its events until the
/// connection ends.
async fn run_watch(config: &RunConfig) -> Result<(), AppError> {
    let mut client =
        TwitterClient::new(config.credentials.clone(), config.client_options.clone())?;
    let mut events = client
        .take_events()
        .ok_or_else(|| AppError::InternalError {
            message: "event channel already taken".to_string(),
            source: None,
        })?;
    client.login().await?;

    let printer = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            match event {
                StreamEvent::Ready => log::info!("stream ready"),
                StreamEvent::FilteredTweetCreate {
                    tweet,
                    matching_rules,
                } => {
                    let tags: Vec<_> = matching_rules
                        .iter()
                        .map(|rule| rule.tag.clone().unwrap_or_else(|| rule.id.clone()))
                        .collect();
                    let tweet = tweet.read();
                    println!(
                        "[{}] {}: {}",
                        tags.join(","),
                        tweet.id(),
                        tweet.field("text").and_then(|v| v.as_str()).unwrap_or("")
                    );
                }
                StreamEvent::SampledTweetCreate { tweet } => {
                    let tweet = tweet.read();
                    println!(
                        "{}: {}",
                        tweet.id(),
                        tweet.field("text").and_then(|v| v.as_str()).unwrap_or("")
                    );
                }
            }
        }
    });

    client.join_streams().await;
    drop(client);
    let _ = printer.await;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let input = CommandLineInput::parse();
    if let Err(e) = setup_logging(input.verbose) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    let config = input.into_config()?;
    match config.mode.clone() {
        RunMode::Search { query } => run_search(&config, query).await?,
        RunMode::Watch(_) => run_watch(&config).await?,
    }
    Ok(())
}
