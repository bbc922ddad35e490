// src/constants.rs
//! Domain constants that define the operational boundaries of the system.
//!
//! Each constant is named for the domain concept it constrains, not its
//! technical role. Reading these constants should tell you the story
//! of how the client operates: how large a page can be, where the API
//! lives, which streams it can hold open.

// ---------------------------------------------------------------------------
// Twitter API v2 boundaries
// ---------------------------------------------------------------------------

/// Base URL for every Twitter API v2 call, paginated or streaming.
pub const TWITTER_API_BASE_URL: &str = "https://api.twitter.com/2";

/// Largest `max_results` value the v2 endpoints accept per page.
///
/// Timeline and search endpoints cap at 100 results per page. Follower
/// endpoints accept up to 1000, but 100 is the portable ceiling we
/// validate against for every book.
pub const MAX_RESULTS_PER_PAGE: u32 = 100;

/// Path of the filtered (rule-matched) tweet stream.
pub const FILTERED_STREAM_PATH: &str = "tweets/search/stream";

/// Path for reading the filtered stream's active rule set.
pub const FILTERED_STREAM_RULES_PATH: &str = "tweets/search/stream/rules";

/// Path of the ~1% sampled tweet stream.
pub const SAMPLED_STREAM_PATH: &str = "tweets/sample/stream";

// ---------------------------------------------------------------------------
// Stream decoding boundaries
// ---------------------------------------------------------------------------

/// Capacity hint for the per-connection line reassembly buffer.
///
/// This is a performance hint, not a constraint. A tweet envelope with
/// full expansions is typically a few kilobytes; over-estimating wastes
/// a little memory, under-estimating causes reallocation.
pub const STREAM_LINE_BUFFER_CAPACITY: usize = 8 * 1024;
