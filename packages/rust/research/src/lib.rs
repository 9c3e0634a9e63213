//! Research collaborators: Wikipedia lookup and DuckDuckGo web search.
//!
//! Both clients return plain text ready to be pasted into a prompt. They do
//! no ranking or deduplication beyond what the upstream service does.

mod duckduckgo;
mod wikipedia;

use std::time::Duration;

use blogsmith_shared::{BlogsmithError, Result};
use reqwest::Client;

pub use duckduckgo::{DuckDuckGoSearch, SearchHit};
pub use wikipedia::WikipediaLookup;

/// User-Agent string for research requests.
const USER_AGENT: &str = concat!("Blogsmith/", env!("CARGO_PKG_VERSION"));

/// Build a reqwest client with the shared research settings.
fn build_client(timeout_secs: u64) -> Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(timeout_secs.max(1)))
        .build()
        .map_err(|e| BlogsmithError::Network(format!("failed to build HTTP client: {e}")))
}

/// Keep at most `max` characters of `text` (char boundaries, not bytes).
fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}
