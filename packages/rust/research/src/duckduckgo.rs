//! DuckDuckGo web search over the no-JavaScript HTML endpoint.

use std::sync::LazyLock;

use async_trait::async_trait;
use blogsmith_shared::{BlogsmithError, Result, WebSearch, WebSearchConfig};
use regex::Regex;
use reqwest::{Client, StatusCode};
use scraper::{ElementRef, Html, Selector};
use tracing::{info, instrument};
use url::Url;

use crate::build_client;

/// Service name used in errors and logs.
const SERVICE: &str = "duckduckgo";

/// Returned when the page lists no organic results.
pub const NO_RESULT: &str = "No good DuckDuckGo Search Result was found";

static RESULT_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.result").expect("valid selector"));
static TITLE_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a.result__a").expect("valid selector"));
static SNIPPET_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".result__snippet").expect("valid selector"));
/// Bot-challenge markup served instead of results when rate limited.
static ANOMALY_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("[class*='anomaly-modal']").expect("valid selector"));

/// One organic search result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub title: String,
    pub snippet: String,
    pub link: String,
}

impl std::fmt::Display for SearchHit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "snippet: {}, title: {}, link: {}",
            self.snippet, self.title, self.link
        )
    }
}

/// DuckDuckGo-backed [`WebSearch`].
pub struct DuckDuckGoSearch {
    client: Client,
    search_url: String,
    max_results: usize,
}

impl DuckDuckGoSearch {
    pub fn new(config: &WebSearchConfig) -> Result<Self> {
        if config.search_url.trim().is_empty() {
            return Err(BlogsmithError::config("web_search.search_url must not be empty"));
        }

        Ok(Self {
            client: build_client(config.timeout_secs)?,
            search_url: config.search_url.trim().to_string(),
            max_results: config.max_results,
        })
    }

    /// Fetch the result page for `query` and parse out up to `max_results` hits.
    pub async fn hits(&self, query: &str) -> Result<Vec<SearchHit>> {
        let response = self
            .client
            .get(&self.search_url)
            .query(&[("q", query)])
            .send()
            .await
            .map_err(|e| BlogsmithError::Network(format!("{}: {e}", self.search_url)))?;

        // DuckDuckGo answers 202 with a challenge page when rate limiting.
        let status = response.status();
        if status != StatusCode::OK {
            return Err(BlogsmithError::search(SERVICE, format!("HTTP {status}")));
        }

        let body = response
            .text()
            .await
            .map_err(|e| BlogsmithError::search(SERVICE, format!("failed to read body: {e}")))?;

        parse_results(&body, self.max_results)
    }
}

#[async_trait]
impl WebSearch for DuckDuckGoSearch {
    #[instrument(skip_all, fields(service = SERVICE))]
    async fn search(&self, query: &str) -> Result<String> {
        let hits = self.hits(query).await?;
        info!(hits = hits.len(), "web search complete");

        if hits.is_empty() {
            return Ok(NO_RESULT.to_string());
        }

        Ok(hits
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", "))
    }
}

/// Extract organic results from a DuckDuckGo HTML page. Ads are skipped.
///
/// A bot-challenge page is an error, never an empty result list.
fn parse_results(html: &str, max_results: usize) -> Result<Vec<SearchHit>> {
    let doc = Html::parse_document(html);

    if doc.select(&ANOMALY_SEL).next().is_some() {
        return Err(BlogsmithError::search(
            SERVICE,
            "rate limited: bot challenge page returned",
        ));
    }

    let hits: Vec<SearchHit> = doc
        .select(&RESULT_SEL)
        .filter(|el| !has_class(el, "result--ad"))
        .filter_map(|el| {
            let anchor = el.select(&TITLE_SEL).next()?;
            let title = element_text(&anchor);
            let href = anchor.value().attr("href")?;
            let snippet = el
                .select(&SNIPPET_SEL)
                .next()
                .map(|s| element_text(&s))
                .unwrap_or_default();

            Some(SearchHit {
                title,
                snippet,
                link: resolve_link(href),
            })
        })
        .take(max_results)
        .collect();

    Ok(hits)
}

fn has_class(el: &ElementRef<'_>, class: &str) -> bool {
    el.value().classes().any(|c| c == class)
}

fn element_text(el: &ElementRef<'_>) -> String {
    collapse_whitespace(&el.text().collect::<String>())
}

fn collapse_whitespace(text: &str) -> String {
    static WS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));
    WS_RE.replace_all(text.trim(), " ").into_owned()
}

/// Unwrap DuckDuckGo's `/l/?uddg=<target>` redirect links to the real target.
fn resolve_link(href: &str) -> String {
    let absolute = if href.starts_with("//") {
        format!("https:{href}")
    } else {
        href.to_string()
    };

    let Ok(parsed) = Url::parse(&absolute) else {
        return href.to_string();
    };

    if parsed.path() == "/l/" {
        if let Some((_, target)) = parsed.query_pairs().find(|(k, _)| k == "uddg") {
            return target.into_owned();
        }
    }

    absolute
}
