//! Wikipedia lookup via the MediaWiki action API.
//!
//! A lookup searches for the top `top_k_results` titles, fetches each page's
//! plain-text intro, and renders them as `Page: …\nSummary: …` blocks capped
//! at `doc_content_chars_max` characters in total.

use async_trait::async_trait;
use blogsmith_shared::{BlogsmithError, ReferenceLookup, Result, WikipediaConfig};
use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument};

use crate::{build_client, truncate_chars};

/// Service name used in errors and logs.
const SERVICE: &str = "wikipedia";

/// Queries longer than this are cut before searching.
const MAX_QUERY_LENGTH: usize = 300;

/// Returned when no page could be summarized.
pub const NO_RESULT: &str = "No good Wikipedia Search Result was found";

/// Wikipedia-backed [`ReferenceLookup`].
pub struct WikipediaLookup {
    client: Client,
    api_url: String,
    top_k_results: usize,
    doc_content_chars_max: usize,
}

impl WikipediaLookup {
    pub fn new(config: &WikipediaConfig) -> Result<Self> {
        if config.api_url.trim().is_empty() {
            return Err(BlogsmithError::config("wikipedia.api_url must not be empty"));
        }

        Ok(Self {
            client: build_client(config.timeout_secs)?,
            api_url: config.api_url.trim().to_string(),
            top_k_results: config.top_k_results,
            doc_content_chars_max: config.doc_content_chars_max,
        })
    }

    /// Titles of the best matching pages, best first.
    async fn search_titles(&self, query: &str) -> Result<Vec<String>> {
        let limit = self.top_k_results.to_string();
        let response: SearchResponse = self
            .get_json(&[
                ("action", "query"),
                ("list", "search"),
                ("srsearch", query),
                ("srlimit", limit.as_str()),
                ("format", "json"),
                ("formatversion", "2"),
            ])
            .await?;

        if let Some(err) = response.error {
            return Err(BlogsmithError::search(SERVICE, err.info));
        }

        Ok(response
            .query
            .map(|q| q.search.into_iter().map(|hit| hit.title).collect())
            .unwrap_or_default())
    }

    /// Plain-text intro of `title`, or `None` if the page is missing, empty,
    /// or a disambiguation page.
    async fn page_summary(&self, title: &str) -> Result<Option<(String, String)>> {
        let response: ExtractResponse = self
            .get_json(&[
                ("action", "query"),
                ("prop", "extracts|pageprops"),
                ("ppprop", "disambiguation"),
                ("exintro", "1"),
                ("explaintext", "1"),
                ("redirects", "1"),
                ("titles", title),
                ("format", "json"),
                ("formatversion", "2"),
            ])
            .await?;

        if let Some(err) = response.error {
            return Err(BlogsmithError::search(SERVICE, err.info));
        }

        let page = response
            .query
            .and_then(|q| q.pages.into_iter().next())
            .filter(|p| !p.missing && !p.is_disambiguation());

        Ok(page.and_then(|p| match p.extract {
            Some(extract) if !extract.trim().is_empty() => Some((p.title, extract)),
            _ => None,
        }))
    }

    async fn get_json<T: DeserializeOwned>(&self, params: &[(&str, &str)]) -> Result<T> {
        let response = self
            .client
            .get(&self.api_url)
            .query(params)
            .send()
            .await
            .map_err(|e| BlogsmithError::Network(format!("{}: {e}", self.api_url)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(BlogsmithError::search(SERVICE, format!("HTTP {status}")));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| BlogsmithError::search(SERVICE, format!("invalid response body: {e}")))
    }
}

#[async_trait]
impl ReferenceLookup for WikipediaLookup {
    #[instrument(skip_all, fields(service = SERVICE))]
    async fn lookup(&self, query: &str) -> Result<String> {
        let query = truncate_chars(query, MAX_QUERY_LENGTH);
        let titles = self.search_titles(&query).await?;
        debug!(hits = titles.len(), "wikipedia search finished");

        let mut summaries = Vec::new();
        for title in titles.iter().take(self.top_k_results) {
            match self.page_summary(title).await? {
                Some((page_title, extract)) => {
                    summaries.push(format!("Page: {page_title}\nSummary: {extract}"));
                }
                None => debug!(%title, "no extract for page, skipping"),
            }
        }

        if summaries.is_empty() {
            info!("no wikipedia pages found");
            return Ok(NO_RESULT.to_string());
        }

        info!(pages = summaries.len(), "wikipedia lookup complete");
        Ok(truncate_chars(
            &summaries.join("\n\n"),
            self.doc_content_chars_max,
        ))
    }
}

// ---------------------------------------------------------------------------
// MediaWiki response shapes (formatversion=2)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    info: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    query: Option<SearchQuery>,
    #[serde(default)]
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    #[serde(default)]
    search: Vec<SearchEntry>,
}

#[derive(Debug, Deserialize)]
struct SearchEntry {
    title: String,
}

#[derive(Debug, Deserialize)]
struct ExtractResponse {
    #[serde(default)]
    query: Option<ExtractQuery>,
    #[serde(default)]
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ExtractQuery {
    #[serde(default)]
    pages: Vec<ExtractPage>,
}

#[derive(Debug, Deserialize)]
struct ExtractPage {
    title: String,
    #[serde(default)]
    missing: bool,
    #[serde(default)]
    extract: Option<String>,
    #[serde(default)]
    pageprops: Option<PageProps>,
}

impl ExtractPage {
    fn is_disambiguation(&self) -> bool {
        self.pageprops
            .as_ref()
            .is_some_and(|props| props.disambiguation.is_some())
    }
}

#[derive(Debug, Deserialize)]
struct PageProps {
    #[serde(default)]
    disambiguation: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn lookup_for(server: &MockServer, chars_max: usize) -> WikipediaLookup {
        let config = WikipediaConfig {
            api_url: format!("{}/w/api.php", server.uri()),
            top_k_results: 2,
            doc_content_chars_max: chars_max,
            timeout_secs: 5,
        };
        WikipediaLookup::new(&config).unwrap()
    }

    async fn mount_search(server: &MockServer, titles: &[&str]) {
        let hits: Vec<_> = titles
            .iter()
            .map(|t| serde_json::json!({ "ns": 0, "title": t }))
            .collect();
        Mock::given(method("GET"))
            .and(query_param("list", "search"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "query": { "search": hits } })),
            )
            .mount(server)
            .await;
    }

    async fn mount_extract(server: &MockServer, title: &str, page: serde_json::Value) {
        Mock::given(method("GET"))
            .and(query_param("prop", "extracts|pageprops"))
            .and(query_param("titles", title))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "query": { "pages": [page] } })),
            )
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn formats_pages_in_search_order() {
        let server = MockServer::start().await;
        mount_search(&server, &["Solar eclipse", "Eclipse"]).await;
        mount_extract(
            &server,
            "Solar eclipse",
            serde_json::json!({ "title": "Solar eclipse", "extract": "The Moon passes between." }),
        )
        .await;
        mount_extract(
            &server,
            "Eclipse",
            serde_json::json!({ "title": "Eclipse", "extract": "An astronomical event." }),
        )
        .await;

        let text = lookup_for(&server, 2000).lookup("solar eclipses").await.unwrap();
        assert_eq!(
            text,
            "Page: Solar eclipse\nSummary: The Moon passes between.\n\n\
             Page: Eclipse\nSummary: An astronomical event."
        );
    }

    #[tokio::test]
    async fn skips_missing_pages() {
        let server = MockServer::start().await;
        mount_search(&server, &["Gone", "Tide"]).await;
        mount_extract(
            &server,
            "Gone",
            serde_json::json!({ "title": "Gone", "missing": true }),
        )
        .await;
        mount_extract(
            &server,
            "Tide",
            serde_json::json!({ "title": "Tide", "extract": "Rise and fall of sea levels." }),
        )
        .await;

        let text = lookup_for(&server, 2000).lookup("tides").await.unwrap();
        assert_eq!(text, "Page: Tide\nSummary: Rise and fall of sea levels.");
    }

    #[tokio::test]
    async fn skips_disambiguation_pages() {
        let server = MockServer::start().await;
        mount_search(&server, &["Mercury", "Mercury (planet)"]).await;
        mount_extract(
            &server,
            "Mercury",
            serde_json::json!({
                "title": "Mercury",
                "extract": "Mercury may refer to:",
                "pageprops": { "disambiguation": "" }
            }),
        )
        .await;
        mount_extract(
            &server,
            "Mercury (planet)",
            serde_json::json!({
                "title": "Mercury (planet)",
                "extract": "Mercury is the closest planet to the Sun."
            }),
        )
        .await;

        let text = lookup_for(&server, 2000).lookup("mercury").await.unwrap();
        assert_eq!(
            text,
            "Page: Mercury (planet)\nSummary: Mercury is the closest planet to the Sun."
        );
    }

    #[tokio::test]
    async fn truncates_to_char_budget() {
        let server = MockServer::start().await;
        mount_search(&server, &["Long"]).await;
        mount_extract(
            &server,
            "Long",
            serde_json::json!({ "title": "Long", "extract": "x".repeat(500) }),
        )
        .await;

        let text = lookup_for(&server, 40).lookup("long").await.unwrap();
        assert_eq!(text.chars().count(), 40);
        assert!(text.starts_with("Page: Long\nSummary: x"));
    }

    #[tokio::test]
    async fn no_hits_yields_placeholder() {
        let server = MockServer::start().await;
        mount_search(&server, &[]).await;

        let text = lookup_for(&server, 2000).lookup("qwzxv").await.unwrap();
        assert_eq!(text, NO_RESULT);
    }

    #[tokio::test]
    async fn server_error_propagates() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = lookup_for(&server, 2000).lookup("anything").await.unwrap_err();
        assert!(matches!(err, BlogsmithError::Search { service: "wikipedia", .. }));
    }

    #[test]
    fn empty_api_url_is_rejected() {
        let config = WikipediaConfig {
            api_url: "  ".into(),
            ..WikipediaConfig::default()
        };
        assert!(WikipediaLookup::new(&config).is_err());
    }
}
