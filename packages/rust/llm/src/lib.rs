//! Language-model client for OpenAI-compatible chat-completions APIs.
//!
//! Defaults target Groq (`https://api.groq.com/openai/v1`), but any endpoint
//! speaking the same `/chat/completions` protocol works. Every call uses the
//! model and temperature from [`LlmConfig`]; there is no per-call tuning and no
//! retry.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use blogsmith_shared::{BlogsmithError, ChatMessage, LanguageModel, LlmConfig, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

/// User-Agent string for model requests.
const USER_AGENT: &str = concat!("Blogsmith/", env!("CARGO_PKG_VERSION"));

/// [`LanguageModel`] backed by a `/chat/completions` endpoint.
pub struct ChatCompletionModel {
    client: Client,
    url: String,
    api_key: Option<String>,
    model: String,
    temperature: f32,
}

impl ChatCompletionModel {
    /// Build a client from config. An absent `api_key` is allowed; the
    /// service will answer 401 and the call fails with [`BlogsmithError::Llm`].
    pub fn new(config: &LlmConfig, api_key: Option<String>) -> Result<Self> {
        let base_url = config.base_url.trim();
        if base_url.is_empty() {
            return Err(BlogsmithError::config("llm.base_url must not be empty"));
        }
        if config.model.trim().is_empty() {
            return Err(BlogsmithError::config("llm.model must not be empty"));
        }

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()
            .map_err(|e| BlogsmithError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            url: format!("{}/chat/completions", base_url.trim_end_matches('/')),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            model: config.model.clone(),
            temperature: config.temperature,
        })
    }

    /// Model identifier sent with every request.
    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl LanguageModel for ChatCompletionModel {
    #[instrument(skip_all, fields(model = %self.model, messages = messages.len()))]
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        let start = Instant::now();
        let body = ChatCompletionRequest {
            model: &self.model,
            messages,
            temperature: self.temperature,
        };

        let mut request = self.client.post(&self.url).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| BlogsmithError::Network(format!("{}: {e}", self.url)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BlogsmithError::Llm {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatCompletionResponse =
            response.json().await.map_err(|e| BlogsmithError::Llm {
                status: status.as_u16(),
                body: format!("invalid response body: {e}"),
            })?;

        if let Some(usage) = &parsed.usage {
            debug!(
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "token usage"
            );
        }

        let text = first_content(parsed).ok_or(BlogsmithError::EmptyResponse)?;
        info!(
            chars = text.len(),
            latency_ms = start.elapsed().as_millis() as u64,
            "completion received"
        );
        Ok(text)
    }
}

/// Content of the first choice, unmodified. Blank text is still a reply.
fn first_content(response: ChatCompletionResponse) -> Option<String> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message)
        .and_then(|m| m.content)
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    #[serde(default)]
    message: Option<ResponseMessage>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    #[serde(default)]
    prompt_tokens: u64,
    #[serde(default)]
    completion_tokens: u64,
}
