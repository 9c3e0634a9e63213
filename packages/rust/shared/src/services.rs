//! Traits for the external collaborators the pipeline calls.
//!
//! Concrete HTTP clients live in `blogsmith-research` and `blogsmith-llm`;
//! tests substitute their own implementations.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::ChatMessage;

/// A chat-completion language model.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Send `messages` in order and return the model's text reply.
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String>;
}

/// An encyclopedia lookup returning a length-capped text summary.
#[async_trait]
pub trait ReferenceLookup: Send + Sync {
    async fn lookup(&self, query: &str) -> Result<String>;
}

/// A general web search returning a text listing of results.
#[async_trait]
pub trait WebSearch: Send + Sync {
    async fn search(&self, query: &str) -> Result<String>;
}
