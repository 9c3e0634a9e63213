//! Core domain types shared across the Blogsmith pipeline.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{BlogsmithError, Result};

// ---------------------------------------------------------------------------
// RunId
// ---------------------------------------------------------------------------

/// A UUID v7 wrapper identifying one pipeline run in logs (time-sortable).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(pub Uuid);

impl RunId {
    /// Generate a new time-sortable run identifier.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// PipelineState
// ---------------------------------------------------------------------------

/// The record threaded through every stage of a run.
///
/// Created with only `topic` set. Each stage fills exactly one further field,
/// in the order `research`, `outline`, `content`, `final_blog`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineState {
    pub topic: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub research: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outline: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_blog: Option<String>,
}

impl PipelineState {
    /// Fresh state for a run on `topic`.
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            ..Self::default()
        }
    }

    /// Merge a stage's output into the matching field, leaving the rest untouched.
    pub fn apply(&mut self, update: StageUpdate) {
        match update {
            StageUpdate::Research(text) => self.research = Some(text),
            StageUpdate::Outline(text) => self.outline = Some(text),
            StageUpdate::Content(text) => self.content = Some(text),
            StageUpdate::FinalBlog(text) => self.final_blog = Some(text),
        }
    }

    /// `research`, or a [`BlogsmithError::MissingField`] blamed on `stage`.
    pub fn require_research(&self, stage: &'static str) -> Result<&str> {
        require(self.research.as_deref(), stage, "research")
    }

    /// `outline`, or a [`BlogsmithError::MissingField`] blamed on `stage`.
    pub fn require_outline(&self, stage: &'static str) -> Result<&str> {
        require(self.outline.as_deref(), stage, "outline")
    }

    /// `content`, or a [`BlogsmithError::MissingField`] blamed on `stage`.
    pub fn require_content(&self, stage: &'static str) -> Result<&str> {
        require(self.content.as_deref(), stage, "content")
    }
}

fn require<'a>(value: Option<&'a str>, stage: &'static str, field: &'static str) -> Result<&'a str> {
    value.ok_or(BlogsmithError::MissingField { stage, field })
}

/// Partial update produced by a single stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageUpdate {
    Research(String),
    Outline(String),
    Content(String),
    FinalBlog(String),
}

// ---------------------------------------------------------------------------
// Chat messages
// ---------------------------------------------------------------------------

/// Role tag of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

/// One role-tagged message sent to the language model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}
