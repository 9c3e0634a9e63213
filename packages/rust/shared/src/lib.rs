//! Shared types, error model, and configuration for Blogsmith.
//!
//! This crate is the foundation depended on by all other Blogsmith crates.
//! It provides:
//! - [`BlogsmithError`] — the unified error type
//! - Domain types ([`PipelineState`], [`StageUpdate`], [`ChatMessage`], [`RunId`])
//! - Collaborator traits ([`LanguageModel`], [`ReferenceLookup`], [`WebSearch`])
//! - Configuration ([`AppConfig`], config loading)

pub mod config;
pub mod error;
pub mod services;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, LlmConfig, WebSearchConfig, WikipediaConfig, config_dir, config_file_path,
    init_config, load_config, load_config_from, read_api_key,
};
pub use error::{BlogsmithError, Result};
pub use services::{LanguageModel, ReferenceLookup, WebSearch};
pub use types::{ChatMessage, PipelineState, Role, RunId, StageUpdate};
