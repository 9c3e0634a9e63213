//! Core pipeline orchestration for Blogsmith.
//!
//! This crate ties the research clients and the language model together into
//! the fixed research → outline → content → finalize run (see [`pipeline`]).

pub mod pipeline;
pub mod prompts;
pub mod stages;

pub use pipeline::{BlogPipeline, ProgressReporter, SilentProgress};
pub use stages::Stage;
