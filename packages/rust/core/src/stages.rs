//! The four pipeline stages.
//!
//! Each stage reads what earlier stages produced and returns a single
//! [`StageUpdate`]. A stage never mutates the state itself; the orchestrator
//! merges the update. Reading a field that is not there yet fails with
//! [`BlogsmithError::MissingField`](blogsmith_shared::BlogsmithError::MissingField)
//! before any external call is made.

use blogsmith_shared::{
    LanguageModel, PipelineState, ReferenceLookup, Result, StageUpdate, WebSearch,
};
use tracing::{debug, instrument};

use crate::prompts;

/// A step of the pipeline, in the only order they ever run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Research,
    Outline,
    Content,
    Finalize,
}

impl Stage {
    /// Fixed execution order. There is no branching between stages.
    pub const ORDER: [Stage; 4] = [
        Stage::Research,
        Stage::Outline,
        Stage::Content,
        Stage::Finalize,
    ];

    /// Short name used in logs and errors.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Research => "research",
            Self::Outline => "outline",
            Self::Content => "content",
            Self::Finalize => "finalize",
        }
    }

    /// Human-facing progress line announced when the stage starts.
    pub fn progress_message(&self, state: &PipelineState) -> String {
        match self {
            Self::Research => format!("Researching topic: {}", state.topic),
            Self::Outline => "Generating outline...".to_string(),
            Self::Content => "Writing blog content...".to_string(),
            Self::Finalize => "Finalizing blog...".to_string(),
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Look the topic up in the encyclopedia, then on the web, and label both.
///
/// The two calls are made one after the other. Either failing aborts the stage.
#[instrument(skip_all, fields(topic = %state.topic))]
pub async fn research(
    state: &PipelineState,
    lookup: &dyn ReferenceLookup,
    search: &dyn WebSearch,
) -> Result<StageUpdate> {
    let reference = lookup.lookup(&state.topic).await?;
    let web = search.search(&state.topic).await?;
    debug!(
        reference_chars = reference.len(),
        web_chars = web.len(),
        "research gathered"
    );
    Ok(StageUpdate::Research(prompts::research_text(&reference, &web)))
}

/// Ask the model for an outline based on the research.
#[instrument(skip_all, fields(topic = %state.topic))]
pub async fn outline(state: &PipelineState, model: &dyn LanguageModel) -> Result<StageUpdate> {
    let research = state.require_research(Stage::Outline.name())?;
    let messages = prompts::outline_prompt(&state.topic, research);
    let text = model.complete(&messages).await?;
    Ok(StageUpdate::Outline(text))
}

/// Ask the model to write the post following the outline.
#[instrument(skip_all, fields(topic = %state.topic))]
pub async fn content(state: &PipelineState, model: &dyn LanguageModel) -> Result<StageUpdate> {
    let outline = state.require_outline(Stage::Content.name())?;
    let messages = prompts::content_prompt(&state.topic, outline);
    let text = model.complete(&messages).await?;
    Ok(StageUpdate::Content(text))
}

/// Publish the drafted content as-is.
pub fn finalize(state: &PipelineState) -> Result<StageUpdate> {
    let content = state.require_content(Stage::Finalize.name())?;
    Ok(StageUpdate::FinalBlog(content.to_string()))
}
