//! End-to-end blog pipeline: topic → research → outline → content → final blog.

use std::sync::Arc;
use std::time::Instant;

use tracing::{info, instrument};

use blogsmith_llm::ChatCompletionModel;
use blogsmith_research::{DuckDuckGoSearch, WikipediaLookup};
use blogsmith_shared::{
    AppConfig, BlogsmithError, LanguageModel, PipelineState, ReferenceLookup, Result, RunId,
    StageUpdate, WebSearch,
};

use crate::stages::{self, Stage};

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when a stage is about to run.
    fn stage_started(&self, stage: Stage, state: &PipelineState);
    /// Called once the terminal state is reached.
    fn done(&self, state: &PipelineState);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn stage_started(&self, _stage: Stage, _state: &PipelineState) {}
    fn done(&self, _state: &PipelineState) {}
}

/// The blog pipeline with its three external collaborators injected.
///
/// Holds no per-run data: every call to [`BlogPipeline::run`] builds its own
/// [`PipelineState`], so one pipeline can serve independent runs.
#[derive(Clone)]
pub struct BlogPipeline {
    model: Arc<dyn LanguageModel>,
    lookup: Arc<dyn ReferenceLookup>,
    search: Arc<dyn WebSearch>,
}

impl BlogPipeline {
    pub fn new(
        model: Arc<dyn LanguageModel>,
        lookup: Arc<dyn ReferenceLookup>,
        search: Arc<dyn WebSearch>,
    ) -> Self {
        Self {
            model,
            lookup,
            search,
        }
    }

    /// Wire up the HTTP-backed collaborators described by `config`.
    pub fn from_config(config: &AppConfig, api_key: Option<String>) -> Result<Self> {
        let model = ChatCompletionModel::new(&config.llm, api_key)?;
        let lookup = WikipediaLookup::new(&config.wikipedia)?;
        let search = DuckDuckGoSearch::new(&config.web_search)?;
        Ok(Self::new(Arc::new(model), Arc::new(lookup), Arc::new(search)))
    }

    /// Run every stage in order and return the terminal state.
    ///
    /// The first failing stage aborts the run; its error is returned as-is and
    /// no partial state escapes.
    #[instrument(skip_all, fields(run_id = %RunId::new(), topic = %topic))]
    pub async fn run(&self, topic: &str, progress: &dyn ProgressReporter) -> Result<PipelineState> {
        let start = Instant::now();
        let mut state = PipelineState::new(topic);

        for stage in Stage::ORDER {
            progress.stage_started(stage, &state);
            info!(stage = %stage, "{}", stage.progress_message(&state));

            let update = self.run_stage(stage, &state).await?;
            state.apply(update);
        }

        progress.done(&state);
        info!(
            elapsed_ms = start.elapsed().as_millis() as u64,
            "blog pipeline complete"
        );

        Ok(state)
    }

    /// Run the pipeline and return only the finished post.
    pub async fn generate_blog(
        &self,
        topic: &str,
        progress: &dyn ProgressReporter,
    ) -> Result<String> {
        let state = self.run(topic, progress).await?;
        state.final_blog.ok_or(BlogsmithError::MissingField {
            stage: "terminal",
            field: "final_blog",
        })
    }

    async fn run_stage(&self, stage: Stage, state: &PipelineState) -> Result<StageUpdate> {
        match stage {
            Stage::Research => {
                stages::research(state, self.lookup.as_ref(), self.search.as_ref()).await
            }
            Stage::Outline => stages::outline(state, self.model.as_ref()).await,
            Stage::Content => stages::content(state, self.model.as_ref()).await,
            Stage::Finalize => stages::finalize(state),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use blogsmith_shared::ChatMessage;

    struct StubLookup(&'static str);

    #[async_trait]
    impl ReferenceLookup for StubLookup {
        async fn lookup(&self, _query: &str) -> Result<String> {
            Ok(self.0.to_string())
        }
    }

    struct StubSearch(&'static str);

    #[async_trait]
    impl WebSearch for StubSearch {
        async fn search(&self, _query: &str) -> Result<String> {
            Ok(self.0.to_string())
        }
    }

    struct FailingSearch;

    #[async_trait]
    impl WebSearch for FailingSearch {
        async fn search(&self, _query: &str) -> Result<String> {
            Err(BlogsmithError::search("duckduckgo", "HTTP 429"))
        }
    }

    /// Replies with a fixed text and records every prompt it receives.
    struct RecordingModel {
        reply: &'static str,
        prompts: Mutex<Vec<Vec<ChatMessage>>>,
    }

    impl RecordingModel {
        fn new(reply: &'static str) -> Self {
            Self {
                reply,
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl LanguageModel for RecordingModel {
        async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
            self.prompts.lock().unwrap().push(messages.to_vec());
            Ok(self.reply.to_string())
        }
    }

    /// Fails every call, counting how often it was reached.
    struct FailingModel {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl LanguageModel for FailingModel {
        async fn complete(&self, _messages: &[ChatMessage]) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(BlogsmithError::Llm {
                status: 500,
                body: "boom".into(),
            })
        }
    }

    /// Errors unless the prompt carries labeled research text.
    struct ResearchCheckingModel;

    #[async_trait]
    impl LanguageModel for ResearchCheckingModel {
        async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
            let user = &messages[1].content;
            if user.starts_with("Based on the following research")
                && !user.contains("Wikipedia info:\n")
            {
                return Err(BlogsmithError::validation("outline prompt without research"));
            }
            Ok("ok".into())
        }
    }

    #[derive(Default)]
    struct RecordingProgress {
        stages: Mutex<Vec<Stage>>,
        finished: AtomicUsize,
    }

    impl ProgressReporter for RecordingProgress {
        fn stage_started(&self, stage: Stage, _state: &PipelineState) {
            self.stages.lock().unwrap().push(stage);
        }

        fn done(&self, _state: &PipelineState) {
            self.finished.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn eclipse_pipeline(model: Arc<dyn LanguageModel>) -> BlogPipeline {
        BlogPipeline::new(
            model,
            Arc::new(StubLookup("Solar eclipses occur when...")),
            Arc::new(StubSearch("[Result] NASA eclipse page")),
        )
    }

    #[tokio::test]
    async fn research_concatenates_labeled_results() {
        let pipeline = BlogPipeline::new(
            Arc::new(RecordingModel::new("x")),
            Arc::new(StubLookup("R1")),
            Arc::new(StubSearch("R2")),
        );

        let state = pipeline.run("anything", &SilentProgress).await.unwrap();
        assert_eq!(
            state.research.as_deref(),
            Some("Wikipedia info:\nR1\n\nDuckDuckGo info:\nR2")
        );
    }

    #[tokio::test]
    async fn end_to_end_with_echo_model() {
        let model = Arc::new(RecordingModel::new("<ECHO>"));
        let pipeline = eclipse_pipeline(model.clone());

        let state = pipeline.run("solar eclipses", &SilentProgress).await.unwrap();

        let research = state.research.as_deref().unwrap();
        assert!(research.contains("Wikipedia info:\nSolar eclipses occur when..."));
        assert!(research.contains("DuckDuckGo info:\n[Result] NASA eclipse page"));
        assert_eq!(state.topic, "solar eclipses");
        assert_eq!(state.outline.as_deref(), Some("<ECHO>"));
        assert_eq!(state.content.as_deref(), Some("<ECHO>"));
        assert_eq!(state.final_blog.as_deref(), Some("<ECHO>"));

        let prompts = model.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 2);
        assert!(prompts[0][1].content.contains(research));
        assert!(prompts[1][1].content.contains("following this outline:\n<ECHO>\n"));
    }

    #[tokio::test]
    async fn outline_sees_research_in_prompt() {
        let pipeline = eclipse_pipeline(Arc::new(ResearchCheckingModel));
        let blog = pipeline
            .generate_blog("solar eclipses", &SilentProgress)
            .await
            .unwrap();
        assert_eq!(blog, "ok");
    }

    #[tokio::test]
    async fn model_failure_at_outline_aborts_run() {
        let model = Arc::new(FailingModel {
            calls: AtomicUsize::new(0),
        });
        let pipeline = eclipse_pipeline(model.clone());
        let progress = RecordingProgress::default();

        let result = pipeline.run("solar eclipses", &progress).await;

        assert!(matches!(result, Err(BlogsmithError::Llm { status: 500, .. })));
        assert_eq!(model.calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            *progress.stages.lock().unwrap(),
            vec![Stage::Research, Stage::Outline]
        );
        assert_eq!(progress.finished.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn search_failure_aborts_before_any_model_call() {
        let model = Arc::new(RecordingModel::new("<ECHO>"));
        let pipeline = BlogPipeline::new(
            model.clone(),
            Arc::new(StubLookup("R1")),
            Arc::new(FailingSearch),
        );

        let err = pipeline
            .generate_blog("solar eclipses", &SilentProgress)
            .await
            .unwrap_err();
        assert!(matches!(err, BlogsmithError::Search { .. }));
        assert!(model.prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn reports_stages_in_order() {
        let pipeline = eclipse_pipeline(Arc::new(RecordingModel::new("<ECHO>")));
        let progress = RecordingProgress::default();

        pipeline.run("solar eclipses", &progress).await.unwrap();

        assert_eq!(*progress.stages.lock().unwrap(), Stage::ORDER.to_vec());
        assert_eq!(progress.finished.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn repeated_runs_are_byte_identical() {
        let pipeline = eclipse_pipeline(Arc::new(RecordingModel::new("# Eclipses\n\nBody.")));

        let first = pipeline.generate_blog("solar eclipses", &SilentProgress).await.unwrap();
        let second = pipeline.generate_blog("solar eclipses", &SilentProgress).await.unwrap();
        assert_eq!(first.as_bytes(), second.as_bytes());
    }

    #[test]
    fn from_config_builds_http_collaborators() {
        let pipeline = BlogPipeline::from_config(&AppConfig::default(), None);
        assert!(pipeline.is_ok());
    }
}
