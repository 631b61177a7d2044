use std::sync::{Arc, OnceLock};

use regex::Regex;
use tokio::task::JoinHandle;

use crate::ai::SummaryGenerator;
use crate::db::HistoryStore;
use crate::error::{InputProblem, SummaryError};
use crate::models::{SummaryFormat, SummaryResult};
use crate::services::MetadataResolver;

static YOUTUBE_URL: OnceLock<Regex> = OnceLock::new();

fn youtube_url() -> &'static Regex {
    YOUTUBE_URL.get_or_init(|| {
        Regex::new(r"^(https?://)?(www\.)?(youtube\.com|youtu\.?be)/.+$")
            .expect("YouTube URL pattern is valid")
    })
}

/// Shape check only: scheme optional, one of the known hosts, some path.
pub fn validate_url(url: &str) -> Result<(), SummaryError> {
    if url.is_empty() {
        return Err(SummaryError::InvalidInput(InputProblem::Empty));
    }
    if !youtube_url().is_match(url) {
        return Err(SummaryError::InvalidInput(InputProblem::UnrecognizedUrl));
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum WorkflowState {
    #[default]
    Idle,
    Validating,
    Loading,
    Error(String),
    Success(SummaryResult),
}

/// The network half of a submission: resolve, generate, record.
///
/// Cheap to clone so each submission can run in its own task.
#[derive(Clone)]
pub struct SummaryPipeline {
    resolver: Arc<dyn MetadataResolver>,
    generator: Arc<dyn SummaryGenerator>,
    history: Arc<HistoryStore>,
}

impl SummaryPipeline {
    pub fn new(
        resolver: Arc<dyn MetadataResolver>,
        generator: Arc<dyn SummaryGenerator>,
        history: Arc<HistoryStore>,
    ) -> Self {
        Self {
            resolver,
            generator,
            history,
        }
    }

    /// Strictly sequential: the generator is never called if resolving fails.
    pub async fn run(
        &self,
        url: &str,
        format: SummaryFormat,
    ) -> Result<SummaryResult, SummaryError> {
        let details = self.resolver.resolve(url).await?;
        let summary = self.generator.generate(url, format).await?;

        let result = SummaryResult::new(url, details, summary, format, chrono::Utc::now());
        self.history.add(result.clone()).await;

        Ok(result)
    }
}

pub struct SummaryWorkflow {
    pipeline: SummaryPipeline,
    state: WorkflowState,
}

impl SummaryWorkflow {
    pub fn new(pipeline: SummaryPipeline) -> Self {
        Self {
            pipeline,
            state: WorkflowState::Idle,
        }
    }

    pub fn state(&self) -> &WorkflowState {
        &self.state
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, WorkflowState::Loading)
    }

    /// Run one submission to completion and return the terminal state.
    pub async fn submit(&mut self, url: &str, format: SummaryFormat) -> &WorkflowState {
        if self.begin(url) {
            let outcome = self.pipeline.run(url, format).await;
            self.complete(outcome);
        }
        &self.state
    }

    /// Validate and, if the URL passes, start the submission on its own task.
    ///
    /// Overlapping submissions are not coalesced or cancelled; every spawned
    /// task finishes and records its own result in history.
    pub fn spawn(
        &mut self,
        url: &str,
        format: SummaryFormat,
    ) -> Option<JoinHandle<Result<SummaryResult, SummaryError>>> {
        if !self.begin(url) {
            return None;
        }

        let pipeline = self.pipeline.clone();
        let url = url.to_string();
        Some(tokio::spawn(async move { pipeline.run(&url, format).await }))
    }

    /// Leave the loading state with the outcome of a submission.
    pub fn complete(&mut self, outcome: Result<SummaryResult, SummaryError>) {
        self.state = match outcome {
            Ok(result) => WorkflowState::Success(result),
            Err(e) => WorkflowState::Error(e.to_string()),
        };
    }

    pub fn reset(&mut self) {
        self.state = WorkflowState::Idle;
    }

    /// Returns true when the submission may go to the network.
    fn begin(&mut self, url: &str) -> bool {
        self.state = WorkflowState::Validating;
        match validate_url(url) {
            Ok(()) => {
                self.state = WorkflowState::Loading;
                true
            }
            Err(e) => {
                self.state = WorkflowState::Error(e.to_string());
                false
            }
        }
    }
}
