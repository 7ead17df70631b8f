use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tracing::Instrument;

use crate::application::ports::{ArtifactStore, ExtractionError, Extractor, StorageError};
use crate::domain::{ConfigurationError, ExtractionOptions, ExtractionResult, JobId, JobState};

use super::JobTracker;

/// Runs one job to a terminal outcome off the request path.
///
/// The extractor is shared read-only by every run. Failures never escape
/// `run`; they are committed as the job's error artifact.
pub struct JobExecutor {
    artifact_store: Arc<dyn ArtifactStore>,
    extractor: Arc<dyn Extractor>,
    tracker: Arc<JobTracker>,
}

impl JobExecutor {
    pub fn new(
        artifact_store: Arc<dyn ArtifactStore>,
        extractor: Arc<dyn Extractor>,
        tracker: Arc<JobTracker>,
    ) -> Self {
        Self {
            artifact_store,
            extractor,
            tracker,
        }
    }

    pub async fn run(&self, job_id: JobId, options: ExtractionOptions) {
        let span = tracing::info_span!(
            "extraction_job",
            job_id = %job_id,
            extractor = self.extractor.name(),
        );
        self.run_claimed(job_id, options).instrument(span).await
    }

    async fn run_claimed(&self, job_id: JobId, options: ExtractionOptions) {
        if !self.tracker.start(job_id) {
            tracing::warn!("Job is not awaiting execution; refusing to run it again");
            return;
        }
        tracing::debug!(state = %JobState::Running, "Job state transition");

        match self.execute(job_id, &options).await {
            Ok(result) => {
                let pages = result.pages.len();
                let items = result.item_count();
                match self.artifact_store.commit_result(&job_id, &result).await {
                    Ok(()) => {
                        self.tracker.finish(job_id);
                        tracing::debug!(state = %JobState::Succeeded, "Job state transition");
                        tracing::info!(pages, items, "Extraction completed");
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Failed to commit result; job stays running");
                    }
                }
            }
            Err(e) => {
                let message = e.to_string();
                tracing::warn!(error = %message, "Extraction failed");
                match self.artifact_store.commit_error(&job_id, &message).await {
                    Ok(()) => {
                        self.tracker.finish(job_id);
                        tracing::debug!(state = %JobState::Failed, "Job state transition");
                    }
                    Err(commit_err) => {
                        tracing::error!(
                            error = %commit_err,
                            "Failed to commit error; job stays running"
                        );
                    }
                }
            }
        }
    }

    async fn execute(
        &self,
        job_id: JobId,
        options: &ExtractionOptions,
    ) -> Result<ExtractionResult, ExecutionError> {
        options.validate()?;

        let input = self
            .artifact_store
            .read_input(&job_id)
            .await
            .map_err(ExecutionError::Input)?;

        tracing::debug!(bytes = input.len(), "Invoking extractor");

        let extraction = AssertUnwindSafe(self.extractor.extract(&input, options))
            .catch_unwind()
            .await;

        match extraction {
            Ok(result) => result.map_err(ExecutionError::Extraction),
            Err(panic) => Err(ExecutionError::Panicked(panic_message(panic.as_ref()))),
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[derive(Debug, thiserror::Error)]
enum ExecutionError {
    #[error("invalid options: {0}")]
    Configuration(#[from] ConfigurationError),
    #[error("could not read input: {0}")]
    Input(StorageError),
    #[error("{0}")]
    Extraction(ExtractionError),
    #[error("extractor crashed: {0}")]
    Panicked(String),
}
