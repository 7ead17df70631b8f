use std::sync::Arc;

use crate::application::ports::{ArtifactStore, SpawnError, StorageError, TaskSpawner};
use crate::domain::{ConfigurationError, ExtractionOptions, JobId};

use super::{JobExecutor, JobTracker};

/// Entry point for new work: allocates the id, persists the input, and
/// dispatches exactly one executor per job.
pub struct JobRegistry {
    artifact_store: Arc<dyn ArtifactStore>,
    executor: Arc<JobExecutor>,
    tracker: Arc<JobTracker>,
    spawner: Arc<dyn TaskSpawner>,
}

impl JobRegistry {
    pub fn new(
        artifact_store: Arc<dyn ArtifactStore>,
        executor: Arc<JobExecutor>,
        tracker: Arc<JobTracker>,
        spawner: Arc<dyn TaskSpawner>,
    ) -> Self {
        Self {
            artifact_store,
            executor,
            tracker,
            spawner,
        }
    }

    /// Returns as soon as the input is durable and the job is dispatched.
    ///
    /// Invalid options and storage failures are reported here and no job id
    /// escapes. A failed dispatch still returns the id; that job is already
    /// marked failed.
    #[tracing::instrument(skip(self, input), fields(bytes = input.len()))]
    pub async fn submit(
        &self,
        input: &[u8],
        options: ExtractionOptions,
    ) -> Result<JobId, SubmitError> {
        options.validate()?;
        if input.is_empty() {
            return Err(SubmitError::EmptyDocument);
        }

        // Tracked before the directory becomes visible, so a pending job
        // without a tracker entry can only be left over from an earlier run.
        let job_id = JobId::new();
        self.tracker.register(job_id);
        if let Err(e) = self.artifact_store.create_job(&job_id, input).await {
            self.tracker.finish(job_id);
            return Err(e.into());
        }

        let executor = Arc::clone(&self.executor);
        let task = Box::pin(async move { executor.run(job_id, options).await });

        match self.spawner.spawn(task) {
            Ok(()) => {
                tracing::info!(job_id = %job_id, "Extraction job dispatched");
            }
            Err(e) => {
                tracing::error!(job_id = %job_id, error = %e, "Failed to dispatch extraction job");
                self.fail_undispatched(job_id, &e).await;
            }
        }

        Ok(job_id)
    }

    async fn fail_undispatched(&self, job_id: JobId, cause: &SpawnError) {
        let message = format!("job could not be dispatched: {cause}");
        match self.artifact_store.commit_error(&job_id, &message).await {
            Ok(()) => self.tracker.finish(job_id),
            Err(e) => {
                tracing::error!(
                    job_id = %job_id,
                    error = %e,
                    "Failed to record dispatch failure; job stays submitted"
                );
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error("configuration: {0}")]
    Configuration(#[from] ConfigurationError),
    #[error("document is empty")]
    EmptyDocument,
    #[error("storage: {0}")]
    Storage(#[from] StorageError),
}
