use std::sync::Arc;

use crate::application::ports::{ArtifactStore, StorageError};
use crate::domain::{JobId, PollStatus, StoredOutcome};

use super::JobTracker;

/// Read-only classification of a job for polling clients.
pub struct StatusReporter {
    artifact_store: Arc<dyn ArtifactStore>,
    tracker: Arc<JobTracker>,
}

impl StatusReporter {
    pub fn new(artifact_store: Arc<dyn ArtifactStore>, tracker: Arc<JobTracker>) -> Self {
        Self {
            artifact_store,
            tracker,
        }
    }

    /// Identifiers that do not parse were never issued and report `NotFound`.
    pub async fn poll(&self, raw_id: &str) -> Result<PollStatus, StorageError> {
        match raw_id.parse::<JobId>() {
            Ok(job_id) => self.poll_job(job_id).await,
            Err(_) => Ok(PollStatus::NotFound),
        }
    }

    /// The tracker is read before the store. Entries are dropped only after
    /// the outcome is committed, so a live job is never reported without
    /// its phase.
    pub async fn poll_job(&self, job_id: JobId) -> Result<PollStatus, StorageError> {
        let phase = self.tracker.state(job_id);
        let snapshot = match self.artifact_store.read_state(&job_id).await {
            Ok(snapshot) => snapshot,
            Err(StorageError::NotFound(_)) => return Ok(PollStatus::NotFound),
            Err(e) => return Err(e),
        };

        Ok(match snapshot.outcome {
            StoredOutcome::Pending => PollStatus::Processing { state: phase },
            StoredOutcome::Succeeded(result) => PollStatus::Succeeded(result),
            StoredOutcome::Failed(message) => PollStatus::Failed(message),
        })
    }
}
