use std::io;

use async_trait::async_trait;

use crate::domain::{ExtractionResult, JobId, JobSnapshot};

/// Per-job persistence with put-once outcome semantics.
///
/// A job becomes visible only once its input is durable, and an outcome
/// becomes visible only once it is completely written. At most one of
/// result/error is ever committed for a job.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    async fn create_job(&self, id: &JobId, input: &[u8]) -> Result<(), StorageError>;

    async fn commit_result(
        &self,
        id: &JobId,
        result: &ExtractionResult,
    ) -> Result<(), StorageError>;

    async fn commit_error(&self, id: &JobId, message: &str) -> Result<(), StorageError>;

    async fn read_state(&self, id: &JobId) -> Result<JobSnapshot, StorageError>;

    async fn read_input(&self, id: &JobId) -> Result<Vec<u8>, StorageError>;

    /// The committed result artifact exactly as stored.
    async fn read_result_raw(&self, id: &JobId) -> Result<Vec<u8>, StorageError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("job not found: {0}")]
    NotFound(JobId),
    #[error("job already exists: {0}")]
    AlreadyExists(JobId),
    #[error("artifact missing for job {0}: {1}")]
    MissingArtifact(JobId, &'static str),
    #[error("job {0} already has a committed outcome")]
    AlreadyCommitted(JobId),
    #[error("corrupt artifact: {0}")]
    Corrupt(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}
