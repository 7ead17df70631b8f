use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::fs;

use crate::application::ports::{ArtifactStore, StorageError};
use crate::domain::{ExtractionResult, JobId, JobSnapshot, StoredOutcome};

use super::atomic_write::{sync_dir, write_atomic, write_synced};

pub const INPUT_FILE: &str = "document.pdf";
pub const RESULT_FILE: &str = "ocr.json";
pub const ERROR_FILE: &str = "error.txt";
const STAGING_DIR: &str = ".staging";

/// One directory per job under `root`:
///
/// ```text
/// <root>/<job-id>/document.pdf
/// <root>/<job-id>/ocr.json     (success only)
/// <root>/<job-id>/error.txt    (failure only)
/// ```
///
/// Job directories are assembled under `<root>/.staging/` and renamed into
/// place, so a visible job directory always holds its full input.
pub struct LocalArtifactStore {
    root: PathBuf,
}

impl LocalArtifactStore {
    /// Opens (creating if needed) the store at `root`. Leftovers from
    /// submissions interrupted by a crash are discarded.
    pub fn new(root: PathBuf) -> Result<Self, StorageError> {
        let staging = root.join(STAGING_DIR);
        if staging.exists() {
            std::fs::remove_dir_all(&staging)?;
        }
        std::fs::create_dir_all(&staging)?;
        Ok(Self { root })
    }

    fn job_dir(&self, id: &JobId) -> PathBuf {
        self.root.join(id.to_string())
    }

    async fn existing_job_dir(&self, id: &JobId) -> Result<PathBuf, StorageError> {
        let dir = self.job_dir(id);
        match fs::metadata(&dir).await {
            Ok(meta) if meta.is_dir() => Ok(dir),
            Ok(_) => Err(StorageError::NotFound(*id)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(StorageError::NotFound(*id)),
            Err(e) => Err(e.into()),
        }
    }

    async fn commit_outcome(
        &self,
        id: &JobId,
        file_name: &str,
        bytes: &[u8],
    ) -> Result<(), StorageError> {
        let dir = self.existing_job_dir(id).await?;

        // Put-once: a single executor per job means nothing else can race
        // between this check and the rename below.
        for outcome in [RESULT_FILE, ERROR_FILE] {
            if fs::try_exists(dir.join(outcome)).await? {
                return Err(StorageError::AlreadyCommitted(*id));
            }
        }

        write_atomic(&dir.join(file_name), bytes).await?;
        Ok(())
    }

    async fn stage_job(&self, staging: &Path, input: &[u8]) -> io::Result<()> {
        fs::create_dir(staging).await?;
        write_synced(&staging.join(INPUT_FILE), input).await?;
        sync_dir(staging).await
    }
}

#[async_trait]
impl ArtifactStore for LocalArtifactStore {
    async fn create_job(&self, id: &JobId, input: &[u8]) -> Result<(), StorageError> {
        let target = self.job_dir(id);
        if fs::try_exists(&target).await? {
            return Err(StorageError::AlreadyExists(*id));
        }

        let staging = self.root.join(STAGING_DIR).join(id.to_string());
        let published = async {
            self.stage_job(&staging, input).await?;
            fs::rename(&staging, &target).await?;
            sync_dir(&self.root).await
        }
        .await;

        if let Err(e) = published {
            let _ = fs::remove_dir_all(&staging).await;
            return Err(e.into());
        }

        tracing::debug!(job_id = %id, bytes = input.len(), "Job input persisted");
        Ok(())
    }

    async fn commit_result(
        &self,
        id: &JobId,
        result: &ExtractionResult,
    ) -> Result<(), StorageError> {
        let bytes = serde_json::to_vec_pretty(result)
            .map_err(|e| StorageError::Corrupt(format!("serialize result: {e}")))?;
        self.commit_outcome(id, RESULT_FILE, &bytes).await
    }

    async fn commit_error(&self, id: &JobId, message: &str) -> Result<(), StorageError> {
        self.commit_outcome(id, ERROR_FILE, message.as_bytes()).await
    }

    async fn read_state(&self, id: &JobId) -> Result<JobSnapshot, StorageError> {
        let dir = self.existing_job_dir(id).await?;

        let input_meta = match fs::metadata(dir.join(INPUT_FILE)).await {
            Ok(meta) => meta,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(StorageError::MissingArtifact(*id, INPUT_FILE));
            }
            Err(e) => return Err(e.into()),
        };

        let outcome = if let Some(bytes) = read_optional(&dir.join(RESULT_FILE)).await? {
            let result = serde_json::from_slice(&bytes)
                .map_err(|e| StorageError::Corrupt(format!("{id}/{RESULT_FILE}: {e}")))?;
            StoredOutcome::Succeeded(result)
        } else if let Some(bytes) = read_optional(&dir.join(ERROR_FILE)).await? {
            StoredOutcome::Failed(String::from_utf8_lossy(&bytes).into_owned())
        } else {
            StoredOutcome::Pending
        };

        Ok(JobSnapshot {
            id: *id,
            input_size: input_meta.len(),
            submitted_at: input_meta.modified().ok().map(DateTime::<Utc>::from),
            outcome,
        })
    }

    async fn read_input(&self, id: &JobId) -> Result<Vec<u8>, StorageError> {
        let dir = self.existing_job_dir(id).await?;
        read_optional(&dir.join(INPUT_FILE))
            .await?
            .ok_or(StorageError::MissingArtifact(*id, INPUT_FILE))
    }

    async fn read_result_raw(&self, id: &JobId) -> Result<Vec<u8>, StorageError> {
        let dir = self.existing_job_dir(id).await?;
        read_optional(&dir.join(RESULT_FILE))
            .await?
            .ok_or(StorageError::MissingArtifact(*id, RESULT_FILE))
    }
}

async fn read_optional(path: &Path) -> Result<Option<Vec<u8>>, StorageError> {
    match fs::read(path).await {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}
