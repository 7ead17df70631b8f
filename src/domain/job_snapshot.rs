use chrono::{DateTime, Utc};

use super::{ExtractionResult, JobId};

/// What the artifact store can see for a job. The store alone cannot tell
/// `Submitted` from `Running`, so both collapse into `Pending`.
#[derive(Debug, Clone, PartialEq)]
pub enum StoredOutcome {
    Pending,
    Succeeded(ExtractionResult),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct JobSnapshot {
    pub id: JobId,
    pub input_size: u64,
    pub submitted_at: Option<DateTime<Utc>>,
    pub outcome: StoredOutcome,
}
