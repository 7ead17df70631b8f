use super::{ExtractionResult, JobState};

/// Client-facing view of a job, derived from committed artifacts.
#[derive(Debug, Clone, PartialEq)]
pub enum PollStatus {
    /// Not yet terminal. `state` is `Submitted` or `Running` when the
    /// in-process tracker still knows the job, `None` otherwise.
    Processing { state: Option<JobState> },
    Succeeded(ExtractionResult),
    Failed(String),
    NotFound,
}

impl PollStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, PollStatus::Succeeded(_) | PollStatus::Failed(_))
    }
}
