mod extraction_options;
mod extraction_result;
mod job_id;
mod job_snapshot;
mod job_state;
mod poll_status;

pub use extraction_options::{
    ConfigurationError, DEFAULT_DPI, DEFAULT_LANGUAGE, DEFAULT_MIN_CONFIDENCE, ExtractionOptions,
    MAX_DPI, MAX_LANGUAGES,
};
pub use extraction_result::{ExtractionResult, PageResult, TextItem};
pub use job_id::JobId;
pub use job_snapshot::{JobSnapshot, StoredOutcome};
pub use job_state::JobState;
pub use poll_status::PollStatus;
