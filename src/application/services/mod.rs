mod job_executor;
mod job_registry;
mod job_tracker;
mod status_reporter;

pub use job_executor::JobExecutor;
pub use job_registry::{JobRegistry, SubmitError};
pub use job_tracker::JobTracker;
pub use status_reporter::StatusReporter;
