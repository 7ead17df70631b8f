mod error_response;
mod health;
mod job_artifacts;
mod job_status;
mod submit_job;

pub use error_response::ErrorResponse;
pub use health::health_handler;
pub use job_artifacts::{job_document_handler, job_result_handler};
pub use job_status::{JobStatusResponse, job_status_handler};
pub use submit_job::{OptionFields, SubmitJobResponse, submit_job_handler};
