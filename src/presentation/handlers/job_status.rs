use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Serialize;

use crate::domain::{ExtractionResult, PollStatus};
use crate::presentation::state::AppState;

use super::error_response::error_response;

#[derive(Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum JobStatusResponse {
    Processing {
        job_id: String,
        /// `submitted`, `running`, or `unknown` once the process no longer
        /// tracks the job (e.g. after a restart).
        state: &'static str,
    },
    Succeeded {
        job_id: String,
        result: ExtractionResult,
        text: String,
    },
    Failed {
        job_id: String,
        error: String,
    },
    NotFound {
        job_id: String,
    },
}

impl JobStatusResponse {
    pub fn from_poll(job_id: String, status: PollStatus) -> (StatusCode, Self) {
        match status {
            PollStatus::Processing { state } => (
                StatusCode::ACCEPTED,
                Self::Processing {
                    job_id,
                    state: state.map(|s| s.as_str()).unwrap_or("unknown"),
                },
            ),
            PollStatus::Succeeded(result) => {
                let text = result.flat_text();
                (
                    StatusCode::OK,
                    Self::Succeeded {
                        job_id,
                        result,
                        text,
                    },
                )
            }
            PollStatus::Failed(error) => (StatusCode::OK, Self::Failed { job_id, error }),
            PollStatus::NotFound => (StatusCode::NOT_FOUND, Self::NotFound { job_id }),
        }
    }
}

#[tracing::instrument(skip(state))]
pub async fn job_status_handler(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> impl IntoResponse {
    match state.reporter.poll(&job_id).await {
        Ok(status) => {
            let (code, body) = JobStatusResponse::from_poll(job_id, status);
            (code, Json(body)).into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to read job state");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to read job: {e}"),
            )
        }
    }
}
