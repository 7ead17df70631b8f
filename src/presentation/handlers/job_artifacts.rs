use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};

use crate::application::ports::StorageError;
use crate::domain::JobId;
use crate::presentation::state::AppState;

use super::error_response::error_response;

/// The originally uploaded document.
#[tracing::instrument(skip(state))]
pub async fn job_document_handler(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Response {
    let Ok(id) = job_id.parse::<JobId>() else {
        return not_found(&job_id);
    };

    match state.artifact_store.read_input(&id).await {
        Ok(bytes) => ([(header::CONTENT_TYPE, "application/pdf")], bytes).into_response(),
        Err(e) => storage_failure(&job_id, e),
    }
}

/// The committed result artifact, byte for byte.
#[tracing::instrument(skip(state))]
pub async fn job_result_handler(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Response {
    let Ok(id) = job_id.parse::<JobId>() else {
        return not_found(&job_id);
    };

    match state.artifact_store.read_result_raw(&id).await {
        Ok(bytes) => ([(header::CONTENT_TYPE, "application/json")], bytes).into_response(),
        Err(e) => storage_failure(&job_id, e),
    }
}

fn not_found(job_id: &str) -> Response {
    error_response(StatusCode::NOT_FOUND, format!("Not found: {job_id}"))
}

fn storage_failure(job_id: &str, e: StorageError) -> Response {
    match e {
        StorageError::NotFound(_) | StorageError::MissingArtifact(..) => not_found(job_id),
        other => {
            tracing::error!(error = %other, "Failed to read job artifact");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to read artifact: {other}"),
            )
        }
    }
}
