use axum::Json;
use axum::extract::{Multipart, State};
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use bytes::Bytes;
use serde::Serialize;

use crate::application::services::SubmitError;
use crate::domain::{ConfigurationError, ExtractionOptions};
use crate::presentation::state::AppState;

use super::error_response::error_response;

const DOCUMENT_FIELD: &str = "pdf";

#[derive(Serialize)]
pub struct SubmitJobResponse {
    pub job_id: String,
    pub status_url: String,
}

/// Raw option fields as they arrive in the form, before parsing.
#[derive(Debug, Default)]
pub struct OptionFields {
    pub languages: Option<String>,
    pub dpi: Option<String>,
    pub min_conf: Option<String>,
}

impl OptionFields {
    /// Overlays the submitted fields on `defaults`. Blank fields keep the
    /// default; anything that does not parse is rejected.
    pub fn apply_to(
        self,
        defaults: &ExtractionOptions,
    ) -> Result<ExtractionOptions, ConfigurationError> {
        let mut options = defaults.clone();

        if let Some(raw) = self.languages {
            let languages = ExtractionOptions::parse_languages(&raw);
            if !languages.is_empty() {
                options.languages = languages;
            }
        }

        if let Some(raw) = non_blank(self.dpi) {
            options.dpi = raw
                .parse()
                .map_err(|_| ConfigurationError::InvalidResolution(raw.clone()))?;
        }

        if let Some(raw) = non_blank(self.min_conf) {
            options.min_confidence = raw
                .parse()
                .map_err(|_| ConfigurationError::InvalidConfidence(raw.clone()))?;
        }

        Ok(options)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[tracing::instrument(skip(state, multipart))]
pub async fn submit_job_handler(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> impl IntoResponse {
    let mut document: Option<Bytes> = None;
    let mut fallback: Option<Bytes> = None;
    let mut fields = OptionFields::default();

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(f)) => f,
            Ok(None) => break,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read multipart");
                return error_response(e.status(), format!("Failed to read upload: {}", e.body_text()));
            }
        };

        let name = field.name().unwrap_or_default().to_string();
        let is_file = field.file_name().is_some();

        match name.as_str() {
            "languages" | "dpi" | "min_conf" => {
                let value = match field.text().await {
                    Ok(v) => v,
                    Err(e) => {
                        return error_response(e.status(), format!("Failed to read {name}: {e}"));
                    }
                };
                match name.as_str() {
                    "languages" => fields.languages = Some(value),
                    "dpi" => fields.dpi = Some(value),
                    _ => fields.min_conf = Some(value),
                }
            }
            _ if name == DOCUMENT_FIELD || is_file => {
                let data = match field.bytes().await {
                    Ok(d) => d,
                    Err(e) => {
                        tracing::warn!(error = %e, "Failed to read file bytes");
                        return error_response(e.status(), format!("Failed to read file: {e}"));
                    }
                };
                if name == DOCUMENT_FIELD {
                    document = Some(data);
                } else if fallback.is_none() {
                    fallback = Some(data);
                }
            }
            _ => tracing::debug!(field = %name, "Ignoring unknown form field"),
        }
    }

    let Some(data) = document.or(fallback) else {
        return error_response(
            StatusCode::BAD_REQUEST,
            format!("Missing document upload under field '{DOCUMENT_FIELD}'"),
        );
    };

    let options = match fields.apply_to(&state.default_options) {
        Ok(options) => options,
        Err(e) => {
            tracing::warn!(error = %e, "Rejected submission options");
            return error_response(StatusCode::BAD_REQUEST, e.to_string());
        }
    };

    tracing::debug!(bytes = data.len(), ?options, "Document received");

    match state.registry.submit(&data, options).await {
        Ok(job_id) => {
            let status_url = format!("/api/v1/jobs/{job_id}");
            (
                StatusCode::ACCEPTED,
                [(header::LOCATION, status_url.clone())],
                Json(SubmitJobResponse {
                    job_id: job_id.to_string(),
                    status_url,
                }),
            )
                .into_response()
        }
        Err(e @ (SubmitError::Configuration(_) | SubmitError::EmptyDocument)) => {
            tracing::warn!(error = %e, "Rejected submission");
            error_response(StatusCode::BAD_REQUEST, e.to_string())
        }
        Err(e @ SubmitError::Storage(_)) => {
            tracing::error!(error = %e, "Failed to persist submission");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to create job: {e}"),
            )
        }
    }
}
