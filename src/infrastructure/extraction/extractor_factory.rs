use std::sync::Arc;

use crate::application::ports::Extractor;
use crate::presentation::config::{ExtractionSettings, ExtractorProvider};

use super::azure_read_adapter::AzureReadAdapter;
use super::mock_extractor::MockExtractor;
use super::vlm_pdf_adapter::VlmPdfAdapter;

#[derive(Debug, thiserror::Error)]
pub enum ExtractorFactoryError {
    #[error("azure_endpoint is required for the Azure Document Intelligence provider")]
    MissingAzureEndpoint,
    #[error("azure_key is required for the Azure Document Intelligence provider")]
    MissingAzureKey,
    #[error("vlm_base_url is required for the VLM provider")]
    MissingVlmBaseUrl,
    #[error("vlm_model is required for the VLM provider")]
    MissingVlmModel,
    #[error("extractor initialization failed: {0}")]
    InitializationFailed(String),
}

/// Builds the process-wide extractor once, before the server takes traffic.
pub struct ExtractorFactory;

impl ExtractorFactory {
    pub fn create(
        settings: &ExtractionSettings,
    ) -> Result<Arc<dyn Extractor>, ExtractorFactoryError> {
        match settings.provider {
            ExtractorProvider::Azure => {
                let endpoint = settings
                    .azure_endpoint
                    .as_deref()
                    .ok_or(ExtractorFactoryError::MissingAzureEndpoint)?;
                let key = settings
                    .azure_key
                    .as_deref()
                    .ok_or(ExtractorFactoryError::MissingAzureKey)?;
                tracing::info!(endpoint, "Loading Azure Document Intelligence read adapter");
                let adapter = AzureReadAdapter::new(endpoint, key)
                    .map_err(|e| ExtractorFactoryError::InitializationFailed(e.to_string()))?;
                Ok(Arc::new(adapter))
            }
            ExtractorProvider::Vlm => {
                let base_url = settings
                    .vlm_base_url
                    .as_deref()
                    .ok_or(ExtractorFactoryError::MissingVlmBaseUrl)?;
                let model = settings
                    .vlm_model
                    .as_deref()
                    .ok_or(ExtractorFactoryError::MissingVlmModel)?;
                let api_key = settings.vlm_api_key.as_deref().unwrap_or("lm-studio");
                tracing::info!(model, base_url, "Loading VLM PDF adapter");
                let adapter = VlmPdfAdapter::new(base_url, model, api_key)
                    .map_err(|e| ExtractorFactoryError::InitializationFailed(e.to_string()))?;
                Ok(Arc::new(adapter))
            }
            ExtractorProvider::Mock => {
                tracing::warn!("Using mock extractor; documents are read as plain text");
                Ok(Arc::new(MockExtractor))
            }
        }
    }
}
