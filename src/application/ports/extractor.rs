use async_trait::async_trait;

use crate::domain::{ExtractionOptions, ExtractionResult};

/// Turns document bytes into structured text. Potentially slow, potentially
/// failing; callers get no visibility into progress.
#[async_trait]
pub trait Extractor: Send + Sync {
    async fn extract(
        &self,
        document: &[u8],
        options: &ExtractionOptions,
    ) -> Result<ExtractionResult, ExtractionError>;

    fn name(&self) -> &'static str;
}

#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    #[error("invalid document: {0}")]
    InvalidDocument(String),
    #[error("extraction failed: {0}")]
    Failed(String),
    #[error("extractor unavailable: {0}")]
    Unavailable(String),
}
