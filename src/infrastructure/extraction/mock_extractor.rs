use async_trait::async_trait;

use crate::application::ports::{ExtractionError, Extractor};
use crate::domain::{ExtractionOptions, ExtractionResult, PageResult, TextItem};

/// Treats the document as UTF-8 text: one page, one item per non-empty line.
pub struct MockExtractor;

#[async_trait]
impl Extractor for MockExtractor {
    async fn extract(
        &self,
        document: &[u8],
        _options: &ExtractionOptions,
    ) -> Result<ExtractionResult, ExtractionError> {
        let text = std::str::from_utf8(document)
            .map_err(|e| ExtractionError::InvalidDocument(e.to_string()))?;

        let items = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| TextItem::new(line, 1.0, Vec::new()))
            .collect();

        Ok(ExtractionResult::new(vec![PageResult { page: 1, items }]))
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
