mod azure_read_adapter;
mod extractor_factory;
mod mock_extractor;
mod pdf_rasterizer;
mod vlm_pdf_adapter;

pub use azure_read_adapter::AzureReadAdapter;
pub use extractor_factory::{ExtractorFactory, ExtractorFactoryError};
pub use mock_extractor::MockExtractor;
pub use vlm_pdf_adapter::VlmPdfAdapter;
