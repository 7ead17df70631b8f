mod environment;
mod settings;

pub use environment::Environment;
pub use settings::{
    DEFAULT_MAX_UPLOAD_BYTES, ExtractionSettings, ExtractorProvider, JobSettings,
    LoggingSettings, ServerSettings, Settings, SettingsError, StorageSettings,
};
