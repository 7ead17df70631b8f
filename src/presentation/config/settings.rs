use config::{Config, ConfigError, File};
use serde::Deserialize;

use crate::domain::{
    DEFAULT_DPI, DEFAULT_LANGUAGE, DEFAULT_MIN_CONFIDENCE, ExtractionOptions,
};

use super::Environment;

pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub storage: StorageSettings,
    pub jobs: JobSettings,
    pub extraction: ExtractionSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    pub root: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JobSettings {
    /// 0 disables the cap.
    pub max_in_flight: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractorProvider {
    Azure,
    Vlm,
    Mock,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExtractionSettings {
    pub provider: ExtractorProvider,
    pub default_languages: String,
    pub default_dpi: u32,
    pub default_min_confidence: f32,
    pub azure_endpoint: Option<String>,
    pub azure_key: Option<String>,
    pub vlm_base_url: Option<String>,
    pub vlm_model: Option<String>,
    pub vlm_api_key: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    pub json: bool,
    pub filter: Option<String>,
}

impl ExtractionSettings {
    pub fn default_options(&self) -> ExtractionOptions {
        ExtractionOptions::new(
            ExtractionOptions::parse_languages(&self.default_languages),
            self.default_dpi,
            self.default_min_confidence,
        )
    }
}

impl JobSettings {
    pub fn in_flight_limit(&self) -> Option<usize> {
        (self.max_in_flight > 0).then_some(self.max_in_flight)
    }
}

impl Settings {
    /// Layers built-in defaults, `appsettings.<env>.toml` (optional) and
    /// `APP_`-prefixed environment variables (`APP_SERVER__PORT=9000`).
    /// A platform-assigned port (`CDSW_APP_PORT`, then `PORT`) overrides the
    /// configured one.
    pub fn load(environment: Environment) -> Result<Self, SettingsError> {
        let configuration = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("server.max_upload_bytes", DEFAULT_MAX_UPLOAD_BYTES as u64)?
            .set_default("storage.root", "uploads")?
            .set_default("jobs.max_in_flight", 0)?
            .set_default("extraction.provider", "mock")?
            .set_default("extraction.default_languages", DEFAULT_LANGUAGE)?
            .set_default("extraction.default_dpi", DEFAULT_DPI as u64)?
            .set_default("extraction.default_min_confidence", DEFAULT_MIN_CONFIDENCE as f64)?
            .set_default("logging.json", false)?
            .add_source(
                File::with_name(&format!("appsettings.{}", environment.as_str())).required(false),
            )
            .add_source(
                config::Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut settings: Settings = configuration.try_deserialize()?;

        if let Some(port) = port_override(|name| std::env::var(name).ok())? {
            settings.server.port = port;
        }

        settings
            .extraction
            .default_options()
            .validate()
            .map_err(|e| SettingsError::InvalidDefaults(e.to_string()))?;

        Ok(settings)
    }
}

/// Port variables set by hosting platforms, most specific first.
const PORT_VARS: [&str; 2] = ["CDSW_APP_PORT", "PORT"];

fn port_override(
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<Option<u16>, SettingsError> {
    let Some(raw) = PORT_VARS
        .iter()
        .find_map(|name| lookup(*name).filter(|v| !v.trim().is_empty()))
    else {
        return Ok(None);
    };
    raw.trim()
        .parse()
        .map(Some)
        .map_err(|_| SettingsError::InvalidPort(raw))
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("port override is not a valid port number: {0}")]
    InvalidPort(String),
    #[error("invalid default extraction options: {0}")]
    InvalidDefaults(String),
}
