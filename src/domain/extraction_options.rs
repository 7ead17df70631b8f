pub const DEFAULT_LANGUAGE: &str = "en";
pub const DEFAULT_DPI: u32 = 300;
pub const DEFAULT_MIN_CONFIDENCE: f32 = 0.2;

pub const MAX_DPI: u32 = 1200;
pub const MAX_LANGUAGES: usize = 8;
const MAX_LANGUAGE_CODE_LEN: usize = 16;

/// Caller-tunable knobs handed to the extractor alongside the document.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionOptions {
    pub languages: Vec<String>,
    pub dpi: u32,
    pub min_confidence: f32,
}

impl Default for ExtractionOptions {
    fn default() -> Self {
        Self {
            languages: vec![DEFAULT_LANGUAGE.to_string()],
            dpi: DEFAULT_DPI,
            min_confidence: DEFAULT_MIN_CONFIDENCE,
        }
    }
}

impl ExtractionOptions {
    pub fn new(languages: Vec<String>, dpi: u32, min_confidence: f32) -> Self {
        Self {
            languages,
            dpi,
            min_confidence,
        }
    }

    /// Splits a comma-separated language list, dropping blank entries.
    pub fn parse_languages(raw: &str) -> Vec<String> {
        raw.split(',')
            .map(str::trim)
            .filter(|lang| !lang.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.languages.is_empty() {
            return Err(ConfigurationError::NoLanguages);
        }
        if self.languages.len() > MAX_LANGUAGES {
            return Err(ConfigurationError::TooManyLanguages(self.languages.len()));
        }
        if let Some(bad) = self.languages.iter().find(|l| !is_language_code(l)) {
            return Err(ConfigurationError::UnsupportedLanguage(bad.clone()));
        }
        if self.dpi == 0 || self.dpi > MAX_DPI {
            return Err(ConfigurationError::InvalidResolution(self.dpi.to_string()));
        }
        if !self.min_confidence.is_finite() || !(0.0..=1.0).contains(&self.min_confidence) {
            return Err(ConfigurationError::InvalidConfidence(
                self.min_confidence.to_string(),
            ));
        }
        Ok(())
    }
}

fn is_language_code(code: &str) -> bool {
    (2..=MAX_LANGUAGE_CODE_LEN).contains(&code.len())
        && code.chars().all(|c| c.is_ascii_lowercase() || c == '_')
        && !code.starts_with('_')
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigurationError {
    #[error("at least one language code must be provided")]
    NoLanguages,
    #[error("too many language codes: {0} (max {max})", max = MAX_LANGUAGES)]
    TooManyLanguages(usize),
    #[error("unsupported language code: {0:?}")]
    UnsupportedLanguage(String),
    #[error("resolution must be an integer DPI between 1 and {max}, got {0:?}", max = MAX_DPI)]
    InvalidResolution(String),
    #[error("confidence threshold must be a number in [0, 1], got {0:?}")]
    InvalidConfidence(String),
}
