//! Runs OCR on a single document without the job service.

use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::Parser;

use ocrline::domain::{DEFAULT_DPI, DEFAULT_MIN_CONFIDENCE, ExtractionOptions};
use ocrline::infrastructure::extraction::ExtractorFactory;
use ocrline::infrastructure::observability::{TracingConfig, init_tracing};
use ocrline::infrastructure::storage::write_atomic;
use ocrline::presentation::{Environment, Settings};

#[derive(Debug, Parser)]
#[command(about = "Run OCR on a PDF file and export the results as JSON")]
struct Args {
    /// Path to the input PDF file.
    pdf: PathBuf,

    /// Comma-separated language codes.
    #[arg(long, default_value = "en")]
    languages: String,

    /// DPI used when rasterizing pages.
    #[arg(long, default_value_t = DEFAULT_DPI)]
    dpi: u32,

    /// Minimum confidence (0-1) required to keep a detection.
    #[arg(long, default_value_t = DEFAULT_MIN_CONFIDENCE)]
    min_confidence: f32,

    /// Write JSON here instead of stdout.
    #[arg(long)]
    json_out: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let environment = Environment::from_env().map_err(anyhow::Error::msg)?;
    let settings = Settings::load(environment).context("Failed to load settings")?;
    init_tracing(&TracingConfig {
        default_filter: "warn,ocrline=info".to_string(),
        ..TracingConfig::from_settings(environment, &settings.logging)
    });

    if !args.pdf.is_file() {
        bail!("PDF not found: {}", args.pdf.display());
    }

    let options = ExtractionOptions::new(
        ExtractionOptions::parse_languages(&args.languages),
        args.dpi,
        args.min_confidence,
    );
    options.validate()?;

    let document = tokio::fs::read(&args.pdf)
        .await
        .with_context(|| format!("Failed to read {}", args.pdf.display()))?;

    let extractor = ExtractorFactory::create(&settings.extraction)?;
    let result = extractor.extract(&document, &options).await?;
    let json = serde_json::to_string_pretty(&result)?;

    match args.json_out {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                tokio::fs::create_dir_all(parent).await?;
            }
            write_atomic(&path, json.as_bytes())
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
            tracing::info!(path = %path.display(), pages = result.pages.len(), "Result written");
        }
        None => println!("{json}"),
    }

    Ok(())
}
