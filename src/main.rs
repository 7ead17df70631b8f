use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;

use ocrline::application::ports::{ArtifactStore, TaskSpawner};
use ocrline::infrastructure::extraction::ExtractorFactory;
use ocrline::infrastructure::observability::{TracingConfig, init_tracing};
use ocrline::infrastructure::runtime::TokioSpawner;
use ocrline::infrastructure::storage::LocalArtifactStore;
use ocrline::presentation::{AppState, Environment, Settings, create_router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let environment = Environment::from_env().map_err(anyhow::Error::msg)?;
    let settings = Settings::load(environment).context("Failed to load settings")?;

    init_tracing(&TracingConfig::from_settings(
        environment,
        &settings.logging,
    ));

    // Built once and shared read-only by every job.
    let extractor = ExtractorFactory::create(&settings.extraction)
        .context("Failed to initialize extractor")?;

    let artifact_store: Arc<dyn ArtifactStore> = Arc::new(
        LocalArtifactStore::new(PathBuf::from(&settings.storage.root))
            .context("Failed to open artifact store")?,
    );

    let spawner: Arc<dyn TaskSpawner> =
        Arc::new(TokioSpawner::new(settings.jobs.in_flight_limit())?);

    tracing::info!(
        storage_root = %settings.storage.root,
        extractor = extractor.name(),
        max_in_flight = settings.jobs.max_in_flight,
        "Job services ready"
    );

    let state = AppState::new(
        artifact_store,
        extractor,
        spawner,
        settings.extraction.default_options(),
        settings.server.max_upload_bytes,
    );

    let router = create_router(state);

    let addr: SocketAddr = format!("{}:{}", settings.server.host, settings.server.port)
        .parse()
        .with_context(|| format!("Invalid listen address {}", settings.server.host))?;

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Listening on http://{}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
}
