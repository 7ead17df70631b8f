use std::sync::Arc;

use crate::application::ports::{ArtifactStore, Extractor, TaskSpawner};
use crate::application::services::{JobExecutor, JobRegistry, JobTracker, StatusReporter};
use crate::domain::ExtractionOptions;

#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<JobRegistry>,
    pub reporter: Arc<StatusReporter>,
    pub artifact_store: Arc<dyn ArtifactStore>,
    /// Applied to any option a submission leaves out.
    pub default_options: ExtractionOptions,
    pub max_upload_bytes: usize,
}

impl AppState {
    /// Wires registry, executor and reporter around one shared tracker.
    pub fn new(
        artifact_store: Arc<dyn ArtifactStore>,
        extractor: Arc<dyn Extractor>,
        spawner: Arc<dyn TaskSpawner>,
        default_options: ExtractionOptions,
        max_upload_bytes: usize,
    ) -> Self {
        let tracker = Arc::new(JobTracker::new());
        let executor = Arc::new(JobExecutor::new(
            Arc::clone(&artifact_store),
            extractor,
            Arc::clone(&tracker),
        ));
        let registry = Arc::new(JobRegistry::new(
            Arc::clone(&artifact_store),
            executor,
            Arc::clone(&tracker),
            spawner,
        ));
        let reporter = Arc::new(StatusReporter::new(Arc::clone(&artifact_store), tracker));

        Self {
            registry,
            reporter,
            artifact_store,
            default_options,
            max_upload_bytes,
        }
    }
}
