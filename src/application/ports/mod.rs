mod artifact_store;
mod extractor;
mod task_spawner;

pub use artifact_store::{ArtifactStore, StorageError};
pub use extractor::{ExtractionError, Extractor};
pub use task_spawner::{SpawnError, TaskSpawner};
