mod atomic_write;
mod local_artifact_store;

pub use atomic_write::{sync_dir, write_atomic};
pub use local_artifact_store::{ERROR_FILE, INPUT_FILE, LocalArtifactStore, RESULT_FILE};
