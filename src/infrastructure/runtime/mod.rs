mod tokio_spawner;

pub use tokio_spawner::TokioSpawner;
