use futures::future::BoxFuture;

/// Hands a job's future to an independent execution context.
///
/// `spawn` must not block and must either take ownership of the task or
/// report why it could not.
pub trait TaskSpawner: Send + Sync {
    fn spawn(&self, task: BoxFuture<'static, ()>) -> Result<(), SpawnError>;
}

#[derive(Debug, thiserror::Error)]
pub enum SpawnError {
    #[error("no async runtime available")]
    NoRuntime,
    #[error("executor capacity exhausted ({0} jobs in flight)")]
    Saturated(usize),
}
