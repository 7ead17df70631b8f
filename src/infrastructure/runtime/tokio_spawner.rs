use std::sync::Arc;

use futures::future::BoxFuture;
use tokio::runtime::Handle;
use tokio::sync::Semaphore;

use crate::application::ports::{SpawnError, TaskSpawner};

struct InFlightLimit {
    semaphore: Arc<Semaphore>,
    max: usize,
}

/// Spawns each job onto the tokio runtime as its own task.
///
/// With a limit configured, dispatch fails fast once `max` jobs are running
/// instead of queueing.
pub struct TokioSpawner {
    handle: Handle,
    limit: Option<InFlightLimit>,
}

impl TokioSpawner {
    /// `max_in_flight` of `None` or `Some(0)` means unbounded.
    pub fn new(max_in_flight: Option<usize>) -> Result<Self, SpawnError> {
        let handle = Handle::try_current().map_err(|_| SpawnError::NoRuntime)?;
        Ok(Self::with_handle(handle, max_in_flight))
    }

    pub fn with_handle(handle: Handle, max_in_flight: Option<usize>) -> Self {
        let limit = max_in_flight.filter(|max| *max > 0).map(|max| InFlightLimit {
            semaphore: Arc::new(Semaphore::new(max)),
            max,
        });
        Self { handle, limit }
    }
}

impl TaskSpawner for TokioSpawner {
    fn spawn(&self, task: BoxFuture<'static, ()>) -> Result<(), SpawnError> {
        let permit = match &self.limit {
            Some(limit) => Some(
                Arc::clone(&limit.semaphore)
                    .try_acquire_owned()
                    .map_err(|_| SpawnError::Saturated(limit.max))?,
            ),
            None => None,
        };

        self.handle.spawn(async move {
            let _permit = permit;
            task.await;
        });
        Ok(())
    }
}
