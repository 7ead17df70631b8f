use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use crate::domain::{JobId, JobState};

/// Process-local view of jobs that have not reached a terminal state.
///
/// Only the registry and executor write here; the status reporter reads.
/// Entries are dropped once the outcome is committed, after which the
/// artifact store is the only source of truth.
#[derive(Default)]
pub struct JobTracker {
    jobs: DashMap<JobId, JobState>,
}

impl JobTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a freshly persisted job. Returns false if the id is already
    /// tracked.
    pub fn register(&self, id: JobId) -> bool {
        match self.jobs.entry(id) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(JobState::Submitted);
                true
            }
        }
    }

    /// Claims the job for execution. Only one caller ever wins for a given id.
    pub fn start(&self, id: JobId) -> bool {
        match self.jobs.get_mut(&id) {
            Some(mut state) if state.can_transition_to(JobState::Running) => {
                *state = JobState::Running;
                true
            }
            _ => false,
        }
    }

    /// Forgets the job once its terminal outcome is durable.
    pub fn finish(&self, id: JobId) {
        self.jobs.remove(&id);
    }

    pub fn state(&self, id: JobId) -> Option<JobState> {
        self.jobs.get(&id).map(|s| *s)
    }

    pub fn in_flight(&self) -> usize {
        self.jobs.len()
    }
}
