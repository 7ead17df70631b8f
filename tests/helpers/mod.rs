use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use futures::future::BoxFuture;
use tokio::sync::{Notify, Semaphore};

use ocrline::application::ports::{
    ArtifactStore, ExtractionError, Extractor, SpawnError, StorageError, TaskSpawner,
};
use ocrline::application::services::{JobExecutor, JobRegistry, JobTracker, StatusReporter};
use ocrline::domain::{
    ExtractionOptions, ExtractionResult, JobId, JobSnapshot, PageResult, PollStatus, TextItem,
};
use ocrline::infrastructure::runtime::TokioSpawner;
use ocrline::infrastructure::storage::LocalArtifactStore;

pub const MULTIPART_BOUNDARY: &str = "ocrline-test-boundary";

pub fn hello_result() -> ExtractionResult {
    ExtractionResult::new(vec![PageResult {
        page: 1,
        items: vec![TextItem::new(
            "hello",
            0.97,
            vec![[0.0, 0.0], [10.0, 0.0], [10.0, 5.0], [0.0, 5.0]],
        )],
    }])
}

/// Returns a fixed result, optionally holding each call until released.
pub struct ScriptedExtractor {
    result: ExtractionResult,
    gate: Option<Semaphore>,
    calls: AtomicUsize,
}

impl ScriptedExtractor {
    pub fn new(result: ExtractionResult) -> Self {
        Self {
            result,
            gate: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn gated(result: ExtractionResult) -> Self {
        Self {
            result,
            gate: Some(Semaphore::new(0)),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn release(&self, n: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(n);
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Extractor for ScriptedExtractor {
    async fn extract(
        &self,
        _document: &[u8],
        _options: &ExtractionOptions,
    ) -> Result<ExtractionResult, ExtractionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.acquire()
                .await
                .map_err(|e| ExtractionError::Failed(e.to_string()))?
                .forget();
        }
        Ok(self.result.clone())
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

/// Rejects every document whose bytes start with `reject`.
pub struct RejectingExtractor;

#[async_trait]
impl Extractor for RejectingExtractor {
    async fn extract(
        &self,
        document: &[u8],
        _options: &ExtractionOptions,
    ) -> Result<ExtractionResult, ExtractionError> {
        if document.starts_with(b"reject") {
            Err(ExtractionError::InvalidDocument(
                "not a PDF: missing %PDF header".to_string(),
            ))
        } else {
            Ok(hello_result())
        }
    }

    fn name(&self) -> &'static str {
        "rejecting"
    }
}

pub struct PanickingExtractor;

#[async_trait]
impl Extractor for PanickingExtractor {
    async fn extract(
        &self,
        _document: &[u8],
        _options: &ExtractionOptions,
    ) -> Result<ExtractionResult, ExtractionError> {
        panic!("model weights corrupted")
    }

    fn name(&self) -> &'static str {
        "panicking"
    }
}

pub struct RefusingSpawner;

impl TaskSpawner for RefusingSpawner {
    fn spawn(&self, _task: BoxFuture<'static, ()>) -> Result<(), SpawnError> {
        Err(SpawnError::Saturated(0))
    }
}

/// Delegates to a real store but fails selected operations.
pub struct FlakyArtifactStore {
    inner: LocalArtifactStore,
    fail_create: bool,
    fail_commit: bool,
}

impl FlakyArtifactStore {
    pub fn failing_create(inner: LocalArtifactStore) -> Self {
        Self {
            inner,
            fail_create: true,
            fail_commit: false,
        }
    }

    pub fn failing_commit(inner: LocalArtifactStore) -> Self {
        Self {
            inner,
            fail_create: false,
            fail_commit: true,
        }
    }
}

fn disk_full() -> StorageError {
    StorageError::Io(std::io::Error::other("No space left on device"))
}

#[async_trait]
impl ArtifactStore for FlakyArtifactStore {
    async fn create_job(&self, id: &JobId, input: &[u8]) -> Result<(), StorageError> {
        if self.fail_create {
            return Err(disk_full());
        }
        self.inner.create_job(id, input).await
    }

    async fn commit_result(
        &self,
        id: &JobId,
        result: &ExtractionResult,
    ) -> Result<(), StorageError> {
        if self.fail_commit {
            return Err(disk_full());
        }
        self.inner.commit_result(id, result).await
    }

    async fn commit_error(&self, id: &JobId, message: &str) -> Result<(), StorageError> {
        if self.fail_commit {
            return Err(disk_full());
        }
        self.inner.commit_error(id, message).await
    }

    async fn read_state(&self, id: &JobId) -> Result<JobSnapshot, StorageError> {
        self.inner.read_state(id).await
    }

    async fn read_input(&self, id: &JobId) -> Result<Vec<u8>, StorageError> {
        self.inner.read_input(id).await
    }

    async fn read_result_raw(&self, id: &JobId) -> Result<Vec<u8>, StorageError> {
        self.inner.read_result_raw(id).await
    }
}

/// Delegates to a real store; the next `create_job` or `read_state` can be
/// held open after its inner call completes until `resume` is called.
pub struct PausingArtifactStore {
    inner: LocalArtifactStore,
    pause_create: AtomicBool,
    pause_read: AtomicBool,
    last_created: Mutex<Option<JobId>>,
    paused: Notify,
    resume: Semaphore,
}

impl PausingArtifactStore {
    pub fn new(inner: LocalArtifactStore) -> Self {
        Self {
            inner,
            pause_create: AtomicBool::new(false),
            pause_read: AtomicBool::new(false),
            last_created: Mutex::new(None),
            paused: Notify::new(),
            resume: Semaphore::new(0),
        }
    }

    pub fn pause_next_create(&self) {
        self.pause_create.store(true, Ordering::SeqCst);
    }

    pub fn pause_next_read(&self) {
        self.pause_read.store(true, Ordering::SeqCst);
    }

    /// Resolves once a call is being held.
    pub async fn wait_until_paused(&self) {
        self.paused.notified().await;
    }

    pub fn resume(&self) {
        self.resume.add_permits(1);
    }

    pub fn last_created(&self) -> Option<JobId> {
        *self.last_created.lock().unwrap()
    }

    async fn hold(&self) {
        self.paused.notify_one();
        if let Ok(permit) = self.resume.acquire().await {
            permit.forget();
        }
    }
}

#[async_trait]
impl ArtifactStore for PausingArtifactStore {
    async fn create_job(&self, id: &JobId, input: &[u8]) -> Result<(), StorageError> {
        let created = self.inner.create_job(id, input).await;
        *self.last_created.lock().unwrap() = Some(*id);
        if self.pause_create.swap(false, Ordering::SeqCst) {
            self.hold().await;
        }
        created
    }

    async fn commit_result(
        &self,
        id: &JobId,
        result: &ExtractionResult,
    ) -> Result<(), StorageError> {
        self.inner.commit_result(id, result).await
    }

    async fn commit_error(&self, id: &JobId, message: &str) -> Result<(), StorageError> {
        self.inner.commit_error(id, message).await
    }

    async fn read_state(&self, id: &JobId) -> Result<JobSnapshot, StorageError> {
        let snapshot = self.inner.read_state(id).await;
        if self.pause_read.swap(false, Ordering::SeqCst) {
            self.hold().await;
        }
        snapshot
    }

    async fn read_input(&self, id: &JobId) -> Result<Vec<u8>, StorageError> {
        self.inner.read_input(id).await
    }

    async fn read_result_raw(&self, id: &JobId) -> Result<Vec<u8>, StorageError> {
        self.inner.read_result_raw(id).await
    }
}

pub struct Harness {
    pub dir: tempfile::TempDir,
    pub store: Arc<dyn ArtifactStore>,
    pub tracker: Arc<JobTracker>,
    pub executor: Arc<JobExecutor>,
    pub registry: JobRegistry,
    pub reporter: StatusReporter,
}

pub fn temp_store() -> (tempfile::TempDir, LocalArtifactStore) {
    let dir = tempfile::TempDir::new().unwrap();
    let store = LocalArtifactStore::new(dir.path().to_path_buf()).unwrap();
    (dir, store)
}

/// Must be called inside a tokio runtime.
pub fn harness(extractor: Arc<dyn Extractor>) -> Harness {
    let spawner: Arc<dyn TaskSpawner> = Arc::new(TokioSpawner::new(None).unwrap());
    let (dir, store) = temp_store();
    harness_with(dir, Arc::new(store), extractor, spawner)
}

pub fn harness_with(
    dir: tempfile::TempDir,
    store: Arc<dyn ArtifactStore>,
    extractor: Arc<dyn Extractor>,
    spawner: Arc<dyn TaskSpawner>,
) -> Harness {
    let tracker = Arc::new(JobTracker::new());
    let executor = Arc::new(JobExecutor::new(
        Arc::clone(&store),
        extractor,
        Arc::clone(&tracker),
    ));
    let registry = JobRegistry::new(
        Arc::clone(&store),
        Arc::clone(&executor),
        Arc::clone(&tracker),
        spawner,
    );
    let reporter = StatusReporter::new(Arc::clone(&store), Arc::clone(&tracker));
    Harness {
        dir,
        store,
        tracker,
        executor,
        registry,
        reporter,
    }
}

/// Polls until the job is terminal or five seconds pass.
pub async fn wait_for_terminal(reporter: &StatusReporter, id: JobId) -> PollStatus {
    for _ in 0..500 {
        let status = reporter.poll_job(id).await.unwrap();
        if status.is_terminal() {
            return status;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("job {id} did not finish in time");
}

/// Counts entries under the store root that look like job directories.
pub fn job_dir_count(root: &std::path::Path) -> usize {
    std::fs::read_dir(root)
        .unwrap()
        .filter_map(Result::ok)
        .filter(|e| !e.file_name().to_string_lossy().starts_with('.'))
        .count()
}

pub struct Part<'a> {
    pub name: &'a str,
    pub filename: Option<&'a str>,
    pub data: &'a [u8],
}

pub fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{MULTIPART_BOUNDARY}\r\n").as_bytes());
        match part.filename {
            Some(filename) => body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n\
                     Content-Type: application/pdf\r\n\r\n",
                    part.name, filename
                )
                .as_bytes(),
            ),
            None => body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{}\"\r\n\r\n",
                    part.name
                )
                .as_bytes(),
            ),
        }
        body.extend_from_slice(part.data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{MULTIPART_BOUNDARY}--\r\n").as_bytes());
    body
}

pub fn multipart_content_type() -> String {
    format!("multipart/form-data; boundary={MULTIPART_BOUNDARY}")
}
