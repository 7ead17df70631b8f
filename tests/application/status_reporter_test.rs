use std::sync::Arc;
use std::time::Duration;

use ocrline::domain::{ExtractionOptions, JobId, JobState, PollStatus};
use ocrline::infrastructure::storage::LocalArtifactStore;

use ocrline::infrastructure::runtime::TokioSpawner;

use crate::helpers::{
    PausingArtifactStore, ScriptedExtractor, harness, harness_with, hello_result, temp_store,
    wait_for_terminal,
};

#[tokio::test]
async fn given_never_issued_identifier_when_polled_then_not_found() {
    let h = harness(Arc::new(ScriptedExtractor::new(hello_result())));

    assert_eq!(h.reporter.poll("nonexistent").await.unwrap(), PollStatus::NotFound);
    assert_eq!(
        h.reporter.poll(&JobId::new().to_string()).await.unwrap(),
        PollStatus::NotFound
    );
}

#[tokio::test]
async fn given_unknown_id_when_polled_after_other_work_then_still_not_found() {
    let h = harness(Arc::new(ScriptedExtractor::new(hello_result())));
    let unknown = JobId::new();
    let id = h
        .registry
        .submit(b"doc1", ExtractionOptions::default())
        .await
        .unwrap();
    wait_for_terminal(&h.reporter, id).await;

    assert_eq!(h.reporter.poll_job(unknown).await.unwrap(), PollStatus::NotFound);
}

#[tokio::test]
async fn given_running_job_when_polled_then_reports_running_phase() {
    let extractor = Arc::new(ScriptedExtractor::gated(hello_result()));
    let h = harness(extractor.clone());
    let id = h
        .registry
        .submit(b"doc1", ExtractionOptions::default())
        .await
        .unwrap();

    while extractor.calls() == 0 {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    assert_eq!(
        h.reporter.poll_job(id).await.unwrap(),
        PollStatus::Processing {
            state: Some(JobState::Running)
        }
    );
    extractor.release(1);
    wait_for_terminal(&h.reporter, id).await;
}

#[tokio::test]
async fn given_terminal_job_when_polled_repeatedly_then_answer_never_changes() {
    let h = harness(Arc::new(ScriptedExtractor::new(hello_result())));
    let id = h
        .registry
        .submit(b"doc1", ExtractionOptions::default())
        .await
        .unwrap();
    let first = wait_for_terminal(&h.reporter, id).await;

    for _ in 0..5 {
        assert_eq!(h.reporter.poll_job(id).await.unwrap(), first);
    }
    assert_eq!(first, PollStatus::Succeeded(hello_result()));
}

#[tokio::test]
async fn given_pending_job_from_previous_process_when_polled_then_processing_with_unknown_phase() {
    let h = harness(Arc::new(ScriptedExtractor::gated(hello_result())));
    let id = h
        .registry
        .submit(b"doc1", ExtractionOptions::default())
        .await
        .unwrap();

    let restarted_store = Arc::new(LocalArtifactStore::new(h.dir.path().to_path_buf()).unwrap());
    let restarted = ocrline::application::services::StatusReporter::new(
        restarted_store,
        Arc::new(ocrline::application::services::JobTracker::new()),
    );

    assert_eq!(
        restarted.poll_job(id).await.unwrap(),
        PollStatus::Processing { state: None }
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn given_concurrent_pollers_when_job_completes_then_no_partial_result_observed() {
    let extractor = Arc::new(ScriptedExtractor::gated(hello_result()));
    let h = Arc::new(harness(extractor.clone()));
    let id = h
        .registry
        .submit(b"doc1", ExtractionOptions::default())
        .await
        .unwrap();

    let pollers: Vec<_> = (0..4)
        .map(|_| {
            let h = Arc::clone(&h);
            tokio::spawn(async move {
                loop {
                    let status = h.reporter.poll_job(id).await.unwrap();
                    match status {
                        PollStatus::Processing { .. } => tokio::task::yield_now().await,
                        PollStatus::Succeeded(result) => {
                            assert_eq!(result, hello_result());
                            return;
                        }
                        other => panic!("unexpected status {other:?}"),
                    }
                }
            })
        })
        .collect();

    tokio::time::sleep(Duration::from_millis(20)).await;
    extractor.release(1);

    for poller in pollers {
        tokio::time::timeout(Duration::from_secs(5), poller)
            .await
            .unwrap()
            .unwrap();
    }
}

#[tokio::test]
async fn given_job_finishes_while_poll_reads_store_then_phase_is_not_reported_unknown() {
    let (dir, store) = temp_store();
    let store = Arc::new(PausingArtifactStore::new(store));
    let extractor = Arc::new(ScriptedExtractor::gated(hello_result()));
    let h = Arc::new(harness_with(
        dir,
        store.clone(),
        extractor.clone(),
        Arc::new(TokioSpawner::new(None).unwrap()),
    ));
    let id = h
        .registry
        .submit(b"doc1", ExtractionOptions::default())
        .await
        .unwrap();
    while extractor.calls() == 0 {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    store.pause_next_read();
    let poll = tokio::spawn({
        let h = Arc::clone(&h);
        async move { h.reporter.poll_job(id).await.unwrap() }
    });
    store.wait_until_paused().await;

    extractor.release(1);
    while h.tracker.state(id).is_some() {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    store.resume();

    let status = poll.await.unwrap();
    assert_eq!(
        status,
        PollStatus::Processing {
            state: Some(JobState::Running)
        }
    );
    assert_eq!(
        h.reporter.poll_job(id).await.unwrap(),
        PollStatus::Succeeded(hello_result())
    );
}
