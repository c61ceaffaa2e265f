//! Orchestrator integration tests driven by fake collaborators.
//!
//! The fakes implement the same seams production wiring uses (JobStore,
//! ObjectPublisher, AssetFetcher, RenderEngine), so these tests exercise the
//! real pipeline control flow: state transitions, failure tagging, workspace
//! cleanup, cancellation, and job isolation.

use async_trait::async_trait;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use slidecast_core::config::{
    AppConfig, FetchConfig, PanDirection, QueueConfig, RenderConfig, StoreConfig,
};
use slidecast_core::error::{EngineFailure, StageError, StageResult};
use slidecast_core::models::{Job, JobStatus, JobUpdate};
use slidecast_engine::{AssetFetcher, RenderEngine};
use slidecast_records::{JobStore, StoreError, StoreResult};
use slidecast_storage::{ObjectPublisher, PublishError, PublishResult};
use slidecast_worker::{JobQueue, Orchestrator};

// --- Fakes -----------------------------------------------------------------

type UpdateRecord = (JobStatus, Option<String>, Option<String>);

#[derive(Default)]
struct FakeStore {
    updates: Mutex<Vec<UpdateRecord>>,
    fail_writes: bool,
}

impl FakeStore {
    fn failing() -> Self {
        Self {
            fail_writes: true,
            ..Self::default()
        }
    }

    fn updates(&self) -> Vec<UpdateRecord> {
        self.updates.lock().unwrap().clone()
    }

    fn statuses(&self) -> Vec<JobStatus> {
        self.updates().into_iter().map(|(s, _, _)| s).collect()
    }

    fn last(&self) -> UpdateRecord {
        self.updates().last().cloned().expect("no updates recorded")
    }
}

#[async_trait]
impl JobStore for FakeStore {
    async fn create(&self, _job: &Job) -> StoreResult<()> {
        Ok(())
    }

    async fn get(&self, _job_id: uuid::Uuid) -> StoreResult<Option<Job>> {
        Ok(None)
    }

    async fn update(&self, update: JobUpdate) -> StoreResult<()> {
        if self.fail_writes {
            return Err(StoreError::Request("store unreachable".into()));
        }
        self.updates.lock().unwrap().push((
            update.status,
            update.result_url,
            update.error_message,
        ));
        Ok(())
    }
}

#[derive(Default)]
struct FakePublisher {
    published: Mutex<Vec<String>>,
    fail: bool,
}

impl FakePublisher {
    fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    fn published(&self) -> Vec<String> {
        self.published.lock().unwrap().clone()
    }
}

#[async_trait]
impl ObjectPublisher for FakePublisher {
    async fn publish(&self, local_path: &Path, destination_key: &str) -> PublishResult<String> {
        if self.fail {
            return Err(PublishError::UploadFailed("quota exceeded".into()));
        }
        assert!(
            local_path.exists(),
            "published artifact must exist at publish time"
        );
        self.published
            .lock()
            .unwrap()
            .push(destination_key.to_string());
        Ok(format!("https://cdn.example.com/{}", destination_key))
    }
}

#[derive(Default)]
struct FakeFetcher {
    fail_urls: HashSet<String>,
    attempts: Mutex<Vec<String>>,
    workspaces: Mutex<Vec<PathBuf>>,
}

impl FakeFetcher {
    fn failing_on(urls: &[&str]) -> Self {
        Self {
            fail_urls: urls.iter().map(|s| s.to_string()).collect(),
            ..Self::default()
        }
    }

    fn attempts(&self) -> Vec<String> {
        self.attempts.lock().unwrap().clone()
    }

    fn workspaces(&self) -> Vec<PathBuf> {
        self.workspaces.lock().unwrap().clone()
    }
}

#[async_trait]
impl AssetFetcher for FakeFetcher {
    async fn fetch(&self, url: &str, dest: &Path) -> StageResult<u64> {
        self.attempts.lock().unwrap().push(url.to_string());
        if let Some(parent) = dest.parent() {
            self.workspaces.lock().unwrap().push(parent.to_path_buf());
        }
        if self.fail_urls.contains(url) {
            return Err(StageError::Fetch("status 404".into()));
        }
        tokio::fs::write(dest, b"asset-bytes").await.unwrap();
        Ok(11)
    }
}

#[derive(Default)]
struct FakeEngine {
    calls: Mutex<Vec<String>>,
    fail_stage: Option<&'static str>,
    block_stage: Option<&'static str>,
}

impl FakeEngine {
    fn failing_at(stage: &'static str) -> Self {
        Self {
            fail_stage: Some(stage),
            ..Self::default()
        }
    }

    fn blocking_at(stage: &'static str) -> Self {
        Self {
            block_stage: Some(stage),
            ..Self::default()
        }
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    async fn stage(&self, name: &'static str, record: String, out: &Path) -> StageResult<()> {
        self.calls.lock().unwrap().push(record);
        if self.block_stage == Some(name) {
            futures::future::pending::<()>().await;
        }
        if self.fail_stage == Some(name) {
            let failure = EngineFailure::new(Some(1), "engine diagnostic output");
            return Err(match name {
                "synthesize" => StageError::Synthesis(failure),
                "assemble" => StageError::Assembly(failure),
                "composite" => StageError::Composite(failure),
                _ => StageError::Mix(failure),
            });
        }
        tokio::fs::write(out, b"rendered").await.unwrap();
        Ok(())
    }
}

#[async_trait]
impl RenderEngine for FakeEngine {
    async fn synthesize_clip(&self, image: &Path, out: &Path) -> StageResult<()> {
        assert!(image.exists(), "stage input must come from the fetcher");
        let name = out.file_name().unwrap().to_string_lossy().to_string();
        self.stage("synthesize", format!("synthesize:{}", name), out).await
    }

    async fn assemble(&self, clips: &[PathBuf], out: &Path) -> StageResult<()> {
        let order: Vec<String> = clips
            .iter()
            .map(|c| c.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        self.stage("assemble", format!("assemble:{}", order.join(",")), out)
            .await
    }

    async fn composite_overlay(&self, base: &Path, _overlay: &Path, out: &Path) -> StageResult<()> {
        assert!(base.exists());
        self.stage("composite", "composite".to_string(), out).await
    }

    async fn mix_audio(&self, video: &Path, audio: &Path, out: &Path) -> StageResult<()> {
        assert!(video.exists());
        assert!(audio.exists(), "audio track must be fetched before mixing");
        self.stage("mix", "mix".to_string(), out).await
    }
}

// --- Wiring ----------------------------------------------------------------

fn test_config(overlay: Option<PathBuf>) -> AppConfig {
    AppConfig {
        store: StoreConfig {
            base_url: "http://localhost:8000".into(),
            api_key: "test".into(),
            bucket: "generated-videos".into(),
        },
        render: RenderConfig {
            ffmpeg_path: "ffmpeg".into(),
            ffprobe_path: "ffprobe".into(),
            width: 1024,
            height: 720,
            fps: 30,
            seconds_per_image: 3.0,
            zoom_start: 1.0,
            zoom_end: 1.25,
            pan: PanDirection::Center,
            overlay_path: overlay,
            overlay_opacity: 0.35,
            audio_fade_secs: 0.5,
            audio_bitrate: "192k".into(),
            x264_preset: "fast".into(),
            x264_crf: 23,
        },
        fetch: FetchConfig {
            timeout_secs: 5,
            max_bytes: 1024 * 1024,
        },
        queue: QueueConfig {
            max_concurrent_jobs: 2,
            channel_capacity: 8,
        },
        workspace_root: None,
    }
}

struct Harness {
    store: Arc<FakeStore>,
    publisher: Arc<FakePublisher>,
    fetcher: Arc<FakeFetcher>,
    engine: Arc<FakeEngine>,
    orchestrator: Arc<Orchestrator>,
}

fn harness(
    store: FakeStore,
    publisher: FakePublisher,
    fetcher: FakeFetcher,
    engine: FakeEngine,
    overlay: Option<PathBuf>,
) -> Harness {
    let store = Arc::new(store);
    let publisher = Arc::new(publisher);
    let fetcher = Arc::new(fetcher);
    let engine = Arc::new(engine);
    let orchestrator = Arc::new(Orchestrator::new(
        store.clone(),
        publisher.clone(),
        fetcher.clone(),
        engine.clone(),
        test_config(overlay),
    ));
    Harness {
        store,
        publisher,
        fetcher,
        engine,
        orchestrator,
    }
}

fn job_with_images(n: usize) -> Job {
    let images = (0..n)
        .map(|i| format!("https://cdn.example.com/img-{}.jpg", i))
        .collect();
    Job::new("alice", images, "https://cdn.example.com/music.mp3").unwrap()
}

async fn wait_until<F: Fn() -> bool>(cond: F) {
    for _ in 0..500 {
        if cond() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("condition not reached within timeout");
}

// --- Tests -----------------------------------------------------------------

#[tokio::test]
async fn successful_run_walks_the_full_state_machine() {
    let h = harness(
        FakeStore::default(),
        FakePublisher::default(),
        FakeFetcher::default(),
        FakeEngine::default(),
        None,
    );
    let job = job_with_images(2);
    let job_id = job.id;

    h.orchestrator.run(job, CancellationToken::new()).await;

    assert_eq!(
        h.store.statuses(),
        vec![JobStatus::Processing, JobStatus::Uploading, JobStatus::Completed]
    );
    let (status, result_url, error_message) = h.store.last();
    assert_eq!(status, JobStatus::Completed);
    let url = result_url.expect("completed job must carry a result url");
    assert!(url.contains(&format!("user_alice/video-{}.mp4", job_id)));
    assert!(error_message.is_none());

    assert_eq!(
        h.publisher.published(),
        vec![format!("user_alice/video-{}.mp4", job_id)]
    );
}

#[tokio::test]
async fn clips_are_assembled_in_input_order() {
    let h = harness(
        FakeStore::default(),
        FakePublisher::default(),
        FakeFetcher::default(),
        FakeEngine::default(),
        None,
    );

    h.orchestrator
        .run(job_with_images(3), CancellationToken::new())
        .await;

    let calls = h.engine.calls();
    assert_eq!(
        calls,
        vec![
            "synthesize:clip-0.mp4",
            "synthesize:clip-1.mp4",
            "synthesize:clip-2.mp4",
            "assemble:clip-0.mp4,clip-1.mp4,clip-2.mp4",
            "mix",
        ]
    );
}

#[tokio::test]
async fn workspace_is_removed_after_success() {
    let h = harness(
        FakeStore::default(),
        FakePublisher::default(),
        FakeFetcher::default(),
        FakeEngine::default(),
        None,
    );

    h.orchestrator
        .run(job_with_images(1), CancellationToken::new())
        .await;

    let workspaces = h.fetcher.workspaces();
    assert!(!workspaces.is_empty());
    for ws in workspaces {
        assert!(!ws.exists(), "workspace {} leaked", ws.display());
    }
}

#[tokio::test]
async fn single_download_failure_fails_the_job_with_asset_tag() {
    let h = harness(
        FakeStore::default(),
        FakePublisher::default(),
        FakeFetcher::failing_on(&["https://cdn.example.com/img-1.jpg"]),
        FakeEngine::default(),
        None,
    );

    h.orchestrator
        .run(job_with_images(3), CancellationToken::new())
        .await;

    let (status, result_url, error_message) = h.store.last();
    assert_eq!(status, JobStatus::Failed);
    assert!(result_url.is_none());
    let message = error_message.unwrap();
    assert!(message.starts_with("fetch: image[1]"), "got: {}", message);
    assert!(message.contains("https://cdn.example.com/img-1.jpg"));
    assert!(message.contains("status 404"));

    // No partial video is published.
    assert!(h.publisher.published().is_empty());
    // Sibling downloads drained: 3 images + 1 audio all attempted.
    assert_eq!(h.fetcher.attempts().len(), 4);
    // Workspace cleaned up on the failure path too.
    for ws in h.fetcher.workspaces() {
        assert!(!ws.exists());
    }
}

#[tokio::test]
async fn overlay_stage_is_skipped_without_configuration() {
    let h = harness(
        FakeStore::default(),
        FakePublisher::default(),
        FakeFetcher::default(),
        FakeEngine::default(),
        None,
    );
    h.orchestrator
        .run(job_with_images(1), CancellationToken::new())
        .await;
    assert!(!h.engine.calls().iter().any(|c| c == "composite"));
    assert_eq!(h.store.last().0, JobStatus::Completed);
}

#[tokio::test]
async fn overlay_stage_runs_when_configured() {
    let h = harness(
        FakeStore::default(),
        FakePublisher::default(),
        FakeFetcher::default(),
        FakeEngine::default(),
        Some(PathBuf::from("/assets/dust.webm")),
    );
    h.orchestrator
        .run(job_with_images(1), CancellationToken::new())
        .await;
    let calls = h.engine.calls();
    let composite_at = calls.iter().position(|c| c == "composite").unwrap();
    let mix_at = calls.iter().position(|c| c == "mix").unwrap();
    assert!(composite_at < mix_at);
    assert_eq!(h.store.last().0, JobStatus::Completed);
}

#[tokio::test]
async fn mix_failure_records_stage_tagged_message() {
    let h = harness(
        FakeStore::default(),
        FakePublisher::default(),
        FakeFetcher::default(),
        FakeEngine::failing_at("mix"),
        None,
    );
    h.orchestrator
        .run(job_with_images(1), CancellationToken::new())
        .await;

    let (status, _, error_message) = h.store.last();
    assert_eq!(status, JobStatus::Failed);
    let message = error_message.unwrap();
    assert!(message.starts_with("mix:"), "got: {}", message);
    assert!(message.contains("engine diagnostic output"));
    assert!(h.publisher.published().is_empty());
}

#[tokio::test]
async fn publish_failure_fails_the_job_after_uploading_transition() {
    let h = harness(
        FakeStore::default(),
        FakePublisher::failing(),
        FakeFetcher::default(),
        FakeEngine::default(),
        None,
    );
    h.orchestrator
        .run(job_with_images(1), CancellationToken::new())
        .await;

    assert_eq!(
        h.store.statuses(),
        vec![JobStatus::Processing, JobStatus::Uploading, JobStatus::Failed]
    );
    let message = h.store.last().2.unwrap();
    assert!(message.starts_with("publish:"), "got: {}", message);
    assert!(message.contains("quota exceeded"));
}

#[tokio::test]
async fn store_write_failures_do_not_abort_the_render() {
    let h = harness(
        FakeStore::failing(),
        FakePublisher::default(),
        FakeFetcher::default(),
        FakeEngine::default(),
        None,
    );
    h.orchestrator
        .run(job_with_images(1), CancellationToken::new())
        .await;

    // The pipeline itself ran to completion and published the artifact.
    assert_eq!(h.publisher.published().len(), 1);
}

#[tokio::test]
async fn cancellation_fails_the_job_and_cleans_the_workspace() {
    let h = harness(
        FakeStore::default(),
        FakePublisher::default(),
        FakeFetcher::default(),
        FakeEngine::blocking_at("mix"),
        None,
    );
    let cancel = CancellationToken::new();

    let orchestrator = h.orchestrator.clone();
    let token = cancel.clone();
    let run = tokio::spawn(async move {
        orchestrator.run(job_with_images(1), token).await;
    });

    // Wait until the pipeline is inside the blocking stage, then cancel.
    let engine = h.engine.clone();
    wait_until(move || engine.calls().iter().any(|c| c == "mix")).await;
    cancel.cancel();
    run.await.unwrap();

    let (status, result_url, error_message) = h.store.last();
    assert_eq!(status, JobStatus::Failed);
    assert!(result_url.is_none());
    assert_eq!(error_message.as_deref(), Some("cancelled"));
    assert!(h.publisher.published().is_empty());
    for ws in h.fetcher.workspaces() {
        assert!(!ws.exists(), "cancelled workspace {} leaked", ws.display());
    }
}

#[tokio::test]
async fn concurrent_jobs_use_isolated_workspaces() {
    let h = harness(
        FakeStore::default(),
        FakePublisher::default(),
        FakeFetcher::default(),
        FakeEngine::default(),
        None,
    );
    let queue = JobQueue::new(h.orchestrator.clone(), test_config(None).queue);

    queue.submit(job_with_images(2)).await.unwrap();
    queue.submit(job_with_images(2)).await.unwrap();

    let store = h.store.clone();
    wait_until(move || {
        store
            .statuses()
            .iter()
            .filter(|s| **s == JobStatus::Completed)
            .count()
            == 2
    })
    .await;

    // Each job fetched into its own directory; the two sets never overlap.
    let workspaces: HashSet<PathBuf> = h.fetcher.workspaces().into_iter().collect();
    assert_eq!(workspaces.len(), 2);
    assert_eq!(h.publisher.published().len(), 2);
    assert_eq!(queue.active_jobs().await, 0);
}

#[tokio::test]
async fn duplicate_submission_is_rejected_while_active() {
    let h = harness(
        FakeStore::default(),
        FakePublisher::default(),
        FakeFetcher::default(),
        FakeEngine::blocking_at("mix"),
        None,
    );
    let queue = JobQueue::new(h.orchestrator.clone(), test_config(None).queue);
    let job = job_with_images(1);
    let job_id = job.id;

    queue.submit(job.clone()).await.unwrap();
    let engine = h.engine.clone();
    wait_until(move || engine.calls().iter().any(|c| c == "mix")).await;

    match queue.submit(job).await {
        Err(slidecast_worker::SubmitError::AlreadyActive(id)) => assert_eq!(id, job_id),
        other => panic!("expected AlreadyActive, got {:?}", other.map(|_| ())),
    }

    assert!(queue.cancel(job_id).await);
    let store = h.store.clone();
    wait_until(move || store.statuses().last() == Some(&JobStatus::Failed)).await;

    // Cancelling an already-finished job is a no-op.
    for _ in 0..500 {
        if queue.active_jobs().await == 0 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(queue.active_jobs().await, 0);
    assert!(!queue.cancel(job_id).await);
}
