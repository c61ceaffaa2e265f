//! Pipeline orchestrator: drives one job from `pending` to a terminal state.
//!
//! `run` never returns an error to its caller; every stage failure is caught
//! here, converted into a `failed` record with a stage-tagged message, and the
//! workspace is removed on every exit path. Job Store writes that fail are
//! logged and swallowed: the orchestrator cannot recover a bookkeeping write
//! and will not crash a render over one.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;

use slidecast_core::config::AppConfig;
use slidecast_core::error::{StageError, StageResult};
use slidecast_core::models::{Job, JobUpdate};
use slidecast_engine::fetch::extension_from_url;
use slidecast_engine::{AssetFetcher, RenderEngine};
use slidecast_records::JobStore;
use slidecast_storage::ObjectPublisher;

use crate::workspace::Workspace;

struct FetchedAssets {
    images: Vec<PathBuf>,
    audio: PathBuf,
}

pub struct Orchestrator {
    job_store: Arc<dyn JobStore>,
    publisher: Arc<dyn ObjectPublisher>,
    fetcher: Arc<dyn AssetFetcher>,
    engine: Arc<dyn RenderEngine>,
    config: AppConfig,
}

impl Orchestrator {
    pub fn new(
        job_store: Arc<dyn JobStore>,
        publisher: Arc<dyn ObjectPublisher>,
        fetcher: Arc<dyn AssetFetcher>,
        engine: Arc<dyn RenderEngine>,
        config: AppConfig,
    ) -> Self {
        Self {
            job_store,
            publisher,
            fetcher,
            engine,
            config,
        }
    }

    /// Run one job to a terminal state. Cancelling the token aborts in-flight
    /// stages (child processes are reaped via kill-on-drop), records a
    /// distinguished `cancelled` failure, and still removes the workspace.
    pub async fn run(&self, job: Job, cancel: CancellationToken) {
        let started = Instant::now();
        let job_id = job.id;
        tracing::info!(
            job_id = %job_id,
            user_id = %job.user_id,
            images = job.image_urls.len(),
            "Starting video generation"
        );

        let outcome = tokio::select! {
            result = self.run_inner(&job) => result,
            _ = cancel.cancelled() => Err(StageError::Cancelled),
        };

        match outcome {
            Ok(()) => {
                tracing::info!(
                    job_id = %job_id,
                    elapsed_secs = started.elapsed().as_secs_f64(),
                    "Video generation completed"
                );
            }
            Err(err) => {
                if err.is_cancelled() {
                    tracing::warn!(job_id = %job_id, "Video generation cancelled");
                } else {
                    tracing::error!(
                        job_id = %job_id,
                        stage = err.stage(),
                        error = %err,
                        "Video generation failed"
                    );
                }
                self.persist(JobUpdate::failed(job_id, err.to_string())).await;
            }
        }
    }

    async fn run_inner(&self, job: &Job) -> StageResult<()> {
        self.persist(JobUpdate::processing(job.id)).await;

        // Workspace lives for the rest of this scope; dropping it (normal
        // return, error, or the run future being cancelled) removes it.
        let workspace = Workspace::create(self.config.workspace_root.as_deref(), &job.short_id())
            .map_err(|e| StageError::Workspace(e.to_string()))?;
        tracing::debug!(job_id = %job.id, workspace = %workspace.path().display(), "Workspace acquired");

        let assets = self.fetch_assets(job, &workspace).await?;

        // Input order is preserved into the slideshow regardless of how the
        // stages schedule their work.
        let mut clips = Vec::with_capacity(assets.images.len());
        for (index, image) in assets.images.iter().enumerate() {
            let clip = workspace.file(&format!("clip-{}.mp4", index));
            self.engine.synthesize_clip(image, &clip).await?;
            clips.push(clip);
        }

        let slideshow = workspace.file("slideshow.mp4");
        self.engine.assemble(&clips, &slideshow).await?;

        let video = match &self.config.render.overlay_path {
            Some(overlay) => {
                let composited = workspace.file("composited.mp4");
                self.engine
                    .composite_overlay(&slideshow, overlay, &composited)
                    .await?;
                composited
            }
            None => {
                tracing::debug!(job_id = %job.id, "No overlay configured, passing slideshow through");
                slideshow
            }
        };

        let final_path = workspace.file(&format!("video-{}.mp4", job.id));
        self.engine
            .mix_audio(&video, &assets.audio, &final_path)
            .await?;

        self.persist(JobUpdate::uploading(job.id)).await;

        let destination_key = format!("user_{}/video-{}.mp4", job.user_id, job.id);
        let public_url = self
            .publisher
            .publish(&final_path, &destination_key)
            .await
            .map_err(|e| StageError::Publish(e.to_string()))?;

        self.persist(JobUpdate::completed(job.id, public_url)).await;
        Ok(())
    }

    /// Fan out all downloads concurrently. First failure (in input order)
    /// wins, but every sibling download runs to completion first so nothing
    /// is still writing into the workspace when it is torn down.
    async fn fetch_assets(&self, job: &Job, workspace: &Workspace) -> StageResult<FetchedAssets> {
        let images: Vec<PathBuf> = job
            .image_urls
            .iter()
            .enumerate()
            .map(|(i, url)| workspace.file(&format!("image-{}{}", i, extension_from_url(url, ".jpg"))))
            .collect();
        let audio = workspace.file(&format!(
            "audio{}",
            extension_from_url(&job.audio_url, ".mp3")
        ));

        let mut downloads = Vec::with_capacity(images.len() + 1);
        for (i, (url, dest)) in job.image_urls.iter().zip(&images).enumerate() {
            downloads.push(self.fetch_one(format!("image[{}]", i), url, dest.clone()));
        }
        downloads.push(self.fetch_one("audio".to_string(), &job.audio_url, audio.clone()));

        let results = futures::future::join_all(downloads).await;
        for result in results {
            result?;
        }

        tracing::debug!(
            job_id = %job.id,
            images = images.len(),
            "All assets downloaded"
        );
        Ok(FetchedAssets { images, audio })
    }

    async fn fetch_one(&self, label: String, url: &str, dest: PathBuf) -> StageResult<()> {
        match self.fetcher.fetch(url, &dest).await {
            Ok(_) => Ok(()),
            Err(StageError::Fetch(detail)) => {
                Err(StageError::Fetch(format!("{} ({}): {}", label, url, detail)))
            }
            Err(other) => Err(other),
        }
    }

    async fn persist(&self, update: JobUpdate) {
        let job_id = update.job_id;
        let status = update.status;
        if let Err(e) = self.job_store.update(update).await {
            // Recorded-state risk: the transition happened but the record
            // write did not. Logged, not fatal.
            tracing::error!(job_id = %job_id, status = %status, error = %e, "Job store update failed");
        }
    }
}
