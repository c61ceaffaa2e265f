//! [`RenderEngine`] seam and its ffmpeg-backed implementation.

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use slidecast_core::config::RenderConfig;
use slidecast_core::error::{EngineFailure, StageError, StageResult};

use crate::clip;
use crate::command::run_engine;
use crate::concat;
use crate::mix;
use crate::overlay;
use crate::probe;

/// Media stages the orchestrator drives. One implementation wraps ffmpeg;
/// tests substitute fakes so pipeline control flow can be exercised without
/// an engine on the path.
#[async_trait]
pub trait RenderEngine: Send + Sync {
    /// Render a fixed-duration pan/zoom clip from a still image.
    async fn synthesize_clip(&self, image: &Path, out: &Path) -> StageResult<()>;

    /// Concatenate the ordered clips into one slideshow stream.
    async fn assemble(&self, clips: &[PathBuf], out: &Path) -> StageResult<()>;

    /// Blend the configured overlay video onto the base stream.
    async fn composite_overlay(&self, base: &Path, overlay: &Path, out: &Path) -> StageResult<()>;

    /// Attach the audio track, looped or trimmed to the video duration.
    async fn mix_audio(&self, video: &Path, audio: &Path, out: &Path) -> StageResult<()>;
}

pub struct FfmpegEngine {
    config: RenderConfig,
}

impl FfmpegEngine {
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }

    /// A zero-exit engine run that leaves no file behind is still a failure;
    /// surface it instead of letting the next stage trip over a missing input.
    async fn require_output(out: &Path) -> Result<(), EngineFailure> {
        match tokio::fs::metadata(out).await {
            Ok(meta) if meta.len() > 0 => Ok(()),
            Ok(_) => Err(EngineFailure::other(format!(
                "engine produced empty output file {}",
                out.display()
            ))),
            Err(_) => Err(EngineFailure::other(format!(
                "engine produced no output file {}",
                out.display()
            ))),
        }
    }
}

#[async_trait]
impl RenderEngine for FfmpegEngine {
    async fn synthesize_clip(&self, image: &Path, out: &Path) -> StageResult<()> {
        let args = clip::synthesize_args(&self.config, image, out);
        run_engine(&self.config.ffmpeg_path, &args, "synthesize")
            .await
            .map_err(StageError::Synthesis)?;
        Self::require_output(out).await.map_err(StageError::Synthesis)
    }

    async fn assemble(&self, clips: &[PathBuf], out: &Path) -> StageResult<()> {
        if clips.is_empty() {
            return Err(StageError::Assembly(EngineFailure::other(
                "no clips to assemble",
            )));
        }

        let list_path = out.with_extension("txt");
        tokio::fs::write(&list_path, concat::concat_list(clips))
            .await
            .map_err(|e| {
                StageError::Assembly(EngineFailure::other(format!(
                    "cannot write concat list: {}",
                    e
                )))
            })?;

        let args = concat::assemble_args(&list_path, out);
        run_engine(&self.config.ffmpeg_path, &args, "assemble")
            .await
            .map_err(StageError::Assembly)?;
        Self::require_output(out).await.map_err(StageError::Assembly)
    }

    async fn composite_overlay(&self, base: &Path, overlay: &Path, out: &Path) -> StageResult<()> {
        if tokio::fs::metadata(overlay).await.is_err() {
            return Err(StageError::Composite(EngineFailure::other(format!(
                "overlay asset unreadable: {}",
                overlay.display()
            ))));
        }

        let args = overlay::composite_args(&self.config, base, overlay, out);
        run_engine(&self.config.ffmpeg_path, &args, "composite")
            .await
            .map_err(StageError::Composite)?;
        Self::require_output(out).await.map_err(StageError::Composite)
    }

    async fn mix_audio(&self, video: &Path, audio: &Path, out: &Path) -> StageResult<()> {
        let duration = probe::media_duration(&self.config.ffprobe_path, video)
            .await
            .map_err(StageError::Mix)?;
        if duration <= 0.0 {
            return Err(StageError::Mix(EngineFailure::other(
                "video stream has zero duration",
            )));
        }

        let args = mix::mix_args(&self.config, video, audio, duration, out);
        run_engine(&self.config.ffmpeg_path, &args, "mix")
            .await
            .map_err(StageError::Mix)?;
        Self::require_output(out).await.map_err(StageError::Mix)
    }
}

/// Re-encoding assembly for non-uniform clips. Not part of [`RenderEngine`]:
/// the pipeline guarantees uniform clips, so only out-of-band callers need it.
impl FfmpegEngine {
    pub async fn assemble_reencode(&self, clips: &[PathBuf], out: &Path) -> StageResult<()> {
        if clips.is_empty() {
            return Err(StageError::Assembly(EngineFailure::other(
                "no clips to assemble",
            )));
        }
        let args = concat::assemble_reencode_args(&self.config, clips, out);
        run_engine(&self.config.ffmpeg_path, &args, "assemble-reencode")
            .await
            .map_err(StageError::Assembly)?;
        Self::require_output(out).await.map_err(StageError::Assembly)
    }
}
