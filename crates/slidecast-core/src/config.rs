//! Configuration module
//!
//! Typed configuration for the worker, loaded once at startup from the
//! environment (binaries load `.env` first) and validated before anything is
//! constructed. Components receive these structs by reference; there is no
//! ambient global lookup.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

// Defaults
const DEFAULT_WIDTH: u32 = 1024;
const DEFAULT_HEIGHT: u32 = 720;
const DEFAULT_FPS: u32 = 30;
const DEFAULT_SECONDS_PER_IMAGE: f64 = 3.0;
const DEFAULT_ZOOM_START: f64 = 1.0;
const DEFAULT_ZOOM_END: f64 = 1.25;
const DEFAULT_OVERLAY_OPACITY: f64 = 0.35;
const DEFAULT_AUDIO_FADE_SECS: f64 = 0.5;
const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 60;
const DEFAULT_FETCH_MAX_BYTES: u64 = 50 * 1024 * 1024;
const DEFAULT_MAX_CONCURRENT_JOBS: usize = 2;
const DEFAULT_QUEUE_CAPACITY: usize = 64;

/// Pan direction applied on top of the zoom transform when synthesizing a
/// clip from a still image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanDirection {
    Center,
    Left,
    Right,
    Up,
    Down,
}

impl FromStr for PanDirection {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "center" => Ok(PanDirection::Center),
            "left" => Ok(PanDirection::Left),
            "right" => Ok(PanDirection::Right),
            "up" => Ok(PanDirection::Up),
            "down" => Ok(PanDirection::Down),
            _ => Err(anyhow::anyhow!("Invalid pan direction: {}", s)),
        }
    }
}

/// Media-engine and effect parameters shared by every clip in a job.
/// Resolution, frame rate, and pixel format are pipeline invariants: the
/// assembler concatenates without re-encoding only because these are uniform.
#[derive(Clone, Debug)]
pub struct RenderConfig {
    pub ffmpeg_path: String,
    pub ffprobe_path: String,
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    pub seconds_per_image: f64,
    pub zoom_start: f64,
    pub zoom_end: f64,
    pub pan: PanDirection,
    /// Decorative overlay video; `None` means the composite stage is skipped.
    pub overlay_path: Option<PathBuf>,
    pub overlay_opacity: f64,
    pub audio_fade_secs: f64,
    pub audio_bitrate: String,
    pub x264_preset: String,
    pub x264_crf: u32,
}

/// Asset download budgets. A single attempt per asset; resilience comes from
/// bounding time and size, not from retries.
#[derive(Clone, Debug)]
pub struct FetchConfig {
    pub timeout_secs: u64,
    pub max_bytes: u64,
}

/// Job Store endpoint (PostgREST-style row store over HTTP).
#[derive(Clone, Debug)]
pub struct StoreConfig {
    pub base_url: String,
    pub api_key: String,
    pub bucket: String,
}

#[derive(Clone, Debug)]
pub struct QueueConfig {
    pub max_concurrent_jobs: usize,
    pub channel_capacity: usize,
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub store: StoreConfig,
    pub render: RenderConfig,
    pub fetch: FetchConfig,
    pub queue: QueueConfig,
    /// Parent directory for per-job workspaces; system temp dir when unset.
    pub workspace_root: Option<PathBuf>,
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parse<T: FromStr>(key: &str, default: T) -> anyhow::Result<T> {
    match env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|_| anyhow::anyhow!("Invalid value for {}: {}", key, raw)),
        Err(_) => Ok(default),
    }
}

impl AppConfig {
    /// Load configuration from the environment. Missing optional values fall
    /// back to defaults; malformed values are startup errors. Binaries load
    /// `.env` before calling this.
    pub fn from_env() -> anyhow::Result<Self> {
        let store = StoreConfig {
            base_url: env::var("SLIDECAST_STORE_URL")
                .map_err(|_| anyhow::anyhow!("SLIDECAST_STORE_URL is required"))?,
            api_key: env::var("SLIDECAST_STORE_KEY")
                .map_err(|_| anyhow::anyhow!("SLIDECAST_STORE_KEY is required"))?,
            bucket: env_or("SLIDECAST_STORE_BUCKET", "generated-videos"),
        };

        let render = RenderConfig {
            ffmpeg_path: env_or("SLIDECAST_FFMPEG_PATH", "ffmpeg"),
            ffprobe_path: env_or("SLIDECAST_FFPROBE_PATH", "ffprobe"),
            width: env_parse("SLIDECAST_VIDEO_WIDTH", DEFAULT_WIDTH)?,
            height: env_parse("SLIDECAST_VIDEO_HEIGHT", DEFAULT_HEIGHT)?,
            fps: env_parse("SLIDECAST_VIDEO_FPS", DEFAULT_FPS)?,
            seconds_per_image: env_parse("SLIDECAST_SECONDS_PER_IMAGE", DEFAULT_SECONDS_PER_IMAGE)?,
            zoom_start: env_parse("SLIDECAST_ZOOM_START", DEFAULT_ZOOM_START)?,
            zoom_end: env_parse("SLIDECAST_ZOOM_END", DEFAULT_ZOOM_END)?,
            pan: env_or("SLIDECAST_PAN_DIRECTION", "center").parse()?,
            overlay_path: env::var("SLIDECAST_OVERLAY_PATH").ok().map(PathBuf::from),
            overlay_opacity: env_parse("SLIDECAST_OVERLAY_OPACITY", DEFAULT_OVERLAY_OPACITY)?,
            audio_fade_secs: env_parse("SLIDECAST_AUDIO_FADE_SECS", DEFAULT_AUDIO_FADE_SECS)?,
            audio_bitrate: env_or("SLIDECAST_AUDIO_BITRATE", "192k"),
            x264_preset: env_or("SLIDECAST_X264_PRESET", "fast"),
            x264_crf: env_parse("SLIDECAST_X264_CRF", 23)?,
        };

        let fetch = FetchConfig {
            timeout_secs: env_parse("SLIDECAST_FETCH_TIMEOUT_SECS", DEFAULT_FETCH_TIMEOUT_SECS)?,
            max_bytes: env_parse("SLIDECAST_FETCH_MAX_BYTES", DEFAULT_FETCH_MAX_BYTES)?,
        };

        let queue = QueueConfig {
            max_concurrent_jobs: env_parse(
                "SLIDECAST_MAX_CONCURRENT_JOBS",
                DEFAULT_MAX_CONCURRENT_JOBS,
            )?,
            channel_capacity: env_parse("SLIDECAST_QUEUE_CAPACITY", DEFAULT_QUEUE_CAPACITY)?,
        };

        let config = Self {
            store,
            render,
            fetch,
            queue,
            workspace_root: env::var("SLIDECAST_WORKSPACE_ROOT").ok().map(PathBuf::from),
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate invariants once at startup so stage code can assume them.
    pub fn validate(&self) -> anyhow::Result<()> {
        let r = &self.render;
        if r.width == 0 || r.height == 0 {
            anyhow::bail!("video dimensions must be non-zero");
        }
        if r.width % 2 != 0 || r.height % 2 != 0 {
            anyhow::bail!("video dimensions must be even for yuv420p output");
        }
        if r.fps == 0 {
            anyhow::bail!("frame rate must be non-zero");
        }
        if r.seconds_per_image <= 0.0 {
            anyhow::bail!("seconds per image must be positive");
        }
        if r.zoom_start < 1.0 || r.zoom_end < r.zoom_start {
            anyhow::bail!(
                "zoom range must satisfy 1.0 <= start <= end, got {}..{}",
                r.zoom_start,
                r.zoom_end
            );
        }
        if !(0.0..=1.0).contains(&r.overlay_opacity) {
            anyhow::bail!("overlay opacity must be within 0.0..=1.0");
        }
        if r.audio_fade_secs < 0.0 {
            anyhow::bail!("audio fade must be non-negative");
        }
        if self.fetch.max_bytes == 0 || self.fetch.timeout_secs == 0 {
            anyhow::bail!("fetch budgets must be non-zero");
        }
        if self.queue.max_concurrent_jobs == 0 {
            anyhow::bail!("max concurrent jobs must be non-zero");
        }
        Ok(())
    }
}
