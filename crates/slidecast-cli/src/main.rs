//! Slidecast CLI — submit a render job and drive it to a terminal status.
//!
//! Set SLIDECAST_STORE_URL and SLIDECAST_STORE_KEY (see `AppConfig::from_env`
//! for the optional knobs). Ctrl-C cancels the in-flight job, which records a
//! `failed` status and removes the workspace before exiting.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use slidecast_core::config::AppConfig;
use slidecast_core::models::{Job, JobStatus};
use slidecast_engine::{FfmpegEngine, HttpFetcher};
use slidecast_records::{HttpJobStore, JobStore};
use slidecast_storage::{HttpBucket, LocalBucket, ObjectPublisher};
use slidecast_worker::Orchestrator;

#[derive(Parser)]
#[command(name = "slidecast", about = "Slideshow video render pipeline CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a slideshow video from image URLs and an audio track
    Render {
        /// Job owner, used in the destination key
        #[arg(long)]
        user: String,
        /// Image URL, repeatable, in slideshow order
        #[arg(long = "image", required = true)]
        images: Vec<String>,
        /// Background audio URL
        #[arg(long)]
        audio: String,
        /// Publish into a local directory instead of the object store
        #[arg(long)]
        publish_dir: Option<PathBuf>,
    },
    /// Show a job record by id
    Status {
        /// Job UUID
        id: Uuid,
    },
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
}

async fn publisher_for(
    client: &reqwest::Client,
    config: &AppConfig,
    publish_dir: Option<PathBuf>,
) -> anyhow::Result<Arc<dyn ObjectPublisher>> {
    match publish_dir {
        Some(dir) => {
            let base_url = format!("file://{}", dir.display());
            let bucket = LocalBucket::new(dir, base_url)
                .await
                .context("Create local publish directory")?;
            Ok(Arc::new(bucket))
        }
        None => Ok(Arc::new(HttpBucket::new(
            client.clone(),
            &config.store.base_url,
            &config.store.bucket,
            &config.store.api_key,
        ))),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env()
        .context("Failed to load configuration. Set SLIDECAST_STORE_URL and SLIDECAST_STORE_KEY")?;

    let client = reqwest::Client::new();
    let job_store = Arc::new(HttpJobStore::new(
        client.clone(),
        &config.store.base_url,
        &config.store.api_key,
    ));

    let cli = Cli::parse();

    match cli.command {
        Commands::Render {
            user,
            images,
            audio,
            publish_dir,
        } => {
            let job = Job::new(user, images, audio)?;
            let job_id = job.id;
            job_store.create(&job).await.context("Create job record")?;

            let publisher = publisher_for(&client, &config, publish_dir).await?;
            let fetcher = Arc::new(HttpFetcher::new(client.clone(), config.fetch.clone()));
            let engine = Arc::new(FfmpegEngine::new(config.render.clone()));
            let orchestrator = Orchestrator::new(
                job_store.clone(),
                publisher,
                fetcher,
                engine,
                config,
            );

            let cancel = CancellationToken::new();
            let signal_cancel = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    tracing::warn!("Interrupt received, cancelling job");
                    signal_cancel.cancel();
                }
            });

            orchestrator.run(job, cancel).await;

            let record = job_store
                .get(job_id)
                .await
                .context("Fetch final job record")?
                .with_context(|| format!("Job {} not found after run", job_id))?;
            println!("{}", serde_json::to_string_pretty(&record)?);
            if record.status == JobStatus::Failed {
                anyhow::bail!(
                    "job {} failed: {}",
                    job_id,
                    record.error_message.as_deref().unwrap_or("unknown error")
                );
            }
        }
        Commands::Status { id } => {
            let record = job_store
                .get(id)
                .await
                .context("Fetch job record")?
                .with_context(|| format!("Job {} not found", id))?;
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
    }

    Ok(())
}
