//! Render worker binary.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use tokio::sync::watch;
use tracing::{info, warn};

use vreel_media::{
    check_ffmpeg, check_ffprobe, probe_capabilities, sweep_orphaned, AssetDownloader, Compositor, FfmpegEngine,
    ProgressSink,
};
use vreel_models::font::DEFAULT_FONT_FILE;
use vreel_models::{AspectPreset, FontSelection, RenderRequest, Theme};
use vreel_sources::{PixabayClient, QuranComClient};
use vreel_worker::{logging, metrics, RenderPipeline, WorkerConfig};

#[derive(Debug, Parser)]
#[command(name = "vreel-worker", version, about = "Render narrated verse videos")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Render a verse range to an MP4 file
    Render(RenderArgs),
    /// Print the text-rendering capabilities of the local FFmpeg
    Probe,
}

#[derive(Debug, Args)]
struct RenderArgs {
    #[arg(long)]
    chapter: u32,
    #[arg(long)]
    from: u32,
    #[arg(long)]
    to: u32,
    #[arg(long)]
    reciter: u32,
    #[arg(long, default_value = "nature")]
    theme: Theme,
    /// Show commentary under each verse
    #[arg(long)]
    tafsir: bool,
    /// Background dimming opacity
    #[arg(long, default_value_t = 0.5)]
    dim: f64,
    #[arg(long, default_value = "16:9")]
    aspect: AspectPreset,
    #[arg(long, default_value = DEFAULT_FONT_FILE)]
    font: String,
    /// Destination file; a directory receives the deterministic file name
    #[arg(long)]
    out: PathBuf,
}

impl RenderArgs {
    fn to_request(&self) -> RenderRequest {
        let mut request = RenderRequest::new(self.chapter, self.from, self.to, self.reciter);
        request.theme = self.theme;
        request.include_tafsir = self.tafsir;
        request.dim_opacity = self.dim;
        request.aspect = self.aspect;
        request.font = FontSelection::new(self.font.clone());
        request
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Install rustls crypto provider (required for TLS/HTTPS)
    if rustls::crypto::ring::default_provider().install_default().is_err() {
        eprintln!("rustls crypto provider already installed");
    }

    dotenvy::dotenv().ok();
    logging::init_tracing();

    let cli = Cli::parse();
    let config = WorkerConfig::from_env();
    info!(work_dir = %config.work_dir.display(), backend = ?config.overlay_backend, "Starting vreel-worker");

    if let Some(addr) = config.metrics_addr {
        metrics::install_exporter(addr).context("failed to install Prometheus exporter")?;
        info!(%addr, "Metrics exporter listening");
    }

    match cli.command {
        Command::Probe => probe(&config).await,
        Command::Render(args) => render(&config, &args).await,
    }
}

async fn probe(config: &WorkerConfig) -> anyhow::Result<()> {
    let ffmpeg = check_ffmpeg()?;
    let ffprobe = check_ffprobe()?;
    let caps = probe_capabilities(config.step_timeout).await?;

    println!("ffmpeg:      {}", ffmpeg.display());
    println!("ffprobe:     {}", ffprobe.display());
    println!("{}", serde_json::to_string_pretty(&caps)?);
    println!(
        "overlay:     {}",
        if caps.supports_native_shaping() {
            "native_shaping"
        } else {
            "fallback"
        }
    );
    Ok(())
}

async fn render(config: &WorkerConfig, args: &RenderArgs) -> anyhow::Result<()> {
    tokio::fs::create_dir_all(&config.work_dir)
        .await
        .with_context(|| format!("failed to create work dir {}", config.work_dir.display()))?;

    match sweep_orphaned(&config.work_dir, config.orphan_max_age).await {
        Ok(0) => {}
        Ok(removed) => info!(removed, "Removed orphaned scratch directories"),
        Err(e) => warn!(error = %e, "Orphan sweep failed"),
    }

    let content = Arc::new(QuranComClient::new(config.quran_config())?);
    let Some(pixabay_config) = config.pixabay_config() else {
        bail!("PIXABAY_API_KEY must be set to search background videos");
    };
    let background = Arc::new(PixabayClient::new(pixabay_config)?);

    let (cancel_tx, cancel_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Received shutdown signal, cancelling render");
            let _ = cancel_tx.send(true);
        }
    });

    let compositor = Compositor::new(
        Arc::new(FfmpegEngine::new(config.step_timeout, config.encode_timeout)),
        AssetDownloader::new(config.step_timeout)?,
        config.compositor_config(),
    )
    .with_cancel(cancel_rx);

    let pipeline = RenderPipeline::new(content.clone(), content, background, compositor);

    let progress: ProgressSink = Arc::new(|percent: u8| info!(percent, "Encode progress"));
    let request = args.to_request();

    let output = match pipeline.render(&request, Some(progress)).await {
        Ok(output) => output,
        // Diagnostics were logged by the pipeline
        Err(e) => bail!(e.user_message()),
    };

    let dest = if args.out.is_dir() {
        args.out.join(output.file_name())
    } else {
        args.out.clone()
    };
    let bytes = output.content_length().await?;
    let dest = output.persist_to(&dest).await?;

    info!(path = %dest.display(), bytes, "Video written");
    println!("{}", dest.display());
    Ok(())
}
