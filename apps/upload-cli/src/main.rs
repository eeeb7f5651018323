//! VideoHub upload command-line entry point.

mod config;

use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;
use videohub_protocol::{Privacy, UploadEvent, VideoMetadata, VideoResource};
use videohub_transfer::UploadSession;
use videohub_uploader::{HttpUploader, SessionStatus, UploadError};

use config::CliConfig;

#[derive(Parser, Debug)]
#[clap(name = "videohub-upload", version, about = "Resumable video uploads to VideoHub")]
struct Cli {
    /// Configuration file. Defaults to `<config dir>/videohub/config.json`.
    #[clap(long, global = true)]
    config: Option<PathBuf>,

    /// OAuth access token.
    #[clap(long, global = true, env = "VIDEOHUB_ACCESS_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Bytes per chunk request, overriding the config file.
    #[clap(long, global = true)]
    chunk_size: Option<usize>,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Open a session and upload a video file.
    Upload(UploadArgs),

    /// Continue an interrupted upload from the server's acknowledged offset.
    Resume {
        /// Session URL printed when the upload was started.
        session_url: String,
        file: PathBuf,
    },

    /// Ask the server how many bytes of a session it holds.
    Status {
        session_url: String,
        /// Source file, used for its size.
        file: PathBuf,
    },

    /// Write the effective configuration to the config file.
    InitConfig,
}

#[derive(Args, Debug)]
struct UploadArgs {
    file: PathBuf,

    #[clap(long)]
    title: String,

    #[clap(long, default_value = "")]
    description: String,

    /// Comma-separated tags.
    #[clap(long, value_delimiter = ',')]
    tags: Vec<String>,

    /// Category name, e.g. "education" or "music".
    #[clap(long)]
    category: Option<String>,

    /// public, unlisted or private.
    #[clap(long)]
    privacy: Option<Privacy>,

    #[clap(long)]
    made_for_kids: bool,

    /// Media MIME type. Guessed from the file extension when omitted.
    #[clap(long)]
    media_type: Option<String>,
}

impl UploadArgs {
    fn metadata(&self, config: &CliConfig) -> VideoMetadata {
        VideoMetadata {
            title: self.title.clone(),
            description: self.description.clone(),
            tags: self
                .tags
                .iter()
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect(),
            category: self
                .category
                .clone()
                .or_else(|| config.default_category.clone()),
            privacy: self.privacy.unwrap_or(config.default_privacy),
            made_for_kids: self.made_for_kids,
            media_type: self
                .media_type
                .clone()
                .or_else(|| detect_media_type(&self.file).map(str::to_string))
                .unwrap_or_default(),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,videohub=debug")),
        )
        .init();

    let cli = Cli::parse();
    let config_path = cli.config.clone().unwrap_or_else(config::default_config_path);
    let mut cfg = CliConfig::load_from(&config_path)
        .with_context(|| format!("failed to load {}", config_path.display()))?;
    if let Some(chunk_size) = cli.chunk_size {
        cfg.uploader.chunk_size = chunk_size;
    }

    if let Command::InitConfig = cli.command {
        cfg.save_to(&config_path)?;
        println!("{}", config_path.display());
        return Ok(());
    }

    let token = cli
        .token
        .clone()
        .filter(|t| !t.is_empty())
        .or_else(|| (!cfg.access_token.is_empty()).then(|| cfg.access_token.clone()))
        .context("no access token: pass --token or set VIDEOHUB_ACCESS_TOKEN")?;

    let mut uploader = HttpUploader::http(cfg.uploader.clone(), token)?;
    let printer = uploader.take_events().map(|rx| tokio::spawn(print_events(rx)));

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        endpoint = %cfg.uploader.endpoint,
        chunk_size = cfg.uploader.chunk_size(),
        "starting"
    );

    let outcome = run(&uploader, &cfg, cli.command).await;

    drop(uploader);
    if let Some(printer) = printer {
        let _ = printer.await;
    }

    let output = outcome?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

async fn run(
    uploader: &HttpUploader,
    cfg: &CliConfig,
    command: Command,
) -> anyhow::Result<serde_json::Value> {
    match command {
        Command::Upload(args) => {
            let metadata = args.metadata(cfg);
            let content_length = file_size(&args.file).await?;
            let session_url = uploader.initiate(&metadata, content_length).await?;
            // Printed so an interrupted upload can be resumed.
            eprintln!("session: {session_url}");

            let session = UploadSession::new(session_url, content_length);
            let video = cancellable(uploader, uploader.upload(&session, &args.file))
                .await
                .inspect_err(|_| eprintln!("{}", resume_hint(&session, &args.file)))?;
            Ok(describe(&video))
        }
        Command::Resume { session_url, file } => {
            let session = UploadSession::new(session_url, file_size(&file).await?);
            let video = cancellable(uploader, uploader.resume(&session, &file))
                .await
                .inspect_err(|_| eprintln!("{}", resume_hint(&session, &file)))?;
            Ok(describe(&video))
        }
        Command::Status { session_url, file } => {
            let total = file_size(&file).await?;
            Ok(match uploader.query_status(&session_url, total).await? {
                SessionStatus::Incomplete { acknowledged } => serde_json::json!({
                    "state": "incomplete",
                    "acknowledgedBytes": acknowledged,
                    "totalBytes": total,
                }),
                SessionStatus::Complete(video) => describe(&video),
            })
        }
        Command::InitConfig => bail!("init-config is handled before connecting"),
    }
}

/// Drives an upload, cancelling it at the next chunk boundary on Ctrl-C.
async fn cancellable<F>(uploader: &HttpUploader, upload: F) -> Result<VideoResource, UploadError>
where
    F: std::future::Future<Output = Result<VideoResource, UploadError>>,
{
    tokio::pin!(upload);
    loop {
        tokio::select! {
            result = &mut upload => return result,
            _ = tokio::signal::ctrl_c() => {
                eprintln!("cancelling after the current chunk...");
                uploader.cancel();
            }
        }
    }
}

async fn print_events(mut rx: mpsc::Receiver<UploadEvent>) {
    while let Some(event) = rx.recv().await {
        match event {
            UploadEvent::Progress { percentage, message } => {
                eprintln!("[{percentage:5.1}%] {message}");
            }
            UploadEvent::Completed { video_id } => eprintln!("completed: {video_id}"),
            UploadEvent::Failed { error } => eprintln!("failed: {error}"),
            UploadEvent::Cancelled => eprintln!("cancelled"),
        }
    }
}

/// Where an interrupted upload stopped, and the command that continues it.
fn resume_hint(session: &UploadSession, file: &Path) -> String {
    let progress = session.progress();
    format!(
        "stopped at {} of {} bytes ({:.1}%); continue with: videohub-upload resume '{}' '{}'",
        progress.uploaded_bytes,
        progress.total_bytes,
        progress.percentage(),
        session.session_url(),
        file.display()
    )
}

fn describe(video: &VideoResource) -> serde_json::Value {
    let mut value = serde_json::to_value(video).unwrap_or_else(|_| serde_json::json!({}));
    if let Some(url) = video.thumbnail_url() {
        value["thumbnailUrl"] = serde_json::json!(url);
    }
    value
}

async fn file_size(path: &Path) -> anyhow::Result<u64> {
    let metadata = tokio::fs::metadata(path)
        .await
        .with_context(|| format!("cannot read {}", path.display()))?;
    if !metadata.is_file() {
        bail!("{} is not a file", path.display());
    }
    Ok(metadata.len())
}

/// Detects the media MIME type from a file path extension.
fn detect_media_type(path: &Path) -> Option<&'static str> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase());

    match ext.as_deref() {
        Some("mp4") | Some("m4v") => Some("video/mp4"),
        Some("mov") => Some("video/quicktime"),
        Some("webm") => Some("video/webm"),
        Some("mkv") => Some("video/x-matroska"),
        Some("avi") => Some("video/x-msvideo"),
        Some("mpeg") | Some("mpg") => Some("video/mpeg"),
        _ => None,
    }
}
