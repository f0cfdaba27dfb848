//! Command-line interface

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use log::{error, info, warn};
use resumable_dl::{
    deepest_cause, LocalSink, ResumableTransfer, SessionStatus, TransferSession,
};
use serde::Serialize;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;

use crate::providers::BlobReader;
use crate::report::{event_printer, OutputMode};
use crate::settings::{DownloadSettings, Provider, ResolvedDownload};
use crate::AppResult;

/// Exit code after Ctrl-C, as a shell reports SIGINT.
const EXIT_INTERRUPTED: u8 = 130;

#[derive(Parser, Debug)]
#[command(name = "bigblob", version, about = "Resumable chunked download of large blobs")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Print transfer events as JSON lines
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Download an object, resuming into an existing local file
    Download(DownloadArgs),
    /// Show the remote length and the local resume point without downloading
    Probe(SourceArgs),
}

#[derive(Args, Debug, Default, Clone)]
pub struct SourceArgs {
    /// Settings file (JSON or key=value lines); flags override its values
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Blob URL, or s3://bucket/key
    #[arg(long)]
    pub blob_url: Option<String>,

    /// Local file to write to
    #[arg(long, value_name = "PATH")]
    pub local_file: Option<PathBuf>,

    /// Storage account key (Shared Key authorization)
    #[arg(long, env = "BIGBLOB_ACCOUNT_KEY", hide_env_values = true)]
    pub account_key: Option<String>,

    #[arg(long, value_enum)]
    pub provider: Option<Provider>,

    /// S3 region
    #[arg(long)]
    pub region: Option<String>,

    /// S3-compatible endpoint URL
    #[arg(long)]
    pub endpoint: Option<String>,

    #[arg(long, env = "AWS_ACCESS_KEY_ID")]
    pub access_key_id: Option<String>,

    #[arg(long, env = "AWS_SECRET_ACCESS_KEY", hide_env_values = true)]
    pub secret_access_key: Option<String>,

    /// Address S3 buckets by path instead of virtual host
    #[arg(long)]
    pub force_path_style: bool,
}

#[derive(Args, Debug, Default, Clone)]
pub struct DownloadArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Restart after any transfer error, not only after timeouts
    #[arg(long)]
    pub retry_on_error: bool,

    #[arg(long, value_name = "SECONDS")]
    pub delay_between_chunks: Option<u64>,

    #[arg(long, value_name = "BYTES")]
    pub chunk_size: Option<u64>,

    /// Deadline for a single chunk read
    #[arg(long, value_name = "SECONDS")]
    pub chunk_timeout: Option<u64>,

    /// Wait before restarting after a timeout or error
    #[arg(long, value_name = "SECONDS")]
    pub retry_backoff: Option<u64>,

    /// Give up after this many consecutive attempts without progress
    #[arg(long)]
    pub max_attempts: Option<u32>,

    /// Wait for Enter before exiting
    #[arg(long)]
    pub pause_at_end: bool,
}

impl SourceArgs {
    fn apply(&self, settings: &mut DownloadSettings) {
        if let Some(url) = &self.blob_url {
            settings.blob_url = Some(url.clone());
        }
        if let Some(path) = &self.local_file {
            settings.local_file_path = Some(path.clone());
        }
        if let Some(key) = &self.account_key {
            settings.account_key = Some(key.clone());
        }
        if let Some(provider) = self.provider {
            settings.provider = Some(provider);
        }
        if let Some(region) = &self.region {
            settings.region = Some(region.clone());
        }
        if let Some(endpoint) = &self.endpoint {
            settings.endpoint = Some(endpoint.clone());
        }
        if let Some(id) = &self.access_key_id {
            settings.access_key_id = Some(id.clone());
        }
        if let Some(secret) = &self.secret_access_key {
            settings.secret_access_key = Some(secret.clone());
        }
        if self.force_path_style {
            settings.force_path_style = Some(true);
        }
    }

    fn settings(&self) -> AppResult<DownloadSettings> {
        let mut settings = DownloadSettings::load(self.config.as_deref())?;
        self.apply(&mut settings);
        Ok(settings)
    }
}

impl DownloadArgs {
    fn settings(&self) -> AppResult<DownloadSettings> {
        let mut settings = self.source.settings()?;
        if self.retry_on_error {
            settings.retry_on_error = Some(true);
        }
        if let Some(delay) = self.delay_between_chunks {
            settings.delay_between_chunks_in_seconds = Some(delay);
        }
        if let Some(size) = self.chunk_size {
            settings.chunk_size = Some(size);
        }
        if let Some(timeout) = self.chunk_timeout {
            settings.chunk_timeout_seconds = Some(timeout);
        }
        if let Some(backoff) = self.retry_backoff {
            settings.retry_backoff_seconds = Some(backoff);
        }
        if let Some(max) = self.max_attempts {
            settings.max_attempts = Some(max);
        }
        if self.pause_at_end {
            settings.pause_at_end = Some(true);
        }
        Ok(settings)
    }
}

pub async fn execute(cli: Cli) -> AppResult<ExitCode> {
    let mode = if cli.json {
        OutputMode::Json
    } else {
        OutputMode::Human
    };
    match cli.command {
        Command::Download(args) => download(&args, mode).await,
        Command::Probe(args) => probe(&args, mode).await,
    }
}

fn build_transfer(
    resolved: &ResolvedDownload,
    mode: OutputMode,
) -> AppResult<ResumableTransfer<BlobReader>> {
    let reader = BlobReader::connect(&resolved.config)?;
    info!(
        "Using {} provider for {}",
        resolved.config.provider_name(),
        resolved.object
    );
    Ok(ResumableTransfer::new(
        reader,
        resolved.object.clone(),
        LocalSink::new(&resolved.local_file),
        resolved.options.clone(),
    )
    .with_events(event_printer(mode)))
}

async fn download(args: &DownloadArgs, mode: OutputMode) -> AppResult<ExitCode> {
    let settings = args.settings()?;
    settings.log_summary();
    let resolved = settings.resolve()?;

    let shutdown = shutdown_on_ctrl_c();
    let transfer = build_transfer(&resolved, mode)?.with_shutdown(shutdown);
    let mut session = TransferSession::new(transfer);

    let result = session.run().await;
    let status = SessionStatus::of(&result);
    match &result {
        Ok(summary) => info!(
            "Download {} after {} run(s): {} bytes written to {}",
            status,
            session.runs(),
            summary.bytes_transferred,
            resolved.local_file.display()
        ),
        Err(err) => error!("Download {}: {}", status, deepest_cause(err)),
    }

    if resolved.pause_at_end {
        pause_at_end().await?;
    }

    Ok(match status {
        SessionStatus::Completed => ExitCode::SUCCESS,
        SessionStatus::Failed => ExitCode::FAILURE,
        SessionStatus::Cancelled => ExitCode::from(EXIT_INTERRUPTED),
    })
}

#[derive(Debug, Serialize)]
struct ProbeReport {
    object: String,
    local_file: PathBuf,
    object_length: u64,
    start_position: u64,
    complete: bool,
}

async fn probe(args: &SourceArgs, mode: OutputMode) -> AppResult<ExitCode> {
    let resolved = args.settings()?.resolve()?;
    let transfer = build_transfer(&resolved, mode)?;
    let point = transfer.inspect().await?;

    let report = ProbeReport {
        object: resolved.object.to_string(),
        local_file: resolved.local_file.clone(),
        object_length: point.object_length,
        start_position: point.start_position,
        complete: point.is_complete(),
    };
    match mode {
        OutputMode::Json => println!("{}", serde_json::to_string(&report)?),
        OutputMode::Human => println!(
            "{}: {} bytes remote, {} bytes local ({})",
            report.object,
            report.object_length,
            report.start_position,
            if report.complete { "complete" } else { "resumable" }
        ),
    }
    Ok(ExitCode::SUCCESS)
}

/// Token cancelled on the first Ctrl-C.
fn shutdown_on_ctrl_c() -> CancellationToken {
    let token = CancellationToken::new();
    let trigger = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, stopping the download");
            trigger.cancel();
        }
    });
    token
}

async fn pause_at_end() -> AppResult<()> {
    println!("Press Enter to exit");
    let mut line = String::new();
    BufReader::new(tokio::io::stdin()).read_line(&mut line).await?;
    Ok(())
}
