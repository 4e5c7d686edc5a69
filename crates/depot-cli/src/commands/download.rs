//! File download CLI command.

use std::path::PathBuf;

use clap::Args;
use uuid::Uuid;

use crate::output;
use depot_core::config::AppConfig;
use depot_core::error::AppError;

/// Arguments for the download command
#[derive(Debug, Args)]
pub struct DownloadArgs {
    /// File ID to download
    pub id: Uuid,

    /// Output path (defaults to the file's own name)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Execute the download command
pub async fn execute(args: &DownloadArgs, config: &AppConfig) -> Result<(), AppError> {
    let ctx = super::init(config).await?;

    let download = ctx.files.download(args.id).await?;
    let target = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(&download.filename));

    tokio::fs::write(&target, &download.data)
        .await
        .map_err(|e| AppError::internal(format!("Failed to write {}: {e}", target.display())))?;

    output::print_success(&format!(
        "Downloaded '{}' ({} bytes, {}) to {}",
        download.filename,
        download.data.len(),
        download.content_type,
        target.display()
    ));
    Ok(())
}
