//! File upload CLI command.

use std::path::PathBuf;

use bytes::Bytes;
use clap::Args;
use uuid::Uuid;

use crate::output::{self, OutputFormat};
use depot_core::config::AppConfig;
use depot_core::error::AppError;
use depot_service::UploadRequest;

/// Arguments for the upload command
#[derive(Debug, Args)]
pub struct UploadArgs {
    /// Path to the file to upload
    pub file: PathBuf,

    /// Owning user ID (a fresh one is generated when omitted)
    #[arg(short, long)]
    pub user: Option<Uuid>,

    /// Mark the file as publicly visible
    #[arg(short, long)]
    pub public: bool,

    /// Override the upload filename
    #[arg(short, long)]
    pub name: Option<String>,

    /// Declared MIME type (sniffed from the payload when omitted)
    #[arg(short, long)]
    pub mime: Option<String>,
}

/// Execute the upload command
pub async fn execute(
    args: &UploadArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let ctx = super::init(config).await?;

    let filename = args.name.clone().unwrap_or_else(|| {
        args.file
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload")
            .to_string()
    });

    let payload = tokio::fs::read(&args.file).await.map_err(|e| {
        AppError::validation(format!("Failed to read {}: {e}", args.file.display()))
    })?;

    let user_id = args.user.unwrap_or_else(Uuid::new_v4);
    let record = ctx
        .files
        .upload(
            user_id,
            UploadRequest {
                filename,
                declared_mime: args.mime.clone(),
                payload: Bytes::from(payload),
                public: args.public,
            },
        )
        .await?;

    output::print_success(&format!(
        "Uploaded '{}' ({} bytes, hash {})",
        record.download_filename(),
        record.size_bytes,
        record.hash
    ));
    output::print_item(&record, format);
    Ok(())
}
