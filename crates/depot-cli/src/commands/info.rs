//! File metadata CLI command.

use clap::Args;
use uuid::Uuid;

use crate::output::{self, OutputFormat};
use depot_core::config::AppConfig;
use depot_core::error::AppError;

/// Arguments for the info command
#[derive(Debug, Args)]
pub struct InfoArgs {
    /// File ID to inspect
    pub id: Uuid,
}

/// Execute the info command
pub async fn execute(
    args: &InfoArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let ctx = super::init(config).await?;

    let record = ctx.files.get(args.id).await?;
    output::print_item(&record, format);
    Ok(())
}
