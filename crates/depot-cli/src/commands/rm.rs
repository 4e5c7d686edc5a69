//! File deletion CLI command.

use clap::Args;
use uuid::Uuid;

use crate::output;
use depot_core::config::AppConfig;
use depot_core::error::AppError;

/// Arguments for the rm command
#[derive(Debug, Args)]
pub struct RmArgs {
    /// File ID to delete
    pub id: Uuid,
}

/// Execute the rm command
pub async fn execute(args: &RmArgs, config: &AppConfig) -> Result<(), AppError> {
    let ctx = super::init(config).await?;

    ctx.files.delete(args.id).await?;
    output::print_success(&format!("Deleted file {}", args.id));
    Ok(())
}
