//! Garbage-collection CLI command for unreferenced content.

use clap::Args;

use crate::output;
use depot_core::config::AppConfig;
use depot_core::error::AppError;

/// Arguments for the gc command
#[derive(Debug, Args)]
pub struct GcArgs {
    /// Report what would be deleted without deleting anything
    #[arg(long)]
    pub dry_run: bool,
}

/// Execute the gc command
pub async fn execute(args: &GcArgs, config: &AppConfig) -> Result<(), AppError> {
    let ctx = super::init(config).await?;

    let candidates = ctx.file_repo.find_unreferenced().await?;
    if args.dry_run {
        for file in &candidates {
            println!("{}  {}  {} bytes", file.id, file.hash, file.size_bytes);
        }
        output::print_success(&format!(
            "{} unreferenced content record(s) (dry run)",
            candidates.len()
        ));
        return Ok(());
    }

    let mut removed = 0usize;
    for file in &candidates {
        // Re-checks the reference count, so a row attached since the
        // sweep started survives.
        if ctx.content.delete_file_if_unreferenced(file.id).await? {
            removed += 1;
        }
    }

    output::print_success(&format!(
        "Removed {removed} of {} unreferenced content record(s)",
        candidates.len()
    ));
    Ok(())
}
