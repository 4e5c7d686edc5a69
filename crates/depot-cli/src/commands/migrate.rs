//! Database migration CLI command.

use clap::Args;

use crate::output;
use depot_core::config::AppConfig;
use depot_core::error::AppError;

/// Arguments for the migrate command
#[derive(Debug, Args)]
pub struct MigrateArgs {}

/// Execute the migrate command
pub async fn execute(_args: &MigrateArgs, config: &AppConfig) -> Result<(), AppError> {
    let pool = depot_database::DatabasePool::connect(&config.database)
        .await?
        .into_pool();

    depot_database::migration::run_migrations(&pool).await?;

    output::print_success("Migrations applied");
    Ok(())
}
