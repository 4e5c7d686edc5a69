//! CLI command definitions and dispatch.

pub mod download;
pub mod gc;
pub mod info;
pub mod list;
pub mod migrate;
pub mod rm;
pub mod upload;

use std::sync::Arc;

use clap::{Parser, Subcommand};

use crate::output::OutputFormat;
use depot_core::config::AppConfig;
use depot_core::error::AppError;
use depot_core::traits::registry::ReferenceCounter;
use depot_database::repositories::file::FileRepository;
use depot_database::repositories::file_user::FileUserRepository;
use depot_service::content::store::Registry;
use depot_service::{ContentStore, FileUserService, OwnershipRepository};

/// Depot — content-addressable file storage
#[derive(Debug, Parser)]
#[command(name = "depot", version, about, long_about = None)]
pub struct Cli {
    /// Configuration environment (merged over config/default.toml)
    #[arg(short, long, default_value = "development")]
    pub env: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run pending database migrations
    Migrate(migrate::MigrateArgs),
    /// Upload a file
    Upload(upload::UploadArgs),
    /// Download a file's content
    Download(download::DownloadArgs),
    /// Show a file's metadata
    Info(info::InfoArgs),
    /// List files
    List(list::ListArgs),
    /// Delete a file
    Rm(rm::RmArgs),
    /// Delete content records nothing references anymore
    Gc(gc::GcArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self, config: &AppConfig) -> Result<(), AppError> {
        match &self.command {
            Commands::Migrate(args) => migrate::execute(args, config).await,
            Commands::Upload(args) => upload::execute(args, config, self.format).await,
            Commands::Download(args) => download::execute(args, config).await,
            Commands::Info(args) => info::execute(args, config, self.format).await,
            Commands::List(args) => list::execute(args, config, self.format).await,
            Commands::Rm(args) => rm::execute(args, config).await,
            Commands::Gc(args) => gc::execute(args, config).await,
        }
    }
}

/// Wired-up services shared by the commands.
pub struct Context {
    /// Content coordinator.
    pub content: Arc<ContentStore>,
    /// Ownership service.
    pub files: FileUserService,
    /// Content registry repository (for maintenance queries).
    pub file_repo: Arc<FileRepository>,
}

/// Helper: load configuration for an environment
pub fn load_config(env: &str) -> Result<AppConfig, AppError> {
    AppConfig::load(env)
}

/// Helper: connect the pool and construct the service stack
pub async fn init(config: &AppConfig) -> Result<Context, AppError> {
    let pool = depot_database::DatabasePool::connect(&config.database)
        .await?
        .into_pool();

    let backend = depot_storage::backends::from_config(&config.storage, pool.clone()).await?;

    let file_repo = Arc::new(FileRepository::new(pool.clone()));
    let file_user_repo = Arc::new(FileUserRepository::new(pool.clone()));

    let content = Arc::new(ContentStore::new(
        Arc::clone(&file_repo) as Arc<Registry>,
        Arc::clone(&file_user_repo) as Arc<dyn ReferenceCounter>,
        backend,
        config.storage.clone(),
    ));
    let files = FileUserService::new(
        Arc::clone(&file_user_repo) as Arc<dyn OwnershipRepository>,
        Arc::clone(&content),
    );

    Ok(Context {
        content,
        files,
        file_repo,
    })
}
