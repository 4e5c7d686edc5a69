//! File listing CLI command.

use clap::Args;
use tabled::Tabled;
use uuid::Uuid;

use crate::output::{self, OutputFormat};
use depot_core::config::AppConfig;
use depot_core::error::AppError;
use depot_core::types::pagination::ListQuery;
use depot_entity::file_user::model::FileUserRecord;

/// Arguments for the list command
#[derive(Debug, Args)]
pub struct ListArgs {
    /// Filter by owning user ID
    #[arg(short, long)]
    pub user: Option<Uuid>,

    /// Filter by name substring
    #[arg(short, long)]
    pub search: Option<String>,

    /// Maximum rows to return
    #[arg(long, default_value_t = 10)]
    pub limit: i64,

    /// Rows to skip
    #[arg(long, default_value_t = 0)]
    pub offset: i64,
}

/// Table row for a listed file
#[derive(Debug, Tabled, serde::Serialize)]
struct FileRow {
    id: Uuid,
    name: String,
    ext: String,
    mime: String,
    size: i64,
    public: bool,
}

impl From<FileUserRecord> for FileRow {
    fn from(record: FileUserRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
            ext: record.ext,
            mime: record.mime,
            size: record.size_bytes,
            public: record.public,
        }
    }
}

/// Execute the list command
pub async fn execute(
    args: &ListArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let ctx = super::init(config).await?;

    let query = ListQuery::new(args.limit, args.offset);
    let page = ctx
        .files
        .list(args.user, args.search.as_deref(), &query)
        .await?;

    let rows: Vec<FileRow> = page.rows.into_iter().map(FileRow::from).collect();
    output::print_list(&rows, format);
    output::print_success(&format!("{} of {} file(s)", rows.len(), page.total));
    Ok(())
}
