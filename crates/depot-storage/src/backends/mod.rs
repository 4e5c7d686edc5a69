//! Content backend implementations and startup selection.

pub mod database;
pub mod local;
pub mod s3;

use std::sync::Arc;

use sqlx::PgPool;
use tracing::info;

use depot_core::config::storage::StorageConfig;
use depot_core::result::AppResult;
use depot_core::traits::backend::{BackendKind, ContentBackend};

pub use database::DatabaseBackend;
pub use local::LocalBackend;
pub use s3::S3Backend;

/// Build the process-wide content backend from configuration.
///
/// Resolved exactly once at startup; the result is injected into the
/// content store so nothing downstream ever branches on the backend kind.
pub async fn from_config(
    config: &StorageConfig,
    pool: PgPool,
) -> AppResult<Arc<dyn ContentBackend>> {
    let kind: BackendKind = config.backend.parse()?;
    let backend: Arc<dyn ContentBackend> = match kind {
        BackendKind::Database => Arc::new(DatabaseBackend::new(pool)),
        BackendKind::Local => Arc::new(LocalBackend::new(&config.local.root_path).await?),
        BackendKind::S3 => Arc::new(S3Backend::new(&config.s3).await?),
    };
    info!(backend = %kind, "Content backend initialized");
    Ok(backend)
}
