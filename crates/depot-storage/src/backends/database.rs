//! Database blob backend — payload bytes inline in the `file_blobs` table.

use async_trait::async_trait;
use bytes::Bytes;
use sqlx::PgPool;
use tracing::debug;

use depot_core::error::{AppError, ErrorKind};
use depot_core::result::AppResult;
use depot_core::traits::backend::{BackendKind, ContentBackend, ObjectMeta};
use depot_core::types::hash::ContentHash;

/// Content backend that keeps payload bytes in PostgreSQL.
///
/// The locator is the digest itself: the `file_blobs` row is keyed by
/// hash, so storing twice is a no-op at the SQL level.
#[derive(Debug, Clone)]
pub struct DatabaseBackend {
    pool: PgPool,
}

impl DatabaseBackend {
    /// Create a new database blob backend.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ContentBackend for DatabaseBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Database
    }

    async fn health_check(&self) -> AppResult<bool> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|v| v == 1)
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Health check failed", e))
    }

    async fn store(
        &self,
        hash: &ContentHash,
        payload: Bytes,
        _meta: &ObjectMeta,
    ) -> AppResult<String> {
        sqlx::query("INSERT INTO file_blobs (hash, data) VALUES ($1, $2) ON CONFLICT (hash) DO NOTHING")
            .bind(hash)
            .bind(payload.as_ref())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::StorageWrite,
                    format!("Failed to store blob {hash}"),
                    e,
                )
            })?;

        debug!(%hash, bytes = payload.len(), "Stored blob row");
        Ok(hash.as_str().to_string())
    }

    async fn load(&self, locator: &str) -> AppResult<Bytes> {
        let data: Option<Vec<u8>> =
            sqlx::query_scalar("SELECT data FROM file_blobs WHERE hash = $1")
                .bind(locator)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| {
                    AppError::with_source(
                        ErrorKind::StorageRead,
                        format!("Failed to load blob {locator}"),
                        e,
                    )
                })?;

        data.map(Bytes::from)
            .ok_or_else(|| AppError::not_found(format!("Blob not found: {locator}")))
    }

    async fn delete(&self, locator: &str) -> AppResult<()> {
        sqlx::query("DELETE FROM file_blobs WHERE hash = $1")
            .bind(locator)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::StorageWrite,
                    format!("Failed to delete blob {locator}"),
                    e,
                )
            })?;
        Ok(())
    }
}
