//! Content registry implementation over the `files` table.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use depot_core::error::{AppError, ErrorKind};
use depot_core::result::AppResult;
use depot_core::traits::registry::ContentRegistry;
use depot_core::types::hash::ContentHash;
use depot_entity::file::model::{CreateFile, File};

/// Repository for content records.
///
/// This is the [`ContentRegistry`] implementation: the `files` table with
/// its unique index on `hash` is the single source of truth for the
/// one-row-per-digest invariant.
#[derive(Debug, Clone)]
pub struct FileRepository {
    pool: PgPool,
}

impl FileRepository {
    /// Create a new file repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find content records no ownership row references anymore.
    pub async fn find_unreferenced(&self) -> AppResult<Vec<File>> {
        sqlx::query_as::<_, File>(
            "SELECT f.* FROM files f \
             LEFT JOIN file_users fu ON fu.file_id = f.id \
             WHERE fu.id IS NULL",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to find unreferenced files", e)
        })
    }

}

#[async_trait]
impl ContentRegistry<File, CreateFile> for FileRepository {
    async fn find_by_hash(&self, hash: &ContentHash) -> AppResult<Option<File>> {
        sqlx::query_as::<_, File>("SELECT * FROM files WHERE hash = $1")
            .bind(hash)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find file by hash", e)
            })
    }

    async fn insert(&self, create: &CreateFile) -> AppResult<File> {
        sqlx::query_as::<_, File>(
            "INSERT INTO files (hash, mime, ext, size_bytes, backend, locator) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
        )
        .bind(&create.hash)
        .bind(&create.mime)
        .bind(&create.ext)
        .bind(create.size_bytes)
        .bind(&create.backend)
        .bind(&create.locator)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.constraint() == Some("files_hash_key") => {
                AppError::conflict(format!("Content {} already registered", create.hash))
            }
            _ => AppError::with_source(ErrorKind::Database, "Failed to create file record", e),
        })
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<File>> {
        sqlx::query_as::<_, File>("SELECT * FROM files WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find file", e))
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM files WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete file", e))?;
        Ok(result.rows_affected() > 0)
    }
}
