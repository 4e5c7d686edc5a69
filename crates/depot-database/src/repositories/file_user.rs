//! Ownership repository over the `file_users` table.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use depot_core::error::{AppError, ErrorKind};
use depot_core::result::AppResult;
use depot_core::traits::registry::ReferenceCounter;
use depot_core::types::pagination::{ListQuery, Page};
use depot_entity::file_user::model::{CreateFileUser, FileUser, FileUserRecord};

/// Columns for the joined ownership + content read model.
const RECORD_COLUMNS: &str = "fu.id, fu.user_id, fu.file_id, fu.name, \
     f.ext, f.mime, f.size_bytes, fu.public, f.hash";

/// Repository for ownership records.
///
/// Also implements [`ReferenceCounter`], answering how many ownership
/// rows still point at a content record before physical deletion.
#[derive(Debug, Clone)]
pub struct FileUserRepository {
    pool: PgPool,
}

impl FileUserRepository {
    /// Create a new ownership repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find an ownership row by ID.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<FileUser>> {
        sqlx::query_as::<_, FileUser>("SELECT * FROM file_users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find file user", e)
            })
    }

    /// Find the joined read model for an ownership row.
    pub async fn find_record(&self, id: Uuid) -> AppResult<Option<FileUserRecord>> {
        sqlx::query_as::<_, FileUserRecord>(&format!(
            "SELECT {RECORD_COLUMNS} FROM file_users fu \
             JOIN files f ON f.id = fu.file_id \
             WHERE fu.id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to find file user record", e)
        })
    }

    /// Create a new ownership row.
    pub async fn create(&self, create: &CreateFileUser) -> AppResult<FileUser> {
        sqlx::query_as::<_, FileUser>(
            "INSERT INTO file_users (user_id, file_id, name, public) \
             VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(create.user_id)
        .bind(create.file_id)
        .bind(&create.name)
        .bind(create.public)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create file user", e))
    }

    /// Update an ownership row (name, visibility, and content reference).
    pub async fn update(&self, file_user: &FileUser) -> AppResult<FileUser> {
        sqlx::query_as::<_, FileUser>(
            "UPDATE file_users SET user_id = $2, file_id = $3, name = $4, public = $5, \
             updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(file_user.id)
        .bind(file_user.user_id)
        .bind(file_user.file_id)
        .bind(&file_user.name)
        .bind(file_user.public)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update file user", e))?
        .ok_or_else(|| AppError::not_found(format!("File user {} not found", file_user.id)))
    }

    /// Delete an ownership row. Returns `true` if a row was removed.
    pub async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM file_users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to delete file user", e)
            })?;
        Ok(result.rows_affected() > 0)
    }

    /// List ownership records, optionally filtered by owner and name search.
    pub async fn list(
        &self,
        user_id: Option<Uuid>,
        search: Option<&str>,
        query: &ListQuery,
    ) -> AppResult<Page<FileUserRecord>> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM file_users fu \
             WHERE ($1::uuid IS NULL OR fu.user_id = $1) \
               AND ($2::text IS NULL OR fu.name ILIKE '%' || $2 || '%')",
        )
        .bind(user_id)
        .bind(search)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count file users", e))?;

        let rows = sqlx::query_as::<_, FileUserRecord>(&format!(
            "SELECT {RECORD_COLUMNS} FROM file_users fu \
             JOIN files f ON f.id = fu.file_id \
             WHERE ($1::uuid IS NULL OR fu.user_id = $1) \
               AND ($2::text IS NULL OR fu.name ILIKE '%' || $2 || '%') \
             ORDER BY fu.created_at DESC \
             LIMIT $3 OFFSET $4"
        ))
        .bind(user_id)
        .bind(search)
        .bind(query.limit())
        .bind(query.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list file users", e))?;

        Ok(Page::new(rows, total))
    }
}

#[async_trait]
impl ReferenceCounter for FileUserRepository {
    async fn count_references(&self, file_id: Uuid) -> AppResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM file_users WHERE file_id = $1")
            .bind(file_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to count references", e)
            })?;
        Ok(count as u64)
    }
}
