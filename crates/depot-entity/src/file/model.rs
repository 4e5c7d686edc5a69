//! File content record model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use depot_core::types::hash::ContentHash;

/// A deduplicated content record.
///
/// Exactly one row exists per content digest; the row is immutable once
/// created (an upload with different bytes produces a new `File`). Many
/// [`crate::file_user::FileUser`] rows may reference the same row.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct File {
    /// Unique content record identifier, stable once created.
    pub id: Uuid,
    /// SHA-256 digest of the payload bytes. Unique across all rows.
    pub hash: ContentHash,
    /// MIME type derived at upload time.
    pub mime: String,
    /// File extension (without the dot) derived from the upload filename.
    pub ext: String,
    /// Payload size in bytes.
    pub size_bytes: i64,
    /// Which backend kind stored the payload.
    pub backend: String,
    /// Backend-specific address of the payload bytes.
    pub locator: String,
    /// When the content record was created.
    pub created_at: DateTime<Utc>,
}

/// Data required to create a new content record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFile {
    /// SHA-256 digest of the payload bytes.
    pub hash: ContentHash,
    /// MIME type.
    pub mime: String,
    /// File extension (without the dot).
    pub ext: String,
    /// Payload size in bytes.
    pub size_bytes: i64,
    /// Backend kind that stored the payload.
    pub backend: String,
    /// Backend-specific locator.
    pub locator: String,
}
