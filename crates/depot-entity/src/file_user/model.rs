//! File ownership record model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use depot_core::types::hash::ContentHash;

/// A named, owned, visibility-flagged reference to a content record.
///
/// Many ownership rows may point at the same `File`; deleting one never
/// implies deleting the content, and repointing `file_id` on re-upload
/// keeps `id` and `name` stable unless explicitly edited.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FileUser {
    /// Unique ownership record identifier.
    pub id: Uuid,
    /// Owning user.
    pub user_id: Uuid,
    /// The content record this row references.
    pub file_id: Uuid,
    /// Display name, stored without the extension.
    pub name: String,
    /// Whether the file is publicly visible.
    pub public: bool,
    /// When the ownership record was created.
    pub created_at: DateTime<Utc>,
    /// When the ownership record was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Data required to create a new ownership record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFileUser {
    /// Owning user.
    pub user_id: Uuid,
    /// The content record to reference.
    pub file_id: Uuid,
    /// Display name.
    pub name: String,
    /// Public visibility flag.
    pub public: bool,
}

/// Mutable ownership fields; `None` leaves the field unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileUserEdit {
    /// New display name.
    pub name: Option<String>,
    /// New visibility flag.
    pub public: Option<bool>,
}

/// Joined read model over an ownership row and its content record.
///
/// This is the shape every consumer-facing operation returns: ownership
/// fields plus the content metadata needed to describe or serve the file.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FileUserRecord {
    /// Ownership record identifier.
    pub id: Uuid,
    /// Owning user.
    pub user_id: Uuid,
    /// Referenced content record identifier.
    pub file_id: Uuid,
    /// Display name (without extension).
    pub name: String,
    /// File extension from the content record.
    pub ext: String,
    /// MIME type from the content record.
    pub mime: String,
    /// Payload size in bytes.
    pub size_bytes: i64,
    /// Public visibility flag.
    pub public: bool,
    /// Content digest.
    pub hash: ContentHash,
}

impl FileUserRecord {
    /// Suggested filename for a download response (`name.ext`).
    pub fn download_filename(&self) -> String {
        if self.ext.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.name, self.ext)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, ext: &str) -> FileUserRecord {
        FileUserRecord {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            file_id: Uuid::new_v4(),
            name: name.to_string(),
            ext: ext.to_string(),
            mime: "application/octet-stream".to_string(),
            size_bytes: 0,
            public: false,
            hash: ContentHash::from_digest([0; 32]),
        }
    }

    #[test]
    fn test_download_filename() {
        assert_eq!(record("photo", "png").download_filename(), "photo.png");
    }

    #[test]
    fn test_download_filename_without_extension() {
        assert_eq!(record("notes", "").download_filename(), "notes");
    }
}
