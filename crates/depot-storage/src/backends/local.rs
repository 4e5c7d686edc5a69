//! Local filesystem backend — payload at a digest-derived path.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::fs;
use tracing::debug;

use depot_core::error::{AppError, ErrorKind};
use depot_core::result::AppResult;
use depot_core::traits::backend::{BackendKind, ContentBackend, ObjectMeta};
use depot_core::types::hash::ContentHash;

/// Content backend rooted at a local directory.
///
/// Objects live at `sha256/<first-2-hex>/<full-hex>` so that no single
/// directory accumulates unbounded fan-out. Writes land in a temp file
/// first and are renamed into place, so a partially written object is
/// never visible to `load`.
#[derive(Debug, Clone)]
pub struct LocalBackend {
    /// Root directory for all stored content.
    root: PathBuf,
}

impl LocalBackend {
    /// Create a new local backend rooted at the given path.
    pub async fn new(root_path: &str) -> AppResult<Self> {
        let root = PathBuf::from(root_path);
        fs::create_dir_all(&root).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::StorageWrite,
                format!("Failed to create storage root: {}", root.display()),
                e,
            )
        })?;
        Ok(Self { root })
    }

    /// Digest-derived path relative to the root.
    fn object_key(hash: &ContentHash) -> String {
        format!("sha256/{}/{}", hash.shard_prefix(), hash.as_str())
    }

    /// Resolve a relative locator to an absolute path within the root.
    fn resolve(&self, locator: &str) -> PathBuf {
        self.root.join(locator.trim_start_matches('/'))
    }

    /// Ensure the parent directory of a path exists.
    async fn ensure_parent(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                AppError::with_source(
                    ErrorKind::StorageWrite,
                    format!("Failed to create parent directory: {}", parent.display()),
                    e,
                )
            })?;
        }
        Ok(())
    }
}

#[async_trait]
impl ContentBackend for LocalBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Local
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(self.root.exists() && self.root.is_dir())
    }

    async fn store(
        &self,
        hash: &ContentHash,
        payload: Bytes,
        _meta: &ObjectMeta,
    ) -> AppResult<String> {
        let key = Self::object_key(hash);
        let full_path = self.resolve(&key);

        // Same digest means byte-identical content already on disk.
        if full_path.exists() {
            debug!(%hash, "Content object already stored");
            return Ok(key);
        }

        self.ensure_parent(&full_path).await?;

        // Write to a temp file and rename so load never sees a partial object.
        let temp_path = full_path.with_extension("tmp");
        fs::write(&temp_path, &payload).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::StorageWrite,
                format!("Failed to write content object: {key}"),
                e,
            )
        })?;
        fs::rename(&temp_path, &full_path).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::StorageWrite,
                format!("Failed to finalize content object: {key}"),
                e,
            )
        })?;

        debug!(%hash, bytes = payload.len(), "Stored content object");
        Ok(key)
    }

    async fn load(&self, locator: &str) -> AppResult<Bytes> {
        let full_path = self.resolve(locator);
        let data = fs::read(&full_path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AppError::not_found(format!("Content object not found: {locator}"))
            } else {
                AppError::with_source(
                    ErrorKind::StorageRead,
                    format!("Failed to read content object: {locator}"),
                    e,
                )
            }
        })?;
        Ok(Bytes::from(data))
    }

    async fn delete(&self, locator: &str) -> AppResult<()> {
        let full_path = self.resolve(locator);
        if full_path.exists() {
            fs::remove_file(&full_path).await.map_err(|e| {
                AppError::with_source(
                    ErrorKind::StorageWrite,
                    format!("Failed to delete content object: {locator}"),
                    e,
                )
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use depot_core::error::ErrorKind;

    use crate::hasher;

    fn meta(payload: &[u8]) -> ObjectMeta {
        ObjectMeta {
            mime: "application/octet-stream".to_string(),
            ext: "bin".to_string(),
            size_bytes: payload.len() as u64,
        }
    }

    async fn backend(dir: &tempfile::TempDir) -> LocalBackend {
        LocalBackend::new(dir.path().to_str().unwrap())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_store_load_delete() {
        let dir = tempfile::tempdir().unwrap();
        let backend = backend(&dir).await;

        let payload = Bytes::from_static(b"hello world");
        let hash = hasher::digest(&payload);
        let locator = backend
            .store(&hash, payload.clone(), &meta(&payload))
            .await
            .unwrap();

        assert_eq!(backend.load(&locator).await.unwrap(), payload);

        backend.delete(&locator).await.unwrap();
        let err = backend.load(&locator).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_store_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let backend = backend(&dir).await;

        let payload = Bytes::from_static(b"same bytes");
        let hash = hasher::digest(&payload);
        let first = backend
            .store(&hash, payload.clone(), &meta(&payload))
            .await
            .unwrap();
        let second = backend
            .store(&hash, payload.clone(), &meta(&payload))
            .await
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(backend.load(&first).await.unwrap(), payload);
    }

    #[tokio::test]
    async fn test_locator_is_sharded_by_digest_prefix() {
        let dir = tempfile::tempdir().unwrap();
        let backend = backend(&dir).await;

        let payload = Bytes::from_static(b"sharded");
        let hash = hasher::digest(&payload);
        let locator = backend
            .store(&hash, payload.clone(), &meta(&payload))
            .await
            .unwrap();

        assert_eq!(
            locator,
            format!("sha256/{}/{}", hash.shard_prefix(), hash.as_str())
        );
    }

    #[tokio::test]
    async fn test_delete_missing_object_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        let backend = backend(&dir).await;

        backend.delete("sha256/ab/missing").await.unwrap();
    }
}
