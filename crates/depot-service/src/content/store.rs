//! Content store — deduplicating coordinator over hasher, backend, and registry.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use tracing::{debug, error, info};
use uuid::Uuid;

use depot_core::config::storage::StorageConfig;
use depot_core::error::{AppError, ErrorKind};
use depot_core::result::AppResult;
use depot_core::traits::backend::{ContentBackend, ObjectMeta};
use depot_core::traits::registry::{ContentRegistry, ReferenceCounter};
use depot_entity::file::model::{CreateFile, File};
use depot_storage::{detect, hasher};

/// The registry contract pinned to the content entity types.
pub type Registry = dyn ContentRegistry<File, CreateFile>;

/// A raw upload as handed over by the ingress layer.
///
/// Filename and declared MIME type are trusted for metadata only — content
/// identity comes exclusively from the payload digest.
#[derive(Debug, Clone)]
pub struct FileUpload {
    /// Declared filename, used for extension and display-name derivation.
    pub filename: String,
    /// Declared content type, if any.
    pub declared_mime: Option<String>,
    /// The payload bytes.
    pub payload: Bytes,
}

/// Coordinates the hasher, the active content backend, and the content
/// registry to provide deduplicated, content-addressed file storage.
///
/// Concurrent saves of identical bytes converge on a single `File` row via
/// the registry's hash-uniqueness constraint: the losing inserter retries
/// as a read. No application-level lock is involved.
#[derive(Clone)]
pub struct ContentStore {
    /// Content registry (digest → metadata index).
    registry: Arc<Registry>,
    /// Answers whether ownership records still reference a content row.
    references: Arc<dyn ReferenceCounter>,
    /// The process-wide content backend, fixed at startup.
    backend: Arc<dyn ContentBackend>,
    /// Storage configuration.
    config: StorageConfig,
}

impl std::fmt::Debug for ContentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentStore")
            .field("backend", &self.backend.kind())
            .finish()
    }
}

impl ContentStore {
    /// Creates a new content store.
    pub fn new(
        registry: Arc<Registry>,
        references: Arc<dyn ReferenceCounter>,
        backend: Arc<dyn ContentBackend>,
        config: StorageConfig,
    ) -> Self {
        Self {
            registry,
            references,
            backend,
            config,
        }
    }

    /// Persist an upload, reusing existing content when the digest is
    /// already registered.
    ///
    /// On a dedup hit no backend write occurs. On a lost insert race the
    /// winner's record is returned; the just-written backend object is
    /// byte-identical to the winner's, so it is left in place.
    pub async fn save_file(&self, upload: FileUpload) -> AppResult<File> {
        if upload.payload.is_empty() {
            return Err(AppError::validation("Upload payload is empty"));
        }
        if upload.payload.len() as u64 > self.config.max_upload_size_bytes {
            return Err(AppError::validation(format!(
                "Upload exceeds maximum size of {} bytes",
                self.config.max_upload_size_bytes
            )));
        }

        let hash = hasher::digest(&upload.payload);
        if let Some(existing) = self.registry.find_by_hash(&hash).await? {
            debug!(%hash, file_id = %existing.id, "Duplicate content, reusing stored object");
            return Ok(existing);
        }

        let mime = detect::resolve_mime(upload.declared_mime.as_deref(), &upload.payload);
        let ext = detect::extension_of(&upload.filename);
        let size_bytes = upload.payload.len();
        let meta = ObjectMeta {
            mime: mime.clone(),
            ext: ext.clone(),
            size_bytes: size_bytes as u64,
        };

        let locator = self
            .bounded(
                ErrorKind::StorageWrite,
                "Backend store",
                self.backend.store(&hash, upload.payload, &meta),
            )
            .await?;

        let create = CreateFile {
            hash: hash.clone(),
            mime,
            ext,
            size_bytes: size_bytes as i64,
            backend: self.backend.kind().as_str().to_string(),
            locator,
        };

        match self.registry.insert(&create).await {
            Ok(file) => {
                info!(
                    file_id = %file.id,
                    %hash,
                    size = size_bytes,
                    backend = %self.backend.kind(),
                    "Stored new content"
                );
                Ok(file)
            }
            Err(e) if e.kind == ErrorKind::Conflict => {
                // A concurrent upload of identical bytes won the insert.
                debug!(%hash, "Lost insert race, resolving to existing record");
                self.registry.find_by_hash(&hash).await?.ok_or_else(|| {
                    AppError::internal(format!("Content {hash} vanished after insert conflict"))
                })
            }
            Err(e) => Err(e),
        }
    }

    /// Load a content record and its payload bytes by identifier.
    ///
    /// With `verify_on_read` enabled the payload is re-digested and a
    /// mismatch fails the read rather than serving corrupt bytes.
    pub async fn load_file(&self, file_id: Uuid) -> AppResult<(File, Bytes)> {
        let file = self
            .registry
            .find_by_id(file_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("File {file_id} not found")))?;

        let data = self
            .bounded(
                ErrorKind::StorageRead,
                "Backend load",
                self.backend.load(&file.locator),
            )
            .await?;

        if self.config.verify_on_read {
            let actual = hasher::digest(&data);
            if actual != file.hash {
                error!(
                    %file_id,
                    expected = %file.hash,
                    actual = %actual,
                    "Stored content failed digest verification"
                );
                return Err(AppError::corruption(format!(
                    "Content {file_id} failed digest verification"
                )));
            }
        }

        Ok((file, data))
    }

    /// Physically delete a content record, but only once nothing
    /// references it.
    ///
    /// Returns `true` when the record and its backend object were removed,
    /// `false` when the content survives (still referenced, or already
    /// gone).
    pub async fn delete_file_if_unreferenced(&self, file_id: Uuid) -> AppResult<bool> {
        let Some(file) = self.registry.find_by_id(file_id).await? else {
            return Ok(false);
        };

        let references = self.references.count_references(file_id).await?;
        if references > 0 {
            debug!(%file_id, references, "Content still referenced, keeping");
            return Ok(false);
        }

        self.bounded(
            ErrorKind::StorageWrite,
            "Backend delete",
            self.backend.delete(&file.locator),
        )
        .await?;
        self.registry.delete(file_id).await?;

        info!(%file_id, hash = %file.hash, "Deleted unreferenced content");
        Ok(true)
    }

    /// Run a backend operation under the configured I/O timeout.
    async fn bounded<T>(
        &self,
        kind: ErrorKind,
        what: &str,
        operation: impl Future<Output = AppResult<T>>,
    ) -> AppResult<T> {
        let limit = Duration::from_secs(self.config.io_timeout_seconds);
        match tokio::time::timeout(limit, operation).await {
            Ok(result) => result,
            Err(_) => Err(AppError::new(
                kind,
                format!("{what} timed out after {}s", limit.as_secs()),
            )),
        }
    }
}
