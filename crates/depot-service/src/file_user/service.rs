//! Ownership service — named, owned, visibility-flagged references to content.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use tracing::info;
use uuid::Uuid;

use depot_core::error::AppError;
use depot_core::result::AppResult;
use depot_core::types::pagination::{ListQuery, Page};
use depot_database::repositories::file_user::FileUserRepository;
use depot_entity::file_user::model::{CreateFileUser, FileUser, FileUserEdit, FileUserRecord};
use depot_storage::detect;

use crate::content::{ContentStore, FileUpload};

/// Persistence port for ownership records.
///
/// Implemented by [`FileUserRepository`]; tests substitute an in-memory
/// fake.
#[async_trait]
pub trait OwnershipRepository: Send + Sync + 'static {
    /// Find an ownership row by ID.
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<FileUser>>;

    /// Find the joined read model for an ownership row.
    async fn find_record(&self, id: Uuid) -> AppResult<Option<FileUserRecord>>;

    /// Create a new ownership row.
    async fn create(&self, create: &CreateFileUser) -> AppResult<FileUser>;

    /// Update an ownership row.
    async fn update(&self, file_user: &FileUser) -> AppResult<FileUser>;

    /// Delete an ownership row. Returns `true` if a row was removed.
    async fn delete(&self, id: Uuid) -> AppResult<bool>;

    /// List ownership records, optionally filtered by owner and name search.
    async fn list(
        &self,
        user_id: Option<Uuid>,
        search: Option<&str>,
        query: &ListQuery,
    ) -> AppResult<Page<FileUserRecord>>;
}

#[async_trait]
impl OwnershipRepository for FileUserRepository {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<FileUser>> {
        FileUserRepository::find_by_id(self, id).await
    }

    async fn find_record(&self, id: Uuid) -> AppResult<Option<FileUserRecord>> {
        FileUserRepository::find_record(self, id).await
    }

    async fn create(&self, create: &CreateFileUser) -> AppResult<FileUser> {
        FileUserRepository::create(self, create).await
    }

    async fn update(&self, file_user: &FileUser) -> AppResult<FileUser> {
        FileUserRepository::update(self, file_user).await
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        FileUserRepository::delete(self, id).await
    }

    async fn list(
        &self,
        user_id: Option<Uuid>,
        search: Option<&str>,
        query: &ListQuery,
    ) -> AppResult<Page<FileUserRecord>> {
        FileUserRepository::list(self, user_id, search, query).await
    }
}

/// An upload request from an authenticated owner.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    /// Declared filename.
    pub filename: String,
    /// Declared content type, if any.
    pub declared_mime: Option<String>,
    /// The payload bytes.
    pub payload: Bytes,
    /// Whether the file should be publicly visible.
    pub public: bool,
}

/// Result of a download: metadata plus content bytes, sufficient for an
/// ingress layer to build a response (content type, length, disposition).
#[derive(Debug)]
pub struct Download {
    /// The joined ownership + content record.
    pub record: FileUserRecord,
    /// The payload bytes.
    pub data: Bytes,
    /// MIME type for a Content-Type header.
    pub content_type: String,
    /// Suggested filename for a Content-Disposition header.
    pub filename: String,
}

/// Implements the user-facing file operations on top of the content store.
///
/// Ownership rows are cheap, mutable references; the content they point at
/// is immutable and shared. Every path that detaches a row from its
/// content asks the store to collect the content if it just became
/// unreferenced.
#[derive(Clone)]
pub struct FileUserService {
    /// Ownership persistence.
    file_users: Arc<dyn OwnershipRepository>,
    /// Content store.
    content: Arc<ContentStore>,
}

impl std::fmt::Debug for FileUserService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileUserService").finish()
    }
}

impl FileUserService {
    /// Creates a new ownership service.
    pub fn new(file_users: Arc<dyn OwnershipRepository>, content: Arc<ContentStore>) -> Self {
        Self {
            file_users,
            content,
        }
    }

    /// Upload a file for a user.
    ///
    /// The payload is stored (or deduplicated) through the content store
    /// and a new ownership row is attached to the resulting content
    /// record. The display name defaults to the filename stem.
    pub async fn upload(&self, user_id: Uuid, request: UploadRequest) -> AppResult<FileUserRecord> {
        let file = self
            .content
            .save_file(FileUpload {
                filename: request.filename.clone(),
                declared_mime: request.declared_mime,
                payload: request.payload,
            })
            .await?;

        let created = self
            .file_users
            .create(&CreateFileUser {
                user_id,
                file_id: file.id,
                name: detect::stem_of(&request.filename),
                public: request.public,
            })
            .await?;

        info!(
            file_user_id = %created.id,
            %user_id,
            file_id = %file.id,
            name = %created.name,
            size = file.size_bytes,
            "File uploaded"
        );

        Ok(FileUserRecord {
            id: created.id,
            user_id: created.user_id,
            file_id: file.id,
            name: created.name,
            ext: file.ext,
            mime: file.mime,
            size_bytes: file.size_bytes,
            public: created.public,
            hash: file.hash,
        })
    }

    /// Edit an ownership row, optionally replacing its content.
    ///
    /// A replacement payload goes through the content store and the row is
    /// repointed at the new record; the previous content is collected if
    /// this was its last reference. The row's `id` and `name` survive a
    /// content replace unless the edit names them.
    pub async fn update(
        &self,
        id: Uuid,
        edit: FileUserEdit,
        replacement: Option<FileUpload>,
    ) -> AppResult<FileUserRecord> {
        let mut file_user = self
            .file_users
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("File {id} not found")))?;
        let previous_file_id = file_user.file_id;

        if let Some(upload) = replacement {
            let file = self.content.save_file(upload).await?;
            file_user.file_id = file.id;
        }
        if let Some(name) = edit.name {
            file_user.name = name;
        }
        if let Some(public) = edit.public {
            file_user.public = public;
        }

        let updated = self.file_users.update(&file_user).await?;

        if updated.file_id != previous_file_id {
            self.content
                .delete_file_if_unreferenced(previous_file_id)
                .await?;
            info!(
                file_user_id = %updated.id,
                old_file_id = %previous_file_id,
                new_file_id = %updated.file_id,
                "File content replaced"
            );
        }

        self.record(updated.id).await
    }

    /// Delete an ownership row, collecting its content if unreferenced.
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let file_user = self
            .file_users
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("File {id} not found")))?;

        self.file_users.delete(id).await?;
        self.content
            .delete_file_if_unreferenced(file_user.file_id)
            .await?;

        info!(file_user_id = %id, file_id = %file_user.file_id, "File deleted");
        Ok(())
    }

    /// Fetch the joined record for an ownership row.
    pub async fn get(&self, id: Uuid) -> AppResult<FileUserRecord> {
        self.record(id).await
    }

    /// Download a file: joined record plus payload bytes.
    pub async fn download(&self, id: Uuid) -> AppResult<Download> {
        let record = self.record(id).await?;
        let (_, data) = self.content.load_file(record.file_id).await?;

        Ok(Download {
            content_type: record.mime.clone(),
            filename: record.download_filename(),
            record,
            data,
        })
    }

    /// List files, optionally filtered by owner and name search.
    pub async fn list(
        &self,
        user_id: Option<Uuid>,
        search: Option<&str>,
        query: &ListQuery,
    ) -> AppResult<Page<FileUserRecord>> {
        self.file_users.list(user_id, search, query).await
    }

    async fn record(&self, id: Uuid) -> AppResult<FileUserRecord> {
        self.file_users
            .find_record(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("File {id} not found")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use depot_core::config::storage::StorageConfig;
    use depot_core::error::ErrorKind;
    use depot_core::traits::backend::ContentBackend;
    use depot_core::traits::registry::ReferenceCounter;

    use crate::content::store::Registry;
    use crate::test_support::{MemoryBackend, MemoryOwnership, MemoryRegistry};

    struct Fixture {
        service: FileUserService,
        backend: Arc<MemoryBackend>,
        registry: Arc<MemoryRegistry>,
        ownership: Arc<MemoryOwnership>,
    }

    fn fixture() -> Fixture {
        let registry = Arc::new(MemoryRegistry::new());
        let ownership = Arc::new(MemoryOwnership::new(Arc::clone(&registry)));
        let backend = Arc::new(MemoryBackend::new());
        let content = Arc::new(ContentStore::new(
            Arc::clone(&registry) as Arc<Registry>,
            Arc::clone(&ownership) as Arc<dyn ReferenceCounter>,
            Arc::clone(&backend) as Arc<dyn ContentBackend>,
            StorageConfig::default(),
        ));
        let service = FileUserService::new(
            Arc::clone(&ownership) as Arc<dyn OwnershipRepository>,
            content,
        );
        Fixture {
            service,
            backend,
            registry,
            ownership,
        }
    }

    fn request(filename: &str, payload: &'static [u8], public: bool) -> UploadRequest {
        UploadRequest {
            filename: filename.to_string(),
            declared_mime: Some("text/plain".to_string()),
            payload: Bytes::from_static(payload),
            public,
        }
    }

    fn replacement(filename: &str, payload: &'static [u8]) -> FileUpload {
        FileUpload {
            filename: filename.to_string(),
            declared_mime: Some("text/plain".to_string()),
            payload: Bytes::from_static(payload),
        }
    }

    #[tokio::test]
    async fn test_upload_creates_named_record() {
        let f = fixture();

        let record = f
            .service
            .upload(Uuid::new_v4(), request("report.txt", b"contents", true))
            .await
            .unwrap();

        assert_eq!(record.name, "report");
        assert_eq!(record.ext, "txt");
        assert_eq!(record.mime, "text/plain");
        assert!(record.public);
        assert_eq!(record.size_bytes, 8);
    }

    #[tokio::test]
    async fn test_two_owners_share_one_content_object() {
        let f = fixture();

        let first = f
            .service
            .upload(Uuid::new_v4(), request("mine.txt", b"shared", false))
            .await
            .unwrap();
        let second = f
            .service
            .upload(Uuid::new_v4(), request("yours.txt", b"shared", false))
            .await
            .unwrap();

        assert_ne!(first.id, second.id);
        assert_eq!(first.file_id, second.file_id);
        assert_eq!(f.backend.object_count(), 1);
        assert_eq!(f.registry.row_count(), 1);
    }

    #[tokio::test]
    async fn test_update_renames_and_toggles_visibility() {
        let f = fixture();

        let record = f
            .service
            .upload(Uuid::new_v4(), request("draft.txt", b"text", false))
            .await
            .unwrap();
        let updated = f
            .service
            .update(
                record.id,
                FileUserEdit {
                    name: Some("final".to_string()),
                    public: Some(true),
                },
                None,
            )
            .await
            .unwrap();

        assert_eq!(updated.id, record.id);
        assert_eq!(updated.name, "final");
        assert!(updated.public);
        // Content untouched.
        assert_eq!(updated.file_id, record.file_id);
    }

    #[tokio::test]
    async fn test_replace_content_repoints_and_collects_orphan() {
        let f = fixture();

        let record = f
            .service
            .upload(Uuid::new_v4(), request("doc.txt", b"version one", false))
            .await
            .unwrap();
        let updated = f
            .service
            .update(
                record.id,
                FileUserEdit::default(),
                Some(replacement("doc.txt", b"version two")),
            )
            .await
            .unwrap();

        assert_eq!(updated.id, record.id);
        assert_eq!(updated.name, record.name);
        assert_ne!(updated.file_id, record.file_id);
        // The old content lost its last reference and was collected.
        assert_eq!(f.registry.row_count(), 1);
        assert_eq!(f.backend.object_count(), 1);
    }

    #[tokio::test]
    async fn test_replace_content_keeps_shared_original() {
        let f = fixture();

        let first = f
            .service
            .upload(Uuid::new_v4(), request("a.txt", b"shared", false))
            .await
            .unwrap();
        let second = f
            .service
            .upload(Uuid::new_v4(), request("b.txt", b"shared", false))
            .await
            .unwrap();

        f.service
            .update(
                second.id,
                FileUserEdit::default(),
                Some(replacement("b.txt", b"different")),
            )
            .await
            .unwrap();

        // The first owner still resolves to the original bytes.
        let download = f.service.download(first.id).await.unwrap();
        assert_eq!(download.data, Bytes::from_static(b"shared"));
        assert_eq!(f.registry.row_count(), 2);
    }

    #[tokio::test]
    async fn test_delete_removes_row_and_orphaned_content() {
        let f = fixture();

        let record = f
            .service
            .upload(Uuid::new_v4(), request("gone.txt", b"bytes", false))
            .await
            .unwrap();
        f.service.delete(record.id).await.unwrap();

        assert_eq!(f.ownership.row_count(), 0);
        assert_eq!(f.registry.row_count(), 0);
        assert_eq!(f.backend.object_count(), 0);

        let err = f.service.get(record.id).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_delete_keeps_content_shared_with_other_owner() {
        let f = fixture();

        let first = f
            .service
            .upload(Uuid::new_v4(), request("one.txt", b"kept", false))
            .await
            .unwrap();
        let second = f
            .service
            .upload(Uuid::new_v4(), request("two.txt", b"kept", false))
            .await
            .unwrap();

        f.service.delete(first.id).await.unwrap();

        let download = f.service.download(second.id).await.unwrap();
        assert_eq!(download.data, Bytes::from_static(b"kept"));
        assert_eq!(f.backend.object_count(), 1);
    }

    #[tokio::test]
    async fn test_download_carries_response_metadata() {
        let f = fixture();

        let record = f
            .service
            .upload(Uuid::new_v4(), request("photo.txt", b"pixels", false))
            .await
            .unwrap();
        let download = f.service.download(record.id).await.unwrap();

        assert_eq!(download.filename, "photo.txt");
        assert_eq!(download.content_type, "text/plain");
        assert_eq!(download.data, Bytes::from_static(b"pixels"));
    }

    #[tokio::test]
    async fn test_list_filters_by_owner() {
        let f = fixture();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();

        f.service
            .upload(alice, request("a1.txt", b"a1", false))
            .await
            .unwrap();
        f.service
            .upload(alice, request("a2.txt", b"a2", false))
            .await
            .unwrap();
        f.service
            .upload(bob, request("b1.txt", b"b1", false))
            .await
            .unwrap();

        let page = f
            .service
            .list(Some(alice), None, &ListQuery::default())
            .await
            .unwrap();
        assert_eq!(page.total, 2);
        assert!(page.rows.iter().all(|r| r.user_id == alice));
    }

    #[tokio::test]
    async fn test_list_searches_by_name() {
        let f = fixture();
        let user = Uuid::new_v4();

        f.service
            .upload(user, request("quarterly-report.txt", b"q", false))
            .await
            .unwrap();
        f.service
            .upload(user, request("holiday-photo.txt", b"h", false))
            .await
            .unwrap();

        let page = f
            .service
            .list(None, Some("report"), &ListQuery::default())
            .await
            .unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.rows[0].name, "quarterly-report");
    }

    #[tokio::test]
    async fn test_get_unknown_id_is_not_found() {
        let f = fixture();

        let err = f.service.get(Uuid::new_v4()).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }
}
