//! In-memory fakes for the registry, backend, and ownership contracts.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use uuid::Uuid;

use depot_core::error::AppError;
use depot_core::result::AppResult;
use depot_core::traits::backend::{BackendKind, ContentBackend, ObjectMeta};
use depot_core::traits::registry::{ContentRegistry, ReferenceCounter};
use depot_core::types::hash::ContentHash;
use depot_core::types::pagination::{ListQuery, Page};
use depot_entity::file::model::{CreateFile, File};
use depot_entity::file_user::model::{CreateFileUser, FileUser, FileUserRecord};

use crate::file_user::OwnershipRepository;

/// In-memory content registry with the same uniqueness semantics as the
/// `files` table.
#[derive(Debug)]
pub struct MemoryRegistry {
    rows: Mutex<HashMap<Uuid, File>>,
    hide_next: AtomicBool,
}

impl MemoryRegistry {
    pub fn new() -> Self {
        Self {
            rows: Mutex::new(HashMap::new()),
            hide_next: AtomicBool::new(false),
        }
    }

    /// Make the next `find_by_hash` miss, simulating a concurrent insert
    /// landing between lookup and insert.
    pub fn hide_next_lookup(&self) {
        self.hide_next.store(true, Ordering::SeqCst);
    }

    pub fn row_count(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    pub fn get(&self, id: Uuid) -> Option<File> {
        self.rows.lock().unwrap().get(&id).cloned()
    }
}

#[async_trait]
impl ContentRegistry<File, CreateFile> for MemoryRegistry {
    async fn find_by_hash(&self, hash: &ContentHash) -> AppResult<Option<File>> {
        if self.hide_next.swap(false, Ordering::SeqCst) {
            return Ok(None);
        }
        Ok(self
            .rows
            .lock()
            .unwrap()
            .values()
            .find(|f| &f.hash == hash)
            .cloned())
    }

    async fn insert(&self, create: &CreateFile) -> AppResult<File> {
        let mut rows = self.rows.lock().unwrap();
        if rows.values().any(|f| f.hash == create.hash) {
            return Err(AppError::conflict(format!(
                "Content {} already registered",
                create.hash
            )));
        }
        let file = File {
            id: Uuid::new_v4(),
            hash: create.hash.clone(),
            mime: create.mime.clone(),
            ext: create.ext.clone(),
            size_bytes: create.size_bytes,
            backend: create.backend.clone(),
            locator: create.locator.clone(),
            created_at: Utc::now(),
        };
        rows.insert(file.id, file.clone());
        Ok(file)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<File>> {
        Ok(self.rows.lock().unwrap().get(&id).cloned())
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        Ok(self.rows.lock().unwrap().remove(&id).is_some())
    }
}

/// In-memory content backend with store-call accounting and a tampering
/// hook for corruption tests.
#[derive(Debug)]
pub struct MemoryBackend {
    objects: Mutex<HashMap<String, Bytes>>,
    store_calls: AtomicUsize,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self {
            objects: Mutex::new(HashMap::new()),
            store_calls: AtomicUsize::new(0),
        }
    }

    pub fn store_calls(&self) -> usize {
        self.store_calls.load(Ordering::SeqCst)
    }

    pub fn object_count(&self) -> usize {
        self.objects.lock().unwrap().len()
    }

    /// Overwrite a stored object without updating any registry state.
    pub fn tamper(&self, locator: &str, data: Bytes) {
        self.objects
            .lock()
            .unwrap()
            .insert(locator.to_string(), data);
    }
}

#[async_trait]
impl ContentBackend for MemoryBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Local
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }

    async fn store(
        &self,
        hash: &ContentHash,
        payload: Bytes,
        _meta: &ObjectMeta,
    ) -> AppResult<String> {
        self.store_calls.fetch_add(1, Ordering::SeqCst);
        let locator = format!("mem/{hash}");
        self.objects.lock().unwrap().insert(locator.clone(), payload);
        Ok(locator)
    }

    async fn load(&self, locator: &str) -> AppResult<Bytes> {
        self.objects
            .lock()
            .unwrap()
            .get(locator)
            .cloned()
            .ok_or_else(|| AppError::not_found(format!("Content object not found: {locator}")))
    }

    async fn delete(&self, locator: &str) -> AppResult<()> {
        self.objects.lock().unwrap().remove(locator);
        Ok(())
    }
}

/// In-memory ownership store joined against a [`MemoryRegistry`].
#[derive(Debug)]
pub struct MemoryOwnership {
    registry: Arc<MemoryRegistry>,
    rows: Mutex<HashMap<Uuid, FileUser>>,
}

impl MemoryOwnership {
    pub fn new(registry: Arc<MemoryRegistry>) -> Self {
        Self {
            registry,
            rows: Mutex::new(HashMap::new()),
        }
    }

    /// Insert an ownership row directly, bypassing the service layer.
    pub fn attach(&self, user_id: Uuid, file_id: Uuid, name: &str) -> FileUser {
        let now = Utc::now();
        let file_user = FileUser {
            id: Uuid::new_v4(),
            user_id,
            file_id,
            name: name.to_string(),
            public: false,
            created_at: now,
            updated_at: now,
        };
        self.rows
            .lock()
            .unwrap()
            .insert(file_user.id, file_user.clone());
        file_user
    }

    pub fn row_count(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    fn record_of(&self, file_user: &FileUser) -> Option<FileUserRecord> {
        self.registry.get(file_user.file_id).map(|file| FileUserRecord {
            id: file_user.id,
            user_id: file_user.user_id,
            file_id: file_user.file_id,
            name: file_user.name.clone(),
            ext: file.ext,
            mime: file.mime,
            size_bytes: file.size_bytes,
            public: file_user.public,
            hash: file.hash,
        })
    }
}

#[async_trait]
impl OwnershipRepository for MemoryOwnership {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<FileUser>> {
        Ok(self.rows.lock().unwrap().get(&id).cloned())
    }

    async fn find_record(&self, id: Uuid) -> AppResult<Option<FileUserRecord>> {
        let row = self.rows.lock().unwrap().get(&id).cloned();
        Ok(row.and_then(|fu| self.record_of(&fu)))
    }

    async fn create(&self, create: &CreateFileUser) -> AppResult<FileUser> {
        let now = Utc::now();
        let file_user = FileUser {
            id: Uuid::new_v4(),
            user_id: create.user_id,
            file_id: create.file_id,
            name: create.name.clone(),
            public: create.public,
            created_at: now,
            updated_at: now,
        };
        self.rows
            .lock()
            .unwrap()
            .insert(file_user.id, file_user.clone());
        Ok(file_user)
    }

    async fn update(&self, file_user: &FileUser) -> AppResult<FileUser> {
        let mut rows = self.rows.lock().unwrap();
        if !rows.contains_key(&file_user.id) {
            return Err(AppError::not_found(format!(
                "File user {} not found",
                file_user.id
            )));
        }
        let mut updated = file_user.clone();
        updated.updated_at = Utc::now();
        rows.insert(updated.id, updated.clone());
        Ok(updated)
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        Ok(self.rows.lock().unwrap().remove(&id).is_some())
    }

    async fn list(
        &self,
        user_id: Option<Uuid>,
        search: Option<&str>,
        query: &ListQuery,
    ) -> AppResult<Page<FileUserRecord>> {
        let rows = self.rows.lock().unwrap();
        let mut matches: Vec<FileUser> = rows
            .values()
            .filter(|fu| user_id.is_none_or(|uid| fu.user_id == uid))
            .filter(|fu| {
                search.is_none_or(|s| fu.name.to_lowercase().contains(&s.to_lowercase()))
            })
            .cloned()
            .collect();
        drop(rows);

        matches.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let total = matches.len() as i64;
        let page_rows = matches
            .into_iter()
            .skip(query.offset() as usize)
            .take(query.limit() as usize)
            .filter_map(|fu| self.record_of(&fu))
            .collect();
        Ok(Page::new(page_rows, total))
    }
}

#[async_trait]
impl ReferenceCounter for MemoryOwnership {
    async fn count_references(&self, file_id: Uuid) -> AppResult<u64> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .values()
            .filter(|fu| fu.file_id == file_id)
            .count() as u64)
    }
}
