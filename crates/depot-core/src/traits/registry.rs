//! Registry and reference-count contracts backing the content store.

use async_trait::async_trait;
use uuid::Uuid;

use crate::result::AppResult;
use crate::types::hash::ContentHash;

/// Index from content digest to content metadata.
///
/// The registry is the single source of truth for hash uniqueness: at most
/// one record exists per digest, enforced by the underlying store (a unique
/// index, not an application-level lock). Callers never write payload bytes
/// to a backend without recording them here.
///
/// The trait is generic over the record and creation types so that the
/// entity crate stays independent of this one; the coordinator pins the
/// parameters to its `File` model.
#[async_trait]
pub trait ContentRegistry<Record, Create>: Send + Sync + 'static
where
    Record: Send + Sync + 'static,
    Create: Send + Sync + 'static,
{
    /// Find a record by its content digest.
    async fn find_by_hash(&self, hash: &ContentHash) -> AppResult<Option<Record>>;

    /// Insert a new record.
    ///
    /// Fails with [`crate::error::ErrorKind::Conflict`] when a record with
    /// the same digest already exists; the caller must treat that as
    /// "already stored" and re-resolve via [`Self::find_by_hash`] rather
    /// than retrying the insert.
    async fn insert(&self, create: &Create) -> AppResult<Record>;

    /// Find a record by its identifier.
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Record>>;

    /// Delete a record by its identifier. Returns `true` if a row was
    /// removed.
    async fn delete(&self, id: Uuid) -> AppResult<bool>;
}

/// Answers how many ownership records still reference a content record.
///
/// Implemented by the ownership store; the coordinator consults it before
/// any physical content deletion.
#[async_trait]
pub trait ReferenceCounter: Send + Sync + 'static {
    /// Number of ownership records pointing at the given content record.
    async fn count_references(&self, file_id: Uuid) -> AppResult<u64>;
}
