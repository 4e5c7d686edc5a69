//! SHA-256 content digests.
//!
//! The digest is a pure function of the payload bytes — filename and
//! headers never enter the hash — which makes it usable both as the
//! deduplication key and as the integrity check on retrieval.

use sha2::{Digest, Sha256};

use depot_core::types::hash::ContentHash;

/// Compute the SHA-256 digest of a payload.
pub fn digest(payload: &[u8]) -> ContentHash {
    let mut hasher = Sha256::new();
    hasher.update(payload);
    ContentHash::from_digest(hasher.finalize().into())
}
