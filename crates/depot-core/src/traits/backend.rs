//! Content backend trait for pluggable payload storage.

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::AppError;
use crate::result::AppResult;
use crate::types::hash::ContentHash;

/// The kind of content backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Payload bytes inline in the database.
    Database,
    /// Local filesystem, sharded by digest prefix.
    Local,
    /// S3-compatible object storage.
    S3,
}

impl BackendKind {
    /// Return the backend kind as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Database => "database",
            Self::Local => "local",
            Self::S3 => "s3",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "database" => Ok(Self::Database),
            "local" => Ok(Self::Local),
            "s3" => Ok(Self::S3),
            _ => Err(AppError::configuration(format!(
                "Invalid backend kind: '{s}'. Expected one of: database, local, s3"
            ))),
        }
    }
}

/// Metadata handed to a backend alongside the payload bytes.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ObjectMeta {
    /// MIME type of the payload.
    pub mime: String,
    /// File extension (without the dot).
    pub ext: String,
    /// Payload size in bytes.
    pub size_bytes: u64,
}

/// Trait for content storage backends.
///
/// A backend persists raw payload bytes keyed by their content digest and
/// hands back an opaque locator string that the content registry records.
/// Which implementation is active is process-wide configuration, fixed at
/// startup and injected into the coordinator — never branched per call.
///
/// `store` must be idempotent: storing the same digest twice either no-ops
/// or overwrites with byte-identical content, and a failed store must not
/// leave a partially written object visible to `load`.
#[async_trait]
pub trait ContentBackend: Send + Sync + fmt::Debug + 'static {
    /// Return which kind of backend this is.
    fn kind(&self) -> BackendKind;

    /// Check whether the backend is healthy and reachable.
    async fn health_check(&self) -> AppResult<bool>;

    /// Durably write a payload under its digest, returning its locator.
    async fn store(
        &self,
        hash: &ContentHash,
        payload: Bytes,
        meta: &ObjectMeta,
    ) -> AppResult<String>;

    /// Read the payload bytes addressed by a locator.
    async fn load(&self, locator: &str) -> AppResult<Bytes>;

    /// Delete the object addressed by a locator. Deleting an absent
    /// object is not an error.
    async fn delete(&self, locator: &str) -> AppResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_kind_roundtrip() {
        for kind in [BackendKind::Database, BackendKind::Local, BackendKind::S3] {
            let parsed: BackendKind = kind.as_str().parse().expect("should parse");
            assert_eq!(parsed, kind);
        }
    }

    #[test]
    fn test_backend_kind_rejects_unknown() {
        assert!("ftp".parse::<BackendKind>().is_err());
    }
}
