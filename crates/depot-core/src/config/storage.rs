//! Content storage configuration.

use serde::{Deserialize, Serialize};

/// Top-level storage configuration.
///
/// `backend` selects the active content backend for the whole process;
/// the choice is resolved once at startup and never changes per request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Active content backend: `"database"`, `"local"`, or `"s3"`.
    #[serde(default = "default_backend")]
    pub backend: String,
    /// Maximum upload size in bytes (default 1 GB).
    #[serde(default = "default_max_upload")]
    pub max_upload_size_bytes: u64,
    /// Re-verify the content digest on every read.
    #[serde(default)]
    pub verify_on_read: bool,
    /// Bounded timeout for backend I/O, in seconds.
    #[serde(default = "default_io_timeout")]
    pub io_timeout_seconds: u64,
    /// Local filesystem backend configuration.
    #[serde(default)]
    pub local: LocalBackendConfig,
    /// S3-compatible backend configuration.
    #[serde(default)]
    pub s3: S3BackendConfig,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            max_upload_size_bytes: default_max_upload(),
            verify_on_read: false,
            io_timeout_seconds: default_io_timeout(),
            local: LocalBackendConfig::default(),
            s3: S3BackendConfig::default(),
        }
    }
}

/// Local filesystem backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalBackendConfig {
    /// Root path for locally stored content.
    #[serde(default = "default_local_root")]
    pub root_path: String,
}

impl Default for LocalBackendConfig {
    fn default() -> Self {
        Self {
            root_path: default_local_root(),
        }
    }
}

/// S3-compatible object storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct S3BackendConfig {
    /// S3 endpoint URL (for non-AWS services like MinIO).
    #[serde(default)]
    pub endpoint: String,
    /// AWS region.
    #[serde(default = "default_region")]
    pub region: String,
    /// S3 bucket name.
    #[serde(default)]
    pub bucket: String,
}

fn default_backend() -> String {
    "database".to_string()
}

fn default_max_upload() -> u64 {
    1_073_741_824 // 1 GB
}

fn default_io_timeout() -> u64 {
    30
}

fn default_local_root() -> String {
    "./data/content".to_string()
}

fn default_region() -> String {
    "us-east-1".to_string()
}
