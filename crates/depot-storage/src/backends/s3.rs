//! S3-compatible object storage backend.

use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use tracing::info;

use depot_core::config::storage::S3BackendConfig;
use depot_core::error::{AppError, ErrorKind};
use depot_core::result::AppResult;
use depot_core::traits::backend::{BackendKind, ContentBackend, ObjectMeta};
use depot_core::types::hash::ContentHash;

/// Content backend over an S3-compatible object store.
///
/// Objects are keyed by digest (`sha256/<first-2-hex>/<full-hex>`); the
/// locator records bucket and key so it stays valid if the configured
/// bucket later changes. Re-putting the same key writes byte-identical
/// content, which keeps `store` idempotent.
#[derive(Debug, Clone)]
pub struct S3Backend {
    client: aws_sdk_s3::Client,
    bucket: String,
}

impl S3Backend {
    /// Create a new S3 backend from configuration.
    ///
    /// Credentials come from the default AWS provider chain; a non-empty
    /// `endpoint` switches to path-style addressing for S3-compatible
    /// services like MinIO.
    pub async fn new(config: &S3BackendConfig) -> AppResult<Self> {
        if config.bucket.is_empty() {
            return Err(AppError::configuration("S3 backend requires a bucket name"));
        }

        let shared = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_config::Region::new(config.region.clone()))
            .load()
            .await;

        let mut builder = aws_sdk_s3::config::Builder::from(&shared);
        if !config.endpoint.is_empty() {
            builder = builder
                .endpoint_url(&config.endpoint)
                .force_path_style(true);
        }
        let client = aws_sdk_s3::Client::from_conf(builder.build());

        info!(
            bucket = %config.bucket,
            region = %config.region,
            "Initializing S3 content backend"
        );
        Ok(Self {
            client,
            bucket: config.bucket.clone(),
        })
    }

    /// Digest-derived object key.
    fn object_key(hash: &ContentHash) -> String {
        format!("sha256/{}/{}", hash.shard_prefix(), hash.as_str())
    }

    /// Split a `bucket/key` locator.
    fn split_locator(locator: &str) -> AppResult<(&str, &str)> {
        locator
            .split_once('/')
            .ok_or_else(|| AppError::storage_read(format!("Malformed S3 locator: {locator}")))
    }
}

#[async_trait]
impl ContentBackend for S3Backend {
    fn kind(&self) -> BackendKind {
        BackendKind::S3
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(self
            .client
            .head_bucket()
            .bucket(&self.bucket)
            .send()
            .await
            .is_ok())
    }

    async fn store(
        &self,
        hash: &ContentHash,
        payload: Bytes,
        meta: &ObjectMeta,
    ) -> AppResult<String> {
        let key = Self::object_key(hash);
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .content_type(&meta.mime)
            .body(ByteStream::from(payload))
            .send()
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::StorageWrite,
                    format!("Failed to store s3://{}/{key}", self.bucket),
                    e,
                )
            })?;
        Ok(format!("{}/{key}", self.bucket))
    }

    async fn load(&self, locator: &str) -> AppResult<Bytes> {
        let (bucket, key) = Self::split_locator(locator)?;
        let response = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                let service_err = e.into_service_error();
                if service_err.is_no_such_key() {
                    AppError::not_found(format!("Content object not found: {locator}"))
                } else {
                    AppError::with_source(
                        ErrorKind::StorageRead,
                        format!("Failed to load s3://{locator}"),
                        service_err,
                    )
                }
            })?;

        let data = response.body.collect().await.map_err(|e| {
            AppError::with_source(
                ErrorKind::StorageRead,
                format!("Failed to read body of s3://{locator}"),
                e,
            )
        })?;
        Ok(data.into_bytes())
    }

    async fn delete(&self, locator: &str) -> AppResult<()> {
        let (bucket, key) = Self::split_locator(locator)?;
        self.client
            .delete_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::StorageWrite,
                    format!("Failed to delete s3://{locator}"),
                    e,
                )
            })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_key_is_sharded() {
        let hash = ContentHash::from_digest([0xcd; 32]);
        let key = S3Backend::object_key(&hash);
        assert!(key.starts_with("sha256/cd/"));
        assert!(key.ends_with(hash.as_str()));
    }

    #[test]
    fn test_split_locator() {
        let (bucket, key) = S3Backend::split_locator("media/sha256/ab/abc").unwrap();
        assert_eq!(bucket, "media");
        assert_eq!(key, "sha256/ab/abc");
    }

    #[test]
    fn test_split_locator_rejects_missing_separator() {
        assert!(S3Backend::split_locator("nobucketkey").is_err());
    }
}
