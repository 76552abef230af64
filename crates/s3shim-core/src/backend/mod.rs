//! The storage capability and its implementations.
//!
//! [`S3Backend`] is everything the dispatcher needs from storage. Two
//! implementations exist:
//!
//! - [`InMemoryBackend`]: a map of buckets behind a coarse lock, each bucket
//!   with its own lock over its objects.
//! - [`DiskBackend`]: one directory per bucket under a base path.
//!
//! Every method takes the caller's credential string. It is only used to
//! derive the [`Owner`](s3shim_model::Owner) recorded on writes and
//! reported by listings.

mod disk;
mod memory;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use s3shim_model::{BucketListing, ObjectInfo, StoredObject};
use tracing::info;

use crate::config::{BackendKind, S3Config};
use crate::error::S3ServiceError;

pub use disk::DiskBackend;
pub use memory::InMemoryBackend;

/// Bucket and object storage.
#[async_trait]
pub trait S3Backend: Send + Sync + fmt::Debug + 'static {
    /// List every bucket, sorted by name, with the owner derived from `credential`.
    async fn list_buckets(&self, credential: &str) -> Result<BucketListing, S3ServiceError>;

    /// Create an empty bucket.
    ///
    /// Fails with [`S3ServiceError::BucketAlreadyExists`] when the name is taken.
    /// Backends that cannot store a name fail with [`S3ServiceError::InvalidBucketName`].
    async fn create_bucket(&self, bucket: &str, credential: &str) -> Result<(), S3ServiceError>;

    /// Delete an empty bucket.
    ///
    /// Fails with [`S3ServiceError::BucketNotEmpty`] while the bucket holds objects.
    async fn delete_bucket(&self, bucket: &str, credential: &str) -> Result<(), S3ServiceError>;

    /// Succeeds when the bucket exists.
    async fn bucket_exists(&self, bucket: &str, credential: &str) -> Result<(), S3ServiceError>;

    /// Snapshot of all object summaries in the bucket, sorted by key.
    async fn list_objects(
        &self,
        bucket: &str,
        credential: &str,
    ) -> Result<Vec<ObjectInfo>, S3ServiceError>;

    /// Create or replace an object. Readers observe either the old or the new
    /// object, never a partial write.
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        data: Bytes,
        content_type: &str,
        credential: &str,
    ) -> Result<ObjectInfo, S3ServiceError>;

    /// Fetch an object with its payload.
    async fn get_object(
        &self,
        bucket: &str,
        key: &str,
        credential: &str,
    ) -> Result<StoredObject, S3ServiceError>;

    /// Fetch object metadata only.
    async fn head_object(
        &self,
        bucket: &str,
        key: &str,
        credential: &str,
    ) -> Result<ObjectInfo, S3ServiceError>;

    /// Remove an object.
    async fn delete_object(
        &self,
        bucket: &str,
        key: &str,
        credential: &str,
    ) -> Result<(), S3ServiceError>;

    /// Copy an object by reading the source and writing the destination.
    ///
    /// The read and the write are separate steps: a concurrent write to the
    /// source between them is not reflected in the copy, and a failure after
    /// the read leaves the destination untouched.
    async fn copy_object(
        &self,
        source_bucket: &str,
        source_key: &str,
        bucket: &str,
        key: &str,
        credential: &str,
    ) -> Result<ObjectInfo, S3ServiceError> {
        let source = self
            .get_object(source_bucket, source_key, credential)
            .await?;
        self.put_object(bucket, key, source.data, &source.info.content_type, credential)
            .await
    }

    /// Drop every bucket and object.
    async fn reset(&self) -> Result<(), S3ServiceError>;
}

/// Construct the backend selected by `config`.
pub async fn from_config(config: &S3Config) -> Result<Arc<dyn S3Backend>, S3ServiceError> {
    let backend: Arc<dyn S3Backend> = match config.backend {
        BackendKind::Memory => Arc::new(InMemoryBackend::new()),
        BackendKind::Disk => Arc::new(DiskBackend::open(&config.data_dir).await?),
    };
    info!(backend = %config.backend, "storage backend ready");
    Ok(backend)
}
