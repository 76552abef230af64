//! In-memory backend.
//!
//! Lock order is always bucket map, then bucket. Object operations clone the
//! bucket's `Arc` under a brief map read lock and release it before locking
//! the bucket, so traffic on one bucket never blocks another. Only
//! `delete_bucket` holds both at once. A deleted bucket is flagged `removed`
//! so a writer that fetched its `Arc` before the delete cannot resurrect it.

use std::collections::{BTreeMap, HashMap};
use std::collections::hash_map::Entry;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use s3shim_model::{BucketInfo, BucketListing, ObjectInfo, Owner, StoredObject};
use tracing::{debug, info};

use super::S3Backend;
use crate::checksums::compute_etag;
use crate::error::S3ServiceError;

#[derive(Debug)]
struct Bucket {
    creation_date: DateTime<Utc>,
    contents: RwLock<BucketContents>,
}

#[derive(Debug, Default)]
struct BucketContents {
    objects: BTreeMap<String, StoredObject>,
    removed: bool,
}

impl Bucket {
    fn new() -> Self {
        Self {
            creation_date: Utc::now(),
            contents: RwLock::new(BucketContents::default()),
        }
    }
}

/// Process-lifetime bucket/object store.
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    buckets: RwLock<HashMap<String, Arc<Bucket>>>,
}

impl InMemoryBackend {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn bucket(&self, name: &str) -> Result<Arc<Bucket>, S3ServiceError> {
        self.buckets
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| no_such_bucket(name))
    }
}

fn no_such_bucket(name: &str) -> S3ServiceError {
    S3ServiceError::NoSuchBucket {
        bucket: name.to_owned(),
    }
}

fn no_such_key(bucket: &str, key: &str) -> S3ServiceError {
    S3ServiceError::NoSuchKey {
        bucket: bucket.to_owned(),
        key: key.to_owned(),
    }
}

#[async_trait]
impl S3Backend for InMemoryBackend {
    async fn list_buckets(&self, credential: &str) -> Result<BucketListing, S3ServiceError> {
        let mut buckets: Vec<BucketInfo> = self
            .buckets
            .read()
            .iter()
            .map(|(name, bucket)| BucketInfo {
                name: name.clone(),
                creation_date: bucket.creation_date,
            })
            .collect();
        buckets.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(BucketListing {
            owner: Owner::from_credential(credential),
            buckets,
        })
    }

    async fn create_bucket(&self, bucket: &str, _credential: &str) -> Result<(), S3ServiceError> {
        match self.buckets.write().entry(bucket.to_owned()) {
            Entry::Occupied(_) => Err(S3ServiceError::BucketAlreadyExists {
                bucket: bucket.to_owned(),
            }),
            Entry::Vacant(slot) => {
                slot.insert(Arc::new(Bucket::new()));
                info!(bucket, "bucket created");
                Ok(())
            }
        }
    }

    async fn delete_bucket(&self, bucket: &str, _credential: &str) -> Result<(), S3ServiceError> {
        let mut buckets = self.buckets.write();
        let entry = buckets.get(bucket).ok_or_else(|| no_such_bucket(bucket))?;
        {
            let mut contents = entry.contents.write();
            if !contents.objects.is_empty() {
                return Err(S3ServiceError::BucketNotEmpty {
                    bucket: bucket.to_owned(),
                });
            }
            contents.removed = true;
        }
        buckets.remove(bucket);
        info!(bucket, "bucket deleted");
        Ok(())
    }

    async fn bucket_exists(&self, bucket: &str, _credential: &str) -> Result<(), S3ServiceError> {
        if self.buckets.read().contains_key(bucket) {
            Ok(())
        } else {
            Err(no_such_bucket(bucket))
        }
    }

    async fn list_objects(
        &self,
        bucket: &str,
        _credential: &str,
    ) -> Result<Vec<ObjectInfo>, S3ServiceError> {
        let entry = self.bucket(bucket)?;
        let contents = entry.contents.read();
        if contents.removed {
            return Err(no_such_bucket(bucket));
        }
        Ok(contents.objects.values().map(|o| o.info.clone()).collect())
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        data: Bytes,
        content_type: &str,
        credential: &str,
    ) -> Result<ObjectInfo, S3ServiceError> {
        let entry = self.bucket(bucket)?;
        let info = ObjectInfo {
            key: key.to_owned(),
            size: data.len() as u64,
            etag: compute_etag(&data),
            last_modified: Utc::now(),
            content_type: content_type.to_owned(),
            owner: Owner::from_credential(credential),
        };

        let mut contents = entry.contents.write();
        if contents.removed {
            return Err(no_such_bucket(bucket));
        }
        contents.objects.insert(
            key.to_owned(),
            StoredObject {
                info: info.clone(),
                data,
            },
        );
        debug!(bucket, key, size = info.size, "object stored");
        Ok(info)
    }

    async fn get_object(
        &self,
        bucket: &str,
        key: &str,
        _credential: &str,
    ) -> Result<StoredObject, S3ServiceError> {
        let entry = self.bucket(bucket)?;
        let contents = entry.contents.read();
        if contents.removed {
            return Err(no_such_bucket(bucket));
        }
        contents
            .objects
            .get(key)
            .cloned()
            .ok_or_else(|| no_such_key(bucket, key))
    }

    async fn head_object(
        &self,
        bucket: &str,
        key: &str,
        _credential: &str,
    ) -> Result<ObjectInfo, S3ServiceError> {
        let entry = self.bucket(bucket)?;
        let contents = entry.contents.read();
        if contents.removed {
            return Err(no_such_bucket(bucket));
        }
        contents
            .objects
            .get(key)
            .map(|o| o.info.clone())
            .ok_or_else(|| no_such_key(bucket, key))
    }

    async fn delete_object(
        &self,
        bucket: &str,
        key: &str,
        _credential: &str,
    ) -> Result<(), S3ServiceError> {
        let entry = self.bucket(bucket)?;
        let mut contents = entry.contents.write();
        if contents.removed {
            return Err(no_such_bucket(bucket));
        }
        contents
            .objects
            .remove(key)
            .map(|_| debug!(bucket, key, "object deleted"))
            .ok_or_else(|| no_such_key(bucket, key))
    }

    async fn reset(&self) -> Result<(), S3ServiceError> {
        let previous = std::mem::take(&mut *self.buckets.write());
        info!(buckets = previous.len(), "in-memory backend reset");
        Ok(())
    }
}
