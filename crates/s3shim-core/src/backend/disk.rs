//! Disk backend.
//!
//! Layout under the base directory:
//!
//! ```text
//! buckets/<bucket>/bucket.json        BucketInfo
//! buckets/<bucket>/objects/<key>      u64 header length | ObjectInfo JSON | payload
//! staging/                            in-flight writes
//! ```
//!
//! Bucket names and keys are percent-encoded into single file names. Object
//! files are written to `staging/` and renamed into place, so a reader sees
//! either the previous object or the new one. A namespace lock serializes
//! bucket creation, deletion and reset against object traffic.

use std::io;
use std::path::{Path, PathBuf};

use anyhow::Context;
use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use s3shim_model::{BucketInfo, BucketListing, ObjectInfo, Owner, StoredObject};
use tokio::fs;
use tokio::io::AsyncReadExt;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::S3Backend;
use crate::checksums::compute_etag;
use crate::error::S3ServiceError;

const BUCKETS_DIR: &str = "buckets";
const STAGING_DIR: &str = "staging";
const OBJECTS_DIR: &str = "objects";
const BUCKET_META: &str = "bucket.json";

/// Longest file name most filesystems accept.
const MAX_FILE_NAME_LEN: usize = 255;

const NAME_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_');

/// File-backed bucket/object store.
#[derive(Debug)]
pub struct DiskBackend {
    root: PathBuf,
    namespace: RwLock<()>,
}

impl DiskBackend {
    /// Open (and create if needed) a store rooted at `base`.
    pub async fn open(base: impl AsRef<Path>) -> Result<Self, S3ServiceError> {
        let root = base.as_ref().to_path_buf();
        for dir in [BUCKETS_DIR, STAGING_DIR] {
            let path = root.join(dir);
            fs::create_dir_all(&path)
                .await
                .with_context(|| format!("failed to create {}", path.display()))?;
        }
        info!(root = %root.display(), "disk backend opened");
        Ok(Self {
            root,
            namespace: RwLock::new(()),
        })
    }

    fn bucket_dir(&self, bucket: &str) -> PathBuf {
        self.root
            .join(BUCKETS_DIR)
            .join(encode_name(bucket).unwrap_or_default())
    }

    fn object_path(&self, bucket: &str, key: &str) -> Result<PathBuf, S3ServiceError> {
        let name = encode_name(key).ok_or_else(|| S3ServiceError::KeyTooLong {
            key: key.to_owned(),
        })?;
        Ok(self.bucket_dir(bucket).join(OBJECTS_DIR).join(name))
    }

    /// Resolve the bucket directory, failing with `NoSuchBucket` when absent.
    async fn existing_bucket_dir(&self, bucket: &str) -> Result<PathBuf, S3ServiceError> {
        if encode_name(bucket).is_none() {
            return Err(no_such_bucket(bucket));
        }
        let dir = self.bucket_dir(bucket);
        let meta = dir.join(BUCKET_META);
        let exists = fs::try_exists(&meta)
            .await
            .with_context(|| format!("failed to stat {}", meta.display()))?;
        if exists {
            Ok(dir)
        } else {
            Err(no_such_bucket(bucket))
        }
    }

    /// Write `contents` to `dest` through the staging directory.
    async fn write_atomically(&self, dest: &Path, contents: &[u8]) -> Result<(), S3ServiceError> {
        let staging = self.root.join(STAGING_DIR);
        let staged = tokio::task::spawn_blocking(move || {
            tempfile::NamedTempFile::new_in(&staging)
                .map(tempfile::NamedTempFile::into_temp_path)
                .with_context(|| format!("failed to create staging file in {}", staging.display()))
        })
        .await
        .context("staging file task failed")??;
        fs::write(&staged, contents)
            .await
            .with_context(|| format!("failed to write {}", staged.display()))?;
        fs::rename(&staged, dest)
            .await
            .with_context(|| format!("failed to move object into {}", dest.display()))?;
        Ok(())
    }
}

fn encode_name(name: &str) -> Option<String> {
    let encoded = utf8_percent_encode(name, NAME_ENCODE_SET).to_string();
    (!encoded.is_empty() && encoded.len() <= MAX_FILE_NAME_LEN).then_some(encoded)
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

/// Open a file, mapping "not found" to `None`.
async fn open_if_exists(path: &Path) -> Result<Option<fs::File>, S3ServiceError> {
    match fs::File::open(path).await {
        Ok(file) => Ok(Some(file)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(anyhow::Error::new(e)
            .context(format!("failed to open {}", path.display()))
            .into()),
    }
}

fn encode_object(info: &ObjectInfo, data: &[u8]) -> Result<Vec<u8>, S3ServiceError> {
    let header = serde_json::to_vec(info).context("failed to encode object metadata")?;
    let mut buf = Vec::with_capacity(8 + header.len() + data.len());
    buf.extend_from_slice(&(header.len() as u64).to_be_bytes());
    buf.extend_from_slice(&header);
    buf.extend_from_slice(data);
    Ok(buf)
}

async fn read_header(file: &mut fs::File, path: &Path) -> Result<ObjectInfo, S3ServiceError> {
    let len = file
        .read_u64()
        .await
        .with_context(|| format!("failed to read header length of {}", path.display()))?;
    let len = usize::try_from(len).context("object header too large")?;
    let mut header = vec![0_u8; len];
    file.read_exact(&mut header)
        .await
        .with_context(|| format!("failed to read header of {}", path.display()))?;
    let info = serde_json::from_slice(&header)
        .with_context(|| format!("corrupt object metadata in {}", path.display()))?;
    Ok(info)
}

#[async_trait]
impl S3Backend for DiskBackend {
    async fn list_buckets(&self, credential: &str) -> Result<BucketListing, S3ServiceError> {
        let _ns = self.namespace.read().await;
        let dir = self.root.join(BUCKETS_DIR);
        let mut entries = fs::read_dir(&dir)
            .await
            .with_context(|| format!("failed to read {}", dir.display()))?;

        let mut buckets = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .with_context(|| format!("failed to read {}", dir.display()))?
        {
            let meta = entry.path().join(BUCKET_META);
            match fs::read(&meta).await {
                Ok(raw) => match serde_json::from_slice::<BucketInfo>(&raw) {
                    Ok(info) => buckets.push(info),
                    Err(e) => warn!(path = %meta.display(), error = %e, "skipping corrupt bucket"),
                },
                Err(e) => warn!(path = %meta.display(), error = %e, "skipping unreadable bucket"),
            }
        }
        buckets.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(BucketListing {
            owner: Owner::from_credential(credential),
            buckets,
        })
    }

    async fn create_bucket(&self, bucket: &str, _credential: &str) -> Result<(), S3ServiceError> {
        let _ns = self.namespace.write().await;
        if encode_name(bucket).is_none() {
            return Err(S3ServiceError::InvalidBucketName {
                bucket: bucket.to_owned(),
            });
        }
        let dir = self.bucket_dir(bucket);
        let meta = dir.join(BUCKET_META);
        if fs::try_exists(&meta)
            .await
            .with_context(|| format!("failed to stat {}", meta.display()))?
        {
            return Err(S3ServiceError::BucketAlreadyExists {
                bucket: bucket.to_owned(),
            });
        }

        let objects = dir.join(OBJECTS_DIR);
        fs::create_dir_all(&objects)
            .await
            .with_context(|| format!("failed to create {}", objects.display()))?;
        let info = BucketInfo {
            name: bucket.to_owned(),
            creation_date: Utc::now(),
        };
        let raw = serde_json::to_vec(&info).context("failed to encode bucket metadata")?;
        self.write_atomically(&meta, &raw).await?;

        info!(bucket, "bucket created");
        Ok(())
    }

    async fn delete_bucket(&self, bucket: &str, _credential: &str) -> Result<(), S3ServiceError> {
        let _ns = self.namespace.write().await;
        let dir = self.existing_bucket_dir(bucket).await?;
        let objects = dir.join(OBJECTS_DIR);
        let mut entries = fs::read_dir(&objects)
            .await
            .with_context(|| format!("failed to read {}", objects.display()))?;
        if entries
            .next_entry()
            .await
            .with_context(|| format!("failed to read {}", objects.display()))?
            .is_some()
        {
            return Err(S3ServiceError::BucketNotEmpty {
                bucket: bucket.to_owned(),
            });
        }
        fs::remove_dir_all(&dir)
            .await
            .with_context(|| format!("failed to remove {}", dir.display()))?;

        info!(bucket, "bucket deleted");
        Ok(())
    }

    async fn bucket_exists(&self, bucket: &str, _credential: &str) -> Result<(), S3ServiceError> {
        let _ns = self.namespace.read().await;
        self.existing_bucket_dir(bucket).await.map(|_| ())
    }

    async fn list_objects(
        &self,
        bucket: &str,
        _credential: &str,
    ) -> Result<Vec<ObjectInfo>, S3ServiceError> {
        let _ns = self.namespace.read().await;
        let objects = self.existing_bucket_dir(bucket).await?.join(OBJECTS_DIR);
        let mut entries = fs::read_dir(&objects)
            .await
            .with_context(|| format!("failed to read {}", objects.display()))?;

        let mut infos = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .with_context(|| format!("failed to read {}", objects.display()))?
        {
            let path = entry.path();
            // Deleted between read_dir and open.
            let Some(mut file) = open_if_exists(&path).await? else {
                continue;
            };
            infos.push(read_header(&mut file, &path).await?);
        }
        infos.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(infos)
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        data: Bytes,
        content_type: &str,
        credential: &str,
    ) -> Result<ObjectInfo, S3ServiceError> {
        let _ns = self.namespace.read().await;
        self.existing_bucket_dir(bucket).await?;
        let path = self.object_path(bucket, key)?;

        let info = ObjectInfo {
            key: key.to_owned(),
            size: data.len() as u64,
            etag: compute_etag(&data),
            last_modified: Utc::now(),
            content_type: content_type.to_owned(),
            owner: Owner::from_credential(credential),
        };
        let encoded = encode_object(&info, &data)?;
        self.write_atomically(&path, &encoded).await?;

        debug!(bucket, key, size = info.size, "object stored");
        Ok(info)
    }

    async fn get_object(
        &self,
        bucket: &str,
        key: &str,
        _credential: &str,
    ) -> Result<StoredObject, S3ServiceError> {
        let _ns = self.namespace.read().await;
        self.existing_bucket_dir(bucket).await?;
        let path = self.object_path(bucket, key)?;
        let mut file = open_if_exists(&path)
            .await?
            .ok_or_else(|| no_such_key(bucket, key))?;

        let info = read_header(&mut file, &path).await?;
        let mut data = Vec::with_capacity(usize::try_from(info.size).unwrap_or_default());
        file.read_to_end(&mut data)
            .await
            .with_context(|| format!("failed to read {}", path.display()))?;

        Ok(StoredObject {
            info,
            data: Bytes::from(data),
        })
    }

    async fn head_object(
        &self,
        bucket: &str,
        key: &str,
        _credential: &str,
    ) -> Result<ObjectInfo, S3ServiceError> {
        let _ns = self.namespace.read().await;
        self.existing_bucket_dir(bucket).await?;
        let path = self.object_path(bucket, key)?;
        let mut file = open_if_exists(&path)
            .await?
            .ok_or_else(|| no_such_key(bucket, key))?;
        read_header(&mut file, &path).await
    }

    async fn delete_object(
        &self,
        bucket: &str,
        key: &str,
        _credential: &str,
    ) -> Result<(), S3ServiceError> {
        let _ns = self.namespace.read().await;
        self.existing_bucket_dir(bucket).await?;
        let path = self.object_path(bucket, key)?;
        match fs::remove_file(&path).await {
            Ok(()) => {
                debug!(bucket, key, "object deleted");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(no_such_key(bucket, key)),
            Err(e) => Err(anyhow::Error::new(e)
                .context(format!("failed to remove {}", path.display()))
                .into()),
        }
    }

    async fn reset(&self) -> Result<(), S3ServiceError> {
        let _ns = self.namespace.write().await;
        for dir in [BUCKETS_DIR, STAGING_DIR] {
            let path = self.root.join(dir);
            match fs::remove_dir_all(&path).await {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => {
                    return Err(anyhow::Error::new(e)
                        .context(format!("failed to clear {}", path.display()))
                        .into());
                }
            }
            fs::create_dir_all(&path)
                .await
                .with_context(|| format!("failed to create {}", path.display()))?;
        }
        info!(root = %self.root.display(), "disk backend reset");
        Ok(())
    }
}
