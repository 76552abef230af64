//! Result types shared by the backends, the XML layer, and the dispatcher.

use std::fmt;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Storage class reported for every object.
pub const STANDARD_STORAGE_CLASS: &str = "STANDARD";

/// The owner of a bucket or object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Owner {
    /// The canonical user ID of the owner.
    pub id: String,
    /// The display name of the owner.
    pub display_name: String,
}

impl Owner {
    /// Derive an owner from a caller credential. Empty credentials map to the
    /// anonymous owner.
    #[must_use]
    pub fn from_credential(credential: &str) -> Self {
        if credential.is_empty() {
            return Self::default();
        }
        Self {
            id: credential.to_owned(),
            display_name: credential.to_owned(),
        }
    }
}

impl Default for Owner {
    fn default() -> Self {
        Self {
            id: "anonymous".to_owned(),
            display_name: "anonymous".to_owned(),
        }
    }
}

impl fmt::Display for Owner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.display_name, self.id)
    }
}

/// Summary of one bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketInfo {
    /// Bucket name.
    pub name: String,
    /// When the bucket was created.
    pub creation_date: DateTime<Utc>,
}

/// Result of `ListBuckets`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketListing {
    /// The requesting owner.
    pub owner: Owner,
    /// All buckets, sorted by name.
    pub buckets: Vec<BucketInfo>,
}

/// Metadata of a stored object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectInfo {
    /// Object key.
    pub key: String,
    /// Payload size in bytes.
    pub size: u64,
    /// Quoted hex MD5 of the payload.
    pub etag: String,
    /// Time of the last write.
    pub last_modified: DateTime<Utc>,
    /// Content type supplied on upload.
    pub content_type: String,
    /// Who wrote the object.
    pub owner: Owner,
}

/// An object with its payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    /// Metadata.
    pub info: ObjectInfo,
    /// Payload bytes.
    pub data: Bytes,
}

/// One page of `ListObjects`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ObjectListing {
    /// Bucket name.
    pub name: String,
    /// Prefix filter echoed back.
    pub prefix: String,
    /// Marker echoed back.
    pub marker: String,
    /// Page size echoed back.
    pub max_keys: usize,
    /// Whether more keys follow this page.
    pub is_truncated: bool,
    /// Last key of this page when truncated.
    pub next_marker: Option<String>,
    /// Objects of this page, sorted by key.
    pub contents: Vec<ObjectInfo>,
}
