//! Canonical S3 operations.
//!
//! An [`S3Operation`] is what the classifier produces from an HTTP request.
//! Each variant carries only the fields its handler needs.

use std::fmt;

/// Bucket sub-resource selectors, in the order the classifier checks them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubResource {
    /// `?location`
    Location,
    /// `?acl`
    Acl,
    /// `?cors`
    Cors,
    /// `?lifecycle`
    Lifecycle,
    /// `?policy`
    Policy,
    /// `?logging`
    Logging,
    /// `?notification`
    Notification,
    /// `?replication`
    Replication,
    /// `?tagging`
    Tagging,
    /// `?versions`
    Versions,
    /// `?versioning`
    Versioning,
    /// `?requestPayment`
    RequestPayment,
    /// `?website`
    Website,
}

impl SubResource {
    /// All selectors in classification priority order.
    pub const PRIORITY: [Self; 13] = [
        Self::Location,
        Self::Acl,
        Self::Cors,
        Self::Lifecycle,
        Self::Policy,
        Self::Logging,
        Self::Notification,
        Self::Replication,
        Self::Tagging,
        Self::Versions,
        Self::Versioning,
        Self::RequestPayment,
        Self::Website,
    ];

    /// The query parameter name that selects this sub-resource.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Location => "location",
            Self::Acl => "acl",
            Self::Cors => "cors",
            Self::Lifecycle => "lifecycle",
            Self::Policy => "policy",
            Self::Logging => "logging",
            Self::Notification => "notification",
            Self::Replication => "replication",
            Self::Tagging => "tagging",
            Self::Versions => "versions",
            Self::Versioning => "versioning",
            Self::RequestPayment => "requestPayment",
            Self::Website => "website",
        }
    }
}

impl fmt::Display for SubResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The HTTP verb a sub-resource request was made with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubResourceMethod {
    /// Read the sub-resource.
    Get,
    /// Replace the sub-resource.
    Put,
    /// Remove the sub-resource.
    Delete,
}

impl SubResourceMethod {
    /// Returns the verb as an uppercase string.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for SubResourceMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Listing parameters accepted by `GET /{bucket}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListObjectsParams {
    /// Only keys starting with this prefix are returned.
    pub prefix: String,
    /// Only keys sorting strictly after this marker are returned.
    pub marker: String,
    /// Upper bound on the number of keys in one page.
    pub max_keys: usize,
}

impl ListObjectsParams {
    /// Page size used when the client sends no `max-keys`.
    pub const DEFAULT_MAX_KEYS: usize = 1000;
}

impl Default for ListObjectsParams {
    fn default() -> Self {
        Self {
            prefix: String::new(),
            marker: String::new(),
            max_keys: Self::DEFAULT_MAX_KEYS,
        }
    }
}

/// A classified S3 request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum S3Operation {
    /// `GET /`
    ListBuckets,
    /// `PUT /{bucket}`
    CreateBucket {
        /// Target bucket.
        bucket: String,
    },
    /// `DELETE /{bucket}`
    DeleteBucket {
        /// Target bucket.
        bucket: String,
    },
    /// `HEAD /{bucket}`
    HeadBucket {
        /// Target bucket.
        bucket: String,
    },
    /// `GET /{bucket}`
    ListObjects {
        /// Target bucket.
        bucket: String,
        /// Prefix, marker and page size.
        params: ListObjectsParams,
    },
    /// `GET|PUT|DELETE /{bucket}?<sub-resource>`
    BucketSubResource {
        /// Target bucket.
        bucket: String,
        /// The verb used.
        method: SubResourceMethod,
        /// The selected sub-resource.
        sub_resource: SubResource,
    },
    /// `PUT /{bucket}/{key}`
    PutObject {
        /// Target bucket.
        bucket: String,
        /// Target key.
        key: String,
    },
    /// `PUT /{bucket}/{key}` with `x-amz-copy-source`
    CopyObject {
        /// Destination bucket.
        bucket: String,
        /// Destination key.
        key: String,
        /// Source bucket.
        source_bucket: String,
        /// Source key.
        source_key: String,
    },
    /// `GET /{bucket}/{key}`
    GetObject {
        /// Target bucket.
        bucket: String,
        /// Target key.
        key: String,
    },
    /// `HEAD /{bucket}/{key}`
    HeadObject {
        /// Target bucket.
        bucket: String,
        /// Target key.
        key: String,
    },
    /// `DELETE /{bucket}/{key}`
    DeleteObject {
        /// Target bucket.
        bucket: String,
        /// Target key.
        key: String,
    },
    /// `POST /{bucket}/{key}`
    PostObject {
        /// Target bucket.
        bucket: String,
        /// Target key.
        key: String,
    },
}

impl S3Operation {
    /// Returns the operation name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ListBuckets => "ListBuckets",
            Self::CreateBucket { .. } => "CreateBucket",
            Self::DeleteBucket { .. } => "DeleteBucket",
            Self::HeadBucket { .. } => "HeadBucket",
            Self::ListObjects { .. } => "ListObjects",
            Self::BucketSubResource { .. } => "BucketSubResource",
            Self::PutObject { .. } => "PutObject",
            Self::CopyObject { .. } => "CopyObject",
            Self::GetObject { .. } => "GetObject",
            Self::HeadObject { .. } => "HeadObject",
            Self::DeleteObject { .. } => "DeleteObject",
            Self::PostObject { .. } => "PostObject",
        }
    }

    /// The bucket this operation addresses, if any.
    #[must_use]
    pub fn bucket(&self) -> Option<&str> {
        match self {
            Self::ListBuckets => None,
            Self::CreateBucket { bucket }
            | Self::DeleteBucket { bucket }
            | Self::HeadBucket { bucket }
            | Self::ListObjects { bucket, .. }
            | Self::BucketSubResource { bucket, .. }
            | Self::PutObject { bucket, .. }
            | Self::CopyObject { bucket, .. }
            | Self::GetObject { bucket, .. }
            | Self::HeadObject { bucket, .. }
            | Self::DeleteObject { bucket, .. }
            | Self::PostObject { bucket, .. } => Some(bucket),
        }
    }

    /// The object key this operation addresses, if any.
    #[must_use]
    pub fn key(&self) -> Option<&str> {
        match self {
            Self::PutObject { key, .. }
            | Self::CopyObject { key, .. }
            | Self::GetObject { key, .. }
            | Self::HeadObject { key, .. }
            | Self::DeleteObject { key, .. }
            | Self::PostObject { key, .. } => Some(key),
            _ => None,
        }
    }
}

impl fmt::Display for S3Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_expose_bucket_and_key() {
        let op = S3Operation::GetObject {
            bucket: "b".to_owned(),
            key: "k".to_owned(),
        };
        assert_eq!(op.bucket(), Some("b"));
        assert_eq!(op.key(), Some("k"));
        assert_eq!(op.to_string(), "GetObject");

        assert_eq!(S3Operation::ListBuckets.bucket(), None);
        assert_eq!(
            S3Operation::HeadBucket {
                bucket: "b".to_owned()
            }
            .key(),
            None
        );
    }

    #[test]
    fn test_should_keep_sub_resource_priority_order() {
        let names: Vec<&str> = SubResource::PRIORITY.iter().map(SubResource::as_str).collect();
        assert_eq!(names.first(), Some(&"location"));
        assert_eq!(names.last(), Some(&"website"));
        assert_eq!(names.len(), 13);
    }
}
