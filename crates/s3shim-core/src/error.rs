//! Backend error types.
//!
//! Backends fail with [`S3ServiceError`]. The [`From`] implementation maps
//! each variant onto the wire taxonomy in [`s3shim_model::S3Error`].
//!
//! # Usage
//!
//! ```
//! use s3shim_core::error::S3ServiceError;
//! use s3shim_model::{S3Error, S3ErrorCode};
//!
//! let err = S3ServiceError::NoSuchBucket {
//!     bucket: "my-bucket".to_owned(),
//! };
//! let s3_err: S3Error = err.into();
//! assert_eq!(s3_err.code, S3ErrorCode::NoSuchBucket);
//! ```

use s3shim_model::{S3Error, S3ErrorCode};
use tracing::error;

/// Backend error type.
#[derive(Debug, thiserror::Error)]
pub enum S3ServiceError {
    /// The specified bucket does not exist.
    #[error("The specified bucket does not exist: {bucket}")]
    NoSuchBucket {
        /// The bucket name that was not found.
        bucket: String,
    },

    /// The bucket name is already taken.
    #[error("The requested bucket name is not available: {bucket}")]
    BucketAlreadyExists {
        /// The bucket name that already exists.
        bucket: String,
    },

    /// The bucket still holds objects.
    #[error("The bucket you tried to delete is not empty: {bucket}")]
    BucketNotEmpty {
        /// The bucket name that is not empty.
        bucket: String,
    },

    /// The bucket name cannot be stored by this backend.
    #[error("The specified bucket is not valid: {bucket}")]
    InvalidBucketName {
        /// The rejected bucket name.
        bucket: String,
    },

    /// The specified key does not exist.
    #[error("The specified key does not exist: {bucket}/{key}")]
    NoSuchKey {
        /// The bucket that was searched.
        bucket: String,
        /// The key that was not found.
        key: String,
    },

    /// The key cannot be stored by this backend.
    #[error("Your key is too long: {key}")]
    KeyTooLong {
        /// The rejected key.
        key: String,
    },

    /// The `Content-MD5` header is not a base64 MD5 digest.
    #[error("The Content-MD5 you specified is not valid")]
    InvalidDigest,

    /// The `Content-MD5` header does not match the payload.
    #[error("The Content-MD5 you specified did not match what we received")]
    BadDigest,

    /// Internal error with context.
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<S3ServiceError> for S3Error {
    fn from(err: S3ServiceError) -> Self {
        match err {
            S3ServiceError::NoSuchBucket { bucket } => S3Error::no_such_bucket(bucket),
            S3ServiceError::BucketAlreadyExists { bucket } => {
                S3Error::bucket_already_exists(bucket)
            }
            S3ServiceError::BucketNotEmpty { bucket } => S3Error::bucket_not_empty(bucket),
            S3ServiceError::InvalidBucketName { bucket } => {
                S3Error::invalid_bucket_name().with_bucket(bucket)
            }
            S3ServiceError::NoSuchKey { bucket, .. } => S3Error::no_such_key(bucket),
            S3ServiceError::KeyTooLong { .. } => S3Error::new(S3ErrorCode::KeyTooLongError),
            S3ServiceError::InvalidDigest => S3Error::new(S3ErrorCode::InvalidDigest),
            S3ServiceError::BadDigest => S3Error::new(S3ErrorCode::BadDigest),
            S3ServiceError::Internal(e) => {
                // The chain names local paths; it stays in the log.
                let chain = format!("{e:#}");
                error!(error = %chain, "internal backend error");
                S3Error::new(S3ErrorCode::InternalError)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_map_no_such_key_with_bucket_name() {
        let err = S3ServiceError::NoSuchKey {
            bucket: "b".to_owned(),
            key: "k".to_owned(),
        };
        let s3_err: S3Error = err.into();
        assert_eq!(s3_err.code, S3ErrorCode::NoSuchKey);
        assert_eq!(s3_err.status_code.as_u16(), 404);
        assert_eq!(s3_err.bucket_name.as_deref(), Some("b"));
    }

    #[test]
    fn test_should_map_internal_to_internal_error_without_detail() {
        let err = S3ServiceError::Internal(
            anyhow::anyhow!("permission denied").context("failed to open /var/lib/s3shim/x"),
        );
        let s3_err: S3Error = err.into();
        assert_eq!(s3_err.code, S3ErrorCode::InternalError);
        assert_eq!(s3_err.message, S3ErrorCode::InternalError.default_message());
        assert!(!s3_err.message.contains("/var/lib"));
    }

    #[test]
    fn test_should_map_invalid_bucket_name_to_400() {
        let s3_err: S3Error = S3ServiceError::InvalidBucketName {
            bucket: "b".repeat(300),
        }
        .into();
        assert_eq!(s3_err.code, S3ErrorCode::InvalidBucketName);
        assert_eq!(s3_err.status_code.as_u16(), 400);
    }

    #[test]
    fn test_should_map_conflicts_to_409() {
        let exists: S3Error = S3ServiceError::BucketAlreadyExists {
            bucket: "b".to_owned(),
        }
        .into();
        let not_empty: S3Error = S3ServiceError::BucketNotEmpty {
            bucket: "b".to_owned(),
        }
        .into();
        assert_eq!(exists.status_code.as_u16(), 409);
        assert_eq!(not_empty.status_code.as_u16(), 409);
    }
}
