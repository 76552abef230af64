//! MD5 digests for ETags and `Content-MD5` verification.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use digest::Digest;

use crate::error::S3ServiceError;

/// Compute the hex-encoded MD5 digest of `data`.
///
/// # Examples
///
/// ```
/// use s3shim_core::checksums::compute_md5;
///
/// let digest = compute_md5(b"hello");
/// assert_eq!(digest, "5d41402abc4b2a76b9719d911017c592");
/// ```
#[must_use]
pub fn compute_md5(data: &[u8]) -> String {
    let hash = md5::Md5::digest(data);
    hex::encode(hash)
}

/// Compute the quoted hex-encoded MD5 digest of `data`, suitable for use as
/// an S3 ETag.
///
/// # Examples
///
/// ```
/// use s3shim_core::checksums::compute_etag;
///
/// let etag = compute_etag(b"");
/// assert_eq!(etag, "\"d41d8cd98f00b204e9800998ecf8427e\"");
/// ```
#[must_use]
pub fn compute_etag(data: &[u8]) -> String {
    let md5_hex = compute_md5(data);
    format!("\"{md5_hex}\"")
}

/// Check a base64 `Content-MD5` header value against `data`.
///
/// # Errors
///
/// - [`S3ServiceError::InvalidDigest`] if the value is not base64 or not 16 bytes.
/// - [`S3ServiceError::BadDigest`] if the digest differs from the payload's.
pub fn verify_content_md5(content_md5: &str, data: &[u8]) -> Result<(), S3ServiceError> {
    let expected = BASE64_STANDARD
        .decode(content_md5.trim())
        .map_err(|_| S3ServiceError::InvalidDigest)?;
    if expected.len() != 16 {
        return Err(S3ServiceError::InvalidDigest);
    }
    let actual = md5::Md5::digest(data);
    if actual.as_slice() == expected.as_slice() {
        Ok(())
    } else {
        Err(S3ServiceError::BadDigest)
    }
}
