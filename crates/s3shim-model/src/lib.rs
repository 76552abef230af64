//! Shared vocabulary of the s3shim server.
//!
//! - [`error`]: the S3 error taxonomy ([`S3Error`], [`S3ErrorCode`]).
//! - [`operations`]: the canonical [`S3Operation`] sum type.
//! - [`request`]: the per-request [`RequestDescriptor`].
//! - [`types`]: owners, bucket and object summaries, listings.

// S3Error is returned by value everywhere; boxing it buys nothing here.
#![allow(clippy::result_large_err)]

pub mod error;
pub mod operations;
pub mod request;
pub mod types;

pub use error::{S3Error, S3ErrorCode};
pub use operations::{ListObjectsParams, S3Operation, SubResource, SubResourceMethod};
pub use request::RequestDescriptor;
pub use types::{BucketInfo, BucketListing, ObjectInfo, ObjectListing, Owner, StoredObject};
