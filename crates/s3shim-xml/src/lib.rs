//! XML rendering for s3shim.
//!
//! - [`error`]: the `<Error>` document returned with every failed request.
//! - [`serialize`]: `ListBucketResult`, `ListAllMyBucketsResult` and
//!   `CopyObjectResult` bodies via the [`S3Serialize`] trait.

pub mod error;
pub mod serialize;

pub use error::{XmlError, error_to_xml};
pub use serialize::{CopyObjectResult, S3Serialize, to_xml};
