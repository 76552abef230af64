//! The storage-backed [`S3Handler`].
//!
//! [`BackendHandler`] maps each [`S3Operation`] to exactly one backend call
//! and renders the result. Backend failures are converted into the error
//! taxonomy unchanged; the service renders them.

use std::sync::Arc;

use bytes::Bytes;
use s3shim_core::S3Backend;
use s3shim_core::checksums::verify_content_md5;
use s3shim_core::listing::paginate;
use s3shim_model::{RequestDescriptor, S3Error, S3Operation};
use s3shim_xml::CopyObjectResult;
use tracing::debug;

use crate::body::S3ResponseBody;
use crate::dispatch::{HandlerFuture, S3Handler};
use crate::response::{
    DEFAULT_OBJECT_CONTENT_TYPE, empty_ok, finish, not_implemented_response, object_headers,
    xml_ok,
};

type HandlerResult = Result<http::Response<S3ResponseBody>, S3Error>;

/// Serves S3 operations from an [`S3Backend`].
#[derive(Debug, Clone)]
pub struct BackendHandler {
    backend: Arc<dyn S3Backend>,
}

impl BackendHandler {
    /// Create a handler over a shared backend.
    #[must_use]
    pub fn new(backend: Arc<dyn S3Backend>) -> Self {
        Self { backend }
    }

    async fn handle(&self, desc: RequestDescriptor, body: Bytes) -> HandlerResult {
        let credential = desc.credential();
        let backend = self.backend.as_ref();

        match &desc.operation {
            S3Operation::ListBuckets => {
                let listing = backend.list_buckets(credential).await?;
                xml_ok("ListAllMyBucketsResult", &listing)
            }
            S3Operation::CreateBucket { bucket } => {
                backend.create_bucket(bucket, credential).await?;
                finish(
                    http::Response::builder()
                        .status(http::StatusCode::OK)
                        .header("Location", format!("/{bucket}"))
                        .header("Content-Length", 0),
                    S3ResponseBody::empty(),
                )
            }
            S3Operation::DeleteBucket { bucket } => {
                backend.delete_bucket(bucket, credential).await?;
                empty_ok()
            }
            S3Operation::HeadBucket { bucket } => {
                backend.bucket_exists(bucket, credential).await?;
                empty_ok()
            }
            S3Operation::ListObjects { bucket, params } => {
                let objects = backend.list_objects(bucket, credential).await?;
                let listing = paginate(bucket, objects, params);
                xml_ok("ListBucketResult", &listing)
            }
            S3Operation::BucketSubResource {
                method,
                sub_resource,
                ..
            } => {
                debug!(%method, %sub_resource, "bucket sub-resource not implemented");
                Ok(not_implemented_response())
            }
            S3Operation::PostObject { .. } => Ok(not_implemented_response()),
            S3Operation::PutObject { bucket, key } => {
                if let Some(content_md5) = desc.content_md5.as_deref() {
                    verify_content_md5(content_md5, &body)?;
                }
                let content_type = desc
                    .content_type
                    .as_deref()
                    .unwrap_or(DEFAULT_OBJECT_CONTENT_TYPE);
                let info = backend
                    .put_object(bucket, key, body, content_type, credential)
                    .await?;
                finish(
                    http::Response::builder()
                        .status(http::StatusCode::OK)
                        .header("ETag", &info.etag)
                        .header("x-amz-version-id", "null")
                        .header("Content-Length", 0),
                    S3ResponseBody::empty(),
                )
            }
            S3Operation::CopyObject {
                bucket,
                key,
                source_bucket,
                source_key,
            } => {
                let info = backend
                    .copy_object(source_bucket, source_key, bucket, key, credential)
                    .await?;
                xml_ok("CopyObjectResult", &CopyObjectResult::from(&info))
            }
            S3Operation::GetObject { bucket, key } => {
                let object = backend.get_object(bucket, key, credential).await?;
                finish(
                    object_headers(
                        http::Response::builder().status(http::StatusCode::OK),
                        &object.info,
                    ),
                    S3ResponseBody::from_bytes(object.data),
                )
            }
            S3Operation::HeadObject { bucket, key } => {
                let info = backend.head_object(bucket, key, credential).await?;
                finish(
                    object_headers(
                        http::Response::builder().status(http::StatusCode::OK),
                        &info,
                    ),
                    S3ResponseBody::empty(),
                )
            }
            S3Operation::DeleteObject { bucket, key } => {
                backend.delete_object(bucket, key, credential).await?;
                finish(
                    http::Response::builder()
                        .status(http::StatusCode::OK)
                        .header("x-amz-delete-marker", "false")
                        .header("x-amz-version-id", "null")
                        .header("Content-Length", 0),
                    S3ResponseBody::empty(),
                )
            }
        }
    }
}

impl S3Handler for BackendHandler {
    fn handle_operation(&self, desc: RequestDescriptor, body: Bytes) -> HandlerFuture<'_> {
        Box::pin(self.handle(desc, body))
    }
}
