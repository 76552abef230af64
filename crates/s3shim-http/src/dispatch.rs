//! S3 operation dispatch: hands a classified request to the business logic handler.
//!
//! [`dispatch_operation`] is the bridge between the classifier and the
//! [`S3Handler`] implementation. The handler receives the
//! [`RequestDescriptor`] and the collected body and returns a complete
//! response or an [`S3Error`] for the service to render.

use std::future::Future;
use std::pin::Pin;

use bytes::Bytes;
use s3shim_model::{RequestDescriptor, S3Error};

use crate::body::S3ResponseBody;

/// The future returned by [`S3Handler::handle_operation`].
pub type HandlerFuture<'a> =
    Pin<Box<dyn Future<Output = Result<http::Response<S3ResponseBody>, S3Error>> + Send + 'a>>;

/// Trait that the business logic provider must implement.
///
/// This is the boundary between the HTTP layer and storage. The future is
/// boxed so the trait stays usable behind `Arc<dyn S3Handler>`.
pub trait S3Handler: Send + Sync + 'static {
    /// Handle a classified S3 request and produce an HTTP response.
    fn handle_operation(&self, desc: RequestDescriptor, body: Bytes) -> HandlerFuture<'_>;
}

/// Dispatch a classified S3 request to the handler.
pub async fn dispatch_operation<H: S3Handler + ?Sized>(
    handler: &H,
    desc: RequestDescriptor,
    body: Bytes,
) -> Result<http::Response<S3ResponseBody>, S3Error> {
    tracing::debug!(
        operation = %desc.operation,
        bucket = ?desc.operation.bucket(),
        key = ?desc.operation.key(),
        body_len = body.len(),
        "dispatching S3 operation"
    );
    handler.handle_operation(desc, body).await
}
