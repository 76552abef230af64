//! The per-request descriptor produced by the classifier.

use crate::operations::S3Operation;

/// Everything the dispatcher needs to know about one request, minus the body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDescriptor {
    /// The classified operation.
    pub operation: S3Operation,
    /// Decoded query parameters, in request order.
    pub query_params: Vec<(String, String)>,
    /// Parsed `Content-Length`, when the client sent one.
    pub content_length: Option<u64>,
    /// Raw `Content-Type` header.
    pub content_type: Option<String>,
    /// Raw `Content-MD5` header.
    pub content_md5: Option<String>,
    /// Caller identity extracted from `Authorization`, passed through unvalidated.
    pub credential: Option<String>,
}

impl RequestDescriptor {
    /// Create a descriptor for `operation` with no headers or parameters.
    #[must_use]
    pub fn new(operation: S3Operation) -> Self {
        Self {
            operation,
            query_params: Vec::new(),
            content_length: None,
            content_type: None,
            content_md5: None,
            credential: None,
        }
    }

    /// The credential string, or the empty string for anonymous callers.
    #[must_use]
    pub fn credential(&self) -> &str {
        self.credential.as_deref().unwrap_or_default()
    }
}
