//! HTTP response construction.
//!
//! Success responses carry per-operation headers built by the helpers below.
//! Failures are rendered by [`error_to_response`] as an XML `<Error>`
//! document. Operations s3shim recognizes but does not implement get the
//! fixed [`not_implemented_response`].

use bytes::Bytes;
use chrono::{DateTime, Utc};
use http::header::HeaderValue;
use s3shim_model::{ObjectInfo, S3Error};
use s3shim_xml::{S3Serialize, error_to_xml, to_xml};

use crate::body::S3ResponseBody;

/// Content type of XML result documents.
pub const XML_CONTENT_TYPE: &str = "application/xml";

/// Content type of rendered error documents.
pub const ERROR_CONTENT_TYPE: &str = "text/plain; charset=utf-8";

/// Content type stored for objects uploaded without one.
pub const DEFAULT_OBJECT_CONTENT_TYPE: &str = "binary/octet-stream";

/// Format a timestamp as an HTTP date (`Last-Modified`, `Date`).
#[must_use]
pub fn http_date(ts: &DateTime<Utc>) -> String {
    ts.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// Set a header on a response builder if the value is a valid header value.
fn set_header(builder: http::response::Builder, name: &str, value: &str) -> http::response::Builder {
    match HeaderValue::from_str(value) {
        Ok(hv) => builder.header(name, hv),
        Err(_) => builder,
    }
}

/// Add the metadata headers every object response carries.
///
/// `Content-Length` is set to the object size, which is also what a HEAD
/// response must report.
pub(crate) fn object_headers(
    builder: http::response::Builder,
    info: &ObjectInfo,
) -> http::response::Builder {
    let builder = set_header(builder, "ETag", &info.etag);
    let builder = set_header(builder, "Last-Modified", &http_date(&info.last_modified));
    let builder = set_header(builder, "Content-Type", &info.content_type);
    builder
        .header("Content-Length", info.size)
        .header("x-amz-version-id", "null")
}

/// Finish a builder, mapping a malformed response into an internal error.
pub(crate) fn finish(
    builder: http::response::Builder,
    body: S3ResponseBody,
) -> Result<http::Response<S3ResponseBody>, S3Error> {
    builder
        .body(body)
        .map_err(|e| S3Error::internal_error("failed to build response").with_source(e))
}

/// A 200 response with no body.
pub(crate) fn empty_ok() -> Result<http::Response<S3ResponseBody>, S3Error> {
    finish(
        http::Response::builder()
            .status(http::StatusCode::OK)
            .header("Content-Length", 0),
        S3ResponseBody::empty(),
    )
}

/// A 200 response carrying `value` serialized under `root`.
pub(crate) fn xml_ok<T: S3Serialize>(
    root: &str,
    value: &T,
) -> Result<http::Response<S3ResponseBody>, S3Error> {
    let xml = to_xml(root, value)
        .map_err(|e| S3Error::internal_error("failed to serialize response").with_source(e))?;
    finish(
        http::Response::builder()
            .status(http::StatusCode::OK)
            .header("Content-Type", XML_CONTENT_TYPE)
            .header("Content-Length", xml.len()),
        S3ResponseBody::from_bytes(xml),
    )
}

/// The fixed response for recognized but unimplemented operations.
#[must_use]
pub fn not_implemented_response() -> http::Response<S3ResponseBody> {
    plain_response(http::StatusCode::INTERNAL_SERVER_ERROR, "Not Implemented")
}

fn plain_response(status: http::StatusCode, text: &'static str) -> http::Response<S3ResponseBody> {
    http::Response::builder()
        .status(status)
        .header("Content-Type", ERROR_CONTENT_TYPE)
        .header("X-Content-Type-Options", "nosniff")
        .header("Content-Length", text.len())
        .body(S3ResponseBody::from_bytes(Bytes::from_static(text.as_bytes())))
        .expect("static plain response should be valid")
}

/// Convert an [`S3Error`] into an HTTP error response.
///
/// The body is the XML `<Error>` document; a rendering failure degrades to a
/// plain-text `500 Internal Server Error`.
#[must_use]
pub fn error_to_response(err: &S3Error, request_id: &str) -> http::Response<S3ResponseBody> {
    let xml = match error_to_xml(err, request_id, request_id) {
        Ok(xml) => xml,
        Err(e) => {
            tracing::error!(error = %e, request_id, "failed to render error document");
            return internal_server_error();
        }
    };

    http::Response::builder()
        .status(err.status_code)
        .header("Content-Type", ERROR_CONTENT_TYPE)
        .header("X-Content-Type-Options", "nosniff")
        .header("Content-Length", xml.len())
        .body(S3ResponseBody::from_bytes(xml))
        .unwrap_or_else(|_| internal_server_error())
}

fn internal_server_error() -> http::Response<S3ResponseBody> {
    plain_response(
        http::StatusCode::INTERNAL_SERVER_ERROR,
        "Internal Server Error",
    )
}

#[cfg(test)]
mod tests {
    use http_body_util::BodyExt;
    use s3shim_model::{Owner, S3ErrorCode};

    use super::*;

    async fn body_string(resp: http::Response<S3ResponseBody>) -> String {
        let bytes = resp
            .into_body()
            .collect()
            .await
            .expect("collect body")
            .to_bytes();
        String::from_utf8(bytes.to_vec()).expect("utf-8 body")
    }

    fn header<'a>(resp: &'a http::Response<S3ResponseBody>, name: &str) -> Option<&'a str> {
        resp.headers().get(name).and_then(|v| v.to_str().ok())
    }

    #[tokio::test]
    async fn test_should_render_error_document() {
        let err = S3Error::no_such_bucket("photos");
        let resp = error_to_response(&err, "req-1");
        assert_eq!(resp.status(), http::StatusCode::NOT_FOUND);
        assert_eq!(header(&resp, "Content-Type"), Some(ERROR_CONTENT_TYPE));
        assert_eq!(header(&resp, "X-Content-Type-Options"), Some("nosniff"));

        let body = body_string(resp).await;
        assert!(body.starts_with("<?xml"));
        assert!(body.contains("<Code>NoSuchBucket</Code>"));
        assert!(body.contains("<StatusCode>404</StatusCode>"));
        assert!(body.contains("<BucketName>photos</BucketName>"));
        assert!(body.contains("<RequestId>req-1</RequestId>"));
    }

    #[tokio::test]
    async fn test_should_render_not_implemented_as_plain_500() {
        let resp = not_implemented_response();
        assert_eq!(resp.status(), http::StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_string(resp).await, "Not Implemented");
    }

    #[test]
    fn test_should_format_http_date() {
        let ts = DateTime::parse_from_rfc3339("2024-03-05T07:08:09Z")
            .expect("valid timestamp")
            .with_timezone(&Utc);
        assert_eq!(http_date(&ts), "Tue, 05 Mar 2024 07:08:09 GMT");
    }

    #[test]
    fn test_should_set_object_headers() {
        let info = ObjectInfo {
            key: "k".to_owned(),
            size: 5,
            etag: "\"5d41402abc4b2a76b9719d911017c592\"".to_owned(),
            last_modified: DateTime::<Utc>::UNIX_EPOCH,
            content_type: "text/plain".to_owned(),
            owner: Owner::default(),
        };
        let resp = finish(
            object_headers(http::Response::builder(), &info),
            S3ResponseBody::empty(),
        )
        .expect("valid response");
        assert_eq!(header(&resp, "ETag"), Some(info.etag.as_str()));
        assert_eq!(header(&resp, "Content-Length"), Some("5"));
        assert_eq!(header(&resp, "Content-Type"), Some("text/plain"));
        assert_eq!(
            header(&resp, "Last-Modified"),
            Some("Thu, 01 Jan 1970 00:00:00 GMT")
        );
        assert_eq!(header(&resp, "x-amz-version-id"), Some("null"));
    }

    #[test]
    fn test_should_keep_error_status_for_client_errors() {
        let err = S3Error::new(S3ErrorCode::InvalidBucketName);
        let resp = error_to_response(&err, "req-2");
        assert_eq!(resp.status(), http::StatusCode::BAD_REQUEST);
    }
}
