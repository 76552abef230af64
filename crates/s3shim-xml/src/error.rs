//! S3 error XML formatting and error types.

use std::io;

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesText, Event};
use s3shim_model::S3Error;

/// Errors that can occur during S3 XML serialization.
#[derive(Debug, thiserror::Error)]
pub enum XmlError {
    /// An I/O error during XML writing.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// An error from the underlying quick-xml library.
    #[error("XML processing error: {0}")]
    QuickXml(#[from] quick_xml::Error),
}

/// Format an S3 error as an XML document.
///
/// `host_id` is rendered as `<HostId>`; the request id comes from the error
/// itself when set, otherwise from `request_id`.
///
/// # Example output
///
/// ```xml
/// <?xml version="1.0" encoding="UTF-8"?>
/// <Error>
///   <StatusCode>404</StatusCode>
///   <Code>NoSuchBucket</Code>
///   <Message>The specified bucket does not exist.</Message>
///   <BucketName>photos</BucketName>
///   <RequestId>3f1c...</RequestId>
///   <HostId>3f1c...</HostId>
/// </Error>
/// ```
pub fn error_to_xml(err: &S3Error, request_id: &str, host_id: &str) -> Result<Vec<u8>, XmlError> {
    let mut buf = Vec::with_capacity(256);
    let mut writer = Writer::new(&mut buf);

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let request_id = err.request_id.as_deref().unwrap_or(request_id);
    writer.create_element("Error").write_inner_content(|w| {
        w.create_element("StatusCode")
            .write_text_content(BytesText::new(&err.status_code.as_u16().to_string()))?;
        w.create_element("Code")
            .write_text_content(BytesText::new(err.code.as_str()))?;
        w.create_element("Message")
            .write_text_content(BytesText::new(&err.message))?;
        w.create_element("BucketName")
            .write_text_content(BytesText::new(err.bucket_name.as_deref().unwrap_or("")))?;
        w.create_element("RequestId")
            .write_text_content(BytesText::new(request_id))?;
        w.create_element("HostId")
            .write_text_content(BytesText::new(host_id))?;
        Ok::<_, io::Error>(())
    })?;

    Ok(buf)
}
