//! S3 XML serialization: converting result types to S3-compatible XML.
//!
//! Conventions follow the S3 RestXml protocol:
//!
//! - Namespace: `http://s3.amazonaws.com/doc/2006-03-01/`
//! - Booleans: lowercase `true`/`false`
//! - Timestamps: ISO 8601 format (`2006-02-03T16:45:09.000Z`)
//! - XML declaration: `<?xml version="1.0" encoding="UTF-8"?>`

use std::io::{self, Write};

use chrono::{DateTime, Utc};
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesText, Event};
use s3shim_model::types::STANDARD_STORAGE_CLASS;
use s3shim_model::{BucketListing, ObjectInfo, ObjectListing, Owner};

use crate::error::XmlError;

/// The S3 XML namespace.
pub const S3_NAMESPACE: &str = "http://s3.amazonaws.com/doc/2006-03-01/";

/// Trait for serializing S3 types to XML.
///
/// Implementors write their content as child elements inside the current XML
/// context. The root element is written by [`to_xml`].
pub trait S3Serialize {
    /// Serialize this value as XML child elements into the given writer.
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()>;
}

/// Serialize a value as an XML document with declaration and S3 namespace.
pub fn to_xml<T: S3Serialize>(root_element: &str, value: &T) -> Result<Vec<u8>, XmlError> {
    let mut buf = Vec::with_capacity(512);
    let mut writer = Writer::new(&mut buf);

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    writer
        .create_element(root_element)
        .with_attribute(("xmlns", S3_NAMESPACE))
        .write_inner_content(|w| value.serialize_xml(w))?;

    Ok(buf)
}

/// The body of a successful `CopyObject`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyObjectResult {
    /// ETag of the new object.
    pub etag: String,
    /// Write time of the new object.
    pub last_modified: DateTime<Utc>,
}

impl From<&ObjectInfo> for CopyObjectResult {
    fn from(info: &ObjectInfo) -> Self {
        Self {
            etag: info.etag.clone(),
            last_modified: info.last_modified,
        }
    }
}

/// Format a timestamp the way S3 does in XML bodies.
#[must_use]
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

fn write_text_element<W: Write>(writer: &mut Writer<W>, tag: &str, text: &str) -> io::Result<()> {
    writer
        .create_element(tag)
        .write_text_content(BytesText::new(text))?;
    Ok(())
}

fn write_bool<W: Write>(writer: &mut Writer<W>, tag: &str, value: bool) -> io::Result<()> {
    write_text_element(writer, tag, if value { "true" } else { "false" })
}

fn write_owner<W: Write>(writer: &mut Writer<W>, owner: &Owner) -> io::Result<()> {
    writer.create_element("Owner").write_inner_content(|w| {
        write_text_element(w, "ID", &owner.id)?;
        write_text_element(w, "DisplayName", &owner.display_name)
    })?;
    Ok(())
}

impl S3Serialize for BucketListing {
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
        write_owner(writer, &self.owner)?;
        writer.create_element("Buckets").write_inner_content(|w| {
            for bucket in &self.buckets {
                w.create_element("Bucket").write_inner_content(|w| {
                    write_text_element(w, "Name", &bucket.name)?;
                    write_text_element(w, "CreationDate", &format_timestamp(&bucket.creation_date))
                })?;
            }
            Ok(())
        })?;
        Ok(())
    }
}

impl S3Serialize for ObjectListing {
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
        write_text_element(writer, "Name", &self.name)?;
        write_text_element(writer, "Prefix", &self.prefix)?;
        write_text_element(writer, "Marker", &self.marker)?;
        write_text_element(writer, "MaxKeys", &self.max_keys.to_string())?;
        write_bool(writer, "IsTruncated", self.is_truncated)?;
        if let Some(next) = &self.next_marker {
            write_text_element(writer, "NextMarker", next)?;
        }
        for object in &self.contents {
            writer.create_element("Contents").write_inner_content(|w| {
                write_text_element(w, "Key", &object.key)?;
                write_text_element(w, "LastModified", &format_timestamp(&object.last_modified))?;
                write_text_element(w, "ETag", &object.etag)?;
                write_text_element(w, "Size", &object.size.to_string())?;
                write_text_element(w, "StorageClass", STANDARD_STORAGE_CLASS)?;
                write_owner(w, &object.owner)
            })?;
        }
        Ok(())
    }
}

impl S3Serialize for CopyObjectResult {
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
        write_text_element(writer, "ETag", &self.etag)?;
        write_text_element(writer, "LastModified", &format_timestamp(&self.last_modified))
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use s3shim_model::BucketInfo;

    use super::*;

    fn ts() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 6, 7, 8, 9)
            .single()
            .expect("valid timestamp")
    }

    fn object(key: &str) -> ObjectInfo {
        ObjectInfo {
            key: key.to_owned(),
            size: 5,
            etag: "\"5d41402abc4b2a76b9719d911017c592\"".to_owned(),
            last_modified: ts(),
            content_type: "text/plain".to_owned(),
            owner: Owner::from_credential("AKID"),
        }
    }

    fn render<T: S3Serialize>(root: &str, value: &T) -> String {
        String::from_utf8(to_xml(root, value).expect("render")).expect("utf-8")
    }

    #[test]
    fn test_should_format_timestamp_with_millis() {
        assert_eq!(format_timestamp(&ts()), "2024-05-06T07:08:09.000Z");
    }

    #[test]
    fn test_should_serialize_list_bucket_result() {
        let listing = ObjectListing {
            name: "TestBucket".to_owned(),
            max_keys: 1000,
            contents: vec![object("test1")],
            ..Default::default()
        };
        let xml = render("ListBucketResult", &listing);

        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(xml.contains(&format!("<ListBucketResult xmlns=\"{S3_NAMESPACE}\">")));
        assert!(xml.contains("<Name>TestBucket</Name>"));
        assert!(xml.contains("<MaxKeys>1000</MaxKeys>"));
        assert!(xml.contains("<IsTruncated>false</IsTruncated>"));
        assert!(!xml.contains("<NextMarker>"));
        assert!(xml.contains("<Key>test1</Key>"));
        assert!(xml.contains("<Size>5</Size>"));
        assert!(xml.contains("<StorageClass>STANDARD</StorageClass>"));
        assert!(xml.contains("<Owner><ID>AKID</ID><DisplayName>AKID</DisplayName></Owner>"));
        assert!(xml.contains("<ETag>&quot;5d41402abc4b2a76b9719d911017c592&quot;</ETag>"));
    }

    #[test]
    fn test_should_serialize_empty_listing_without_contents() {
        let listing = ObjectListing {
            name: "TestBucket".to_owned(),
            max_keys: 1000,
            ..Default::default()
        };
        let xml = render("ListBucketResult", &listing);
        assert!(!xml.contains("<Contents>"));
    }

    #[test]
    fn test_should_serialize_truncated_listing_with_next_marker() {
        let listing = ObjectListing {
            name: "b".to_owned(),
            max_keys: 1,
            is_truncated: true,
            next_marker: Some("a".to_owned()),
            contents: vec![object("a")],
            ..Default::default()
        };
        let xml = render("ListBucketResult", &listing);
        assert!(xml.contains("<IsTruncated>true</IsTruncated>"));
        assert!(xml.contains("<NextMarker>a</NextMarker>"));
    }

    #[test]
    fn test_should_serialize_list_all_my_buckets_result() {
        let listing = BucketListing {
            owner: Owner::default(),
            buckets: vec![
                BucketInfo {
                    name: "alpha".to_owned(),
                    creation_date: ts(),
                },
                BucketInfo {
                    name: "beta".to_owned(),
                    creation_date: ts(),
                },
            ],
        };
        let xml = render("ListAllMyBucketsResult", &listing);
        assert!(xml.contains("<Owner><ID>anonymous</ID>"));
        assert!(xml.contains(
            "<Bucket><Name>alpha</Name><CreationDate>2024-05-06T07:08:09.000Z</CreationDate></Bucket>"
        ));
        assert!(xml.find("alpha") < xml.find("beta"));
    }

    #[test]
    fn test_should_serialize_copy_object_result() {
        let result = CopyObjectResult::from(&object("k"));
        let xml = render("CopyObjectResult", &result);
        assert!(xml.contains("<LastModified>2024-05-06T07:08:09.000Z</LastModified>"));
        assert!(xml.contains("<ETag>"));
    }
}
