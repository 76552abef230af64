//! S3 request classification: addressing style resolution and operation identification.
//!
//! The [`S3Router`] maps incoming HTTP requests to a [`RequestDescriptor`] by examining:
//!
//! - The `Host` header, to pick path-style or subdomain-style addressing
//! - The URI path, split into bucket and object
//! - The HTTP method (GET, PUT, DELETE, POST, HEAD)
//! - Query parameters that select bucket sub-resources (e.g. `?acl`, `?versioning`)
//! - `x-amz-copy-source`, which turns an object PUT into a copy
//!
//! Path-style requests are addressed to the configured domain itself and carry the
//! bucket as the first path segment. Subdomain-style requests are addressed to
//! `<bucket>.<domain>` and the whole path is the object. Hosts matching neither
//! (an IP address, another name) are treated as path-style.
//!
//! Percent-encoded path segments, query values and `x-amz-copy-source` must decode
//! to UTF-8; anything else is `InvalidURI` rather than a lossy replacement, so two
//! distinct encodings never name the same object.

use http::Method;
use percent_encoding::percent_decode_str;
use s3shim_model::{
    ListObjectsParams, RequestDescriptor, S3Error, S3ErrorCode, S3Operation, SubResource,
    SubResourceMethod,
};

use crate::credential::extract_credential;

const COPY_SOURCE_HEADER: &str = "x-amz-copy-source";

/// Configuration for S3 request classification.
///
/// Only `<bucket>.<domain>` hosts are subdomain-style, with every label before
/// `.<domain>` forming the bucket; every other host, including IP literals and
/// unrelated names, is deliberately classified as path-style.
#[derive(Debug, Clone)]
pub struct S3Router {
    /// The host name of path-style requests (e.g. `localhost`).
    pub domain: String,
    /// Whether to recognize `<bucket>.<domain>` hosts.
    pub virtual_hosting: bool,
}

impl S3Router {
    /// Create a new router with the given domain and virtual hosting setting.
    #[must_use]
    pub fn new(domain: impl Into<String>, virtual_hosting: bool) -> Self {
        Self {
            domain: domain.into(),
            virtual_hosting,
        }
    }

    /// Classify an HTTP request.
    ///
    /// # Errors
    ///
    /// - `InvalidRequest` when `Content-Length` is not a non-negative integer.
    /// - `InvalidURI` when a percent-encoded component does not decode to UTF-8.
    /// - `InvalidBucketName` when a non-GET path-style request has no bucket.
    /// - `InvalidArgument` when a path-style path has more than two segments,
    ///   `max-keys` is malformed, `x-amz-copy-source` has no key, or a
    ///   content or copy-source header is not valid UTF-8.
    /// - `MethodNotAllowed` for POST on a bucket and for verbs S3 does not use.
    pub fn resolve<B>(&self, req: &http::Request<B>) -> Result<RequestDescriptor, S3Error> {
        let method = req.method();
        let uri = req.uri();
        let headers = req.headers();

        let content_length = parse_content_length(headers)?;
        let query_params = parse_query_params(uri.query().unwrap_or(""))?;

        let host = request_host(req);
        let subdomain_bucket = if self.virtual_hosting {
            host.and_then(|h| extract_subdomain_bucket(h, &self.domain))
        } else {
            None
        };

        let (bucket, key) = match subdomain_bucket {
            Some(bucket) => {
                let raw = uri.path().trim_start_matches('/');
                let key = if raw.is_empty() {
                    None
                } else {
                    Some(decode_uri_component(raw)?)
                };
                (Some(bucket), key)
            }
            None => split_path_style(uri.path())?,
        };

        let operation = identify_operation(method, bucket, key, &query_params, headers)?;

        Ok(RequestDescriptor {
            operation,
            content_length,
            content_type: header_string(headers, http::header::CONTENT_TYPE.as_str())?,
            content_md5: header_string(headers, "content-md5")?,
            credential: extract_credential(headers, &query_params),
            query_params,
        })
    }
}

/// The request host without port, from `Host` or the absolute URI.
fn request_host<B>(req: &http::Request<B>) -> Option<&str> {
    let host = req
        .headers()
        .get(http::header::HOST)
        .and_then(|v| v.to_str().ok())
        .or_else(|| req.uri().host())?;
    Some(strip_port(host))
}

fn strip_port(host: &str) -> &str {
    // Bracketed IPv6 literal: keep everything up to the closing bracket.
    if host.starts_with('[') {
        return host.find(']').map_or(host, |end| &host[..=end]);
    }
    host.split(':').next().unwrap_or(host)
}

/// Extract the bucket name from a subdomain-style host.
///
/// With domain `localhost`, host `photos.localhost` yields `photos`.
fn extract_subdomain_bucket(host: &str, domain: &str) -> Option<String> {
    let host = host.to_ascii_lowercase();
    let suffix = format!(".{}", domain.to_ascii_lowercase());
    let bucket = host.strip_suffix(&suffix)?;
    (!bucket.is_empty()).then(|| bucket.to_owned())
}

/// Split a path-style path into bucket and object.
fn split_path_style(path: &str) -> Result<(Option<String>, Option<String>), S3Error> {
    let trimmed = path.trim_matches('/');
    if trimmed.is_empty() {
        return Ok((None, None));
    }
    let segments: Vec<&str> = trimmed.split('/').collect();
    match segments.as_slice() {
        [bucket] => Ok((Some(decode_uri_component(bucket)?), None)),
        [bucket, key] => Ok((
            Some(decode_uri_component(bucket)?),
            Some(decode_uri_component(key)?),
        )),
        _ => Err(S3Error::invalid_argument(format!(
            "path has {} segments, expected /{{bucket}}[/{{object}}]",
            segments.len()
        ))),
    }
}

/// Decode a percent-encoded URI component.
fn decode_uri_component(s: &str) -> Result<String, S3Error> {
    percent_decode_str(s)
        .decode_utf8()
        .map(std::borrow::Cow::into_owned)
        .map_err(|_| S3Error::new(S3ErrorCode::InvalidURI))
}

/// Parse a query string into key-value pairs.
fn parse_query_params(query: &str) -> Result<Vec<(String, String)>, S3Error> {
    query
        .split('&')
        .filter(|s| !s.is_empty())
        .map(|pair| match pair.split_once('=') {
            Some((k, v)) => Ok((decode_query_component(k)?, decode_query_component(v)?)),
            None => Ok((decode_query_component(pair)?, String::new())),
        })
        .collect()
}

fn decode_query_component(s: &str) -> Result<String, S3Error> {
    decode_uri_component(&s.replace('+', " "))
}

/// Look up a query parameter by name.
fn query_has_key(params: &[(String, String)], key: &str) -> bool {
    params.iter().any(|(k, _)| k == key)
}

/// Get the value of a query parameter by name.
fn query_value<'a>(params: &'a [(String, String)], key: &str) -> Option<&'a str> {
    params
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

/// A header value as text. Non-ASCII bytes are accepted when they form UTF-8.
fn header_str<'a>(
    headers: &'a http::HeaderMap,
    name: &str,
) -> Result<Option<&'a str>, S3Error> {
    headers
        .get(name)
        .map(|v| {
            std::str::from_utf8(v.as_bytes())
                .map_err(|_| S3Error::invalid_argument(format!("{name} is not valid UTF-8")))
        })
        .transpose()
}

fn header_string(headers: &http::HeaderMap, name: &str) -> Result<Option<String>, S3Error> {
    Ok(header_str(headers, name)?.map(ToOwned::to_owned))
}

fn parse_content_length(headers: &http::HeaderMap) -> Result<Option<u64>, S3Error> {
    let Some(value) = headers.get(http::header::CONTENT_LENGTH) else {
        return Ok(None);
    };
    value
        .to_str()
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Some)
        .ok_or_else(|| S3Error::invalid_request("Content-Length must be a non-negative integer"))
}

/// The first sub-resource selector present, in priority order.
fn find_sub_resource(params: &[(String, String)]) -> Option<SubResource> {
    SubResource::PRIORITY
        .into_iter()
        .find(|sub| query_has_key(params, sub.as_str()))
}

fn parse_list_params(params: &[(String, String)]) -> Result<ListObjectsParams, S3Error> {
    let max_keys = match query_value(params, "max-keys") {
        Some(raw) => raw
            .parse::<usize>()
            .map_err(|_| S3Error::invalid_argument("max-keys must be a non-negative integer"))?
            .min(ListObjectsParams::DEFAULT_MAX_KEYS),
        None => ListObjectsParams::DEFAULT_MAX_KEYS,
    };
    Ok(ListObjectsParams {
        prefix: query_value(params, "prefix").unwrap_or_default().to_owned(),
        marker: query_value(params, "marker").unwrap_or_default().to_owned(),
        max_keys,
    })
}

/// Parse `x-amz-copy-source` (`[/]bucket/key[?versionId=...]`, percent-encoded).
fn parse_copy_source(raw: &str) -> Result<(String, String), S3Error> {
    let without_version = raw.split_once('?').map_or(raw, |(path, _)| path);
    let decoded = decode_uri_component(without_version.trim_start_matches('/'))?;
    match decoded.split_once('/') {
        Some((bucket, key)) if !bucket.is_empty() && !key.is_empty() => {
            Ok((bucket.to_owned(), key.to_owned()))
        }
        _ => Err(S3Error::invalid_argument(
            "x-amz-copy-source must be of the form /bucket/key",
        )),
    }
}

/// Identify the S3 operation from method, addressed bucket/object, query and headers.
fn identify_operation(
    method: &Method,
    bucket: Option<String>,
    key: Option<String>,
    params: &[(String, String)],
    headers: &http::HeaderMap,
) -> Result<S3Operation, S3Error> {
    match (bucket, key) {
        (None, _) => {
            if *method == Method::GET {
                Ok(S3Operation::ListBuckets)
            } else {
                Err(S3Error::invalid_bucket_name())
            }
        }
        (Some(bucket), None) => identify_bucket_operation(method, bucket, params),
        (Some(bucket), Some(key)) => identify_object_operation(method, bucket, key, headers),
    }
}

fn identify_bucket_operation(
    method: &Method,
    bucket: String,
    params: &[(String, String)],
) -> Result<S3Operation, S3Error> {
    let sub_resource = find_sub_resource(params);
    let sub_method = match *method {
        Method::GET => SubResourceMethod::Get,
        Method::PUT => SubResourceMethod::Put,
        Method::DELETE => SubResourceMethod::Delete,
        Method::HEAD => return Ok(S3Operation::HeadBucket { bucket }),
        _ => return Err(S3Error::method_not_allowed().with_bucket(bucket)),
    };

    if let Some(sub_resource) = sub_resource {
        return Ok(S3Operation::BucketSubResource {
            bucket,
            method: sub_method,
            sub_resource,
        });
    }

    Ok(match sub_method {
        SubResourceMethod::Get => S3Operation::ListObjects {
            params: parse_list_params(params)?,
            bucket,
        },
        SubResourceMethod::Put => S3Operation::CreateBucket { bucket },
        SubResourceMethod::Delete => S3Operation::DeleteBucket { bucket },
    })
}

fn identify_object_operation(
    method: &Method,
    bucket: String,
    key: String,
    headers: &http::HeaderMap,
) -> Result<S3Operation, S3Error> {
    match *method {
        Method::GET => Ok(S3Operation::GetObject { bucket, key }),
        Method::HEAD => Ok(S3Operation::HeadObject { bucket, key }),
        Method::DELETE => Ok(S3Operation::DeleteObject { bucket, key }),
        Method::POST => Ok(S3Operation::PostObject { bucket, key }),
        Method::PUT => match header_str(headers, COPY_SOURCE_HEADER)? {
            Some(source) => {
                let (source_bucket, source_key) = parse_copy_source(source)?;
                Ok(S3Operation::CopyObject {
                    bucket,
                    key,
                    source_bucket,
                    source_key,
                })
            }
            None => Ok(S3Operation::PutObject { bucket, key }),
        },
        _ => Err(S3Error::method_not_allowed().with_bucket(bucket)),
    }
}
