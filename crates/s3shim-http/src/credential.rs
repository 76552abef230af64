//! Caller identity extraction.
//!
//! Signatures are not verified. The access key id is pulled out of whichever
//! AWS authorization scheme the client used so that owners in listings are
//! stable per access key:
//!
//! - `AWS4-HMAC-SHA256 Credential=AKID/date/region/service/aws4_request, ...`
//! - `AWS AKID:signature`
//! - presigned URLs carrying `X-Amz-Credential=AKID/...`
//!
//! Any other `Authorization` value is passed through verbatim.

const SIGV4_ALGORITHM: &str = "AWS4-HMAC-SHA256";
const SIGV2_SCHEME: &str = "AWS";

/// Extract the caller credential from the request headers and query.
#[must_use]
pub fn extract_credential(
    headers: &http::HeaderMap,
    query_params: &[(String, String)],
) -> Option<String> {
    if let Some(header) = headers
        .get(http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
    {
        return Some(access_key_from_authorization(header).unwrap_or(header).to_owned());
    }

    query_params
        .iter()
        .find(|(k, _)| k == "X-Amz-Credential")
        .and_then(|(_, v)| access_key_from_scope(v))
        .map(ToOwned::to_owned)
}

/// Pull the access key id out of a SigV4 or SigV2 `Authorization` value.
fn access_key_from_authorization(header: &str) -> Option<&str> {
    let (scheme, rest) = header.split_once(' ')?;
    match scheme {
        SIGV4_ALGORITHM => rest
            .split(',')
            .map(str::trim)
            .find_map(|part| part.strip_prefix("Credential="))
            .and_then(access_key_from_scope),
        SIGV2_SCHEME => rest
            .trim()
            .split_once(':')
            .map(|(akid, _)| akid)
            .filter(|akid| !akid.is_empty()),
        _ => None,
    }
}

/// `AKID/date/region/service/aws4_request` -> `AKID`.
fn access_key_from_scope(scope: &str) -> Option<&str> {
    let parts: Vec<&str> = scope.splitn(5, '/').collect();
    if parts.len() == 5 && parts[4] == "aws4_request" && !parts[0].is_empty() {
        Some(parts[0])
    } else {
        None
    }
}
