//! Integration tests for the s3shim server.
//!
//! These tests require a running server at `localhost:10001` (override with
//! `S3_ENDPOINT_URL`). They are marked `#[ignore]` so they don't run during
//! normal `cargo test`.
//!
//! Run them with:
//! ```text
//! cargo test -p s3shim-integration -- --ignored
//! ```

use std::sync::Once;

use aws_credential_types::Credentials;
use aws_sdk_s3::config::{BehaviorVersion, Region, RequestChecksumCalculation};

static INIT: Once = Once::new();

/// Initialize tracing (once).
fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .init();
    });
}

/// Endpoint URL for the server.
fn endpoint_url() -> String {
    std::env::var("S3_ENDPOINT_URL").unwrap_or_else(|_| "http://localhost:10001".to_owned())
}

/// Create a path-style S3 client pointing at the local server.
#[must_use]
pub fn s3_client() -> aws_sdk_s3::Client {
    s3_client_with_access_key("test")
}

/// Create a path-style S3 client signing with `access_key`.
#[must_use]
pub fn s3_client_with_access_key(access_key: &str) -> aws_sdk_s3::Client {
    init_tracing();

    let creds = Credentials::new(access_key, "test", None, None, "integration-test");

    let config = aws_sdk_s3::config::Builder::new()
        .behavior_version(BehaviorVersion::latest())
        .region(Region::new("us-east-1"))
        .credentials_provider(creds)
        .endpoint_url(endpoint_url())
        .force_path_style(true)
        .request_checksum_calculation(RequestChecksumCalculation::WhenRequired)
        .build();

    aws_sdk_s3::Client::from_conf(config)
}

/// Generate a unique bucket name for a test.
#[must_use]
pub fn test_bucket_name(prefix: &str) -> String {
    let id = uuid::Uuid::new_v4().to_string()[..8].to_owned();
    format!("test-{prefix}-{id}")
}

/// Create a bucket and return its name. Caller is responsible for cleanup.
pub async fn create_test_bucket(client: &aws_sdk_s3::Client, prefix: &str) -> String {
    let name = test_bucket_name(prefix);
    client
        .create_bucket()
        .bucket(&name)
        .send()
        .await
        .unwrap_or_else(|e| panic!("failed to create bucket {name}: {e}"));
    name
}

/// Delete all objects in a bucket, then delete the bucket.
pub async fn cleanup_bucket(client: &aws_sdk_s3::Client, bucket: &str) {
    let mut marker = None;
    loop {
        let mut req = client.list_objects().bucket(bucket);
        if let Some(m) = marker.take() {
            req = req.marker(m);
        }
        let Ok(resp) = req.send().await else {
            return; // Bucket may not exist.
        };

        let mut last_key = None;
        for obj in resp.contents() {
            if let Some(key) = obj.key() {
                let _ = client.delete_object().bucket(bucket).key(key).send().await;
                last_key = Some(key.to_owned());
            }
        }

        if resp.is_truncated() == Some(true) {
            marker = resp.next_marker().map(ToOwned::to_owned).or(last_key);
        } else {
            break;
        }
    }

    let _ = client.delete_bucket().bucket(bucket).send().await;
}

mod test_bucket;
mod test_error;
mod test_list;
mod test_object;
