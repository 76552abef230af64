//! Error handling integration tests.

#[cfg(test)]
mod tests {
    use aws_sdk_s3::error::ProvideErrorMetadata;
    use aws_sdk_s3::primitives::ByteStream;

    use crate::{cleanup_bucket, create_test_bucket, s3_client, test_bucket_name};

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_return_no_such_bucket_on_put() {
        let client = s3_client();
        let bucket = test_bucket_name("ghost");

        let err = client
            .put_object()
            .bucket(&bucket)
            .key("file.txt")
            .body(ByteStream::from_static(b"data"))
            .send()
            .await
            .expect_err("put to nonexistent bucket should fail");

        assert_eq!(err.code(), Some("NoSuchBucket"));
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_return_no_such_key_on_get() {
        let client = s3_client();
        let bucket = create_test_bucket(&client, "nokey").await;

        let err = client
            .get_object()
            .bucket(&bucket)
            .key("nonexistent.txt")
            .send()
            .await
            .expect_err("get nonexistent key should fail");

        assert_eq!(err.code(), Some("NoSuchKey"));
        assert_eq!(
            err.raw_response().map(|r| r.status().as_u16()),
            Some(404)
        );

        cleanup_bucket(&client, &bucket).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_return_bucket_already_exists() {
        let client = s3_client();
        let bucket = create_test_bucket(&client, "exists").await;

        let err = client
            .create_bucket()
            .bucket(&bucket)
            .send()
            .await
            .expect_err("duplicate create should fail");

        assert_eq!(err.code(), Some("BucketAlreadyExists"));

        cleanup_bucket(&client, &bucket).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_reject_bad_content_md5() {
        let client = s3_client();
        let bucket = create_test_bucket(&client, "md5").await;

        let err = client
            .put_object()
            .bucket(&bucket)
            .key("file.txt")
            .content_md5("XUFAKrxLKna5cZ2REBfFkg==")
            .body(ByteStream::from_static(b"not hello"))
            .send()
            .await
            .expect_err("mismatched Content-MD5 should fail");

        assert_eq!(err.code(), Some("BadDigest"));

        cleanup_bucket(&client, &bucket).await;
    }
}
