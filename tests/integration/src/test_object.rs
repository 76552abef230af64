//! Object CRUD integration tests.

#[cfg(test)]
mod tests {
    use aws_sdk_s3::primitives::ByteStream;

    use crate::{cleanup_bucket, create_test_bucket, s3_client};

    async fn put(client: &aws_sdk_s3::Client, bucket: &str, key: &str, body: &'static [u8]) {
        client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from_static(body))
            .send()
            .await
            .unwrap_or_else(|e| panic!("put {key}: {e}"));
    }

    async fn get(client: &aws_sdk_s3::Client, bucket: &str, key: &str) -> Vec<u8> {
        client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .unwrap_or_else(|e| panic!("get {key}: {e}"))
            .body
            .collect()
            .await
            .expect("read body")
            .into_bytes()
            .to_vec()
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_put_and_get_object() {
        let client = s3_client();
        let bucket = create_test_bucket(&client, "putget").await;

        let resp = client
            .put_object()
            .bucket(&bucket)
            .key("hello.txt")
            .content_type("text/plain")
            .body(ByteStream::from_static(b"hello"))
            .send()
            .await
            .expect("put_object");
        assert_eq!(
            resp.e_tag(),
            Some("\"5d41402abc4b2a76b9719d911017c592\"")
        );

        let got = client
            .get_object()
            .bucket(&bucket)
            .key("hello.txt")
            .send()
            .await
            .expect("get_object");
        assert_eq!(got.content_type(), Some("text/plain"));
        assert_eq!(got.content_length(), Some(5));
        let data = got.body.collect().await.expect("read body").into_bytes();
        assert_eq!(data.as_ref(), b"hello");

        cleanup_bucket(&client, &bucket).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_overwrite_object() {
        let client = s3_client();
        let bucket = create_test_bucket(&client, "overwrite").await;

        put(&client, &bucket, "test1", b"test1").await;
        assert_eq!(get(&client, &bucket, "test1").await, b"test1");

        put(&client, &bucket, "test1", b"Updatedtest").await;
        assert_eq!(get(&client, &bucket, "test1").await, b"Updatedtest");

        cleanup_bucket(&client, &bucket).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_head_object() {
        let client = s3_client();
        let bucket = create_test_bucket(&client, "head").await;
        put(&client, &bucket, "meta.bin", b"0123456789").await;

        let head = client
            .head_object()
            .bucket(&bucket)
            .key("meta.bin")
            .send()
            .await
            .expect("head_object");
        assert_eq!(head.content_length(), Some(10));
        assert!(head.e_tag().is_some());
        assert!(head.last_modified().is_some());

        cleanup_bucket(&client, &bucket).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_delete_object() {
        let client = s3_client();
        let bucket = create_test_bucket(&client, "delete").await;
        put(&client, &bucket, "gone.txt", b"bye").await;

        client
            .delete_object()
            .bucket(&bucket)
            .key("gone.txt")
            .send()
            .await
            .expect("delete_object");

        let result = client
            .get_object()
            .bucket(&bucket)
            .key("gone.txt")
            .send()
            .await;
        assert!(result.is_err(), "get after delete should fail");

        cleanup_bucket(&client, &bucket).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_copy_object() {
        let client = s3_client();
        let bucket = create_test_bucket(&client, "copy").await;
        put(&client, &bucket, "source.txt", b"copy me").await;

        let resp = client
            .copy_object()
            .bucket(&bucket)
            .key("dest.txt")
            .copy_source(format!("{bucket}/source.txt"))
            .send()
            .await
            .expect("copy_object");
        assert!(
            resp.copy_object_result()
                .and_then(|r| r.e_tag())
                .is_some()
        );

        assert_eq!(get(&client, &bucket, "dest.txt").await, b"copy me");

        cleanup_bucket(&client, &bucket).await;
    }
}
