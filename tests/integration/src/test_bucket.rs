//! Bucket CRUD integration tests.

#[cfg(test)]
mod tests {
    use aws_sdk_s3::primitives::ByteStream;

    use crate::{
        cleanup_bucket, create_test_bucket, s3_client, s3_client_with_access_key, test_bucket_name,
    };

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_create_and_delete_bucket() {
        let client = s3_client();
        let bucket = create_test_bucket(&client, "create").await;

        let head = client.head_bucket().bucket(&bucket).send().await;
        assert!(head.is_ok(), "head_bucket should succeed");

        cleanup_bucket(&client, &bucket).await;

        let head = client.head_bucket().bucket(&bucket).send().await;
        assert!(head.is_err(), "head_bucket should fail after delete");
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_list_buckets_with_caller_as_owner() {
        let client = s3_client_with_access_key("AKIDOWNER");
        let b1 = create_test_bucket(&client, "list1").await;
        let b2 = create_test_bucket(&client, "list2").await;

        let resp = client.list_buckets().send().await.expect("list_buckets");
        let names: Vec<&str> = resp.buckets().iter().filter_map(|b| b.name()).collect();

        assert!(names.contains(&b1.as_str()), "should contain {b1}");
        assert!(names.contains(&b2.as_str()), "should contain {b2}");
        assert_eq!(resp.owner().and_then(|o| o.id()), Some("AKIDOWNER"));

        cleanup_bucket(&client, &b1).await;
        cleanup_bucket(&client, &b2).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_reject_duplicate_bucket() {
        let client = s3_client();
        let bucket = create_test_bucket(&client, "dup").await;

        let result = client.create_bucket().bucket(&bucket).send().await;
        assert!(result.is_err(), "duplicate bucket should fail");

        cleanup_bucket(&client, &bucket).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_reject_delete_nonempty_bucket() {
        let client = s3_client();
        let bucket = create_test_bucket(&client, "nonempty").await;

        client
            .put_object()
            .bucket(&bucket)
            .key("file.txt")
            .body(ByteStream::from_static(b"data"))
            .send()
            .await
            .expect("put_object");

        let result = client.delete_bucket().bucket(&bucket).send().await;
        assert!(result.is_err(), "deleting nonempty bucket should fail");

        cleanup_bucket(&client, &bucket).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_fail_head_on_missing_bucket() {
        let client = s3_client();
        let bucket = test_bucket_name("missing");

        let head = client.head_bucket().bucket(&bucket).send().await;
        assert!(head.is_err(), "head_bucket on missing bucket should fail");
    }
}
