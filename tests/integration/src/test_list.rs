//! List objects integration tests.

#[cfg(test)]
mod tests {
    use aws_sdk_s3::primitives::ByteStream;

    use crate::{cleanup_bucket, create_test_bucket, s3_client};

    async fn populate_bucket(client: &aws_sdk_s3::Client, bucket: &str) {
        let keys = [
            "photos-2024-img1.jpg",
            "photos-2024-img2.jpg",
            "photos-2025-img3.jpg",
            "report.pdf",
            "root.txt",
        ];
        for key in keys {
            client
                .put_object()
                .bucket(bucket)
                .key(key)
                .body(ByteStream::from_static(b"x"))
                .send()
                .await
                .unwrap_or_else(|e| panic!("put {key}: {e}"));
        }
    }

    fn keys(resp: &aws_sdk_s3::operation::list_objects::ListObjectsOutput) -> Vec<&str> {
        resp.contents().iter().filter_map(|o| o.key()).collect()
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_list_all_objects_sorted() {
        let client = s3_client();
        let bucket = create_test_bucket(&client, "listall").await;
        populate_bucket(&client, &bucket).await;

        let resp = client
            .list_objects()
            .bucket(&bucket)
            .send()
            .await
            .expect("list_objects");

        assert_eq!(
            keys(&resp),
            vec![
                "photos-2024-img1.jpg",
                "photos-2024-img2.jpg",
                "photos-2025-img3.jpg",
                "report.pdf",
                "root.txt",
            ]
        );
        assert_eq!(resp.is_truncated(), Some(false));

        cleanup_bucket(&client, &bucket).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_list_with_prefix() {
        let client = s3_client();
        let bucket = create_test_bucket(&client, "prefix").await;
        populate_bucket(&client, &bucket).await;

        let resp = client
            .list_objects()
            .bucket(&bucket)
            .prefix("photos-2024-")
            .send()
            .await
            .expect("list_objects with prefix");

        assert_eq!(
            keys(&resp),
            vec!["photos-2024-img1.jpg", "photos-2024-img2.jpg"]
        );

        cleanup_bucket(&client, &bucket).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_paginate_with_marker() {
        let client = s3_client();
        let bucket = create_test_bucket(&client, "paginate").await;
        populate_bucket(&client, &bucket).await;

        let first = client
            .list_objects()
            .bucket(&bucket)
            .max_keys(2)
            .send()
            .await
            .expect("first page");
        assert_eq!(first.is_truncated(), Some(true));
        assert_eq!(first.next_marker(), Some("photos-2024-img2.jpg"));

        let second = client
            .list_objects()
            .bucket(&bucket)
            .marker("photos-2024-img2.jpg")
            .send()
            .await
            .expect("second page");
        assert_eq!(
            keys(&second),
            vec!["photos-2025-img3.jpg", "report.pdf", "root.txt"]
        );

        cleanup_bucket(&client, &bucket).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_list_empty_after_delete() {
        let client = s3_client();
        let bucket = create_test_bucket(&client, "empty").await;

        client
            .put_object()
            .bucket(&bucket)
            .key("only")
            .body(ByteStream::from_static(b"x"))
            .send()
            .await
            .expect("put_object");
        client
            .delete_object()
            .bucket(&bucket)
            .key("only")
            .send()
            .await
            .expect("delete_object");

        let resp = client
            .list_objects()
            .bucket(&bucket)
            .send()
            .await
            .expect("list_objects");
        assert!(resp.contents().is_empty());

        cleanup_bucket(&client, &bucket).await;
    }
}
