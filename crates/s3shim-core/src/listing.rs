//! `ListObjects` pagination over a sorted key snapshot.

use s3shim_model::{ListObjectsParams, ObjectInfo, ObjectListing};

/// Build one page of a bucket listing.
///
/// `objects` must be sorted by key. Keys are kept when they start with
/// `params.prefix` and sort strictly after `params.marker`; at most
/// `params.max_keys` are returned.
#[must_use]
pub fn paginate(bucket: &str, objects: Vec<ObjectInfo>, params: &ListObjectsParams) -> ObjectListing {
    let mut matching = objects
        .into_iter()
        .filter(|o| o.key.starts_with(&params.prefix))
        .filter(|o| params.marker.is_empty() || o.key.as_str() > params.marker.as_str());

    let contents: Vec<ObjectInfo> = matching.by_ref().take(params.max_keys).collect();
    let is_truncated = matching.next().is_some();
    let next_marker = if is_truncated {
        contents.last().map(|o| o.key.clone())
    } else {
        None
    };

    ObjectListing {
        name: bucket.to_owned(),
        prefix: params.prefix.clone(),
        marker: params.marker.clone(),
        max_keys: params.max_keys,
        is_truncated,
        next_marker,
        contents,
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use s3shim_model::Owner;

    use super::*;

    fn objects(keys: &[&str]) -> Vec<ObjectInfo> {
        keys.iter()
            .map(|k| ObjectInfo {
                key: (*k).to_owned(),
                size: 0,
                etag: String::new(),
                last_modified: Utc::now(),
                content_type: String::new(),
                owner: Owner::default(),
            })
            .collect()
    }

    fn keys(listing: &ObjectListing) -> Vec<&str> {
        listing.contents.iter().map(|o| o.key.as_str()).collect()
    }

    #[test]
    fn test_should_return_everything_with_default_params() {
        let listing = paginate("b", objects(&["a", "b", "c"]), &ListObjectsParams::default());
        assert_eq!(keys(&listing), ["a", "b", "c"]);
        assert!(!listing.is_truncated);
        assert_eq!(listing.next_marker, None);
        assert_eq!(listing.max_keys, 1000);
    }

    #[test]
    fn test_should_filter_by_prefix() {
        let params = ListObjectsParams {
            prefix: "logs/".to_owned(),
            ..Default::default()
        };
        let listing = paginate("b", objects(&["a", "logs/1", "logs/2", "z"]), &params);
        assert_eq!(keys(&listing), ["logs/1", "logs/2"]);
        assert_eq!(listing.prefix, "logs/");
    }

    #[test]
    fn test_should_truncate_and_resume_from_marker() {
        let params = ListObjectsParams {
            max_keys: 2,
            ..Default::default()
        };
        let first = paginate("b", objects(&["a", "b", "c"]), &params);
        assert_eq!(keys(&first), ["a", "b"]);
        assert!(first.is_truncated);
        assert_eq!(first.next_marker.as_deref(), Some("b"));

        let params = ListObjectsParams {
            marker: "b".to_owned(),
            max_keys: 2,
            ..Default::default()
        };
        let second = paginate("b", objects(&["a", "b", "c"]), &params);
        assert_eq!(keys(&second), ["c"]);
        assert!(!second.is_truncated);
    }

    #[test]
    fn test_should_return_empty_page_for_zero_max_keys() {
        let params = ListObjectsParams {
            max_keys: 0,
            ..Default::default()
        };
        let listing = paginate("b", objects(&["a"]), &params);
        assert!(listing.contents.is_empty());
        assert!(listing.is_truncated);
        assert_eq!(listing.next_marker, None);
    }
}
