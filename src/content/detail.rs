//! Fetching posts for the detail pages

use super::{PostDetail, PostPage};
use crate::cms::{ContentApi, TypeQuery};
use crate::error::{ApiError, ApiResult};
use crate::listing::{Listing, ListingState, LoadMore};

/// All uids of a document type, following cursors to the last page
pub async fn enumerate_identifiers(
    api: &dyn ContentApi,
    document_type: &str,
    page_size: u32,
) -> ApiResult<Vec<String>> {
    let query = TypeQuery::new(document_type)
        .fetch(&["title"])
        .page_size(page_size);
    let first = PostPage::from_raw(api.query_by_type(&query).await?)?;

    let mut listing = Listing::new(api, ListingState::new(first));
    loop {
        match listing.load_more().await {
            LoadMore::Appended { .. } => continue,
            LoadMore::Exhausted => break,
            LoadMore::Failed(e) => return Err(e),
        }
    }

    Ok(listing
        .into_state()
        .items
        .into_iter()
        .map(|post| post.uid)
        .collect())
}

/// Fetch one post by uid; the API must answer with that same uid
pub async fn fetch_detail(
    api: &dyn ContentApi,
    document_type: &str,
    uid: &str,
) -> ApiResult<PostDetail> {
    let raw = api.get_by_uid(document_type, uid).await?;
    let detail = PostDetail::from_raw(raw)?;
    if detail.uid != uid {
        return Err(ApiError::IdentifierMismatch {
            expected: uid.to_string(),
            found: detail.uid,
        });
    }
    Ok(detail)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cms::fake::{self, FakeApi};

    fn api(n: usize) -> FakeApi {
        FakeApi::new(
            (1..=n)
                .map(|i| fake::post(&format!("post-{}", i), &format!("Post {}", i), None))
                .collect(),
        )
    }

    #[tokio::test]
    async fn test_enumerate_follows_cursors() {
        let api = api(5);
        let uids = enumerate_identifiers(&api, "posts", 2).await.unwrap();
        assert_eq!(uids, vec!["post-1", "post-2", "post-3", "post-4", "post-5"]);
        // first query + two cursor pages
        assert_eq!(api.requests(), 3);
    }

    #[tokio::test]
    async fn test_enumerate_empty_repository() {
        let api = api(0);
        assert!(enumerate_identifiers(&api, "posts", 100)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_enumerate_propagates_failures() {
        let api = api(3);
        api.fail_next();
        assert!(enumerate_identifiers(&api, "posts", 1).await.is_err());
    }

    #[tokio::test]
    async fn test_every_identifier_round_trips() {
        let api = api(4);
        for uid in enumerate_identifiers(&api, "posts", 3).await.unwrap() {
            let detail = fetch_detail(&api, "posts", &uid).await.unwrap();
            assert_eq!(detail.uid, uid);
        }
    }

    #[tokio::test]
    async fn test_unknown_uid_is_not_found() {
        let api = api(1);
        let err = fetch_detail(&api, "posts", "nao-existe").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_mismatched_uid_is_an_error() {
        let api = api(2).with_alias("post-1", "post-2");
        let err = fetch_detail(&api, "posts", "post-1").await.unwrap_err();
        assert!(matches!(
            err,
            ApiError::IdentifierMismatch { ref expected, ref found }
                if expected == "post-1" && found == "post-2"
        ));
    }
}
