//! Content API access
//!
//! [`ContentApi`] is the seam between the site and the headless CMS. The
//! generator, the listing and the dev server only talk to this trait, so
//! they can run against [`PrismicClient`] in production and an in-memory
//! fake in tests.

#[cfg(test)]
pub(crate) mod fake;
mod prismic;
mod raw;

use async_trait::async_trait;
use std::fmt;
use url::Url;

use crate::error::{ApiError, ApiResult};

pub use prismic::PrismicClient;
pub use raw::{RawDocument, RawImage, RawPage, RawPostData, RawSection};

/// Query for every document of one custom type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeQuery {
    pub document_type: String,
    /// Fields to project (bare names, without the type prefix); empty fetches everything
    pub fields: Vec<String>,
    pub page_size: Option<u32>,
}

impl TypeQuery {
    pub fn new(document_type: &str) -> Self {
        Self {
            document_type: document_type.to_string(),
            fields: Vec::new(),
            page_size: None,
        }
    }

    /// Restrict the returned data to these fields
    pub fn fetch(mut self, fields: &[&str]) -> Self {
        self.fields = fields.iter().map(|f| f.to_string()).collect();
        self
    }

    pub fn page_size(mut self, page_size: u32) -> Self {
        self.page_size = Some(page_size);
        self
    }
}

/// Opaque pointer to the next page of results: an absolute URL returning
/// the same page shape as the query that produced it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cursor(Url);

impl Cursor {
    pub fn parse(value: &str) -> ApiResult<Self> {
        let url = Url::parse(value).map_err(|e| ApiError::InvalidCursor {
            cursor: value.to_string(),
            reason: e.to_string(),
        })?;

        if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
            return Err(ApiError::InvalidCursor {
                cursor: value.to_string(),
                reason: "expected an http(s) URL".to_string(),
            });
        }

        Ok(Self(url))
    }

    pub fn url(&self) -> &Url {
        &self.0
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn host(&self) -> &str {
        self.0.host_str().unwrap_or_default()
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str())
    }
}

/// Operations the site needs from the content repository
#[async_trait]
pub trait ContentApi: Send + Sync {
    /// First page of all documents of a type
    async fn query_by_type(&self, query: &TypeQuery) -> ApiResult<RawPage>;

    /// Single document of a type by its uid, with full content
    async fn get_by_uid(&self, document_type: &str, uid: &str) -> ApiResult<RawDocument>;

    /// Follow a cursor returned in a previous page
    async fn fetch_page(&self, cursor: &Cursor) -> ApiResult<RawPage>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_parse() {
        let cursor = Cursor::parse(
            "https://spacetraveling.cdn.prismic.io/api/v2/documents/search?page=2&pageSize=1",
        )
        .unwrap();
        assert_eq!(cursor.host(), "spacetraveling.cdn.prismic.io");
        assert!(cursor.as_str().contains("page=2"));
        assert_eq!(cursor.to_string(), cursor.as_str());
    }

    #[test]
    fn test_cursor_rejects_non_http() {
        assert!(matches!(
            Cursor::parse("not a url"),
            Err(ApiError::InvalidCursor { .. })
        ));
        assert!(matches!(
            Cursor::parse("file:///etc/passwd"),
            Err(ApiError::InvalidCursor { .. })
        ));
    }

    #[test]
    fn test_type_query_builder() {
        let query = TypeQuery::new("posts")
            .fetch(&["title", "subtitle"])
            .page_size(3);
        assert_eq!(query.document_type, "posts");
        assert_eq!(query.fields, vec!["title", "subtitle"]);
        assert_eq!(query.page_size, Some(3));
    }
}
