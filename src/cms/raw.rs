//! Wire shapes of the content API

use serde::{Deserialize, Serialize};

use crate::richtext::{RichField, RichText};

/// One page of query results
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawPage {
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub total_pages: Option<u32>,
    #[serde(default)]
    pub results: Vec<RawDocument>,
    /// Absolute URL of the next page, `null` on the last one
    #[serde(default)]
    pub next_page: Option<String>,
}

/// A document as returned by the API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawDocument {
    pub id: String,
    #[serde(default)]
    pub uid: Option<String>,
    #[serde(rename = "type", default)]
    pub document_type: String,
    #[serde(default)]
    pub first_publication_date: Option<String>,
    #[serde(default)]
    pub data: RawPostData,
}

/// Custom fields of a post document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawPostData {
    pub title: RichField,
    pub subtitle: RichField,
    pub author: RichField,
    pub banner: Option<RawImage>,
    pub content: Vec<RawSection>,
}

/// Image field; an unset image arrives as `{}`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawImage {
    pub url: Option<String>,
    pub alt: Option<String>,
}

/// Entry of the `content` group field
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawSection {
    pub heading: RichField,
    pub body: RichText,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_search_response() {
        let json = r#"{
            "page": 1,
            "results_per_page": 1,
            "results_size": 1,
            "total_results_size": 2,
            "total_pages": 2,
            "next_page": "https://spacetraveling.cdn.prismic.io/api/v2/documents/search?ref=X&page=2&pageSize=1",
            "prev_page": null,
            "results": [{
                "id": "YFzJ",
                "uid": "como-utilizar-hooks",
                "type": "posts",
                "href": "https://spacetraveling.cdn.prismic.io/api/v2/documents/search?ref=X",
                "tags": [],
                "first_publication_date": "2021-03-25T19:25:28+0000",
                "last_publication_date": "2021-03-25T19:27:35+0000",
                "lang": "pt-br",
                "data": {
                    "title": "Como utilizar Hooks",
                    "subtitle": "Pensando em sincronização em vez de ciclos de vida",
                    "author": "Joseph Oliveira",
                    "banner": {"dimensions": {"width": 1440, "height": 400}, "alt": null, "url": "https://images.prismic.io/banner.png"},
                    "content": [{
                        "heading": "Proin et varius",
                        "body": [{"type": "paragraph", "text": "Lorem ipsum dolor", "spans": []}]
                    }]
                }
            }]
        }"#;

        let page: RawPage = serde_json::from_str(json).unwrap();
        assert_eq!(page.total_pages, Some(2));
        assert!(page.next_page.is_some());

        let doc = &page.results[0];
        assert_eq!(doc.uid.as_deref(), Some("como-utilizar-hooks"));
        assert_eq!(doc.document_type, "posts");
        assert_eq!(doc.data.title.resolve(), "Como utilizar Hooks");
        assert_eq!(
            doc.data.banner.as_ref().and_then(|b| b.url.as_deref()),
            Some("https://images.prismic.io/banner.png")
        );
        assert_eq!(doc.data.content[0].heading.resolve(), "Proin et varius");
        assert_eq!(doc.data.content[0].body.as_text(), "Lorem ipsum dolor");
    }

    #[test]
    fn test_parse_last_page_and_sparse_document() {
        let json = r#"{
            "next_page": null,
            "results": [{"id": "abc", "uid": null, "type": "posts", "first_publication_date": null, "data": {"banner": {}}}]
        }"#;
        let page: RawPage = serde_json::from_str(json).unwrap();
        assert!(page.next_page.is_none());
        let doc = &page.results[0];
        assert!(doc.uid.is_none());
        assert!(doc.first_publication_date.is_none());
        assert!(doc.data.banner.as_ref().unwrap().url.is_none());
        assert!(doc.data.content.is_empty());
    }
}
