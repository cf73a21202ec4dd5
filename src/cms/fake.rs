//! In-memory content API for tests

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use super::{ContentApi, Cursor, RawDocument, RawPage, RawPostData, RawSection, TypeQuery};
use crate::error::{ApiError, ApiResult};
use crate::richtext::{Block, RichField, RichText};

const FAKE_HOST: &str = "https://fake.cdn.prismic.io/api/v2/documents/search";

/// Serves a fixed list of documents, paginated like the real API
pub(crate) struct FakeApi {
    documents: Vec<RawDocument>,
    default_page_size: usize,
    requests: AtomicUsize,
    fail_next: AtomicBool,
    /// uid lookups answered with another document's uid
    aliases: HashMap<String, String>,
}

impl FakeApi {
    pub(crate) fn new(documents: Vec<RawDocument>) -> Self {
        Self {
            documents,
            default_page_size: 20,
            requests: AtomicUsize::new(0),
            fail_next: AtomicBool::new(false),
            aliases: HashMap::new(),
        }
    }

    /// Answer lookups of `requested` with the document stored under `actual`
    pub(crate) fn with_alias(mut self, requested: &str, actual: &str) -> Self {
        self.aliases
            .insert(requested.to_string(), actual.to_string());
        self
    }

    /// Number of requests served so far, failed ones included
    pub(crate) fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    /// Make the next request fail with a 500
    pub(crate) fn fail_next(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    /// Cursor for page `page` (1-based) of size `page_size`
    pub(crate) fn cursor(page: usize, page_size: usize) -> Cursor {
        Cursor::parse(&format!("{}?page={}&pageSize={}", FAKE_HOST, page, page_size))
            .expect("valid fake cursor")
    }

    fn record(&self) -> ApiResult<()> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(ApiError::Status {
                status: 500,
                url: FAKE_HOST.to_string(),
            });
        }
        Ok(())
    }

    fn page(&self, page: usize, page_size: usize) -> RawPage {
        let page_size = page_size.max(1);
        let start = (page - 1) * page_size;
        let results: Vec<RawDocument> = self
            .documents
            .iter()
            .skip(start)
            .take(page_size)
            .cloned()
            .collect();
        let total_pages = self.documents.len().div_ceil(page_size);
        let next_page = (page < total_pages)
            .then(|| Self::cursor(page + 1, page_size).as_str().to_string());

        RawPage {
            page: Some(page as u32),
            total_pages: Some(total_pages as u32),
            results,
            next_page,
        }
    }
}

#[async_trait]
impl ContentApi for FakeApi {
    async fn query_by_type(&self, query: &TypeQuery) -> ApiResult<RawPage> {
        self.record()?;
        let page_size = query
            .page_size
            .map(|s| s as usize)
            .unwrap_or(self.default_page_size);
        Ok(self.page(1, page_size))
    }

    async fn get_by_uid(&self, document_type: &str, uid: &str) -> ApiResult<RawDocument> {
        self.record()?;
        let wanted = self.aliases.get(uid).map(String::as_str).unwrap_or(uid);
        self.documents
            .iter()
            .find(|doc| doc.uid.as_deref() == Some(wanted))
            .cloned()
            .ok_or_else(|| ApiError::NotFound {
                document_type: document_type.to_string(),
                uid: uid.to_string(),
            })
    }

    async fn fetch_page(&self, cursor: &Cursor) -> ApiResult<RawPage> {
        self.record()?;
        let param = |key: &str| {
            cursor
                .url()
                .query_pairs()
                .find(|(k, _)| k == key)
                .and_then(|(_, v)| v.parse::<usize>().ok())
        };
        let page = param("page").unwrap_or(1).max(1);
        let page_size = param("pageSize").unwrap_or(self.default_page_size);
        Ok(self.page(page, page_size))
    }
}

/// A post document with plain-string fields and the given sections
pub(crate) fn post(uid: &str, title: &str, date: Option<&str>) -> RawDocument {
    RawDocument {
        id: format!("id-{}", uid),
        uid: Some(uid.to_string()),
        document_type: "posts".to_string(),
        first_publication_date: date.map(str::to_string),
        data: RawPostData {
            title: RichField::Plain(title.to_string()),
            subtitle: RichField::Plain(format!("Sobre {}", title)),
            author: RichField::Plain("Joseph Oliveira".to_string()),
            banner: None,
            content: Vec::new(),
        },
    }
}

/// A content section whose body is one paragraph per entry
pub(crate) fn section(heading: &str, paragraphs: &[&str]) -> RawSection {
    RawSection {
        heading: RichField::Plain(heading.to_string()),
        body: RichText::new(paragraphs.iter().map(|p| Block::paragraph(*p)).collect()),
    }
}
