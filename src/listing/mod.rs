//! Post listing with incremental pagination
//!
//! [`ListingState`] is a plain value: the posts shown so far and the cursor
//! to the next page. [`Listing`] pairs it with a content API and performs
//! the "load more" step.

use crate::cms::{ContentApi, Cursor};
use crate::content::{PostPage, PostSummary};
use crate::error::{ApiError, ApiResult};

/// Posts loaded so far and where to continue
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingState {
    pub items: Vec<PostSummary>,
    pub next_cursor: Option<Cursor>,
}

impl ListingState {
    /// State after the first page
    pub fn new(first: PostPage) -> Self {
        Self::default().apply_page(first)
    }

    /// Empty state that continues from `cursor`
    pub fn resume(cursor: Cursor) -> Self {
        Self {
            items: Vec::new(),
            next_cursor: Some(cursor),
        }
    }

    /// Append a page's items after the current ones and take over its cursor
    pub fn apply_page(mut self, page: PostPage) -> Self {
        self.items.extend(page.items);
        self.next_cursor = page.next_cursor;
        self
    }

    /// Whether the last page has been reached
    pub fn is_exhausted(&self) -> bool {
        self.next_cursor.is_none()
    }
}

/// Outcome of [`Listing::load_more`]
#[derive(Debug)]
pub enum LoadMore {
    /// A page was fetched and appended
    Appended { count: usize, exhausted: bool },
    /// Nothing left to fetch; no request was made
    Exhausted,
    /// The request failed; the state is unchanged and the call can be retried
    Failed(ApiError),
}

/// A listing bound to the API it pages through
pub struct Listing<'a> {
    api: &'a dyn ContentApi,
    state: ListingState,
}

impl<'a> Listing<'a> {
    pub fn new(api: &'a dyn ContentApi, state: ListingState) -> Self {
        Self { api, state }
    }

    pub fn state(&self) -> &ListingState {
        &self.state
    }

    pub fn into_state(self) -> ListingState {
        self.state
    }

    /// Fetch the next page, if any, and append it
    pub async fn load_more(&mut self) -> LoadMore {
        let Some(cursor) = self.state.next_cursor.clone() else {
            tracing::debug!("Listing exhausted, not fetching");
            return LoadMore::Exhausted;
        };

        match self.fetch(&cursor).await {
            Ok(page) => {
                let count = page.items.len();
                self.state = std::mem::take(&mut self.state).apply_page(page);
                tracing::debug!("Loaded {} more posts from {}", count, cursor);
                LoadMore::Appended {
                    count,
                    exhausted: self.state.is_exhausted(),
                }
            }
            Err(e) => {
                tracing::warn!("Failed to load more posts from {}: {}", cursor, e);
                LoadMore::Failed(e)
            }
        }
    }

    async fn fetch(&self, cursor: &Cursor) -> ApiResult<PostPage> {
        let raw = self.api.fetch_page(cursor).await?;
        PostPage::from_raw(raw)
    }
}
