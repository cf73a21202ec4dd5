//! Post models

use chrono::{DateTime, FixedOffset};

use super::reading;
use crate::cms::{Cursor, RawDocument, RawPage};
use crate::error::{ApiError, ApiResult};
use crate::helpers::parse_api_timestamp;
use crate::richtext::RichText;

/// A post as shown in the listing
#[derive(Debug, Clone, PartialEq)]
pub struct PostSummary {
    /// Unique identifier, used in `/post/{uid}`
    pub uid: String,

    /// First publication date, if the document has been published
    pub first_publication_date: Option<DateTime<FixedOffset>>,

    pub title: String,
    pub subtitle: String,
    pub author: String,
}

impl PostSummary {
    /// Normalize a raw document, resolving rich fields to plain text
    pub fn from_raw(raw: RawDocument) -> ApiResult<Self> {
        let first_publication_date = publication_date(&raw);
        let uid = require_uid(&raw)?;
        Ok(Self {
            uid,
            first_publication_date,
            title: raw.data.title.resolve(),
            subtitle: raw.data.subtitle.resolve(),
            author: raw.data.author.resolve(),
        })
    }
}

/// One content section of a post
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    /// Plain heading text; also the section's key on the page
    pub heading: String,
    pub body: RichText,
}

/// A post with its full content
#[derive(Debug, Clone, PartialEq)]
pub struct PostDetail {
    pub uid: String,
    pub first_publication_date: Option<DateTime<FixedOffset>>,
    pub title: String,
    pub author: String,
    pub banner_url: Option<String>,
    /// Sections in the order the API returned them
    pub sections: Vec<Section>,
}

impl PostDetail {
    /// Normalize a raw document
    pub fn from_raw(raw: RawDocument) -> ApiResult<Self> {
        let first_publication_date = publication_date(&raw);
        let uid = require_uid(&raw)?;
        let banner_url = raw
            .data
            .banner
            .and_then(|banner| banner.url)
            .filter(|url| !url.is_empty());

        let sections = raw
            .data
            .content
            .into_iter()
            .map(|section| Section {
                heading: section.heading.resolve(),
                body: section.body,
            })
            .collect();

        Ok(Self {
            uid,
            first_publication_date,
            title: raw.data.title.resolve(),
            author: raw.data.author.resolve(),
            banner_url,
            sections,
        })
    }

    /// Words in all headings and bodies
    pub fn word_count(&self) -> usize {
        reading::count_words(&self.sections)
    }

    /// Estimated reading time in whole minutes, rounded up
    pub fn reading_time(&self, words_per_minute: usize) -> usize {
        reading::reading_time_minutes(self.word_count(), words_per_minute)
    }
}

/// A page of post summaries plus the cursor to the next one
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostPage {
    pub items: Vec<PostSummary>,
    /// `None` once there is nothing left to fetch
    pub next_cursor: Option<Cursor>,
}

impl PostPage {
    /// Normalize a raw page
    ///
    /// Documents without a uid cannot be linked to and are left out, so the
    /// rest of the page and its cursor still apply.
    pub fn from_raw(raw: RawPage) -> ApiResult<Self> {
        let items = raw
            .results
            .into_iter()
            .filter_map(|doc| match PostSummary::from_raw(doc) {
                Ok(summary) => Some(summary),
                Err(e) => {
                    tracing::warn!("Skipping listed document: {}", e);
                    None
                }
            })
            .collect();
        let next_cursor = raw
            .next_page
            .as_deref()
            .filter(|next| !next.is_empty())
            .map(Cursor::parse)
            .transpose()?;

        Ok(Self { items, next_cursor })
    }
}

fn require_uid(raw: &RawDocument) -> ApiResult<String> {
    raw.uid
        .clone()
        .filter(|uid| !uid.is_empty())
        .ok_or_else(|| ApiError::MissingIdentifier { id: raw.id.clone() })
}

fn publication_date(raw: &RawDocument) -> Option<DateTime<FixedOffset>> {
    let value = raw.first_publication_date.as_deref()?;
    let parsed = parse_api_timestamp(value);
    if parsed.is_none() {
        tracing::warn!(
            "Document {} has an unreadable publication date: {}",
            raw.id,
            value
        );
    }
    parsed
}
