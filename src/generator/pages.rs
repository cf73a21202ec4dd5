//! Page rendering shared by the static build and the dev server

use anyhow::Result;
use tera::Context;

use crate::cms::Cursor;
use crate::config::SiteConfig;
use crate::content::{PostDetail, PostSummary};
use crate::helpers::{encode_segment, full_url_for, post_url, url_for, DateFormatter};
use crate::listing::ListingState;
use crate::templates::{PostView, SectionView, SiteData, SummaryView, TemplateRenderer};

/// Seconds before the fallback page reloads itself
const FALLBACK_REFRESH_SECS: u32 = 2;

/// Renders every page of the site from domain values
pub struct Pages {
    config: SiteConfig,
    renderer: TemplateRenderer,
    dates: DateFormatter,
}

impl Pages {
    pub fn new(config: &SiteConfig) -> Result<Self> {
        Ok(Self {
            config: config.clone(),
            renderer: TemplateRenderer::new()?,
            dates: DateFormatter::from_config(config)?,
        })
    }

    /// Home page with the first page of posts
    pub fn index(&self, listing: &ListingState) -> Result<String> {
        let mut context = self.listing_context(&listing.items, listing.next_cursor.as_ref());
        context.insert("failed", &false);
        self.renderer.render("index.html", &context)
    }

    /// Fragment appended by the "load more" button
    pub fn more(&self, items: &[PostSummary], next: Option<&Cursor>) -> Result<String> {
        let mut context = self.listing_context(items, next);
        context.insert("failed", &false);
        self.renderer.render("more_items.html", &context)
    }

    /// Fragment offering to retry the same cursor
    pub fn load_failed(&self, cursor: &Cursor) -> Result<String> {
        let mut context = self.listing_context(&[], Some(cursor));
        context.insert("failed", &true);
        self.renderer.render("more_items.html", &context)
    }

    pub fn post(&self, post: &PostDetail) -> Result<String> {
        let date = self.dates.display(post.first_publication_date.as_ref());
        let view = PostView {
            uid: post.uid.clone(),
            permalink: full_url_for(&self.config, &format!("post/{}", encode_segment(&post.uid))),
            title: post.title.clone(),
            author: post.author.clone(),
            banner_url: post.banner_url.clone(),
            date: date.text(&self.config.labels.unknown_date).to_string(),
            datetime: date.datetime().map(str::to_string),
            reading_time: post.reading_time(self.config.words_per_minute),
            sections: post
                .sections
                .iter()
                .map(|section| SectionView {
                    heading: section.heading.clone(),
                    html: section.body.as_html(),
                })
                .collect(),
        };

        let mut context = self.base_context();
        context.insert("post", &view);
        self.renderer.render("post.html", &context)
    }

    /// "Loading" page shown while a post is fetched on demand
    pub fn fallback(&self) -> Result<String> {
        let mut context = self.base_context();
        context.insert("refresh_secs", &FALLBACK_REFRESH_SECS);
        self.renderer.render("fallback.html", &context)
    }

    pub fn not_found(&self) -> Result<String> {
        self.renderer.render("not_found.html", &self.base_context())
    }

    /// Error page for an on-demand fetch that failed
    pub fn fetch_failed(&self, uid: &str) -> Result<String> {
        let mut context = self.base_context();
        context.insert("retry_url", &post_url(&self.config, uid));
        self.renderer.render("fetch_failed.html", &context)
    }

    /// URL fetched by the "load more" button for `cursor`
    pub fn more_url(&self, cursor: &Cursor) -> String {
        let query = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("cursor", cursor.as_str())
            .finish();
        format!("{}?{}", url_for(&self.config, "more"), query)
    }

    fn summary_view(&self, post: &PostSummary) -> SummaryView {
        let date = self.dates.display(post.first_publication_date.as_ref());
        SummaryView {
            uid: post.uid.clone(),
            url: post_url(&self.config, &post.uid),
            title: post.title.clone(),
            subtitle: post.subtitle.clone(),
            author: post.author.clone(),
            date: date.text(&self.config.labels.unknown_date).to_string(),
            datetime: date.datetime().map(str::to_string),
        }
    }

    fn listing_context(&self, items: &[PostSummary], next: Option<&Cursor>) -> Context {
        let posts: Vec<SummaryView> = items.iter().map(|p| self.summary_view(p)).collect();
        let mut context = self.base_context();
        context.insert("posts", &posts);
        context.insert("more", &next.map(|cursor| self.more_url(cursor)));
        context
    }

    fn base_context(&self) -> Context {
        let mut context = Context::new();
        context.insert("site", &SiteData::from_config(&self.config));
        context
    }
}
