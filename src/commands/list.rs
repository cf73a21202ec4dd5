//! List posts from the content API

use anyhow::{Context as _, Result};

use crate::cms::{ContentApi, TypeQuery};
use crate::content::{PostPage, PostSummary};
use crate::generator::SUMMARY_FIELDS;
use crate::helpers::DateFormatter;
use crate::listing::{Listing, ListingState, LoadMore};
use crate::Blog;

/// Print the posts of the configured repository
pub async fn run(blog: &Blog, all: bool) -> Result<()> {
    let client = blog.client()?;
    for line in run_with(blog, &client, all).await? {
        println!("{}", line);
    }
    Ok(())
}

/// Lines describing the listing; the first page only unless `all` is set
pub async fn run_with(blog: &Blog, api: &dyn ContentApi, all: bool) -> Result<Vec<String>> {
    let api_config = &blog.config.api;
    let query = TypeQuery::new(&api_config.document_type)
        .fetch(SUMMARY_FIELDS)
        .page_size(api_config.page_size);
    let first = PostPage::from_raw(api.query_by_type(&query).await?)?;

    let mut listing = Listing::new(api, ListingState::new(first));
    if all {
        loop {
            match listing.load_more().await {
                LoadMore::Appended { .. } => continue,
                LoadMore::Exhausted => break,
                LoadMore::Failed(e) => {
                    return Err(e).context("Failed to load the next page of posts")
                }
            }
        }
    }

    let state = listing.into_state();
    let dates = DateFormatter::from_config(&blog.config)?;

    let mut lines = vec![format!("Posts ({}):", state.items.len())];
    lines.extend(state.items.iter().map(|post| describe(post, &dates, blog)));
    if !state.is_exhausted() {
        lines.push("  ... more posts available, use --all to list them".to_string());
    }
    Ok(lines)
}

fn describe(post: &PostSummary, dates: &DateFormatter, blog: &Blog) -> String {
    let date = dates.display(post.first_publication_date.as_ref());
    format!(
        "  {} - {} [{}]",
        date.text(&blog.config.labels.unknown_date),
        post.title,
        post.uid
    )
}
