//! Generator module - fetches posts from the content API and writes the static site

mod pages;

use anyhow::{Context as _, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::cms::{ContentApi, TypeQuery};
use crate::content::{enumerate_identifiers, fetch_detail, PostPage};
use crate::helpers::is_safe_segment;
use crate::listing::ListingState;
use crate::templates::STYLESHEET;
use crate::Blog;

pub use pages::Pages;

/// Fields needed to render a listing entry
pub const SUMMARY_FIELDS: &[&str] = &["title", "subtitle", "author"];

/// Summary of a finished build
#[derive(Debug, Clone)]
pub struct BuildReport {
    /// Posts on the pre-rendered home page
    pub listed: usize,
    /// Whether the home page offers "load more"
    pub has_more: bool,
    /// Detail pages written
    pub posts: usize,
    pub elapsed: Duration,
}

/// Static site generator
pub struct Generator<'a> {
    blog: Blog,
    api: &'a dyn ContentApi,
    pages: Pages,
}

impl<'a> Generator<'a> {
    /// Create a new generator
    pub fn new(blog: &Blog, api: &'a dyn ContentApi) -> Result<Self> {
        Ok(Self {
            blog: blog.clone(),
            api,
            pages: Pages::new(&blog.config)?,
        })
    }

    /// Generate the entire site
    ///
    /// Every page is fetched and rendered before anything is written, so a
    /// failed request leaves the previous build untouched.
    pub async fn generate(&self) -> Result<BuildReport> {
        let start = Instant::now();
        let public_dir = &self.blog.public_dir;

        let (listing, index) = self.render_index().await?;
        let posts = self.render_post_pages().await?;
        let not_found = self.pages.not_found()?;

        fs::create_dir_all(public_dir)?;
        write_file(&public_dir.join("css").join("style.css"), STYLESHEET)?;
        write_file(&public_dir.join("index.html"), &index)?;
        for (path, html) in &posts {
            write_file(path, html)?;
            tracing::debug!("Generated {:?}", path);
        }
        write_file(&public_dir.join("404.html"), &not_found)?;

        Ok(BuildReport {
            listed: listing.items.len(),
            has_more: !listing.is_exhausted(),
            posts: posts.len(),
            elapsed: start.elapsed(),
        })
    }

    /// Render the home page from the first listing page
    async fn render_index(&self) -> Result<(ListingState, String)> {
        let api_config = &self.blog.config.api;
        let query = TypeQuery::new(&api_config.document_type)
            .fetch(SUMMARY_FIELDS)
            .page_size(api_config.page_size);

        let raw = self
            .api
            .query_by_type(&query)
            .await
            .context("Failed to fetch the first page of posts")?;
        let listing = ListingState::new(PostPage::from_raw(raw)?);

        let html = self.pages.index(&listing)?;
        tracing::debug!(
            "Rendered index with {} posts (more: {})",
            listing.items.len(),
            !listing.is_exhausted()
        );

        Ok((listing, html))
    }

    /// Render one detail page per post identifier, with its output path
    async fn render_post_pages(&self) -> Result<Vec<(PathBuf, String)>> {
        let api_config = &self.blog.config.api;
        let uids = enumerate_identifiers(
            self.api,
            &api_config.document_type,
            api_config.enumerate_page_size,
        )
        .await
        .context("Failed to enumerate post identifiers")?;

        tracing::info!("Found {} posts", uids.len());

        let mut rendered = Vec::with_capacity(uids.len());
        for uid in &uids {
            // Check before fetching so a bad uid fails fast
            let path = post_output_path(&self.blog.public_dir, uid)?;

            let post = fetch_detail(self.api, &api_config.document_type, uid)
                .await
                .with_context(|| format!("Failed to fetch post '{}'", uid))?;
            rendered.push((path, self.pages.post(&post)?));
        }

        Ok(rendered)
    }
}

/// Where the detail page of `uid` lives under the public directory
pub fn post_output_path(public_dir: &Path, uid: &str) -> Result<PathBuf> {
    if !is_safe_segment(uid) {
        anyhow::bail!("Post uid {:?} cannot be used as a page path", uid);
    }
    Ok(public_dir.join("post").join(uid).join("index.html"))
}

/// Write a rendered detail page, returning its path
pub fn write_post_page(public_dir: &Path, uid: &str, html: &str) -> Result<PathBuf> {
    let output_path = post_output_path(public_dir, uid)?;
    write_file(&output_path, html)?;
    Ok(output_path)
}

fn write_file(output_path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| anyhow::anyhow!("Failed to create {:?}: {}", parent, e))?;
    }
    fs::write(output_path, contents)
        .map_err(|e| anyhow::anyhow!("Failed to write {:?}: {}", output_path, e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cms::fake::{self, FakeApi};
    use crate::config::SiteConfig;
    use tempfile::TempDir;

    fn blog(dir: &TempDir) -> Blog {
        Blog::from_config(dir.path(), SiteConfig::default())
    }

    fn api() -> FakeApi {
        let mut first = fake::post(
            "como-utilizar-hooks",
            "Como utilizar Hooks",
            Some("2020-04-19T15:30:00+0000"),
        );
        first.data.content = vec![fake::section("Proin et varius", &["Lorem ipsum"])];
        let second = fake::post("criando-um-app", "Criando um app CRA do zero", None);
        FakeApi::new(vec![first, second])
    }

    #[tokio::test]
    async fn test_generate_site() {
        let dir = TempDir::new().unwrap();
        let blog = blog(&dir);
        let api = api();

        let report = Generator::new(&blog, &api)
            .unwrap()
            .generate()
            .await
            .unwrap();
        assert_eq!(report.listed, 1);
        assert!(report.has_more);
        assert_eq!(report.posts, 2);

        let public = &blog.public_dir;
        assert!(public.join("css/style.css").is_file());
        assert!(public.join("404.html").is_file());

        let index = fs::read_to_string(public.join("index.html")).unwrap();
        assert!(index.contains("Como utilizar Hooks"));
        assert!(index.contains("19 abr 2020"));
        assert!(index.contains("Carregar mais posts"));

        let post = fs::read_to_string(public.join("post/como-utilizar-hooks/index.html")).unwrap();
        assert!(post.contains("19 abr 2020"));
        assert!(post.contains("Proin et varius"));

        let undated = fs::read_to_string(public.join("post/criando-um-app/index.html")).unwrap();
        assert!(undated.contains("Data desconhecida"));
        assert!(undated.contains("0 min"));
    }

    #[tokio::test]
    async fn test_first_page_failure_fails_build() {
        let dir = TempDir::new().unwrap();
        let blog = blog(&dir);
        let api = api();
        api.fail_next();

        let result = Generator::new(&blog, &api).unwrap().generate().await;
        assert!(result.is_err());
        assert!(!blog.public_dir.join("index.html").exists());
    }

    #[tokio::test]
    async fn test_post_failure_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let blog = blog(&dir);
        let api = api().with_alias("criando-um-app", "como-utilizar-hooks");

        let result = Generator::new(&blog, &api).unwrap().generate().await;
        assert!(result.is_err());
        assert!(!blog.public_dir.join("index.html").exists());
        assert!(!blog.public_dir.join("css/style.css").exists());
        assert!(!blog
            .public_dir
            .join("post/como-utilizar-hooks/index.html")
            .exists());
    }

    #[tokio::test]
    async fn test_unsafe_uid_fails_build() {
        let dir = TempDir::new().unwrap();
        let blog = blog(&dir);
        let api = FakeApi::new(vec![fake::post("..", "Escape", None)]);

        let err = Generator::new(&blog, &api)
            .unwrap()
            .generate()
            .await
            .unwrap_err();
        assert!(err.to_string().contains("cannot be used as a page path"));
    }

    #[test]
    fn test_post_output_path() {
        let public = Path::new("/site/public");
        assert_eq!(
            post_output_path(public, "hello").unwrap(),
            Path::new("/site/public/post/hello/index.html")
        );
        assert!(post_output_path(public, "a/b").is_err());
        assert!(post_output_path(public, "").is_err());
    }
}
