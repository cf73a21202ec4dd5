//! Generate static files

use anyhow::Result;

use crate::cms::ContentApi;
use crate::generator::{BuildReport, Generator};
use crate::Blog;

/// Generate the static site from the configured repository
pub async fn run(blog: &Blog) -> Result<BuildReport> {
    let client = blog.client()?;
    run_with(blog, &client).await
}

/// Generate the static site from any content source
pub async fn run_with(blog: &Blog, api: &dyn ContentApi) -> Result<BuildReport> {
    let generator = Generator::new(blog, api)?;
    let report = generator.generate().await?;

    tracing::info!(
        "Generated index ({} posts) and {} post pages in {:.2}s",
        report.listed,
        report.posts,
        report.elapsed.as_secs_f64()
    );

    Ok(report)
}
