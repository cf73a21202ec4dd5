//! Built-in site templates using the Tera template engine
//!
//! Templates and the stylesheet are embedded in the binary. Autoescaping
//! stays on for `.html` templates; the only values marked `safe` are HTML
//! produced by this crate (rich text bodies and helper tags).

use anyhow::Result;
use serde::Serialize;
use tera::{Context, Tera};

use crate::config::{LabelsConfig, SiteConfig};
use crate::helpers::{css, meta_generator, url_for};

/// Stylesheet written to `css/style.css`
pub const STYLESHEET: &str = include_str!("site/style.css");

/// Template renderer with the embedded site templates
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    /// Create a new renderer with all templates loaded
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("site/layout.html")),
            ("index.html", include_str!("site/index.html")),
            ("post.html", include_str!("site/post.html")),
            ("fallback.html", include_str!("site/fallback.html")),
            ("not_found.html", include_str!("site/not_found.html")),
            ("fetch_failed.html", include_str!("site/fetch_failed.html")),
            ("more_items.html", include_str!("site/more_items.html")),
            // Partials
            (
                "partials/post_summary.html",
                include_str!("site/partials/post_summary.html"),
            ),
            (
                "partials/load_more.html",
                include_str!("site/partials/load_more.html"),
            ),
        ])?;

        Ok(Self { tera })
    }

    /// Render a template with given context
    pub fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(template_name, context)?)
    }
}

/// Data structures for template context

#[derive(Debug, Clone, Serialize)]
pub struct SiteData {
    pub title: String,
    pub description: String,
    /// BCP 47 tag for `<html lang>`
    pub lang: String,
    pub home_url: String,
    /// Pre-rendered `<link>` tag
    pub stylesheet: String,
    /// Pre-rendered `<meta name="generator">` tag
    pub generator: String,
    pub labels: LabelsConfig,
}

impl SiteData {
    pub fn from_config(config: &SiteConfig) -> Self {
        Self {
            title: config.title.clone(),
            description: config.description.clone(),
            lang: config.locale.replace('_', "-"),
            home_url: url_for(config, "/"),
            stylesheet: css(config, "style.css"),
            generator: meta_generator(),
            labels: config.labels.clone(),
        }
    }
}

/// One entry of the listing
#[derive(Debug, Clone, Serialize)]
pub struct SummaryView {
    pub uid: String,
    pub url: String,
    pub title: String,
    pub subtitle: String,
    pub author: String,
    /// Display text, or the "unknown date" label
    pub date: String,
    pub datetime: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PostView {
    pub uid: String,
    /// Absolute URL, for `<link rel="canonical">`
    pub permalink: String,
    pub title: String,
    pub author: String,
    pub banner_url: Option<String>,
    pub date: String,
    pub datetime: Option<String>,
    /// Minutes, rounded up
    pub reading_time: usize,
    pub sections: Vec<SectionView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SectionView {
    pub heading: String,
    /// Rendered rich text, already escaped
    pub html: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(config: &SiteConfig) -> Context {
        let mut context = Context::new();
        context.insert("site", &SiteData::from_config(config));
        context
    }

    fn summary(uid: &str, title: &str) -> SummaryView {
        SummaryView {
            uid: uid.to_string(),
            url: format!("/post/{}", uid),
            title: title.to_string(),
            subtitle: "Tudo sobre como criar a sua primeira aplicação".to_string(),
            author: "Danilo Vieira".to_string(),
            date: "19 abr 2020".to_string(),
            datetime: Some("2020-04-19T15:30:00+00:00".to_string()),
        }
    }

    #[test]
    fn test_all_templates_parse() {
        assert!(TemplateRenderer::new().is_ok());
    }

    #[test]
    fn test_site_data_lang() {
        let site = SiteData::from_config(&SiteConfig::default());
        assert_eq!(site.lang, "pt-BR");
        assert_eq!(site.home_url, "/");
        assert!(site.stylesheet.contains("/css/style.css"));
    }

    #[test]
    fn test_index_with_load_more_button() {
        let renderer = TemplateRenderer::new().unwrap();
        let config = SiteConfig::default();
        let mut context = context(&config);
        context.insert("posts", &vec![summary("como-utilizar-hooks", "Como utilizar Hooks")]);
        context.insert("more", &Some("/more?cursor=x"));
        context.insert("failed", &false);

        let html = renderer.render("index.html", &context).unwrap();
        assert!(html.contains("Como utilizar Hooks"));
        assert!(html.contains(r#"href="&#x2F;post&#x2F;como-utilizar-hooks""#));
        assert!(html.contains("19 abr 2020"));
        assert!(html.contains("Carregar mais posts"));
        assert!(html.contains(r#"id="posts""#));
    }

    #[test]
    fn test_load_more_button_carries_failure_labels() {
        let renderer = TemplateRenderer::new().unwrap();
        let config = SiteConfig::default();
        let mut context = context(&config);
        context.insert("posts", &Vec::<SummaryView>::new());
        context.insert("more", &Some("/more?cursor=x"));
        context.insert("failed", &false);

        let html = renderer.render("index.html", &context).unwrap();
        assert!(html.contains(r#"data-failed="Não foi possível carregar mais posts.""#));
        assert!(html.contains(r#"data-retry="Tentar novamente""#));
        assert!(html.contains("error.textContent = button.dataset.failed"));
    }

    #[test]
    fn test_index_without_cursor_has_no_button() {
        let renderer = TemplateRenderer::new().unwrap();
        let config = SiteConfig::default();
        let mut context = context(&config);
        context.insert("posts", &vec![summary("a", "A")]);
        context.insert("more", &None::<String>);
        context.insert("failed", &false);

        let html = renderer.render("index.html", &context).unwrap();
        assert!(!html.contains("<button"));
    }

    #[test]
    fn test_titles_are_escaped() {
        let renderer = TemplateRenderer::new().unwrap();
        let config = SiteConfig::default();
        let mut context = context(&config);
        context.insert("posts", &vec![summary("x", "<script>alert(1)</script>")]);
        context.insert("more", &None::<String>);
        context.insert("failed", &false);

        let html = renderer.render("more_items.html", &context).unwrap();
        assert!(!html.contains("<script>alert"));
        assert!(html.contains("&lt;script&gt;"));
    }
}
