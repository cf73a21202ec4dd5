//! spacetraveling: a static blog front end over a headless CMS
//!
//! Posts are fetched from a Prismic repository through the [`cms::ContentApi`]
//! trait, rendered with embedded Tera templates and written to a public
//! directory. A small dev server adds incremental "load more" and renders
//! posts missing from the build on first request.

pub mod cms;
pub mod commands;
pub mod config;
pub mod content;
pub mod error;
pub mod generator;
pub mod helpers;
pub mod listing;
pub mod richtext;
pub mod server;
pub mod templates;

use anyhow::Result;
use std::path::{Path, PathBuf};

/// The main blog application
#[derive(Debug, Clone)]
pub struct Blog {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Public (output) directory
    pub public_dir: PathBuf,
}

impl Blog {
    /// Create a new Blog instance from a directory
    ///
    /// Reads `_config.yml` when present, applies `PRISMIC_*` overrides from
    /// the environment and the site's `.env` file, and validates the result.
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join("_config.yml");

        let mut config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            tracing::debug!("No _config.yml in {:?}, using defaults", base_dir);
            config::SiteConfig::default()
        };
        config.apply_env(config::PrismicEnv::load(base_dir.join(".env"))?);
        config.validate()?;

        Ok(Self::from_config(base_dir, config))
    }

    /// Create a Blog from an already loaded configuration
    pub fn from_config<P: AsRef<Path>>(base_dir: P, config: config::SiteConfig) -> Self {
        let base_dir = base_dir.as_ref().to_path_buf();
        let public_dir = base_dir.join(&config.public_dir);
        Self {
            config,
            base_dir,
            public_dir,
        }
    }

    /// Content API client for the configured repository
    pub fn client(&self) -> Result<cms::PrismicClient> {
        cms::PrismicClient::new(&self.config.api)
    }

    /// Generate the static site
    pub async fn generate(&self) -> Result<generator::BuildReport> {
        commands::generate::run(self).await
    }

    /// Clean the public directory
    pub fn clean(&self) -> Result<()> {
        commands::clean::run(self)
    }
}
