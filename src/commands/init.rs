//! Initialize a new blog site

use anyhow::Result;
use std::fs;
use std::path::Path;

/// Starter configuration; every key shows its default
const CONFIG_TEMPLATE: &str = r#"# spacetraveling configuration

# Site
title: spacetraveling
description: ''

# URL
url: http://localhost:4000
root: /

# Directory
public_dir: public

# Dates and reading time
locale: pt_BR
timezone: UTC
date_format: '%d %b %Y'
words_per_minute: 200

# Render posts missing from the build on first request (dev server)
fallback: true

# Content API
# The endpoint and token can also be set with PRISMIC_API_ENDPOINT
# and PRISMIC_ACCESS_TOKEN, in the environment or in a .env file here.
api:
  endpoint: https://your-repository.cdn.prismic.io/api/v2
  # access_token:
  document_type: posts
  page_size: 1
  enumerate_page_size: 100
  # timeout_secs: 10

# Interface text
labels:
  load_more: Carregar mais posts
  loading: Carregando...
  load_failed: Não foi possível carregar mais posts.
  retry: Tentar novamente
  not_found: Post não encontrado
  fetch_failed: Não foi possível carregar este post.
  unknown_date: Data desconhecida
  reading_time_unit: min
"#;

/// Initialize a new site in the given directory
///
/// An existing `_config.yml` is left untouched.
pub fn init_site(target_dir: &Path) -> Result<()> {
    fs::create_dir_all(target_dir)?;

    let config_path = target_dir.join("_config.yml");
    if config_path.exists() {
        anyhow::bail!("{:?} already exists", config_path);
    }
    fs::write(&config_path, CONFIG_TEMPLATE)?;
    tracing::debug!("Wrote {:?}", config_path);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use tempfile::TempDir;

    #[test]
    fn test_template_matches_defaults() {
        let config: SiteConfig = serde_yaml::from_str(CONFIG_TEMPLATE).unwrap();
        let defaults = SiteConfig::default();
        assert_eq!(config.title, defaults.title);
        assert_eq!(config.date_format, defaults.date_format);
        assert_eq!(config.api.page_size, defaults.api.page_size);
        assert_eq!(config.labels.load_more, defaults.labels.load_more);
        assert_eq!(config.labels.fetch_failed, defaults.labels.fetch_failed);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_init_writes_config_once() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("blog");

        init_site(&target).unwrap();
        assert!(target.join("_config.yml").is_file());
        assert!(init_site(&target).is_err());
    }
}
