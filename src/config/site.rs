//! Site configuration (_config.yml)

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::error::ConfigError;

/// Prefix of the variables read into [`PrismicEnv`]
pub const ENV_PREFIX: &str = "PRISMIC_";

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub description: String,

    // URL
    pub url: String,
    pub root: String,

    // Directory
    pub public_dir: String,

    // Date / reading time
    pub locale: String,
    pub timezone: String,
    pub date_format: String,
    pub words_per_minute: usize,

    /// Render posts missing from the build on first request instead of answering 404
    pub fallback: bool,

    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub labels: LabelsConfig,

    // Store any additional fields
    #[serde(flatten)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "spacetraveling".to_string(),
            description: String::new(),

            url: "http://localhost:4000".to_string(),
            root: "/".to_string(),

            public_dir: "public".to_string(),

            locale: "pt_BR".to_string(),
            timezone: "UTC".to_string(),
            date_format: "%d %b %Y".to_string(),
            words_per_minute: 200,

            fallback: true,

            api: ApiConfig::default(),
            labels: LabelsConfig::default(),
            extra: HashMap::new(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: SiteConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Apply `PRISMIC_API_ENDPOINT` and `PRISMIC_ACCESS_TOKEN` overrides
    pub fn apply_env(&mut self, env: PrismicEnv) {
        if let Some(endpoint) = env.api_endpoint {
            tracing::debug!("Using API endpoint from {}API_ENDPOINT", ENV_PREFIX);
            self.api.endpoint = endpoint;
        }
        if let Some(token) = env.access_token {
            tracing::debug!("Using access token from {}ACCESS_TOKEN", ENV_PREFIX);
            self.api.access_token = Some(token);
        }
    }

    /// Check the settings that would otherwise only fail deep inside a build
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.words_per_minute == 0 {
            return Err(ConfigError::ZeroWordsPerMinute);
        }
        crate::helpers::parse_locale(&self.locale)?;
        crate::helpers::parse_timezone(&self.timezone)?;
        Ok(())
    }
}

/// API settings taken from `PRISMIC_*` variables
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PrismicEnv {
    pub api_endpoint: Option<String>,
    pub access_token: Option<String>,
}

impl PrismicEnv {
    /// Read the process environment and, under it, the dotenv file at `path`
    ///
    /// A missing file is not an error. Variables set in the process win over
    /// the file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let from_file = match dotenvy::from_path_iter(path) {
            Ok(iter) => Self::from_vars(iter.collect::<Result<Vec<_>, _>>()?)?,
            Err(e) if e.not_found() => {
                tracing::debug!("No .env file at {:?}", path);
                Self::default()
            }
            Err(e) => return Err(e.into()),
        };
        let from_process: Self = envy::prefixed(ENV_PREFIX).from_env()?;
        Ok(from_process.or(from_file))
    }

    /// Deserialize from `(name, value)` pairs such as a dotenv file's entries
    pub fn from_vars<I>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let env: Self = envy::prefixed(ENV_PREFIX).from_iter(vars)?;
        Ok(env.non_empty())
    }

    /// Fill the unset fields from `other`
    fn or(self, other: Self) -> Self {
        let this = self.non_empty();
        Self {
            api_endpoint: this.api_endpoint.or(other.api_endpoint),
            access_token: this.access_token.or(other.access_token),
        }
    }

    /// Treat empty values as unset
    fn non_empty(self) -> Self {
        Self {
            api_endpoint: self.api_endpoint.filter(|v| !v.is_empty()),
            access_token: self.access_token.filter(|v| !v.is_empty()),
        }
    }
}

/// Content API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Repository API root, e.g. `https://my-repo.cdn.prismic.io/api/v2`
    pub endpoint: String,
    pub access_token: Option<String>,
    /// Custom type holding the blog posts
    pub document_type: String,
    /// Posts per listing page
    pub page_size: u32,
    /// Page size used when enumerating every uid at build time
    pub enumerate_page_size: u32,
    pub timeout_secs: Option<u64>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            access_token: None,
            document_type: "posts".to_string(),
            page_size: 1,
            enumerate_page_size: 100,
            timeout_secs: None,
        }
    }
}

/// User-facing strings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelsConfig {
    pub load_more: String,
    pub loading: String,
    pub load_failed: String,
    pub retry: String,
    pub not_found: String,
    pub fetch_failed: String,
    pub unknown_date: String,
    pub reading_time_unit: String,
}

impl Default for LabelsConfig {
    fn default() -> Self {
        Self {
            load_more: "Carregar mais posts".to_string(),
            loading: "Carregando...".to_string(),
            load_failed: "Não foi possível carregar mais posts.".to_string(),
            retry: "Tentar novamente".to_string(),
            not_found: "Post não encontrado".to_string(),
            fetch_failed: "Não foi possível carregar este post.".to_string(),
            unknown_date: "Data desconhecida".to_string(),
            reading_time_unit: "min".to_string(),
        }
    }
}
