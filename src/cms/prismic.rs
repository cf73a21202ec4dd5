//! Prismic REST API v2 client

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tokio::sync::OnceCell;
use url::Url;

use super::{ContentApi, Cursor, RawDocument, RawPage, TypeQuery};
use crate::config::ApiConfig;
use crate::error::{ApiError, ApiResult, ConfigError};

/// Repository metadata returned by the API root
#[derive(Debug, Deserialize)]
struct ApiInfo {
    #[serde(default)]
    refs: Vec<ApiRef>,
}

#[derive(Debug, Deserialize)]
struct ApiRef {
    #[serde(rename = "ref")]
    reference: String,
    #[serde(rename = "isMasterRef", default)]
    is_master: bool,
}

/// HTTP client for a Prismic repository
pub struct PrismicClient {
    http: reqwest::Client,
    endpoint: Url,
    access_token: Option<String>,
    master_ref: OnceCell<String>,
}

impl PrismicClient {
    /// Create a client from the `api` section of the site config
    pub fn new(config: &ApiConfig) -> anyhow::Result<Self> {
        let endpoint = parse_endpoint(&config.endpoint)?;

        let mut builder = reqwest::Client::builder().user_agent(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION")
        ));
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            http: builder.build()?,
            endpoint,
            access_token: config.access_token.clone().filter(|t| !t.is_empty()),
            master_ref: OnceCell::new(),
        })
    }

    /// Ref of the currently published content, fetched once per client
    async fn master_ref(&self) -> ApiResult<&str> {
        let reference = self
            .master_ref
            .get_or_try_init(|| async {
                let mut url = self.endpoint.clone();
                if let Some(token) = &self.access_token {
                    url.query_pairs_mut().append_pair("access_token", token);
                }
                let info: ApiInfo = self.get_json(url).await?;
                let master = info
                    .refs
                    .into_iter()
                    .find(|r| r.is_master)
                    .ok_or(ApiError::NoMasterRef)?;
                tracing::debug!("Using master ref {}", master.reference);
                Ok::<_, ApiError>(master.reference)
            })
            .await?;
        Ok(reference.as_str())
    }

    /// Build a `documents/search` URL
    fn search_url(
        &self,
        reference: &str,
        predicate: &str,
        fetch: &[String],
        page_size: Option<u32>,
    ) -> Url {
        let mut url = self.endpoint.clone();
        // Always succeeds: the endpoint was checked to be an http(s) URL
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend(["documents", "search"]);
        }
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("ref", reference);
            query.append_pair("q", predicate);
            if !fetch.is_empty() {
                query.append_pair("fetch", &fetch.join(","));
            }
            if let Some(size) = page_size {
                query.append_pair("pageSize", &size.to_string());
            }
            if let Some(token) = &self.access_token {
                query.append_pair("access_token", token);
            }
        }
        url
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> ApiResult<T> {
        tracing::debug!("GET {}", redacted(&url));
        let response = self.http.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                url: redacted(&url),
            });
        }
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl ContentApi for PrismicClient {
    async fn query_by_type(&self, query: &TypeQuery) -> ApiResult<RawPage> {
        let reference = self.master_ref().await?;
        let fetch: Vec<String> = query
            .fields
            .iter()
            .map(|field| format!("{}.{}", query.document_type, field))
            .collect();
        let url = self.search_url(
            reference,
            &type_predicate(&query.document_type),
            &fetch,
            query.page_size,
        );
        self.get_json(url).await
    }

    async fn get_by_uid(&self, document_type: &str, uid: &str) -> ApiResult<RawDocument> {
        let reference = self.master_ref().await?;
        let url = self.search_url(reference, &uid_predicate(document_type, uid), &[], Some(1));
        let page: RawPage = self.get_json(url).await?;
        page.results
            .into_iter()
            .next()
            .ok_or_else(|| ApiError::NotFound {
                document_type: document_type.to_string(),
                uid: uid.to_string(),
            })
    }

    async fn fetch_page(&self, cursor: &Cursor) -> ApiResult<RawPage> {
        let expected = self.endpoint.host_str().unwrap_or_default();
        if cursor.host() != expected {
            return Err(ApiError::ForeignCursor {
                host: cursor.host().to_string(),
                expected: expected.to_string(),
            });
        }
        self.get_json(cursor.url().clone()).await
    }
}

fn parse_endpoint(endpoint: &str) -> Result<Url, ConfigError> {
    let invalid = |reason: &str| ConfigError::InvalidEndpoint {
        endpoint: endpoint.to_string(),
        reason: reason.to_string(),
    };

    if endpoint.trim().is_empty() {
        return Err(invalid(
            "not set (api.endpoint in _config.yml or PRISMIC_API_ENDPOINT)",
        ));
    }
    let url = Url::parse(endpoint.trim()).map_err(|e| invalid(&e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(invalid("expected an http(s) URL"));
    }
    Ok(url)
}

/// `[[at(document.type,"posts")]]`
fn type_predicate(document_type: &str) -> String {
    format!(
        r#"[[at(document.type,"{}")]]"#,
        escape_literal(document_type)
    )
}

/// `[[at(my.posts.uid,"some-uid")]]`
fn uid_predicate(document_type: &str, uid: &str) -> String {
    format!(
        r#"[[at(my.{}.uid,"{}")]]"#,
        document_type,
        escape_literal(uid)
    )
}

fn escape_literal(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

/// URL for logs and errors, without the access token
fn redacted(url: &Url) -> String {
    let mut clean = url.clone();
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| key != "access_token")
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    if pairs.is_empty() {
        clean.set_query(None);
    } else {
        clean.query_pairs_mut().clear().extend_pairs(pairs);
    }
    clean.to_string()
}
