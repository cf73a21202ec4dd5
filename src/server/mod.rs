//! Development server: static files, "load more" and on-demand post pages

mod fallback;

use anyhow::Result;
use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::cms::{ContentApi, Cursor};
use crate::config::SiteConfig;
use crate::content::fetch_detail;
use crate::error::ApiError;
use crate::generator::{post_output_path, write_post_page, Pages};
use crate::helpers::is_safe_segment;
use crate::listing::{Listing, ListingState, LoadMore};
use crate::Blog;

pub use fallback::{FallbackRegistry, Lookup, Resolution};

/// Server state
pub struct ServerState {
    config: SiteConfig,
    public_dir: PathBuf,
    api: Arc<dyn ContentApi>,
    pages: Pages,
    fallbacks: FallbackRegistry,
}

impl ServerState {
    pub fn new(blog: &Blog, api: Arc<dyn ContentApi>) -> Result<Self> {
        Ok(Self {
            config: blog.config.clone(),
            public_dir: blog.public_dir.clone(),
            api,
            pages: Pages::new(&blog.config)?,
            fallbacks: FallbackRegistry::new(),
        })
    }
}

/// Build the router over a prepared state
pub fn router(state: Arc<ServerState>) -> Router {
    let not_found = ServeFile::new(state.public_dir.join("404.html"));
    let static_files = ServeDir::new(&state.public_dir)
        .append_index_html_on_directories(true)
        .not_found_service(not_found);

    Router::new()
        .route("/more", get(more_handler))
        .route("/post/:uid", get(post_handler))
        .route("/post/:uid/", get(post_handler))
        .fallback_service(static_files)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the development server
pub async fn start(
    blog: &Blog,
    api: Arc<dyn ContentApi>,
    ip: &str,
    port: u16,
    open: bool,
) -> Result<()> {
    let state = Arc::new(ServerState::new(blog, api)?);
    let app = router(state);

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    let url = format!("http://{}:{}", ip, port);
    println!("Server running at {}", url);
    if blog.config.fallback {
        println!("Posts missing from the build are rendered on first request.");
    }
    println!("Press Ctrl+C to stop.");

    // Open browser if requested
    if open {
        if let Err(e) = open_browser(&url) {
            tracing::warn!("Failed to open browser: {}", e);
        }
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[derive(Debug, Deserialize)]
pub(crate) struct MoreQuery {
    cursor: String,
}

/// Next listing page as an HTML fragment
pub(crate) async fn more_handler(
    State(state): State<Arc<ServerState>>,
    Query(query): Query<MoreQuery>,
) -> Response {
    let cursor = match Cursor::parse(&query.cursor) {
        Ok(cursor) => cursor,
        Err(e) => return (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
    };

    let mut listing = Listing::new(state.api.as_ref(), ListingState::resume(cursor.clone()));
    match listing.load_more().await {
        LoadMore::Appended { .. } | LoadMore::Exhausted => {
            let listing = listing.into_state();
            html_response(
                StatusCode::OK,
                state
                    .pages
                    .more(&listing.items, listing.next_cursor.as_ref()),
            )
        }
        LoadMore::Failed(e @ ApiError::ForeignCursor { .. }) => {
            (StatusCode::BAD_REQUEST, e.to_string()).into_response()
        }
        LoadMore::Failed(_) => html_response(StatusCode::BAD_GATEWAY, state.pages.load_failed(&cursor)),
    }
}

/// Pre-rendered post page, or on-demand rendering when enabled
pub(crate) async fn post_handler(
    State(state): State<Arc<ServerState>>,
    Path(uid): Path<String>,
) -> Response {
    if !is_safe_segment(&uid) {
        return not_found(&state);
    }

    if let Ok(path) = post_output_path(&state.public_dir, &uid) {
        match tokio::fs::read_to_string(&path).await {
            Ok(html) => return Html(html).into_response(),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!("Failed to read {:?}: {}", path, e),
        }
    }

    if !state.config.fallback {
        return not_found(&state);
    }

    match state.fallbacks.lookup(&uid).await {
        Lookup::Started => {
            tracing::info!("Rendering post '{}' on demand", uid);
            tokio::spawn(resolve_fallback(state.clone(), uid));
            fallback_page(&state)
        }
        Lookup::Pending => fallback_page(&state),
        Lookup::NotFound => not_found(&state),
        Lookup::Failed(message) => {
            tracing::debug!("Reporting failed fetch of '{}': {}", uid, message);
            html_response(StatusCode::BAD_GATEWAY, state.pages.fetch_failed(&uid))
        }
    }
}

/// Fetch and render one post in the background
async fn resolve_fallback(state: Arc<ServerState>, uid: String) {
    let resolution =
        match fetch_detail(state.api.as_ref(), &state.config.api.document_type, &uid).await {
            Ok(post) => match state
                .pages
                .post(&post)
                .and_then(|html| write_post_page(&state.public_dir, &uid, &html))
            {
                Ok(path) => {
                    tracing::info!("Rendered {:?}", path);
                    Resolution::Rendered
                }
                Err(e) => {
                    tracing::error!("Failed to render post '{}': {}", uid, e);
                    Resolution::Failed(e.to_string())
                }
            },
            Err(e) if e.is_not_found() => {
                tracing::info!("Post '{}' not found", uid);
                Resolution::NotFound
            }
            Err(e) => {
                tracing::warn!("Failed to fetch post '{}': {}", uid, e);
                Resolution::Failed(e.to_string())
            }
        };

    state.fallbacks.resolve(&uid, resolution).await;
}

fn fallback_page(state: &ServerState) -> Response {
    let mut response = html_response(StatusCode::OK, state.pages.fallback());
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, header::HeaderValue::from_static("no-store"));
    response
}

fn not_found(state: &ServerState) -> Response {
    html_response(StatusCode::NOT_FOUND, state.pages.not_found())
}

fn html_response(status: StatusCode, rendered: Result<String>) -> Response {
    match rendered {
        Ok(html) => (status, Html(html)).into_response(),
        Err(e) => {
            tracing::error!("Failed to render page: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Server error").into_response()
        }
    }
}

/// Open a URL in the default browser
fn open_browser(url: &str) -> Result<()> {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open").arg(url).spawn()?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open").arg(url).spawn()?;
    }

    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/c", "start", url])
            .spawn()?;
    }

    Ok(())
}
