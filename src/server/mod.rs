//! Blog server with revalidation and fallback rendering

mod revalidate;

pub use revalidate::{Lookup, PageCache};

use anyhow::{Context, Result};
use axum::{
    extract::{Path as UrlPath, Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::content::ContentError;
use crate::generator::{PageBuilder, PageStatus, RenderedPage, Route};
use crate::helpers::{is_safe_slug, next_posts_path};
use crate::pages::PostListView;
use crate::Blog;

/// Server state
pub struct ServerState {
    pages: PageBuilder,
    cache: PageCache,
    revalidate: Duration,
    fallback_timeout: Duration,
}

type SharedState = Arc<ServerState>;

impl ServerState {
    pub fn new(pages: PageBuilder, revalidate: Duration, fallback_timeout: Duration) -> Self {
        Self {
            pages,
            cache: PageCache::new(revalidate),
            revalidate,
            fallback_timeout,
        }
    }

    /// Keep at most `limit` not-found and failed routes in the cache
    pub fn with_missing_limit(mut self, limit: usize) -> Self {
        self.cache = PageCache::with_missing_limit(self.revalidate, limit);
        self
    }

    /// Render the post list and every known post into the cache
    pub async fn prerender(&self) -> Result<usize> {
        let home = self
            .pages
            .build(&Route::Home)
            .await
            .context("Failed to render the post list")?;
        self.cache.insert(Route::Home, home).await;

        let slugs = self
            .pages
            .source()
            .post_slugs()
            .await
            .context("Failed to enumerate posts")?;

        for slug in slugs {
            if !is_safe_slug(&slug) {
                tracing::warn!("Skipping post with unusable slug {:?}", slug);
                continue;
            }
            let route = Route::Post(slug);
            let page = self
                .pages
                .build(&route)
                .await
                .with_context(|| format!("Failed to render {}", route))?;
            self.cache.insert(route, page).await;
        }

        Ok(self.cache.len().await)
    }
}

/// Start the server
pub async fn start(blog: &Blog, ip: &str, port: u16, open: bool) -> Result<()> {
    let client = blog.content_client()?;
    let pages = PageBuilder::new(&blog.config, Arc::new(client))?;
    let state = Arc::new(ServerState::new(
        pages,
        Duration::from_secs(blog.config.revalidate),
        Duration::from_secs(blog.config.fallback_timeout),
    ));

    tracing::info!("Rendering pages...");
    let rendered = state.prerender().await?;
    tracing::info!("Rendered {} pages", rendered);

    let app = router(state, &blog.static_dir);

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    let url = format!("http://{}:{}", ip, port);
    println!("Server running at {}", url);
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

/// Routes of the blog; anything else is looked up in `static_dir`
pub fn router(state: Arc<ServerState>, static_dir: &Path) -> Router {
    Router::new()
        .route("/", get(home_handler))
        .route("/post/:slug", get(post_handler))
        .route("/api/posts/next", get(next_posts_handler))
        .fallback_service(ServeDir::new(static_dir))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn home_handler(State(state): State<SharedState>) -> Response {
    serve_route(state, Route::Home).await
}

async fn post_handler(State(state): State<SharedState>, UrlPath(slug): UrlPath<String>) -> Response {
    if !is_safe_slug(&slug) {
        return message_response(StatusCode::NOT_FOUND, state.pages.render_not_found());
    }
    serve_route(state, Route::Post(slug)).await
}

#[derive(Debug, Deserialize)]
struct NextPostsQuery {
    page: String,
}

/// Next page of the post list, with display-ready cards
async fn next_posts_handler(
    State(state): State<SharedState>,
    Query(query): Query<NextPostsQuery>,
) -> Response {
    match state.pages.source().next_posts(&query.page).await {
        Ok(page) => {
            let next = page.next_page.as_deref().map(next_posts_path);
            Json(PostListView::build(&page.results, next, state.pages.formatter())).into_response()
        }
        Err(e) => {
            tracing::warn!("Failed to load next posts: {}", e);
            let status = match e {
                ContentError::ForeignPage(_) | ContentError::Url(_) => StatusCode::BAD_REQUEST,
                _ => StatusCode::BAD_GATEWAY,
            };
            (status, Json(serde_json::json!({ "error": e.to_string() }))).into_response()
        }
    }
}

async fn serve_route(state: SharedState, route: Route) -> Response {
    match state.cache.lookup(&route).await {
        Lookup::Fresh(page) => page_response(&state, page),
        Lookup::Stale(page) => {
            tracing::debug!("Revalidating {}", route);
            spawn_render(state.clone(), route);
            page_response(&state, page)
        }
        Lookup::Claimed => {
            tracing::debug!("Rendering {} on demand", route);
            spawn_render(state.clone(), route);
            message_response(StatusCode::OK, state.pages.render_loading())
        }
        Lookup::Pending => message_response(StatusCode::OK, state.pages.render_loading()),
        Lookup::Failed => {
            message_response(StatusCode::SERVICE_UNAVAILABLE, state.pages.render_unavailable())
        }
    }
}

/// Render a route in the background, bounded by the fallback timeout
///
/// On-demand renders and revalidations of stale pages share the timeout. A
/// revalidation that runs out keeps the stale page and is retried by the
/// next request.
fn spawn_render(state: SharedState, route: Route) {
    tokio::spawn(async move {
        match tokio::time::timeout(state.fallback_timeout, state.pages.build(&route)).await {
            Ok(Ok(page)) => {
                tracing::info!("Rendered {}", route);
                state.cache.insert(route, page).await;
            }
            Ok(Err(e)) => {
                tracing::warn!("Failed to render {}: {:#}", route, e);
                state.cache.fail(&route).await;
            }
            Err(_) => {
                tracing::warn!(
                    "Rendering {} timed out after {:?}",
                    route,
                    state.fallback_timeout
                );
                state.cache.fail(&route).await;
            }
        }
    });
}

fn page_response(state: &ServerState, page: RenderedPage) -> Response {
    let status = match page.status {
        PageStatus::Ok => StatusCode::OK,
        PageStatus::NotFound => StatusCode::NOT_FOUND,
    };
    let cache_control = format!(
        "s-maxage={}, stale-while-revalidate",
        state.revalidate.as_secs()
    );
    (
        status,
        [(header::CACHE_CONTROL, cache_control)],
        Html(page.html),
    )
        .into_response()
}

/// Loading, not-found and unavailable pages are never cached downstream
fn message_response(status: StatusCode, html: Result<String>) -> Response {
    match html {
        Ok(html) => (
            status,
            [(header::CACHE_CONTROL, "no-store")],
            Html(html),
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Template error: {:#}", e);
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
