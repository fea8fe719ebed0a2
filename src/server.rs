//! HTTP service exposing the news proxy and rendered cards.
//!
//! # Routes
//!
//! | Route | Response |
//! |-------|----------|
//! | `GET /api/news?query=` | Upstream search JSON, or an error envelope |
//! | `GET /news?query=&limit=` | Rendered card container (HTML fragment) |
//! | `GET /` | Full rendered page |
//! | `GET /health` | `{"status":"ok"}` |
//!
//! `/api/news` is a thin pass-through that keeps the API key on the server.
//! Upstream errors are reported, not absorbed:
//!
//! - upstream non-2xx: same status, `{"error": ..., "status": <code>}`
//! - anything else: `500`, `{"error": "Server error", "message": ...}`
//!
//! The HTML routes run the full fetch strategy and always render something.

use crate::config::NewsConfig;
use crate::fetch::{FetchError, fetch_articles, fetch_direct};
use crate::query::search_url;
use crate::render::{render_container, render_page};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::error::Error;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info, instrument, warn};

/// Upper bound for the `limit` query parameter.
const MAX_LIMIT: usize = 20;

/// State shared by all handlers. Never mutated after startup.
#[derive(Debug)]
pub struct AppState {
    pub client: Client,
    pub config: NewsConfig,
}

#[derive(Debug, Default, Deserialize)]
pub struct NewsParams {
    pub query: Option<String>,
    pub limit: Option<usize>,
}

impl NewsParams {
    fn term<'a>(&'a self, config: &'a NewsConfig) -> &'a str {
        self.query
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .unwrap_or(&config.query)
    }

    fn limit(&self, config: &NewsConfig) -> usize {
        match self.limit {
            Some(0) | None => config.limit,
            Some(n) => n.min(MAX_LIMIT),
        }
    }
}

/// Build the axum Router with all endpoints.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(page))
        .route("/news", get(cards))
        .route("/api/news", get(proxy_news))
        .route("/health", get(health))
        .layer(cors)
        .with_state(state)
}

/// Serve until the process is stopped.
pub async fn start(bind: SocketAddr, state: Arc<AppState>) -> Result<(), Box<dyn Error>> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(bind).await?;
    info!("News service listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

#[instrument(level = "info", skip(state))]
async fn proxy_news(State(state): State<Arc<AppState>>, Query(params): Query<NewsParams>) -> Response {
    let term = params.term(&state.config);

    let target = match search_url(&state.config, term) {
        Ok(url) => url,
        Err(e) => return server_error(&FetchError::from(e)),
    };

    match fetch_direct(&state.client, &target, state.config.timeout()).await {
        Ok(body) => (StatusCode::OK, Json(body)).into_response(),
        Err(FetchError::HttpStatus(code)) => {
            warn!(status = code, "Upstream search returned an error");
            let status = StatusCode::from_u16(code).unwrap_or(StatusCode::BAD_GATEWAY);
            (
                status,
                Json(json!({
                    "error": "Failed to fetch news from upstream",
                    "status": code,
                })),
            )
                .into_response()
        }
        Err(e) => server_error(&e),
    }
}

fn server_error(e: &FetchError) -> Response {
    error!(error = %e, "Proxy request failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "error": "Server error",
            "message": e.to_string(),
        })),
    )
        .into_response()
}

#[instrument(level = "info", skip(state))]
async fn cards(State(state): State<Arc<AppState>>, Query(params): Query<NewsParams>) -> Html<String> {
    let (term, config) = run_config(&state, &params);
    let outcome = fetch_articles(&state.client, &config, &term).await;
    Html(render_container(&outcome.articles, &config.placeholder_image, outcome.tier))
}

#[instrument(level = "info", skip(state))]
async fn page(State(state): State<Arc<AppState>>, Query(params): Query<NewsParams>) -> Html<String> {
    let (term, config) = run_config(&state, &params);
    let outcome = fetch_articles(&state.client, &config, &term).await;
    let container = render_container(&outcome.articles, &config.placeholder_image, outcome.tier);
    Html(render_page(&term, &container))
}

fn run_config(state: &AppState, params: &NewsParams) -> (String, NewsConfig) {
    let term = params.term(&state.config).to_string();
    let config = NewsConfig {
        limit: params.limit(&state.config),
        ..state.config.clone()
    };
    (term, config)
}
