//! # News Cards
//!
//! Fetches news articles for a single search term and renders them as HTML
//! cards, degrading gracefully when the search API is unreachable.
//!
//! ## Features
//!
//! - Queries a news search API (classic `tbm=nws` search or the `google_news` engine)
//! - Retries through a public relay when the direct call fails or times out
//! - Falls back to built-in sample articles when every network tier fails
//! - Upgrades thumbnails from known CDNs and carries an ordered image fallback chain
//! - Serves the search proxy endpoint and rendered pages over HTTP
//!
//! ## Usage
//!
//! ```sh
//! news_cards --api-key KEY render -o news.html
//! news_cards --api-key KEY serve --bind 0.0.0.0:8080
//! ```
//!
//! ## Architecture
//!
//! Each run is one linear pass:
//! 1. **Query**: Build the search URL from the configured term and key
//! 2. **Fetch**: Direct call → relay → sample articles
//! 3. **Normalize**: Keep the first N `news_results`
//! 4. **Render**: Resolve thumbnails and write one card per article

use clap::Parser;
use futures::stream::{self, StreamExt};
use reqwest::Client;
use std::error::Error;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod config;
mod fallback;
mod fetch;
mod models;
mod normalize;
mod outputs;
mod query;
mod render;
mod server;
mod thumbnail;
mod utils;

use cli::{Cli, Command};
use config::NewsConfig;
use fetch::fetch_articles;
use outputs::{html, json};
use render::{image_chains, render_container_with_images, render_page};
use server::AppState;
use thumbnail::{HttpImageProbe, first_loadable};
use utils::ensure_writable_dir;

/// Image chains probed at once when `--verify-images` is set.
const PROBE_CONCURRENCY: usize = 4;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    info!("news_cards starting up");

    let args = Cli::parse();
    debug!(command = ?args.command, "Parsed CLI arguments");

    let config = match NewsConfig::from_cli(&args) {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Invalid configuration");
            return Err(e.into());
        }
    };

    let client = Client::builder()
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()?;

    match args.command {
        Command::Render {
            output,
            json_output,
            verify_images,
        } => {
            run_render(
                &client,
                &config,
                output.as_deref(),
                json_output.as_deref(),
                verify_images,
            )
            .await
        }
        Command::Serve { bind } => server::start(bind, Arc::new(AppState { client, config })).await,
    }
}

/// Run the pipeline once and write its outputs.
#[instrument(level = "info", skip(client, config))]
async fn run_render(
    client: &Client,
    config: &NewsConfig,
    output: Option<&str>,
    json_output: Option<&str>,
    verify_images: bool,
) -> Result<(), Box<dyn Error>> {
    let start_time = Instant::now();

    // Early check: ensure JSON output dir is writable
    if let Some(dir) = json_output {
        if let Err(e) = ensure_writable_dir(dir).await {
            error!(
                path = %dir,
                error = %e,
                "JSON output directory is not writable (fix perms or choose a different path)"
            );
            return Err(e);
        }
    }

    let outcome = fetch_articles(client, config, &config.query).await;
    if outcome.is_degraded() {
        warn!(
            tier = %outcome.tier,
            failures = outcome.failures.len(),
            "Rendering degraded results"
        );
    }

    let mut chains = image_chains(&outcome.articles, &config.placeholder_image);
    if verify_images {
        let probe = HttpImageProbe::new(client.clone());
        chains = stream::iter(chains)
            .map(|chain| {
                let probe = &probe;
                async move {
                    match first_loadable(probe, &chain).await {
                        Some(url) => {
                            let pos = chain.iter().position(|c| *c == url).unwrap_or(0);
                            chain[pos..].to_vec()
                        }
                        None => chain,
                    }
                }
            })
            .buffered(PROBE_CONCURRENCY)
            .collect()
            .await;
        info!(cards = chains.len(), "Verified card images");
    }

    let container = render_container_with_images(&outcome.articles, &chains, outcome.tier);
    let page = render_page(&config.query, &container);
    html::write_page(&page, output).await?;

    if let Some(dir) = json_output {
        let snapshot = json::Snapshot::new(&config.query, &outcome);
        if let Err(e) = json::write_snapshot(&snapshot, dir).await {
            error!(error = %e, "Failed to write JSON snapshot");
        }
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        tier = %outcome.tier,
        cards = outcome.articles.len(),
        "Render complete"
    );
    Ok(())
}
