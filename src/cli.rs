//! Command-line interface definitions for News Cards.
//!
//! This module defines the CLI arguments and subcommands using the `clap` crate.
//! Pipeline options are global and can also be provided via environment
//! variables or a YAML config file (see [`crate::config`]).

use crate::config::RelayMode;
use clap::{Parser, Subcommand};
use std::net::SocketAddr;

/// Command-line arguments for the News Cards application.
///
/// # Examples
///
/// ```sh
/// # Render the default query to stdout
/// news_cards --api-key YOUR_KEY render
///
/// # Render to a file and keep a JSON snapshot of the articles
/// news_cards --query "grid storage" render -o news.html --json-output ./json
///
/// # Serve the proxy endpoint and rendered pages
/// SERPAPI_API_KEY=YOUR_KEY news_cards serve --bind 0.0.0.0:8080
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to a YAML config file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Search API key
    #[arg(long, env = "SERPAPI_API_KEY", global = true, hide_env_values = true)]
    pub api_key: Option<String>,

    /// Search term
    #[arg(short, long, global = true)]
    pub query: Option<String>,

    /// Maximum number of articles to render
    #[arg(short, long, global = true)]
    pub limit: Option<usize>,

    /// Search API endpoint
    #[arg(long, global = true)]
    pub endpoint: Option<String>,

    /// Use the google_news engine instead of the classic news search
    #[arg(long, global = true)]
    pub google_news: bool,

    /// Relay base URL used when the direct call fails
    #[arg(long, env = "NEWS_RELAY_URL", global = true)]
    pub relay_url: Option<String>,

    /// How the relay wraps requests and responses
    #[arg(long, value_enum, global = true)]
    pub relay_mode: Option<RelayMode>,

    /// Skip the relay and go straight to the sample articles on failure
    #[arg(long, global = true, conflicts_with_all = ["relay_url", "relay_mode"])]
    pub no_relay: bool,

    /// Timeout for the direct call, in seconds
    #[arg(long, global = true)]
    pub timeout_secs: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the pipeline once and write the rendered page
    Render {
        /// Output HTML file (stdout when omitted)
        #[arg(short, long)]
        output: Option<String>,

        /// Output directory for a JSON snapshot of the rendered articles
        #[arg(short, long)]
        json_output: Option<String>,

        /// Probe each card's image candidates and put the first loadable one first
        #[arg(long)]
        verify_images: bool,
    },
    /// Serve the news proxy endpoint and rendered pages over HTTP
    Serve {
        /// Address to listen on
        #[arg(short, long, default_value = "127.0.0.1:3000")]
        bind: SocketAddr,
    },
}
