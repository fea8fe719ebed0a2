//! Fetch strategy: direct call, relay retry, built-in fallback.
//!
//! This module talks to the search API and never lets a network failure reach
//! the caller. Each run walks at most three tiers:
//!
//! 1. **Direct**: `GET` the search URL, cancelled after the configured timeout
//! 2. **Relay**: the same URL through a public relay (envelope or prefix style)
//! 3. **Fallback**: the built-in sample articles
//!
//! A tier is only consulted after the previous one failed. There are no
//! retries within a tier and no backoff.
//!
//! A direct call that succeeds with no results is an answer, not a failure:
//! the run ends there with an empty article list.

use crate::config::{NewsConfig, RelayConfig, RelayMode};
use crate::fallback::sample_articles;
use crate::models::{FetchOutcome, RelayEnvelope, Tier};
use crate::normalize::{has_results, normalize};
use crate::query::{relay_url, search_url};
use crate::utils::{looks_truncated, truncate_for_log};
use reqwest::Client;
use serde_json::Value;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// Ways a single tier can fail.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Transport-level error (DNS, connection, TLS, body read).
    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// Response with a non-2xx status.
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    /// The direct call was cancelled.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
    /// The body was not valid JSON.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// The relay answered, but not with a usable envelope.
    #[error("relay envelope unusable: {0}")]
    Envelope(String),
    /// The relay answered with a payload containing no results.
    #[error("no results")]
    NoResults,
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// Run the whole fetch strategy for `term` and return up to `config.limit` articles.
#[instrument(level = "info", skip(client, config), fields(limit = config.limit))]
pub async fn fetch_articles(client: &Client, config: &NewsConfig, term: &str) -> FetchOutcome {
    let t0 = Instant::now();
    let mut failures = Vec::new();

    let target = match search_url(config, term) {
        Ok(url) => Some(url),
        Err(e) => {
            warn!(error = %e, "Could not build search URL");
            failures.push((Tier::Direct, FetchError::from(e)));
            None
        }
    };

    if let Some(target) = &target {
        match fetch_direct(client, target, config.timeout()).await {
            Ok(payload) => {
                let articles = normalize(&payload, config.limit);
                info!(
                    tier = %Tier::Direct,
                    count = articles.len(),
                    elapsed_ms = t0.elapsed().as_millis() as u64,
                    "Fetched articles"
                );
                return FetchOutcome {
                    articles,
                    tier: Tier::Direct,
                    failures,
                };
            }
            Err(e) => {
                warn!(tier = %Tier::Direct, error = %e, "Direct fetch failed; trying relay");
                failures.push((Tier::Direct, e));
            }
        }

        if let Some(relay) = &config.relay {
            match fetch_relayed(client, relay, target).await {
                Ok(payload) => {
                    let articles = normalize(&payload, config.limit);
                    info!(
                        tier = %Tier::Relay,
                        count = articles.len(),
                        elapsed_ms = t0.elapsed().as_millis() as u64,
                        "Fetched articles"
                    );
                    return FetchOutcome {
                        articles,
                        tier: Tier::Relay,
                        failures,
                    };
                }
                Err(e) => {
                    warn!(tier = %Tier::Relay, error = %e, "Relay fetch failed; using sample articles");
                    failures.push((Tier::Relay, e));
                }
            }
        } else {
            debug!("Relay disabled; using sample articles");
        }
    }

    let mut articles = sample_articles();
    articles.truncate(config.limit);
    info!(
        tier = %Tier::Fallback,
        count = articles.len(),
        failures = failures.len(),
        elapsed_ms = t0.elapsed().as_millis() as u64,
        "Serving sample articles"
    );
    FetchOutcome {
        articles,
        tier: Tier::Fallback,
        failures,
    }
}

/// `GET` the search URL directly, giving up after `timeout`.
#[instrument(level = "debug", skip_all)]
pub async fn fetch_direct(client: &Client, target: &Url, timeout: Duration) -> Result<Value, FetchError> {
    match tokio::time::timeout(timeout, get_json(client, target.clone())).await {
        Ok(result) => result,
        Err(_) => Err(FetchError::Timeout(timeout)),
    }
}

/// `GET` the search URL through the relay and unwrap its response.
///
/// Fails with [`FetchError::NoResults`] when the unwrapped payload carries no
/// news results, so that the caller moves on to the sample articles.
#[instrument(level = "debug", skip_all, fields(mode = ?relay.mode))]
pub async fn fetch_relayed(client: &Client, relay: &RelayConfig, target: &Url) -> Result<Value, FetchError> {
    let url = relay_url(relay, target)?;

    let payload = match relay.mode {
        RelayMode::Prefix => get_json(client, url).await?,
        RelayMode::Envelope => {
            let envelope: RelayEnvelope = serde_json::from_value(get_json(client, url).await?)?;
            let contents = envelope
                .contents
                .ok_or_else(|| FetchError::Envelope("missing `contents`".to_string()))?;
            serde_json::from_str(&contents).map_err(|e| {
                FetchError::Envelope(format!(
                    "contents are not JSON ({}): {}",
                    e,
                    truncate_for_log(&contents, 200)
                ))
            })?
        }
    };

    if !has_results(&payload) {
        return Err(FetchError::NoResults);
    }
    Ok(payload)
}

async fn get_json(client: &Client, url: Url) -> Result<Value, FetchError> {
    let response = client
        .get(url)
        .header(reqwest::header::ACCEPT, "application/json")
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::HttpStatus(status.as_u16()));
    }

    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| {
        if looks_truncated(&e) {
            warn!(bytes = body.len(), "Response body ended mid-document");
        }
        debug!(body = %truncate_for_log(&body, 300), "Response body is not JSON");
        FetchError::Json(e)
    })
}
