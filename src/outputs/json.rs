//! JSON snapshot of a pipeline run.
//!
//! Snapshots record what was rendered and where it came from, so a page can
//! be audited after the fact (e.g. to spot runs that fell back to samples).
//!
//! # Output Structure
//!
//! Files are organized by date with edition names:
//! ```text
//! json_output_dir/
//! └── 2025-05-06/
//!     ├── morning.json
//!     ├── afternoon.json
//!     └── evening.json
//! ```
//!
//! A later run in the same edition overwrites the earlier snapshot.

use crate::models::{Article, FetchOutcome, Tier};
use crate::utils::{ensure_writable_dir, time_of_day};
use chrono::Local;
use serde::Serialize;
use std::error::Error;
use std::path::PathBuf;
use tokio::fs;
use tracing::{error, info, instrument};

/// What gets written to disk for one run.
#[derive(Debug, Serialize)]
pub struct Snapshot<'a> {
    /// The date of the run in `YYYY-MM-DD` format.
    pub local_date: String,
    /// The time of day category: "morning", "afternoon", or "evening".
    pub time_of_day: String,
    /// The exact local time of the run.
    pub local_time: String,
    pub query: &'a str,
    pub tier: Tier,
    /// Tier failures absorbed during the run, as display strings.
    pub failures: Vec<String>,
    pub articles: &'a [Article],
}

impl<'a> Snapshot<'a> {
    pub fn new(query: &'a str, outcome: &'a FetchOutcome) -> Self {
        let now = Local::now();
        Self {
            local_date: now.date_naive().to_string(),
            time_of_day: time_of_day(),
            local_time: now.time().to_string(),
            query,
            tier: outcome.tier,
            failures: outcome
                .failures
                .iter()
                .map(|(tier, e)| format!("{}: {}", tier, e))
                .collect(),
            articles: &outcome.articles,
        }
    }
}

/// Write a [`Snapshot`] to `{json_output_dir}/{date}/{time_of_day}.json`.
///
/// Returns the path that was written.
#[instrument(level = "info", skip_all, fields(json_output_dir = %json_output_dir))]
pub async fn write_snapshot(
    snapshot: &Snapshot<'_>,
    json_output_dir: &str,
) -> Result<PathBuf, Box<dyn Error>> {
    let json = serde_json::to_string_pretty(snapshot)?;

    let full_json_dir = format!("{}/{}", json_output_dir.trim_end_matches('/'), snapshot.local_date);
    info!(%full_json_dir, "Ensuring JSON directory exists");
    if let Err(e) = ensure_writable_dir(&full_json_dir).await {
        error!(%full_json_dir, error = %e, "Failed to prepare JSON dir");
        return Err(e);
    }

    let output_json_filename = PathBuf::from(&full_json_dir).join(format!("{}.json", snapshot.time_of_day));
    fs::write(&output_json_filename, json).await?;
    info!(path = %output_json_filename.display(), articles = snapshot.articles.len(), "Wrote JSON snapshot");

    Ok(output_json_filename)
}
