//! Utility functions for string handling, dates, and file system operations.
//!
//! This module provides helper functions used throughout the application:
//! - Time classification for snapshot naming
//! - String truncation for logging
//! - JSON error detection for bodies that were cut off in transit
//! - HTML escaping for rendered markup
//! - Best-effort parsing of the free-form dates the search API returns
//! - File system validation for output directories

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use std::error::Error;
use std::fs as stdfs;
use tokio::fs;
use tracing::{info, instrument};

/// Classify a time of day into morning, afternoon, or evening.
///
/// The time boundaries are:
/// - **Morning**: 00:00 - 08:00
/// - **Afternoon**: 08:00 - 16:00
/// - **Evening**: 16:00 - 24:00
pub fn classify_time_of_day(tod: NaiveTime) -> &'static str {
    if tod.hour() < 8 {
        "morning"
    } else if tod.hour() < 16 {
        "afternoon"
    } else {
        "evening"
    }
}

/// The current local time of day, classified by [`classify_time_of_day`].
pub fn time_of_day() -> String {
    let tod = Local::now().time();
    let which = classify_time_of_day(tod);
    tracing::debug!(%tod, %which, "Computed time_of_day");
    which.to_string()
}

/// Truncate a string for logging purposes.
///
/// Long strings are truncated to at most `max` bytes (on a character
/// boundary) with an ellipsis and byte count indicator appended.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log("a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…(+{} bytes)", &s[..end], s.len() - end)
}

/// Detect if a serde_json error indicates truncated/incomplete JSON.
///
/// Relays occasionally cut long bodies short; the resulting parse error is
/// an EOF error rather than a syntax error.
pub fn looks_truncated(e: &serde_json::Error) -> bool {
    use serde_json::error::Category;
    matches!(e.classify(), Category::Eof)
}

/// Escape text for use inside HTML element content or a quoted attribute.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Parse a publication date as returned by the search API.
///
/// Accepted shapes:
/// - RFC 3339 (`2025-01-05T08:00:00Z`)
/// - RFC 2822 (`Sun, 05 Jan 2025 08:00:00 +0000`)
/// - google_news style (`01/05/2025, 08:00 AM, +0000 UTC`)
/// - ISO date (`2025-01-05`)
/// - US short/long month (`Jan 5, 2025`, `January 5, 2025`)
///
/// Relative dates such as `"2 hours ago"` are not parsed.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(dt.date_naive());
    }
    // google_news dates carry a trailing " UTC" after the offset
    let without_zone = raw.trim_end_matches(" UTC");
    if let Ok(dt) = DateTime::parse_from_str(without_zone, "%m/%d/%Y, %I:%M %p, %z") {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.date());
    }
    ["%Y-%m-%d", "%b %d, %Y", "%B %d, %Y", "%m/%d/%Y"]
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
}

/// Ensure a directory exists and is writable.
///
/// This function creates the directory if it doesn't exist, then performs
/// a write test by creating and immediately deleting a probe file.
#[instrument(level = "info", skip_all, fields(path = %path))]
pub async fn ensure_writable_dir(path: &str) -> Result<(), Box<dyn Error>> {
    if let Err(e) = fs::create_dir_all(path).await {
        return Err(Box::new(e));
    }
    // Try a small sync write using std fs (simpler error surface)
    let probe_path = format!("{}/..__probe_write__", path.trim_end_matches('/'));
    match stdfs::File::create(&probe_path) {
        Ok(_) => {
            let _ = stdfs::remove_file(&probe_path);
            info!("Output directory is writable");
            Ok(())
        }
        Err(e) => Err(Box::new(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_time_of_day() {
        let at = |h, m| NaiveTime::from_hms_opt(h, m, 0).unwrap();
        assert_eq!(classify_time_of_day(at(0, 0)), "morning");
        assert_eq!(classify_time_of_day(at(7, 59)), "morning");
        assert_eq!(classify_time_of_day(at(8, 0)), "afternoon");
        assert_eq!(classify_time_of_day(at(15, 59)), "afternoon");
        assert_eq!(classify_time_of_day(at(16, 0)), "evening");
        assert_eq!(classify_time_of_day(at(23, 59)), "evening");
    }

    #[test]
    fn test_truncate_for_log_short_string() {
        let s = "Hello, world!";
        assert_eq!(truncate_for_log(s, 100), "Hello, world!");
    }

    #[test]
    fn test_truncate_for_log_long_string() {
        let s = "a".repeat(500);
        let result = truncate_for_log(&s, 100);
        assert!(result.starts_with(&"a".repeat(100)));
        assert!(result.contains("…(+400 bytes)"));
    }

    #[test]
    fn test_truncate_for_log_multibyte_boundary() {
        let s = "ééééé";
        let result = truncate_for_log(s, 3);
        assert!(result.starts_with('é'));
        assert!(result.contains("…(+8 bytes)"));
    }

    #[test]
    fn test_looks_truncated() {
        let json_eof = r#"{"field": "value"#;
        let err = serde_json::from_str::<serde_json::Value>(json_eof).unwrap_err();
        assert!(looks_truncated(&err));

        let json_syntax = r#"{"field" "value"}"#;
        let err = serde_json::from_str::<serde_json::Value>(json_syntax).unwrap_err();
        assert!(!looks_truncated(&err));
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<script>alert("x & 'y'")</script>"#),
            "&lt;script&gt;alert(&quot;x &amp; &#39;y&#39;&quot;)&lt;/script&gt;"
        );
        assert_eq!(escape_html("plain"), "plain");
    }

    #[test]
    fn test_parse_date_formats() {
        let jan5 = NaiveDate::from_ymd_opt(2025, 1, 5).unwrap();
        assert_eq!(parse_date("2025-01-05T08:00:00Z"), Some(jan5));
        assert_eq!(parse_date("Sun, 05 Jan 2025 08:00:00 +0000"), Some(jan5));
        assert_eq!(parse_date("01/05/2025, 08:00 AM, +0000 UTC"), Some(jan5));
        assert_eq!(parse_date("2025-01-05"), Some(jan5));
        assert_eq!(parse_date("2025-01-05 13:45:00"), Some(jan5));
        assert_eq!(parse_date("Jan 5, 2025"), Some(jan5));
        assert_eq!(parse_date("January 5, 2025"), Some(jan5));
        assert_eq!(parse_date("01/05/2025"), Some(jan5));
    }

    #[test]
    fn test_parse_date_rejects_relative_and_garbage() {
        assert_eq!(parse_date("2 hours ago"), None);
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("yesterday-ish"), None);
        assert_eq!(parse_date("2025-13-45"), None);
    }

    #[tokio::test]
    async fn test_ensure_writable_dir_creates_nested() {
        let tmp = tempfile::tempdir().unwrap();
        let nested = tmp.path().join("a/b/c");
        let nested = nested.to_str().unwrap();

        ensure_writable_dir(nested).await.unwrap();
        assert!(std::path::Path::new(nested).is_dir());
    }
}
