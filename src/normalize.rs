//! Extraction of article records from raw search payloads.

use crate::models::{Article, ArticleSource};
use serde_json::{Map, Value};

/// Return the first `limit` entries of `payload.news_results`.
///
/// A missing or non-array `news_results` yields an empty list. Only the first
/// `limit` entries are looked at; among those, entries that are not JSON
/// objects are dropped. Objects are read leniently, so one with missing or
/// oddly typed fields still produces an [`Article`].
pub fn normalize(payload: &Value, limit: usize) -> Vec<Article> {
    let Some(results) = payload.get("news_results").and_then(Value::as_array) else {
        return Vec::new();
    };

    results
        .iter()
        .take(limit)
        .filter_map(Value::as_object)
        .map(article_from_object)
        .collect()
}

/// Whether a payload carries at least one news result.
pub fn has_results(payload: &Value) -> bool {
    payload
        .get("news_results")
        .and_then(Value::as_array)
        .is_some_and(|results| results.iter().any(Value::is_object))
}

fn article_from_object(obj: &Map<String, Value>) -> Article {
    Article {
        title: text(obj, "title").unwrap_or_default(),
        snippet: text(obj, "snippet"),
        link: text(obj, "link").unwrap_or_default(),
        source: source(obj),
        date: text(obj, "date"),
        thumbnail: text(obj, "thumbnail"),
        thumbnail_small: text(obj, "thumbnail_small"),
    }
}

fn text(obj: &Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn source(obj: &Map<String, Value>) -> Option<ArticleSource> {
    match obj.get("source")? {
        Value::String(name) if !name.trim().is_empty() => Some(ArticleSource::Name(name.clone())),
        Value::Object(detail) => text(detail, "name").map(|name| ArticleSource::Detailed {
            name,
            icon: text(detail, "icon"),
        }),
        _ => None,
    }
}
