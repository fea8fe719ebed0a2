//! Data models for search results and pipeline outcomes.
//!
//! This module defines the core data structures used throughout the application:
//! - [`Article`]: A single news result as returned by the search API
//! - [`ArticleSource`]: The publisher field, which differs between API flavours
//! - [`RelayEnvelope`]: The wrapper returned by envelope-style relays
//! - [`FetchOutcome`]: The articles produced by one pipeline run and how they were obtained
//!
//! Articles are built from raw payloads by [`crate::normalize`], which reads
//! every field leniently. They are only ever serialized (into snapshots).

use crate::fetch::FetchError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A news article as returned by the search API or the built-in sample set.
///
/// Articles have no identity beyond their fields. They are rebuilt on every
/// fetch and discarded after rendering.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Article {
    /// The headline.
    pub title: String,
    /// A short excerpt of the article body.
    pub snippet: Option<String>,
    /// The outbound URL of the full article.
    pub link: String,
    /// The publisher.
    pub source: Option<ArticleSource>,
    /// Free-form publication date (e.g. `"2 hours ago"`, `"Jan 5, 2025"`).
    pub date: Option<String>,
    /// The primary thumbnail URL.
    pub thumbnail: Option<String>,
    /// A smaller thumbnail, tried when the primary one fails to load.
    pub thumbnail_small: Option<String>,
}

/// The publisher of an article.
///
/// The classic news search returns a bare string; the `google_news` engine
/// returns an object with a `name` and an optional icon.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ArticleSource {
    Name(String),
    Detailed {
        name: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        icon: Option<String>,
    },
}

impl ArticleSource {
    pub fn name(&self) -> &str {
        match self {
            ArticleSource::Name(name) => name,
            ArticleSource::Detailed { name, .. } => name,
        }
    }
}

impl Article {
    /// The publisher name, if one was supplied and is not blank.
    pub fn source_name(&self) -> Option<&str> {
        self.source
            .as_ref()
            .map(ArticleSource::name)
            .filter(|name| !name.trim().is_empty())
    }

    /// Extract the registrable domain of the article link.
    ///
    /// For example: `"https://www.reuters.com/world/x"` -> `"reuters.com"`,
    /// `"https://www.bbc.co.uk/news"` -> `"bbc.co.uk"`.
    /// Used to look up a publisher logo when no thumbnail loads.
    ///
    /// Country-code second-level suffixes (`co.uk`, `com.au`, ...) are
    /// recognised by shape only; there is no public suffix list.
    pub fn domain(&self) -> Option<String> {
        let parsed = url::Url::parse(&self.link).ok()?;
        let host = parsed.host_str()?;
        let parts: Vec<&str> = host.split('.').filter(|p| !p.is_empty()).collect();
        if parts.len() < 2 {
            return None;
        }
        let keep = if parts.len() >= 3 && is_second_level_suffix(&parts[parts.len() - 2..]) {
            3
        } else {
            2
        };
        Some(parts[parts.len() - keep..].join("."))
    }
}

const SECOND_LEVEL_LABELS: [&str; 9] = ["co", "com", "net", "org", "gov", "ac", "edu", "or", "ne"];

/// `[label, tld]` pairs such as `co.uk` or `com.au`.
fn is_second_level_suffix(tail: &[&str]) -> bool {
    match tail {
        [label, tld] => tld.len() == 2 && SECOND_LEVEL_LABELS.contains(label),
        _ => false,
    }
}

/// The body returned by an envelope-style relay.
///
/// The relay fetches the target URL and hands back its body as a string in
/// `contents`, which must itself be parsed as JSON.
#[derive(Debug, Deserialize)]
pub struct RelayEnvelope {
    pub contents: Option<String>,
}

/// Which tier of the fetch strategy produced the articles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Direct,
    Relay,
    Fallback,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Tier::Direct => "direct",
            Tier::Relay => "relay",
            Tier::Fallback => "fallback",
        };
        f.write_str(label)
    }
}

/// The result of one pipeline run.
///
/// Failures of the network tiers are never returned as errors. They are
/// recorded here, in the order they happened, alongside the articles that
/// were eventually produced.
#[derive(Debug)]
pub struct FetchOutcome {
    pub articles: Vec<Article>,
    pub tier: Tier,
    pub failures: Vec<(Tier, FetchError)>,
}

impl FetchOutcome {
    pub fn is_degraded(&self) -> bool {
        self.tier != Tier::Direct
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_blank_source_is_ignored() {
        let article = Article {
            source: Some(ArticleSource::Name("  ".to_string())),
            ..Article::default()
        };
        assert_eq!(article.source_name(), None);
    }

    #[test]
    fn test_domain_strips_subdomains() {
        let article = Article {
            link: "https://www.reuters.com/world/story".to_string(),
            ..Article::default()
        };
        assert_eq!(article.domain(), Some("reuters.com".to_string()));
    }

    #[test]
    fn test_domain_keeps_country_second_level() {
        let domain = |link: &str| {
            Article {
                link: link.to_string(),
                ..Article::default()
            }
            .domain()
        };
        assert_eq!(domain("https://www.bbc.co.uk/news/x"), Some("bbc.co.uk".to_string()));
        assert_eq!(domain("https://www.abc.net.au/news"), Some("abc.net.au".to_string()));
        assert_eq!(domain("https://news.example.io/a"), Some("example.io".to_string()));
        assert_eq!(domain("https://co.uk/"), Some("co.uk".to_string()));
    }

    #[test]
    fn test_source_serializes_by_shape() {
        let plain = ArticleSource::Name("Reuters".to_string());
        let detailed = ArticleSource::Detailed {
            name: "Wired".to_string(),
            icon: None,
        };
        assert_eq!(serde_json::to_value(&plain).unwrap(), json!("Reuters"));
        assert_eq!(serde_json::to_value(&detailed).unwrap(), json!({ "name": "Wired" }));
    }

    #[test]
    fn test_domain_simple_host() {
        let article = Article {
            link: "https://x.test".to_string(),
            ..Article::default()
        };
        assert_eq!(article.domain(), Some("x.test".to_string()));
    }

    #[test]
    fn test_domain_invalid_link() {
        let article = Article {
            link: "not a url".to_string(),
            ..Article::default()
        };
        assert_eq!(article.domain(), None);

        let article = Article {
            link: "http://localhost/x".to_string(),
            ..Article::default()
        };
        assert_eq!(article.domain(), None);
    }

    #[test]
    fn test_tier_display_and_serialization() {
        assert_eq!(Tier::Relay.to_string(), "relay");
        assert_eq!(serde_json::to_string(&Tier::Fallback).unwrap(), "\"fallback\"");
    }

    #[test]
    fn test_relay_envelope_without_contents() {
        let envelope: RelayEnvelope = serde_json::from_str(r#"{"status":{}}"#).unwrap();
        assert!(envelope.contents.is_none());
    }
}
