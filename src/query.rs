//! Outbound URL construction.
//!
//! Three URLs are built per run:
//! - the search request sent to the news API ([`search_url`])
//! - the same request wrapped for the relay ([`relay_url`])
//! - the public results page behind the "view all" link ([`live_search_url`])

use crate::config::{Flavor, NewsConfig, RelayConfig, RelayMode};
use url::Url;

const LIVE_SEARCH_BASE: &str = "https://www.google.com/search";

/// Build the search API request for `term`.
///
/// ```ignore
/// news:        {endpoint}?q={term}&tbm=nws&api_key={key}
/// google_news: {endpoint}?engine=google_news&q={term}&hl=en&gl=us&api_key={key}
/// ```
pub fn search_url(config: &NewsConfig, term: &str) -> Result<Url, url::ParseError> {
    let mut url = Url::parse(&config.endpoint)?;
    {
        let mut pairs = url.query_pairs_mut();
        match config.flavor {
            Flavor::News => {
                pairs.append_pair("q", term).append_pair("tbm", "nws");
            }
            Flavor::GoogleNews => {
                pairs
                    .append_pair("engine", "google_news")
                    .append_pair("q", term)
                    .append_pair("hl", "en")
                    .append_pair("gl", "us");
            }
        }
        pairs.append_pair("api_key", &config.api_key);
    }
    Ok(url)
}

/// Wrap `target` so it is fetched through the relay.
pub fn relay_url(relay: &RelayConfig, target: &Url) -> Result<Url, url::ParseError> {
    match relay.mode {
        RelayMode::Envelope => {
            let mut url = Url::parse(&relay.base)?;
            url.query_pairs_mut().append_pair("url", target.as_str());
            Ok(url)
        }
        // cors-anywhere style relays take the raw target as their path
        RelayMode::Prefix => {
            let sep = if relay.base.ends_with('/') { "" } else { "/" };
            Url::parse(&format!("{}{}{}", relay.base, sep, target.as_str()))
        }
    }
}

/// The public news results page for `term`, used by the "view all" link.
pub fn live_search_url(term: &str) -> String {
    format!(
        "{}?q={}&tbm=nws",
        LIVE_SEARCH_BASE,
        urlencoding::encode(term)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn config() -> NewsConfig {
        NewsConfig {
            api_key: "k3y".to_string(),
            ..NewsConfig::default()
        }
    }

    #[test]
    fn test_search_url_news_flavor() {
        let url = search_url(&config(), "Lithium-Ion Battery Fire").unwrap();
        assert_eq!(
            url.as_str(),
            "https://serpapi.com/search.json?q=Lithium-Ion+Battery+Fire&tbm=nws&api_key=k3y"
        );
    }

    #[test]
    fn test_search_url_google_news_flavor() {
        let config = NewsConfig {
            flavor: Flavor::GoogleNews,
            ..config()
        };
        let url = search_url(&config, "technology").unwrap();
        assert_eq!(
            url.as_str(),
            "https://serpapi.com/search.json?engine=google_news&q=technology&hl=en&gl=us&api_key=k3y"
        );
    }

    #[test]
    fn test_search_url_encodes_term() {
        let url = search_url(&config(), "a&b=c").unwrap();
        let q: Vec<_> = url.query_pairs().filter(|(k, _)| k == "q").collect();
        assert_eq!(q.len(), 1);
        assert_eq!(q[0].1, "a&b=c");
    }

    #[test]
    fn test_envelope_relay_url() {
        let relay = RelayConfig {
            mode: RelayMode::Envelope,
            base: "https://api.allorigins.win/get".to_string(),
        };
        let target = Url::parse("https://serpapi.com/search.json?q=x&tbm=nws").unwrap();
        let url = relay_url(&relay, &target).unwrap();

        let wrapped: Vec<_> = url.query_pairs().collect();
        assert_eq!(url.path(), "/get");
        assert_eq!(wrapped.len(), 1);
        assert_eq!(wrapped[0].0, "url");
        assert_eq!(wrapped[0].1, target.as_str());
    }

    #[test]
    fn test_prefix_relay_url() {
        let relay = RelayConfig {
            mode: RelayMode::Prefix,
            base: "https://cors-anywhere.herokuapp.com/".to_string(),
        };
        let target = Url::parse("https://serpapi.com/search.json?q=x").unwrap();
        let url = relay_url(&relay, &target).unwrap();
        assert_eq!(
            url.as_str(),
            "https://cors-anywhere.herokuapp.com/https://serpapi.com/search.json?q=x"
        );
    }

    #[test]
    fn test_prefix_relay_url_without_trailing_slash() {
        let relay = RelayConfig {
            mode: RelayMode::Prefix,
            base: "https://cors-anywhere.herokuapp.com".to_string(),
        };
        let target = Url::parse("https://serpapi.com/search.json?q=x").unwrap();
        let url = relay_url(&relay, &target).unwrap();
        assert_eq!(url.host_str(), Some("cors-anywhere.herokuapp.com"));
        assert_eq!(
            url.as_str(),
            "https://cors-anywhere.herokuapp.com/https://serpapi.com/search.json?q=x"
        );
    }

    #[test]
    fn test_live_search_url() {
        assert_eq!(
            live_search_url("Lithium-Ion Battery Fire"),
            "https://www.google.com/search?q=Lithium-Ion%20Battery%20Fire&tbm=nws"
        );
    }
}
