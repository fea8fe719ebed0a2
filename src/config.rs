//! Pipeline configuration.
//!
//! A [`NewsConfig`] is built once at startup and passed into every pipeline
//! call. Values come from three layers, later layers winning:
//!
//! 1. Built-in defaults
//! 2. An optional YAML file (`--config news.yaml`)
//! 3. Command-line flags and environment variables
//!
//! # Example file
//!
//! ```yaml
//! api_key: "..."
//! query: "Lithium-Ion Battery Fire"
//! limit: 3
//! flavor: news
//! relay:
//!   mode: envelope
//!   base: "https://api.allorigins.win/get"
//! timeout_secs: 15
//! ```

use crate::cli::Cli;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;

pub const DEFAULT_QUERY: &str = "Lithium-Ion Battery Fire";
pub const DEFAULT_LIMIT: usize = 3;
pub const DEFAULT_ENDPOINT: &str = "https://serpapi.com/search.json";
pub const DEFAULT_RELAY: &str = "https://api.allorigins.win/get";
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;
pub const DEFAULT_PLACEHOLDER: &str =
    "https://via.placeholder.com/400x200/151515/11BF4E?text=Industry+News";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid config file {path}: {source}")]
    Yaml {
        path: String,
        source: serde_yaml::Error,
    },
    #[error("no API key configured (use --api-key, SERPAPI_API_KEY, or api_key in the config file)")]
    MissingApiKey,
    #[error("invalid {field} URL {value:?}: {source}")]
    InvalidUrl {
        field: &'static str,
        value: String,
        source: url::ParseError,
    },
    #[error("limit must be at least 1")]
    ZeroLimit,
    #[error("timeout_secs must be at least 1")]
    ZeroTimeout,
}

/// Which request shape to send to the search endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Flavor {
    /// Classic web search restricted to news (`tbm=nws`).
    #[default]
    News,
    /// The dedicated `google_news` engine.
    GoogleNews,
}

/// How the relay wraps the upstream URL and response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum RelayMode {
    /// `{base}?url={encoded}`, answering `{"contents": "<body>"}`.
    #[default]
    Envelope,
    /// `{base}{target}`, answering the raw upstream body.
    Prefix,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RelayConfig {
    #[serde(default)]
    pub mode: RelayMode,
    pub base: String,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            mode: RelayMode::Envelope,
            base: DEFAULT_RELAY.to_string(),
        }
    }
}

/// Everything one pipeline run needs to know.
#[derive(Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct NewsConfig {
    pub api_key: String,
    pub query: String,
    pub limit: usize,
    pub endpoint: String,
    pub flavor: Flavor,
    /// `None` disables the relay tier.
    pub relay: Option<RelayConfig>,
    pub timeout_secs: u64,
    pub placeholder_image: String,
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            query: DEFAULT_QUERY.to_string(),
            limit: DEFAULT_LIMIT,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            flavor: Flavor::News,
            relay: Some(RelayConfig::default()),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            placeholder_image: DEFAULT_PLACEHOLDER.to_string(),
        }
    }
}

// Keeps the credential out of logs.
impl std::fmt::Debug for NewsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewsConfig")
            .field("api_key", &if self.api_key.is_empty() { "<unset>" } else { "<redacted>" })
            .field("query", &self.query)
            .field("limit", &self.limit)
            .field("endpoint", &self.endpoint)
            .field("flavor", &self.flavor)
            .field("relay", &self.relay)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl NewsConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Load a YAML config file. Missing keys take their defaults.
    #[instrument(level = "info", skip_all, fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        serde_yaml::from_str(&raw).map_err(|source| ConfigError::Yaml {
            path: path.display().to_string(),
            source,
        })
    }

    /// Build the effective configuration from the command line.
    ///
    /// Reads `--config` first if given, then applies every flag that was set.
    pub fn from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        let mut config = match &cli.config {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };

        if let Some(key) = &cli.api_key {
            config.api_key = key.clone();
        }
        if let Some(query) = &cli.query {
            config.query = query.clone();
        }
        if let Some(limit) = cli.limit {
            config.limit = limit;
        }
        if let Some(endpoint) = &cli.endpoint {
            config.endpoint = endpoint.clone();
        }
        if cli.google_news {
            config.flavor = Flavor::GoogleNews;
        }
        if let Some(secs) = cli.timeout_secs {
            config.timeout_secs = secs;
        }
        if cli.no_relay {
            config.relay = None;
        } else if cli.relay_url.is_some() || cli.relay_mode.is_some() {
            let mut relay = config.relay.take().unwrap_or_default();
            if let Some(base) = &cli.relay_url {
                relay.base = base.clone();
            }
            if let Some(mode) = cli.relay_mode {
                relay.mode = mode;
            }
            config.relay = Some(relay);
        }

        config.validate()?;
        debug!(?config, "Resolved configuration");
        Ok(config)
    }

    /// Check the values a pipeline run depends on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_key.trim().is_empty() {
            return Err(ConfigError::MissingApiKey);
        }
        if self.limit == 0 {
            return Err(ConfigError::ZeroLimit);
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        Url::parse(&self.endpoint).map_err(|source| ConfigError::InvalidUrl {
            field: "endpoint",
            value: self.endpoint.clone(),
            source,
        })?;
        if let Some(relay) = &self.relay {
            Url::parse(&relay.base).map_err(|source| ConfigError::InvalidUrl {
                field: "relay",
                value: relay.base.clone(),
                source,
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::io::Write;

    fn cli(args: &[&str]) -> Cli {
        let mut full = vec!["news_cards"];
        full.extend_from_slice(args);
        full.push("render");
        Cli::parse_from(full)
    }

    #[test]
    fn test_defaults() {
        let config = NewsConfig::default();
        assert_eq!(config.query, "Lithium-Ion Battery Fire");
        assert_eq!(config.limit, 3);
        assert_eq!(config.timeout(), Duration::from_secs(15));
        assert_eq!(config.relay.unwrap().mode, RelayMode::Envelope);
    }

    #[test]
    fn test_missing_api_key_rejected() {
        let config = NewsConfig::default();
        assert!(matches!(config.validate(), Err(ConfigError::MissingApiKey)));
    }

    #[test]
    fn test_zero_limit_rejected() {
        let config = NewsConfig {
            api_key: "k".to_string(),
            limit: 0,
            ..NewsConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::ZeroLimit)));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let config = NewsConfig {
            api_key: "k".to_string(),
            timeout_secs: 0,
            ..NewsConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::ZeroTimeout)));

        let result = NewsConfig::from_cli(&cli(&["--api-key", "k", "--timeout-secs", "0"]));
        assert!(matches!(result, Err(ConfigError::ZeroTimeout)));
    }

    #[test]
    fn test_prefix_relay_without_trailing_slash_accepted() {
        let config = NewsConfig::from_cli(&cli(&[
            "--api-key",
            "k",
            "--relay-mode",
            "prefix",
            "--relay-url",
            "https://cors-anywhere.herokuapp.com",
        ]))
        .unwrap();
        let relay = config.relay.unwrap();
        let target = Url::parse("https://serpapi.com/search.json?q=x").unwrap();
        let url = crate::query::relay_url(&relay, &target).unwrap();
        assert_eq!(url.host_str(), Some("cors-anywhere.herokuapp.com"));
    }

    #[test]
    fn test_invalid_endpoint_rejected() {
        let config = NewsConfig {
            api_key: "k".to_string(),
            endpoint: "not a url".to_string(),
            ..NewsConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidUrl { field: "endpoint", .. })
        ));
    }

    #[test]
    fn test_cli_overrides() {
        let config = NewsConfig::from_cli(&cli(&[
            "--api-key",
            "secret",
            "--query",
            "solar",
            "--limit",
            "5",
            "--relay-mode",
            "prefix",
            "--relay-url",
            "https://relay.test/",
            "--google-news",
        ]))
        .unwrap();

        assert_eq!(config.api_key, "secret");
        assert_eq!(config.query, "solar");
        assert_eq!(config.limit, 5);
        assert_eq!(config.flavor, Flavor::GoogleNews);
        assert_eq!(
            config.relay,
            Some(RelayConfig {
                mode: RelayMode::Prefix,
                base: "https://relay.test/".to_string(),
            })
        );
    }

    #[test]
    fn test_no_relay_flag() {
        let config = NewsConfig::from_cli(&cli(&["--api-key", "secret", "--no-relay"])).unwrap();
        assert!(config.relay.is_none());
    }

    #[test]
    fn test_yaml_file_then_cli() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "api_key: from-file\nquery: wind\nlimit: 6\nrelay:\n  mode: prefix\n  base: https://proxy.test/\ntimeout_secs: 4"
        )
        .unwrap();
        let path = file.path().to_str().unwrap().to_string();

        let config = NewsConfig::from_cli(&cli(&["--config", &path, "--limit", "2"])).unwrap();

        assert_eq!(config.api_key, "from-file");
        assert_eq!(config.query, "wind");
        assert_eq!(config.limit, 2);
        assert_eq!(config.timeout_secs, 4);
        assert_eq!(config.relay.unwrap().mode, RelayMode::Prefix);
    }

    #[test]
    fn test_unreadable_config_file() {
        let result = NewsConfig::from_file("/definitely/not/here.yaml");
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let config = NewsConfig {
            api_key: "super-secret".to_string(),
            ..NewsConfig::default()
        };
        let shown = format!("{:?}", config);
        assert!(!shown.contains("super-secret"));
        assert!(shown.contains("<redacted>"));
    }
}
