//! Configuration management for Kopite.
//!
//! Configuration is read from `~/.config/kopite/config.toml` at startup.
//! If the file doesn't exist, a default configuration with comments is created.

pub mod mediators;

pub use mediators::{Encoding, MediatorDescriptor, Wrapping};

use serde::Deserialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_COMMUNITY: &str = "LiverpoolFC";
pub const DEFAULT_UPSTREAM_BASE: &str = "https://www.reddit.com";
pub const DEFAULT_PROXY_ENDPOINT: &str = "http://localhost:3000/api/reddit";

/// Main configuration struct.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub client: ClientConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediatorMode {
    /// One same-origin endpoint, one attempt per request
    #[default]
    Proxy,
    /// Ordered public mediators, each tried once
    Chain,
}

/// Request-layer options.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Community substituted for anything outside the allow-list
    pub default_community: String,
    pub allowed_communities: Vec<String>,
    pub mediator_mode: MediatorMode,
    pub mediators: Vec<MediatorDescriptor>,
    /// Endpoint used in proxy mode; receives `?path=<upstream path>&<query>`
    pub proxy_endpoint: String,
    /// Origin of the upstream JSON API, also the prefix of every cache key
    pub upstream_base: String,
    pub rate_limit_n: usize,
    pub rate_limit_window_ms: u64,
    pub cache_ttl_ms: u64,
    pub cache_sweep_ms: u64,
    pub request_timeout_ms: u64,
    pub listing_limit: u32,
    pub comment_limit: u32,
    pub comment_depth: u32,
    pub user_agent: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            default_community: DEFAULT_COMMUNITY.to_string(),
            allowed_communities: vec![
                DEFAULT_COMMUNITY.to_string(),
                "LiverpoolFCWomen".to_string(),
                "PremierLeague".to_string(),
                "soccer".to_string(),
            ],
            mediator_mode: MediatorMode::Proxy,
            mediators: mediators::default_chain(),
            proxy_endpoint: DEFAULT_PROXY_ENDPOINT.to_string(),
            upstream_base: DEFAULT_UPSTREAM_BASE.to_string(),
            rate_limit_n: 10,
            rate_limit_window_ms: 60_000,
            cache_ttl_ms: 300_000,
            cache_sweep_ms: 60_000,
            request_timeout_ms: 10_000,
            listing_limit: 50,
            comment_limit: 500,
            comment_depth: 10,
            user_agent: crate::fetcher::http_fetcher::DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl ApiConfig {
    pub fn rate_limit_window(&self) -> Duration {
        Duration::from_millis(self.rate_limit_window_ms)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_millis(self.cache_ttl_ms)
    }

    pub fn cache_sweep(&self) -> Duration {
        Duration::from_millis(self.cache_sweep_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Case-insensitive allow-list check.
    pub fn is_allowed(&self, community: &str) -> bool {
        self.allowed_communities
            .iter()
            .any(|c| c.eq_ignore_ascii_case(community))
    }
}

/// Client-environment signals.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Promotes mobile-friendly mediators and picks the mobile error text
    pub mobile: bool,
}

impl Config {
    /// Load configuration from the default path.
    ///
    /// If the config file doesn't exist, creates a default one with comments.
    /// Missing fields in the config file will use default values.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::default_config_path()?;
        Self::load_from(&config_path)
    }

    /// Load from an explicit path, creating a commented default file there if
    /// nothing exists yet.
    pub fn load_from(config_path: &Path) -> Result<Self, ConfigError> {
        if !config_path.exists() {
            Self::create_default_config(config_path)?;
            return Ok(Self::default());
        }

        let content = fs::read_to_string(config_path).map_err(|e| ConfigError::Io {
            path: config_path.to_path_buf(),
            source: e,
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: config_path.to_path_buf(),
            source: e,
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path: `~/.config/kopite/config.toml`
    pub fn default_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("kopite").join("config.toml"))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let api = &self.api;
        if api.default_community.trim().is_empty() {
            return Err(ConfigError::Invalid("default_community is empty".into()));
        }
        if !api.is_allowed(&api.default_community) {
            return Err(ConfigError::Invalid(format!(
                "default_community {} is not in allowed_communities",
                api.default_community
            )));
        }
        if api.rate_limit_n == 0 || api.rate_limit_window_ms == 0 {
            return Err(ConfigError::Invalid(
                "rate_limit_n and rate_limit_window_ms must be positive".into(),
            ));
        }
        if api.request_timeout_ms == 0 {
            return Err(ConfigError::Invalid("request_timeout_ms must be positive".into()));
        }
        if api.cache_sweep_ms == 0 {
            return Err(ConfigError::Invalid("cache_sweep_ms must be positive".into()));
        }
        if api.mediator_mode == MediatorMode::Chain && api.mediators.is_empty() {
            return Err(ConfigError::Invalid(
                "chain mode requires at least one [[api.mediators]] entry".into(),
            ));
        }
        Ok(())
    }

    /// Create a default config file with comments.
    fn create_default_config(path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let mut file = fs::File::create(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        file.write_all(Self::default_config_content().as_bytes())
            .map_err(|e| ConfigError::Io {
                path: path.to_path_buf(),
                source: e,
            })?;

        Ok(())
    }

    /// Generate the default config file content with comments.
    fn default_config_content() -> String {
        r##"# Kopite Configuration

[api]
# Community used when a request names one outside the allow-list
default_community = "LiverpoolFC"
allowed_communities = ["LiverpoolFC", "LiverpoolFCWomen", "PremierLeague", "soccer"]

# "proxy": a single same-origin endpoint
# "chain": the [[api.mediators]] list below, tried in order
mediator_mode = "proxy"
proxy_endpoint = "http://localhost:3000/api/reddit"
upstream_base = "https://www.reddit.com"

# At most rate_limit_n requests per rate_limit_window_ms
rate_limit_n = 10
rate_limit_window_ms = 60000

cache_ttl_ms = 300000
cache_sweep_ms = 60000
request_timeout_ms = 10000

listing_limit = 50
comment_limit = 500
comment_depth = 10

# encoding: "raw" or "urlencoded"
# wrapping: "direct" or "envelope" (JSON body with a `contents` field)
[[api.mediators]]
name = "corsproxy"
url_prefix = "https://corsproxy.io/?"
encoding = "urlencoded"
wrapping = "direct"
mobile_friendly = true

[[api.mediators]]
name = "allorigins-raw"
url_prefix = "https://api.allorigins.win/raw?url="
encoding = "urlencoded"
wrapping = "direct"
mobile_friendly = false

[[api.mediators]]
name = "allorigins-get"
url_prefix = "https://api.allorigins.win/get?url="
encoding = "urlencoded"
wrapping = "envelope"
mobile_friendly = true

[[api.mediators]]
name = "codetabs"
url_prefix = "https://api.codetabs.com/v1/proxy?quest="
encoding = "raw"
wrapping = "direct"
mobile_friendly = false

[client]
mobile = false
"##
        .to_string()
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to read/write config file at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_deserializes() {
        let content = Config::default_config_content();
        let config: Config = toml::from_str(&content).expect("Default config should be valid TOML");

        assert_eq!(config.api.default_community, "LiverpoolFC");
        assert_eq!(config.api.mediator_mode, MediatorMode::Proxy);
        assert_eq!(config.api.mediators.len(), 4);
        assert_eq!(config.api.mediators[2].wrapping, Wrapping::Envelope);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_config() {
        let content = r##"
[api]
mediator_mode = "chain"
rate_limit_n = 3

[client]
mobile = true
"##;
        let config: Config = toml::from_str(content).expect("Partial config should work");

        assert_eq!(config.api.mediator_mode, MediatorMode::Chain);
        assert_eq!(config.api.rate_limit_n, 3);
        assert!(config.client.mobile);
        // Defaults
        assert_eq!(config.api.request_timeout(), Duration::from_millis(10_000));
        assert_eq!(config.api.cache_ttl(), Duration::from_millis(300_000));
        assert!(!config.api.mediators.is_empty());
    }

    #[test]
    fn test_empty_config() {
        let config: Config = toml::from_str("").expect("Empty config should work");
        assert_eq!(config.api.rate_limit_n, 10);
        assert_eq!(config.api.rate_limit_window(), Duration::from_secs(60));
        assert_eq!(config.api.cache_sweep(), Duration::from_secs(60));
    }

    #[test]
    fn test_allow_list_is_case_insensitive() {
        let api = ApiConfig::default();
        assert!(api.is_allowed("liverpoolfc"));
        assert!(!api.is_allowed("gambling"));
    }

    #[test]
    fn test_validate_rejects_default_outside_allow_list() {
        let mut config = Config::default();
        config.api.allowed_communities = vec!["soccer".into()];
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_validate_rejects_empty_chain() {
        let mut config = Config::default();
        config.api.mediator_mode = MediatorMode::Chain;
        config.api.mediators.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_creates_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let config = Config::load_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config.api.default_community, DEFAULT_COMMUNITY);

        let reloaded = Config::load_from(&path).unwrap();
        assert_eq!(reloaded.api.mediators.len(), 4);
    }

    #[test]
    fn test_load_from_reports_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[api]\nrate_limit_n = \"many\"\n").unwrap();

        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::Parse { .. })
        ));
    }
}
