// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Server configuration module
//!
//! Configuration covers the HTTP listener, the tracker request bound, the
//! response cache, and per-indexer credentials and rate limits. Values are
//! validated while loading so the server never starts with a setting it cannot
//! honour.

use std::{
    collections::HashMap,
    fmt,
    net::{IpAddr, Ipv4Addr, SocketAddr},
    path::Path,
    time::Duration,
};

use anyhow::{Result, anyhow, ensure};
use config::{
    Config, ConfigBuilder, ConfigError, Environment as ConfigEnv, File, builder::DefaultState,
};
use serde::{Deserialize, Deserializer, Serialize, de};
use shared_types::Indexer;
use tracker_api::RateLimitConfig;
use url::Url;

use crate::error::{ServerError, ServerResult};

const DEFAULT_REQUEST_TIMEOUT_SECONDS: u64 = 10;
const DEFAULT_CACHE_TTL_SECONDS: u64 = 300;
const DEFAULT_CACHE_MAX_ENTRIES: usize = 10_000;

/// A validated server port that ensures the value is appropriate for the environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ServerPort {
    port: u16,
    environment: Environment,
}

impl ServerPort {
    /// Create a new `ServerPort`, ensuring it's valid for the given environment
    ///
    /// # Errors
    ///
    /// Returns an error if the port is 0 in non-testing environments
    pub fn new(port: u16, environment: Environment) -> Result<Self> {
        if port == 0 && environment != Environment::Testing {
            return Err(anyhow!("port cannot be 0 in non-testing environments"));
        }
        Ok(Self { port, environment })
    }

    /// Create a safe default port for development
    pub const fn default_development() -> Self {
        Self {
            port: 3000,
            environment: Environment::Development,
        }
    }

    /// Create a safe testing port (port 0)
    pub const fn testing() -> Self {
        Self {
            port: 0,
            environment: Environment::Testing,
        }
    }

    /// Get the port value
    pub fn value(&self) -> u16 {
        self.port
    }
}

impl<'de> Deserialize<'de> for ServerPort {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let port = u16::deserialize(deserializer)?;
        // re-validated once the environment is known
        Ok(Self {
            port,
            environment: Environment::Development,
        })
    }
}

/// A validated timeout duration in seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeoutSeconds(Duration);

impl TimeoutSeconds {
    /// Create a new `TimeoutSeconds`, ensuring the value is within valid bounds
    ///
    /// # Errors
    ///
    /// Returns an error if timeout is 0 or greater than 300 seconds
    pub fn new(seconds: u64) -> Result<Self> {
        ensure!(seconds != 0, "timeout must be greater than 0");
        ensure!(seconds <= 300, "timeout cannot exceed 300");
        Ok(Self(Duration::from_secs(seconds)))
    }

    /// Default HTTP layer timeout (30 seconds)
    pub const fn default_value() -> Self {
        Self(Duration::from_secs(30))
    }

    /// Default bound for one tracker API call (10 seconds)
    pub const fn request_default() -> Self {
        Self(Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECONDS))
    }

    /// Create a safe testing timeout (5 seconds)
    pub const fn testing() -> Self {
        Self(Duration::from_secs(5))
    }

    /// Tracker call bound used in testing (2 seconds), inside [`Self::testing`]
    pub const fn request_testing() -> Self {
        Self(Duration::from_secs(2))
    }

    /// Get the timeout value
    pub fn value(&self) -> Duration {
        self.0
    }
}

impl<'de> Deserialize<'de> for TimeoutSeconds {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let seconds = u64::deserialize(deserializer)?;
        Self::new(seconds).map_err(|e| de::Error::custom(e.to_string()))
    }
}

impl Default for TimeoutSeconds {
    fn default() -> Self {
        Self::default_value()
    }
}

/// Environment types for configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Production environment
    Production,
    /// Development environment
    Development,
    /// Testing environment
    Testing,
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Environment::Production => write!(f, "production"),
            Environment::Development => write!(f, "development"),
            Environment::Testing => write!(f, "testing"),
        }
    }
}

/// Response cache settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    /// Entry lifetime in seconds
    pub ttl_seconds: u64,
    /// Maximum number of cached responses; 0 disables caching
    pub max_entries: usize,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            ttl_seconds: DEFAULT_CACHE_TTL_SECONDS,
            max_entries: DEFAULT_CACHE_MAX_ENTRIES,
        }
    }
}

impl CacheSettings {
    /// Entry lifetime
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds)
    }
}

/// Per-indexer settings
///
/// Unset rate limit fields fall back to the indexer's published limit and an
/// unset `api_base` to its compiled-in URL.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexerSettings {
    /// Configured API key
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// Token bucket capacity
    pub burst: Option<u32>,
    /// Seconds for the bucket to refill from empty
    pub period_seconds: Option<u64>,
    /// Alternative API base, such as a staging mirror
    pub api_base: Option<Url>,
}

impl fmt::Debug for IndexerSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IndexerSettings")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("burst", &self.burst)
            .field("period_seconds", &self.period_seconds)
            .field("api_base", &self.api_base)
            .finish()
    }
}

/// Server configuration for different environments
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host address
    pub host: IpAddr,
    /// Server port (validated for environment compatibility)
    pub port: ServerPort,
    /// HTTP layer timeout in seconds (validated range: 1-300)
    pub timeout_seconds: TimeoutSeconds,
    /// Environment type
    pub environment: Environment,
    /// Bound for a single tracker API call
    #[serde(default = "TimeoutSeconds::request_default")]
    pub request_timeout_seconds: TimeoutSeconds,
    /// Response cache settings
    #[serde(default)]
    pub cache: CacheSettings,
    /// Settings keyed by indexer
    #[serde(default)]
    pub indexers: HashMap<Indexer, IndexerSettings>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: ServerPort::default_development(),
            timeout_seconds: TimeoutSeconds::default(),
            environment: Environment::Development,
            request_timeout_seconds: TimeoutSeconds::request_default(),
            cache: CacheSettings::default(),
            indexers: HashMap::new(),
        }
    }
}

impl ServerConfig {
    /// Create configuration from environment variables and optional configuration files
    ///
    /// # Errors
    ///
    /// Returns `ServerError::Config` if configuration is invalid or cannot be loaded.
    pub fn from_env() -> ServerResult<Self> {
        Self::load().map_err(|e| ServerError::Config {
            message: format!("failed to load configuration: {e}"),
        })
    }

    /// Load configuration using the config crate with hierarchical sources
    ///
    /// Configuration is loaded in the following order (later sources override earlier ones):
    /// 1. Default values
    /// 2. Configuration file (config.json)
    /// 3. Environment-specific files (config.{env}.json)
    /// 4. Environment variables with `SERVER__` prefix, `__` separating nested keys
    ///    (`SERVER__INDEXERS__REDACTED__API_KEY`)
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if configuration cannot be loaded or is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let env_var = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

        let mut config_builder = Self::defaults()?
            .add_source(File::with_name("config.json").required(false))
            .add_source(
                File::with_name(&format!("config.{}.json", env_var.to_lowercase())).required(false),
            )
            .add_source(
                ConfigEnv::with_prefix("SERVER")
                    .separator("__")
                    .try_parsing(true),
            );

        if std::env::var("ENVIRONMENT").is_ok() {
            config_builder = config_builder.set_override("environment", env_var.to_lowercase())?;
        }

        Self::finish(config_builder.build()?)
    }

    /// Load configuration from defaults and a single file
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file is missing or its contents are invalid.
    pub fn load_file(path: &Path) -> Result<Self, ConfigError> {
        let config = Self::defaults()?.add_source(File::from(path)).build()?;
        Self::finish(config)
    }

    fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        Config::builder()
            .set_default("host", "127.0.0.1")?
            .set_default("port", 3000)?
            .set_default("timeout_seconds", 30)?
            .set_default("environment", "development")?
            .set_default("request_timeout_seconds", 10)?
            .set_default("cache.ttl_seconds", 300)?
            .set_default("cache.max_entries", 10_000)
    }

    fn finish(config: Config) -> Result<Self, ConfigError> {
        let mut server_config: Self = config.try_deserialize()?;

        server_config.port = ServerPort::new(server_config.port.value(), server_config.environment)
            .map_err(|e| ConfigError::Message(format!("invalid port configuration: {e}")))?;

        // The tracker call must time out before the HTTP layer does, or callers
        // see the layer's bare 408 instead of a 504.
        if server_config.request_timeout_seconds.value() >= server_config.timeout_seconds.value() {
            return Err(ConfigError::Message(format!(
                "request_timeout_seconds ({}s) must be less than timeout_seconds ({}s)",
                server_config.request_timeout_seconds.value().as_secs(),
                server_config.timeout_seconds.value().as_secs()
            )));
        }

        for (indexer, settings) in &server_config.indexers {
            if settings
                .api_key
                .as_deref()
                .is_some_and(|key| key.trim().is_empty())
            {
                return Err(ConfigError::Message(format!(
                    "api_key for indexer {indexer} cannot be empty"
                )));
            }
            if settings.period_seconds == Some(0) {
                return Err(ConfigError::Message(format!(
                    "period_seconds for indexer {indexer} must be greater than 0"
                )));
            }
        }

        Ok(server_config)
    }

    /// Create configuration optimized for testing
    pub fn for_testing() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: ServerPort::testing(), // let OS choose available port
            timeout_seconds: TimeoutSeconds::testing(),
            environment: Environment::Testing,
            request_timeout_seconds: TimeoutSeconds::request_testing(),
            cache: CacheSettings::default(),
            indexers: HashMap::new(),
        }
    }

    /// Replace the settings for `indexer`
    #[must_use]
    pub fn with_indexer(mut self, indexer: Indexer, settings: IndexerSettings) -> Self {
        self.indexers.insert(indexer, settings);
        self
    }

    /// Get socket address for binding
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port.value())
    }

    /// Effective rate limit for `indexer`
    pub fn rate_limit(&self, indexer: Indexer) -> RateLimitConfig {
        let published = RateLimitConfig::for_indexer(indexer);
        match self.indexers.get(&indexer) {
            Some(settings) => RateLimitConfig {
                burst: settings.burst.unwrap_or(published.burst),
                period_seconds: settings.period_seconds.unwrap_or(published.period_seconds),
            },
            None => published,
        }
    }

    /// Effective API base for `indexer`
    pub fn api_base(&self, indexer: Indexer) -> String {
        self.indexers
            .get(&indexer)
            .and_then(|settings| settings.api_base.as_ref())
            .map_or_else(|| indexer.api_base().to_string(), ToString::to_string)
    }

    /// Configured API key for `indexer`
    pub fn api_key(&self, indexer: Indexer) -> Option<&str> {
        self.indexers
            .get(&indexer)
            .and_then(|settings| settings.api_key.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_validation() {
        assert!(TimeoutSeconds::new(0).is_err());
        assert!(TimeoutSeconds::new(400).is_err());

        assert!(TimeoutSeconds::new(30).is_ok());
        assert!(TimeoutSeconds::new(1).is_ok());
        assert!(TimeoutSeconds::new(300).is_ok());
    }

    #[test]
    fn server_port_validation() {
        assert!(ServerPort::new(0, Environment::Testing).is_ok());
        assert!(ServerPort::new(0, Environment::Development).is_err());
        assert!(ServerPort::new(0, Environment::Production).is_err());

        assert!(ServerPort::new(3000, Environment::Development).is_ok());
        assert!(ServerPort::new(443, Environment::Production).is_ok());
    }

    #[test]
    fn environment_display() {
        assert_eq!(Environment::Production.to_string(), "production");
        assert_eq!(Environment::Development.to_string(), "development");
        assert_eq!(Environment::Testing.to_string(), "testing");
    }

    #[test]
    fn request_timeout_is_inside_http_timeout() {
        let defaults = ServerConfig::default();
        assert!(defaults.request_timeout_seconds.value() < defaults.timeout_seconds.value());

        let testing = ServerConfig::for_testing();
        assert!(testing.request_timeout_seconds.value() < testing.timeout_seconds.value());
    }

    #[test]
    fn request_timeout_defaults_to_ten_seconds() {
        assert_eq!(
            ServerConfig::default().request_timeout_seconds.value(),
            Duration::from_secs(10)
        );
    }

    #[test]
    fn indexer_fallbacks() {
        let config = ServerConfig::for_testing().with_indexer(
            Indexer::Orpheus,
            IndexerSettings {
                burst: Some(2),
                api_base: Some(Url::parse("http://127.0.0.1:8080/ajax.php").unwrap()),
                ..Default::default()
            },
        );

        assert_eq!(
            config.rate_limit(Indexer::Orpheus),
            RateLimitConfig {
                burst: 2,
                period_seconds: 10
            }
        );
        assert_eq!(
            config.rate_limit(Indexer::Redacted),
            RateLimitConfig::for_indexer(Indexer::Redacted)
        );
        assert_eq!(
            config.api_base(Indexer::Orpheus),
            "http://127.0.0.1:8080/ajax.php"
        );
        assert_eq!(config.api_base(Indexer::Redacted), Indexer::Redacted.api_base());
        assert_eq!(config.api_key(Indexer::Redacted), None);
    }

    #[test]
    fn settings_debug_hides_key() {
        let settings = IndexerSettings {
            api_key: Some("hunter2".to_string()),
            ..Default::default()
        };
        assert!(!format!("{settings:?}").contains("hunter2"));
    }
}
