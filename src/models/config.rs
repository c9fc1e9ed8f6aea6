//! Application configuration structures.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Holiday CSV source settings
    #[serde(default)]
    pub source: SourceConfig,

    /// Output location for year documents
    #[serde(default)]
    pub output: OutputConfig,

    /// Realtime alert feed settings
    #[serde(default)]
    pub realtime: RealtimeConfig,

    /// Read-side settings
    #[serde(default)]
    pub reader: ReaderConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Output directory, resolved against `base` when relative.
    pub fn output_dir(&self, base: &Path) -> PathBuf {
        let dir = Path::new(&self.output.dir);
        if dir.is_absolute() {
            dir.to_path_buf()
        } else {
            base.join(dir)
        }
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.source.url.trim().is_empty() {
            return Err(AppError::validation("source.url is empty"));
        }
        let url = Url::parse(&self.source.url)
            .map_err(|e| AppError::validation(format!("source.url is invalid: {e}")))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(AppError::validation("source.url must be http(s)"));
        }
        if self.source.connect_timeout_secs == 0 {
            return Err(AppError::validation(
                "source.connect_timeout_secs must be > 0",
            ));
        }
        if self.source.read_timeout_secs == 0 {
            return Err(AppError::validation("source.read_timeout_secs must be > 0"));
        }
        if self.output.dir.trim().is_empty() {
            return Err(AppError::validation("output.dir is empty"));
        }
        if self.realtime.city_names.is_empty() {
            return Err(AppError::validation("realtime.city_names is empty"));
        }
        if self.realtime.city_names.iter().any(|c| c.trim().is_empty()) {
            return Err(AppError::validation(
                "realtime.city_names contains a blank name",
            ));
        }
        if self.realtime.timeout_secs == 0 {
            return Err(AppError::validation("realtime.timeout_secs must be > 0"));
        }
        Ok(())
    }
}

/// Holiday CSV download settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// URL of the office calendar CSV resource
    #[serde(default)]
    pub url: String,

    /// Connect timeout in seconds
    #[serde(default = "defaults::connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Per-read timeout in seconds
    #[serde(default = "defaults::read_timeout")]
    pub read_timeout_secs: u64,

    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Directory for the transient download (system temp dir if unset)
    #[serde(default)]
    pub temp_dir: Option<PathBuf>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            connect_timeout_secs: defaults::connect_timeout(),
            read_timeout_secs: defaults::read_timeout(),
            user_agent: defaults::user_agent(),
            temp_dir: None,
        }
    }
}

/// Output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory holding `YYYY.json` and `years.json`
    #[serde(default = "defaults::output_dir")]
    pub dir: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: defaults::output_dir(),
        }
    }
}

/// Realtime alert feed settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeConfig {
    /// Alert feed URL
    #[serde(default = "defaults::feed_url")]
    pub feed_url: String,

    /// Accepted spellings of the target city
    #[serde(default = "defaults::city_names")]
    pub city_names: Vec<String>,

    /// Overall request timeout in seconds
    #[serde(default = "defaults::feed_timeout")]
    pub timeout_secs: u64,

    /// How long a successful feed result is reused
    #[serde(default = "defaults::feed_cache_ttl")]
    pub cache_ttl_secs: u64,

    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            feed_url: defaults::feed_url(),
            city_names: defaults::city_names(),
            timeout_secs: defaults::feed_timeout(),
            cache_ttl_secs: defaults::feed_cache_ttl(),
            user_agent: defaults::user_agent(),
        }
    }
}

/// Read-side cache settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReaderConfig {
    #[serde(default = "defaults::reader_cache_ttl")]
    pub cache_ttl_secs: u64,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            cache_ttl_secs: defaults::reader_cache_ttl(),
        }
    }
}

mod defaults {
    // Source defaults
    pub fn connect_timeout() -> u64 {
        10
    }
    pub fn read_timeout() -> u64 {
        30
    }
    pub fn user_agent() -> String {
        concat!("holiday-feed/", env!("CARGO_PKG_VERSION")).into()
    }

    // Output defaults
    pub fn output_dir() -> String {
        "data/holidays".into()
    }

    // Realtime defaults
    pub fn feed_url() -> String {
        "https://alerts.ncdr.nat.gov.tw/JSONAtomFeed.ashx?AlertType=33".into()
    }
    pub fn city_names() -> Vec<String> {
        vec!["臺北市".into(), "台北市".into()]
    }
    pub fn feed_timeout() -> u64 {
        10
    }
    pub fn feed_cache_ttl() -> u64 {
        60
    }

    // Reader defaults
    pub fn reader_cache_ttl() -> u64 {
        300
    }
}
