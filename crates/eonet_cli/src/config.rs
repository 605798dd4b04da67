//! Configuration file support for eonet.
//!
//! Configuration is loaded with the following precedence (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables (prefixed with `EONET_`, e.g., `EONET_LOAD__CONCURRENCY`)
//! 3. Config file (~/.config/eonet/config.toml or ./eonet.toml)
//! 4. Built-in defaults
//!
//! Example config file:
//! ```toml
//! [api]
//! base_url = "https://eonet.gsfc.nasa.gov/api/v3"
//! timeout_secs = 30
//!
//! [load]
//! window_days = 360
//! concurrency = 2
//! ```

use std::path::PathBuf;
use std::time::Duration;

use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use directories::ProjectDirs;
use serde::Deserialize;

use eonet::catalog::{DEFAULT_API, DEFAULT_TIMEOUT_SECS};
use eonet::sync::{DEFAULT_FETCH_CONCURRENCY, DEFAULT_WINDOW_DAYS, LoadOptions};

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Catalog API configuration.
    pub api: ApiConfig,
    /// Default load options.
    pub load: LoadConfig,
}

/// Catalog API configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// API root, e.g. "https://eonet.gsfc.nasa.gov/api/v3".
    /// Can also be set via EONET_API__BASE_URL environment variable.
    pub base_url: String,
    /// Per-request timeout.
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Default load options.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoadConfig {
    /// Only include events from this many days back.
    pub window_days: u32,
    /// Maximum concurrent category fetches.
    pub concurrency: usize,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            window_days: DEFAULT_WINDOW_DAYS,
            concurrency: DEFAULT_FETCH_CONCURRENCY,
        }
    }
}

impl Config {
    /// Load configuration using the config crate's layered approach.
    ///
    /// Sources are loaded in order (later sources override earlier):
    /// 1. Built-in defaults
    /// 2. XDG config file (~/.config/eonet/config.toml)
    /// 3. Local config file (./eonet.toml)
    /// 4. Environment variables with EONET_ prefix
    pub fn load() -> Self {
        let mut builder = ConfigBuilder::builder();

        if let Some(xdg_config) = Self::default_config_path()
            && xdg_config.exists()
        {
            tracing::debug!("Loading config from {:?}", xdg_config);
            builder = builder.add_source(
                File::from(xdg_config)
                    .format(FileFormat::Toml)
                    .required(false),
            );
        }

        // Local config file (higher priority than XDG)
        let local_config = PathBuf::from("eonet.toml");
        if local_config.exists() {
            tracing::debug!("Loading config from ./eonet.toml");
            builder = builder.add_source(
                File::from(local_config)
                    .format(FileFormat::Toml)
                    .required(false),
            );
        }

        // e.g., EONET_LOAD__WINDOW_DAYS -> load.window_days
        builder = builder.add_source(Self::environment());

        match builder.build() {
            Ok(settings) => match settings.try_deserialize::<Config>() {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!("Failed to deserialize config: {}", e);
                    Config::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to build config: {}", e);
                Config::default()
            }
        }
    }

    /// `EONET_<SECTION>__<KEY>` variables. The double underscore keeps keys
    /// like `window_days` intact.
    fn environment() -> Environment {
        Environment::with_prefix("EONET")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
    }

    /// Request timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout_secs.max(1))
    }

    /// Load options with optional CLI overrides applied.
    pub fn load_options(&self, days: Option<u32>, concurrency: Option<usize>) -> LoadOptions {
        LoadOptions {
            window_days: days.unwrap_or(self.load.window_days),
            concurrency: concurrency.unwrap_or(self.load.concurrency),
        }
    }

    /// Get the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "eonet").map(|dirs| dirs.config_dir().join("config.toml"))
    }
}
