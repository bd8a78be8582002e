//! User configuration
//!
//! Loaded from `$PTREE_CONFIG`, or `<config dir>/pricetree/config.toml`.
//! A missing file means defaults.

use anyhow::{Context, Result};
use pricetree_core::FetchStrategy;
use pricetree_server::ServerConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable overriding the config file location
pub const CONFIG_ENV: &str = "PTREE_CONFIG";

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub fetch: FetchConfig,
    pub store: StoreConfig,
    pub server: ServerSection,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:7878".to_string(),
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyName {
    #[default]
    Sequential,
    Parallel,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub strategy: StrategyName,
    pub max_in_flight: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            strategy: StrategyName::Sequential,
            max_in_flight: 8,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Defaults to `<data dir>/pricetree`
    pub data_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub bind: String,
    /// 0 disables the timeout
    pub request_timeout_secs: u64,
    /// 0 disables the limit
    pub concurrency_limit: usize,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:7878".to_string(),
            request_timeout_secs: 30,
            concurrency_limit: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// Daily rolling log files for `ptree serve`
    pub dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            dir: None,
        }
    }
}

/// Every key accepted by `get` and `set`
pub const KEYS: &[&str] = &[
    "api.base_url",
    "api.timeout_secs",
    "fetch.strategy",
    "fetch.max_in_flight",
    "store.data_dir",
    "server.bind",
    "server.request_timeout_secs",
    "server.concurrency_limit",
    "logging.level",
    "logging.dir",
];

impl Config {
    /// Check value ranges
    pub fn validate(&self) -> Result<()> {
        if !(1..=300).contains(&self.api.timeout_secs) {
            anyhow::bail!("api.timeout_secs must be between 1 and 300 (got {})", self.api.timeout_secs);
        }
        if self.api.base_url.trim().is_empty() {
            anyhow::bail!("api.base_url must not be empty");
        }
        if !(1..=64).contains(&self.fetch.max_in_flight) {
            anyhow::bail!(
                "fetch.max_in_flight must be between 1 and 64 (got {})",
                self.fetch.max_in_flight
            );
        }
        if self.server.request_timeout_secs > 600 {
            anyhow::bail!(
                "server.request_timeout_secs must be between 0 and 600 (got {})",
                self.server.request_timeout_secs
            );
        }
        if self.server.bind.trim().is_empty() {
            anyhow::bail!("server.bind must not be empty");
        }
        Ok(())
    }

    pub fn fetch_strategy(&self) -> FetchStrategy {
        match self.fetch.strategy {
            StrategyName::Sequential => FetchStrategy::Sequential,
            StrategyName::Parallel => FetchStrategy::parallel(self.fetch.max_in_flight),
        }
    }

    pub fn data_dir(&self) -> Result<PathBuf> {
        match &self.store.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => dirs::data_dir()
                .map(|d| d.join("pricetree"))
                .context("Could not determine data directory; set store.data_dir"),
        }
    }

    pub fn server_config(&self) -> ServerConfig {
        ServerConfig {
            request_timeout: (self.server.request_timeout_secs > 0)
                .then(|| Duration::from_secs(self.server.request_timeout_secs)),
            concurrency_limit: (self.server.concurrency_limit > 0).then_some(self.server.concurrency_limit),
        }
    }

    /// Read one value by dotted key
    pub fn get(&self, key: &str) -> Result<String> {
        let path_str = |p: &Option<PathBuf>| p.as_ref().map(|p| p.display().to_string()).unwrap_or_default();
        let value = match key {
            "api.base_url" => self.api.base_url.clone(),
            "api.timeout_secs" => self.api.timeout_secs.to_string(),
            "fetch.strategy" => match self.fetch.strategy {
                StrategyName::Sequential => "sequential".to_string(),
                StrategyName::Parallel => "parallel".to_string(),
            },
            "fetch.max_in_flight" => self.fetch.max_in_flight.to_string(),
            "store.data_dir" => path_str(&self.store.data_dir),
            "server.bind" => self.server.bind.clone(),
            "server.request_timeout_secs" => self.server.request_timeout_secs.to_string(),
            "server.concurrency_limit" => self.server.concurrency_limit.to_string(),
            "logging.level" => self.logging.level.clone(),
            "logging.dir" => path_str(&self.logging.dir),
            _ => anyhow::bail!("Unknown config key: {}. Use 'ptree config list' to see available keys.", key),
        };
        Ok(value)
    }

    /// Set one value by dotted key; on error `self` is left unchanged
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let optional_path = |v: &str| (!v.is_empty()).then(|| PathBuf::from(v));
        let mut next = self.clone();
        match key {
            "api.base_url" => next.api.base_url = value.to_string(),
            "api.timeout_secs" => {
                next.api.timeout_secs = value.parse().context("Invalid value: must be a positive integer")?
            }
            "fetch.strategy" => {
                next.fetch.strategy = match value {
                    "sequential" => StrategyName::Sequential,
                    "parallel" => StrategyName::Parallel,
                    _ => anyhow::bail!("Invalid value: must be 'sequential' or 'parallel'"),
                }
            }
            "fetch.max_in_flight" => {
                next.fetch.max_in_flight = value.parse().context("Invalid value: must be a positive integer")?
            }
            "store.data_dir" => next.store.data_dir = optional_path(value),
            "server.bind" => next.server.bind = value.to_string(),
            "server.request_timeout_secs" => {
                next.server.request_timeout_secs =
                    value.parse().context("Invalid value: must be a non-negative integer")?
            }
            "server.concurrency_limit" => {
                next.server.concurrency_limit =
                    value.parse().context("Invalid value: must be a non-negative integer")?
            }
            "logging.level" => next.logging.level = value.to_string(),
            "logging.dir" => next.logging.dir = optional_path(value),
            _ => anyhow::bail!("Unknown config key: {}. Use 'ptree config list' to see available keys.", key),
        }
        next.validate().context("Invalid configuration value")?;
        *self = next;
        Ok(())
    }
}

/// Location of the config file
pub fn config_file_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os(CONFIG_ENV) {
        return Some(PathBuf::from(path));
    }
    dirs::config_dir().map(|d| d.join("pricetree").join("config.toml"))
}

/// Load the config file, falling back to defaults when it does not exist
pub fn load() -> Result<Config> {
    match config_file_path() {
        Some(path) => load_from(&path),
        None => Ok(Config::default()),
    }
}

pub fn load_from(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    let config: Config =
        toml::from_str(&text).with_context(|| format!("Failed to parse config file {}", path.display()))?;
    config
        .validate()
        .with_context(|| format!("Invalid config file {}", path.display()))?;
    Ok(config)
}

pub fn save(config: &Config) -> Result<()> {
    let path = config_file_path().context("Could not determine config file path")?;
    save_to(config, &path)
}

pub fn save_to(config: &Config, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config directory {}", parent.display()))?;
    }
    let text = toml::to_string_pretty(config).context("Failed to serialize config")?;
    std::fs::write(path, text).with_context(|| format!("Failed to write config file {}", path.display()))
}

/// Write the default config if no file exists; returns whether one was created
pub fn init_if_missing() -> Result<bool> {
    let path = config_file_path().context("Could not determine config file path")?;
    if path.exists() {
        return Ok(false);
    }
    save_to(&Config::default(), &path)?;
    Ok(true)
}

pub fn example_config() -> &'static str {
    r#"# pricetree configuration

[api]
base_url = "http://127.0.0.1:7878"
timeout_secs = 30                 # 1-300

[fetch]
strategy = "parallel"             # "sequential" | "parallel"
max_in_flight = 8                 # 1-64

[store]
# data_dir = "/var/lib/pricetree"

[server]
bind = "127.0.0.1:7878"
request_timeout_secs = 30         # 0-600, 0 = no timeout
concurrency_limit = 0             # 0 = unlimited

[logging]
level = "info"                    # overridden by RUST_LOG
# dir = "/var/log/pricetree"      # daily rolling files for `ptree serve`
"#
}
