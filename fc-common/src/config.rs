//! Configuration loading and resolution
//!
//! Each setting is resolved in priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! Sources 1 and 2 are merged by the binary's argument parser and arrive here
//! as [`ConfigOverrides`].

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Default listen port
pub const DEFAULT_PORT: u16 = 3005;

/// Default bind address
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default API path prefix (without leading slash)
pub const DEFAULT_PATH_PREFIX: &str = "fit-and-competent-api";

/// Default SQLite database file
pub const DEFAULT_DATABASE: &str = "./.development.db";

/// Default upper bound on a single store call
pub const DEFAULT_STORE_TIMEOUT_MS: u64 = 5000;

/// Values supplied on the command line or through the environment
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub port: Option<u16>,
    pub host: Option<String>,
    pub path_prefix: Option<String>,
    pub database: Option<PathBuf>,
    pub store_timeout_ms: Option<u64>,
}

/// Optional TOML config file contents
///
/// Every key is optional; missing keys fall through to compiled defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TomlConfig {
    pub port: Option<u16>,
    pub host: Option<String>,
    pub path_prefix: Option<String>,
    pub database: Option<PathBuf>,
    pub store_timeout_ms: Option<u64>,
}

impl TomlConfig {
    /// Parse a config file from disk
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Invalid config file {}: {}", path.display(), e)))
    }
}

/// Fully resolved API configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
    /// Normalized path prefix: either empty or `/segment[/segment...]`
    pub path_prefix: String,
    pub database: PathBuf,
    pub store_timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            path_prefix: normalize_path_prefix(DEFAULT_PATH_PREFIX),
            database: PathBuf::from(DEFAULT_DATABASE),
            store_timeout: Duration::from_millis(DEFAULT_STORE_TIMEOUT_MS),
        }
    }
}

impl ApiConfig {
    /// Resolve configuration from overrides and an optional TOML file
    ///
    /// A config file that was explicitly named but cannot be read is an error.
    pub fn resolve(overrides: ConfigOverrides, config_file: Option<&Path>) -> Result<Self> {
        let file = match config_file {
            Some(path) => {
                let parsed = TomlConfig::load(path)?;
                info!("Loaded config file: {}", path.display());
                parsed
            }
            None => TomlConfig::default(),
        };

        Ok(Self::merge(overrides, file))
    }

    /// Merge sources without touching the filesystem
    pub fn merge(overrides: ConfigOverrides, file: TomlConfig) -> Self {
        let defaults = Self::default();

        let store_timeout_ms = overrides
            .store_timeout_ms
            .or(file.store_timeout_ms)
            .unwrap_or(DEFAULT_STORE_TIMEOUT_MS);
        let store_timeout = if store_timeout_ms == 0 {
            warn!("store_timeout_ms = 0 is not allowed, using {} ms", DEFAULT_STORE_TIMEOUT_MS);
            defaults.store_timeout
        } else {
            Duration::from_millis(store_timeout_ms)
        };

        Self {
            host: overrides.host.or(file.host).unwrap_or(defaults.host),
            port: overrides.port.or(file.port).unwrap_or(defaults.port),
            path_prefix: overrides
                .path_prefix
                .or(file.path_prefix)
                .map(|p| normalize_path_prefix(&p))
                .unwrap_or(defaults.path_prefix),
            database: overrides.database.or(file.database).unwrap_or(defaults.database),
            store_timeout,
        }
    }

    /// `host:port` string for binding the listener
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Normalize a path prefix to `/a/b` form (or empty for "mount at root")
pub fn normalize_path_prefix(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{}", trimmed)
    }
}
