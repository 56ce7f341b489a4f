//! Configuration management for signups.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::net::SocketAddr;
use std::path::PathBuf;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default config directory name.
const CONFIG_DIR_NAME: &str = "signups";

/// Prefix for environment variable overrides.
const ENV_PREFIX: &str = "SIGNUPS_";

/// Default activities document, relative to the application directory.
const ACTIVITIES_FILE: &str = "data/activities.json";

/// Default teachers document, relative to the application directory.
const TEACHERS_FILE: &str = "data/teachers.json";

/// Default front-end directory, relative to the application directory.
const STATIC_DIR: &str = "static";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `SIGNUPS_`, sections split on `__`)
/// 2. TOML config file at `~/.config/signups/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP listener configuration.
    pub server: ServerConfig,
    /// Store document locations.
    pub storage: StorageConfig,
    /// Front-end asset configuration.
    pub assets: AssetsConfig,
}

/// HTTP listener configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
}

/// Store document locations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the activities document.
    /// Defaults to `data/activities.json` under the application directory.
    pub activities_path: Option<PathBuf>,
    /// Path to the teachers document.
    /// Defaults to `data/teachers.json` under the application directory.
    pub teachers_path: Option<PathBuf>,
}

/// Front-end asset configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetsConfig {
    /// Directory served under `/static`.
    /// Defaults to `static` under the application directory.
    pub static_dir: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
        }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(CONFIG_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Directory the default store and asset paths are resolved against.
    #[must_use]
    pub fn app_dir() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.server.host.trim().is_empty() {
            return Err(Error::ConfigValidation {
                message: "server.host must not be empty".to_string(),
            });
        }

        self.socket_addr()?;

        Ok(())
    }

    /// Get the address the server binds to.
    ///
    /// # Errors
    ///
    /// Returns an error if `host:port` is not a valid socket address.
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        let addr = format!("{}:{}", self.server.host, self.server.port);
        addr.parse().map_err(|_| Error::ConfigValidation {
            message: format!("invalid listen address: {addr}"),
        })
    }

    /// Get the activities document path, resolving defaults if not set.
    #[must_use]
    pub fn activities_path(&self) -> PathBuf {
        self.storage
            .activities_path
            .clone()
            .unwrap_or_else(|| Self::app_dir().join(ACTIVITIES_FILE))
    }

    /// Get the teachers document path, resolving defaults if not set.
    #[must_use]
    pub fn teachers_path(&self) -> PathBuf {
        self.storage
            .teachers_path
            .clone()
            .unwrap_or_else(|| Self::app_dir().join(TEACHERS_FILE))
    }

    /// Get the front-end directory, resolving defaults if not set.
    #[must_use]
    pub fn static_dir(&self) -> PathBuf {
        self.assets
            .static_dir
            .clone()
            .unwrap_or_else(|| Self::app_dir().join(STATIC_DIR))
    }
}
