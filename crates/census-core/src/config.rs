//! Configuration management for census-mcp.
//!
//! Handles loading and saving configuration from TOML files.
//! Config files are stored in platform-specific locations:
//!
//! - **macOS/Linux**: `~/.config/census-mcp/config.toml`
//! - **Windows**: `%APPDATA%\census-mcp\config.toml`
//!
//! # Example
//!
//! ```ignore
//! use census_core::config::Config;
//!
//! let mut config = Config::load()?;
//! config.set("server.transport", "sse")?;
//! config.save()?;
//! ```

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Config file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Config directory name.
const CONFIG_DIR_NAME: &str = "census-mcp";

/// Environment variable holding the Census API key.
pub const API_KEY_ENV: &str = "CENSUS_API_KEY";

/// Environment variable overriding the log level.
pub const LOG_LEVEL_ENV: &str = "LOG_LEVEL";

/// Environment variable naming a log file.
pub const LOG_FILE_ENV: &str = "LOG_FILE";

/// Default port of the SSE listener.
pub const DEFAULT_PORT: u16 = 8080;

// =============================================================================
// Configuration structures
// =============================================================================

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Census API access
    #[serde(default)]
    pub census: CensusConfig,

    /// MCP server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Logging settings
    #[serde(default)]
    pub log: LogConfig,
}

/// Census API configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CensusConfig {
    /// API key appended to data requests
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// API base URL (defaults to https://api.census.gov)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

/// Transport the MCP server speaks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    /// Newline-delimited JSON-RPC over stdin/stdout
    #[default]
    Stdio,
    /// HTTP listener with a server-sent events stream
    Sse,
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transport::Stdio => f.write_str("stdio"),
            Transport::Sse => f.write_str("sse"),
        }
    }
}

impl FromStr for Transport {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "stdio" => Ok(Transport::Stdio),
            "sse" => Ok(Transport::Sse),
            other => Err(format!(
                "unknown transport '{}', expected 'stdio' or 'sse'",
                other
            )),
        }
    }
}

/// MCP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub transport: Transport,
    /// Bind address of the SSE listener
    #[serde(default = "default_host")]
    pub host: String,
    /// Port of the SSE listener
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            transport: Transport::default(),
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogConfig {
    /// Log level (debug, info, warn, error)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    /// Append logs to this file instead of stderr
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

// =============================================================================
// Config implementation
// =============================================================================

impl Config {
    /// Get the configuration directory path.
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|p| p.join(CONFIG_DIR_NAME))
            .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))
    }

    /// Get the configuration file path.
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join(CONFIG_FILE_NAME))
    }

    /// Load configuration from the default location.
    ///
    /// Returns a default config if the file doesn't exist.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        Self::load_from(&path)
    }

    /// Load configuration from a specific path.
    ///
    /// Returns a default config if the file doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = ?path, "Config file does not exist, using defaults");
            return Ok(Self::default());
        }

        debug!(path = ?path, "Loading config");

        let contents = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read config file: {}", e)))?;

        let config: Config = toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse config file: {}", e)))?;

        info!(path = ?path, "Config loaded successfully");
        Ok(config)
    }

    /// Save configuration to the default location.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        self.save_to(&path)
    }

    /// Save configuration to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| Error::Config(format!("Failed to create config directory: {}", e)))?;
        }

        debug!(path = ?path, "Saving config");

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, contents)
            .map_err(|e| Error::Config(format!("Failed to write config file: {}", e)))?;

        info!(path = ?path, "Config saved successfully");
        Ok(())
    }

    /// Resolve the API key: explicit value, then `CENSUS_API_KEY`, then the file.
    pub fn resolve_api_key(&self, explicit: Option<&str>) -> Result<String> {
        let from_env = std::env::var(API_KEY_ENV).ok();
        self.resolve_api_key_with(explicit, from_env.as_deref())
    }

    fn resolve_api_key_with(&self, explicit: Option<&str>, from_env: Option<&str>) -> Result<String> {
        [explicit, from_env, self.census.api_key.as_deref()]
            .into_iter()
            .flatten()
            .find(|key| !key.is_empty())
            .map(str::to_string)
            .ok_or_else(|| {
                Error::Config(format!(
                    "Census API key not provided: pass --key or set {}",
                    API_KEY_ENV
                ))
            })
    }

    /// Resolve the log level: explicit value, then `LOG_LEVEL`, then the file, then "info".
    pub fn resolve_log_level(&self, explicit: Option<&str>) -> String {
        let from_env = std::env::var(LOG_LEVEL_ENV).ok();
        self.resolve_log_level_with(explicit, from_env.as_deref())
    }

    fn resolve_log_level_with(&self, explicit: Option<&str>, from_env: Option<&str>) -> String {
        [explicit, from_env, self.log.level.as_deref()]
            .into_iter()
            .flatten()
            .find(|level| !level.is_empty())
            .unwrap_or("info")
            .to_lowercase()
    }

    /// Resolve the log file: `LOG_FILE`, then the file.
    pub fn resolve_log_file(&self) -> Option<PathBuf> {
        std::env::var(LOG_FILE_ENV)
            .ok()
            .filter(|path| !path.is_empty())
            .map(PathBuf::from)
            .or_else(|| self.log.file.clone())
    }

    /// Set a configuration value by key path.
    ///
    /// Key format: `section.field` (e.g., `census.api_key`, `server.port`)
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let (section, field) = split_key(key)?;

        match (section, field) {
            ("census", "api_key" | "key") => self.census.api_key = Some(value.to_string()),
            ("census", "base_url" | "url") => self.census.base_url = Some(value.to_string()),
            ("server", "transport") => {
                self.server.transport = value.parse().map_err(Error::Config)?;
            }
            ("server", "host") => self.server.host = value.to_string(),
            ("server", "port") => {
                self.server.port = value
                    .parse()
                    .map_err(|_| Error::Config(format!("Invalid port: {}", value)))?;
            }
            ("log", "level") => self.log.level = Some(value.to_string()),
            ("log", "file") => self.log.file = Some(PathBuf::from(value)),
            ("census" | "server" | "log", _) => {
                return Err(Error::Config(format!(
                    "Unknown {} config field: {}",
                    section, field
                )))
            }
            _ => return Err(Error::Config(format!("Unknown section: {}", section))),
        }

        Ok(())
    }

    /// Get a configuration value by key path.
    ///
    /// Key format: `section.field` (e.g., `census.api_key`, `server.port`)
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        let (section, field) = split_key(key)?;

        match (section, field) {
            ("census", "api_key" | "key") => Ok(self.census.api_key.clone()),
            ("census", "base_url" | "url") => Ok(self.census.base_url.clone()),
            ("server", "transport") => Ok(Some(self.server.transport.to_string())),
            ("server", "host") => Ok(Some(self.server.host.clone())),
            ("server", "port") => Ok(Some(self.server.port.to_string())),
            ("log", "level") => Ok(self.log.level.clone()),
            ("log", "file") => Ok(self.log.file.as_ref().map(|p| p.display().to_string())),
            ("census" | "server" | "log", _) => Err(Error::Config(format!(
                "Unknown {} config field: {}",
                section, field
            ))),
            _ => Err(Error::Config(format!("Unknown section: {}", section))),
        }
    }
}

fn split_key(key: &str) -> Result<(&str, &str)> {
    let parts: Vec<&str> = key.split('.').collect();
    if parts.len() != 2 {
        return Err(Error::Config(format!(
            "Invalid config key '{}'. Expected format: section.field",
            key
        )));
    }
    Ok((parts[0], parts[1]))
}

// =============================================================================
// Tests
// =============================================================================
