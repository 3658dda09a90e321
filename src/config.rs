//! Server configuration
//!
//! Values resolve in three layers: built-in defaults, then environment
//! variables, then command-line flags.

use axum::http::HeaderValue;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{RelayError, Result};

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_FRONTEND_URL: &str = "http://localhost:5173";
pub const DEFAULT_HEARTBEAT_SECS: u64 = 30;
pub const DEFAULT_LOG_RETENTION_DAYS: u32 = 7;

pub const ENV_PORT: &str = "PORT";
pub const ENV_FRONTEND_URL: &str = "FRONTEND_URL";
pub const ENV_HOST: &str = "LFR_HOST";
pub const ENV_HEARTBEAT_SECS: &str = "LFR_HEARTBEAT_SECS";
pub const ENV_LOG_FILE: &str = "LFR_LOG_FILE";
pub const ENV_LOG_RETENTION_DAYS: &str = "LFR_LOG_RETENTION_DAYS";

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    /// Interface to bind
    pub host: String,
    pub port: u16,
    /// Only origin allowed by CORS
    pub frontend_url: String,
    /// Interval between WebSocket pings
    pub heartbeat_interval: Duration,
    /// Daily-rolling log file (stderr when unset)
    pub log_file: Option<PathBuf>,
    /// Rotated logs older than this are removed at startup
    pub log_retention_days: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            frontend_url: DEFAULT_FRONTEND_URL.to_string(),
            heartbeat_interval: Duration::from_secs(DEFAULT_HEARTBEAT_SECS),
            log_file: None,
            log_retention_days: DEFAULT_LOG_RETENTION_DAYS,
        }
    }
}

/// Values given explicitly on the command line
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub frontend_url: Option<String>,
    pub heartbeat_secs: Option<u64>,
    pub log_file: Option<PathBuf>,
}

impl ServerConfig {
    /// Defaults overlaid with the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overlaid with whatever `lookup` returns for each variable
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(host) = lookup(ENV_HOST) {
            config.host = host;
        }
        if let Some(port) = lookup(ENV_PORT) {
            config.port = parse_number(ENV_PORT, &port)?;
        }
        if let Some(url) = lookup(ENV_FRONTEND_URL) {
            config.frontend_url = url;
        }
        if let Some(secs) = lookup(ENV_HEARTBEAT_SECS) {
            config.heartbeat_interval = Duration::from_secs(parse_number(ENV_HEARTBEAT_SECS, &secs)?);
        }
        if let Some(path) = lookup(ENV_LOG_FILE) {
            config.log_file = Some(PathBuf::from(path));
        }
        if let Some(days) = lookup(ENV_LOG_RETENTION_DAYS) {
            config.log_retention_days = parse_number(ENV_LOG_RETENTION_DAYS, &days)?;
        }

        Ok(config)
    }

    /// Apply command-line values on top of this config
    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Self {
        if let Some(host) = overrides.host {
            self.host = host;
        }
        if let Some(port) = overrides.port {
            self.port = port;
        }
        if let Some(url) = overrides.frontend_url {
            self.frontend_url = url;
        }
        if let Some(secs) = overrides.heartbeat_secs {
            self.heartbeat_interval = Duration::from_secs(secs);
        }
        if overrides.log_file.is_some() {
            self.log_file = overrides.log_file;
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(RelayError::ConfigError("host must not be empty".to_string()));
        }
        if self.heartbeat_interval.is_zero() {
            return Err(RelayError::ConfigError(
                "heartbeat interval must be at least one second".to_string(),
            ));
        }
        self.frontend_origin()?;
        Ok(())
    }

    /// Frontend URL as a CORS origin header value
    pub fn frontend_origin(&self) -> Result<HeaderValue> {
        let url = self.frontend_url.trim_end_matches('/');
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(RelayError::ConfigError(format!(
                "frontend URL must start with http:// or https://: {}",
                self.frontend_url
            )));
        }
        HeaderValue::from_str(url).map_err(|_| {
            RelayError::ConfigError(format!("invalid frontend URL: {}", self.frontend_url))
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| RelayError::ConfigError(format!("{} must be a number, got '{}'", key, value)))
}
