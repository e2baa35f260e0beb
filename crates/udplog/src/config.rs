// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::env;

use crate::collector::CollectorConfig;
use crate::errors::ConfigError;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 12345;
pub const DEFAULT_WORKERS: usize = 3;
pub const DEFAULT_LOG_LEVEL: &str = "info";

const VALID_LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Collector process configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Address to bind the UDP socket to (e.g., "0.0.0.0")
    pub host: String,
    /// UDP port to listen on
    pub port: u16,
    /// Number of tasks receiving from the socket concurrently
    pub workers: usize,
    /// Log level (e.g., trace, debug, info, warn, error)
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            workers: DEFAULT_WORKERS,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl Config {
    /// Create configuration from `UDPLOG_*` environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Create configuration from an arbitrary key lookup.
    ///
    /// Unset keys fall back to defaults; set but unparsable numbers are errors
    /// rather than silently replaced.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let host = lookup("UDPLOG_HOST")
            .map(|val| val.trim().to_string())
            .unwrap_or(defaults.host);
        let port = match lookup("UDPLOG_PORT") {
            Some(val) => val.trim().parse::<u16>().map_err(|e| {
                ConfigError::InvalidConfig(format!("UDPLOG_PORT '{val}' is not a port: {e}"))
            })?,
            None => defaults.port,
        };
        let workers = match lookup("UDPLOG_WORKERS") {
            Some(val) => val.trim().parse::<usize>().map_err(|e| {
                ConfigError::InvalidConfig(format!("UDPLOG_WORKERS '{val}' is not a count: {e}"))
            })?,
            None => defaults.workers,
        };
        let log_level = lookup("UDPLOG_LOG_LEVEL")
            .map(|val| val.trim().to_lowercase())
            .unwrap_or(defaults.log_level);

        let config = Self {
            host,
            port,
            workers,
            log_level,
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.is_empty() {
            return Err(ConfigError::InvalidConfig(
                "UDPLOG_HOST cannot be empty".to_string(),
            ));
        }

        if self.port == 0 {
            return Err(ConfigError::InvalidConfig(
                "UDPLOG_PORT must be greater than 0".to_string(),
            ));
        }

        if self.workers == 0 {
            return Err(ConfigError::InvalidConfig(
                "UDPLOG_WORKERS must be greater than 0".to_string(),
            ));
        }

        if !VALID_LOG_LEVELS.contains(&self.log_level.as_str()) {
            return Err(ConfigError::InvalidConfig(format!(
                "Invalid log level '{}'. Must be one of: trace, debug, info, warn, error",
                self.log_level
            )));
        }

        Ok(())
    }

    pub fn collector_config(&self) -> CollectorConfig {
        CollectorConfig {
            host: self.host.clone(),
            port: self.port,
            workers: self.workers,
        }
    }
}
