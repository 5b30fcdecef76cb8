//! Configuration management for reelsync
//!
//! This module handles loading and validating configuration from environment
//! variables and TOML files.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

const HOUR_SECS: u64 = 60 * 60;

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Sync pass configuration
    pub sync: SyncConfig,

    /// Program store configuration
    pub storage: StorageConfig,

    /// Listing source configuration
    pub listing: ListingConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Sync-specific configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Maximum operations per atomic store apply
    pub batch_size: usize,

    /// Seconds between periodic passes
    pub period_secs: u64,

    /// Window length of a periodic pass, in seconds
    pub periodic_lookahead_secs: u64,

    /// Window length of an on-demand pass, in seconds
    pub immediate_lookahead_secs: u64,
}

/// Program store configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// SQLite database path
    pub sqlite_path: PathBuf,
}

/// Listing source configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingConfig {
    /// JSON listing document
    pub path: PathBuf,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (text, json)
    pub format: String,
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse::<T>().ok())
}

impl Config {
    /// Load configuration from environment variables, falling back to defaults
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let config = Self {
            sync: SyncConfig {
                batch_size: env_parse("REELSYNC_BATCH_SIZE").unwrap_or(defaults.sync.batch_size),
                period_secs: env_parse("REELSYNC_SYNC_PERIOD_SECS")
                    .unwrap_or(defaults.sync.period_secs),
                periodic_lookahead_secs: env_parse("REELSYNC_PERIODIC_LOOKAHEAD_SECS")
                    .unwrap_or(defaults.sync.periodic_lookahead_secs),
                immediate_lookahead_secs: env_parse("REELSYNC_IMMEDIATE_LOOKAHEAD_SECS")
                    .unwrap_or(defaults.sync.immediate_lookahead_secs),
            },
            storage: StorageConfig {
                sqlite_path: std::env::var("REELSYNC_SQLITE_PATH")
                    .map(PathBuf::from)
                    .unwrap_or(defaults.storage.sqlite_path),
            },
            listing: ListingConfig {
                path: std::env::var("REELSYNC_LISTING_PATH")
                    .map(PathBuf::from)
                    .unwrap_or(defaults.listing.path),
            },
            logging: LoggingConfig {
                level: std::env::var("REELSYNC_LOG_LEVEL").unwrap_or(defaults.logging.level),
                format: std::env::var("REELSYNC_LOG_FORMAT").unwrap_or(defaults.logging.format),
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config file: {}", path.display()))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.sync.batch_size == 0 {
            anyhow::bail!("batch_size must be greater than 0");
        }

        if self.sync.period_secs == 0 {
            anyhow::bail!("period_secs must be greater than 0");
        }

        if !matches!(self.logging.format.as_str(), "text" | "json") {
            anyhow::bail!(
                "log format must be 'text' or 'json', got '{}'",
                self.logging.format
            );
        }

        Ok(())
    }

    #[must_use]
    pub fn sync_period(&self) -> Duration {
        Duration::from_secs(self.sync.period_secs)
    }

    #[must_use]
    pub fn periodic_lookahead(&self) -> Duration {
        Duration::from_secs(self.sync.periodic_lookahead_secs)
    }

    #[must_use]
    pub fn immediate_lookahead(&self) -> Duration {
        Duration::from_secs(self.sync.immediate_lookahead_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sync: SyncConfig {
                batch_size: 100,
                period_secs: 12 * HOUR_SECS,
                periodic_lookahead_secs: 48 * HOUR_SECS,
                immediate_lookahead_secs: HOUR_SECS,
            },
            storage: StorageConfig {
                sqlite_path: PathBuf::from("data/programs.db"),
            },
            listing: ListingConfig {
                path: PathBuf::from("listing.json"),
            },
            logging: LoggingConfig {
                level: String::from("info"),
                format: String::from("text"),
            },
        }
    }
}
