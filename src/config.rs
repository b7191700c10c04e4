//! Application configuration management.
//!
//! Settings are merged from four layers, later layers winning:
//!
//! 1. Built-in defaults
//! 2. TOML file: `--config FILE`, else `config.toml` in the platform config
//!    directory
//! 3. Environment variables prefixed with `DUPESCAN_` (e.g.
//!    `DUPESCAN_MIN_SIZE_MB=10`)
//! 4. CLI flags, applied by the caller on top of the returned [`Config`]
//!
//! ```toml
//! min_size_mb = 5
//! io_threads = 4
//! snapshot_dir = "/var/lib/dupescan"
//! strict = false
//! ```

use anyhow::{Context, Result};
use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::duplicates::confirmer::DEFAULT_IO_THREADS;
use crate::duplicates::finder::DEFAULT_MIN_SIZE_MB;

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "DUPESCAN_";

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Minimum file size in megabytes.
    pub min_size_mb: u64,
    /// Fingerprinting threads.
    pub io_threads: usize,
    /// Where snapshots are stored; platform data dir when unset.
    pub snapshot_dir: Option<PathBuf>,
    /// Abort on the first per-file error.
    pub strict: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            min_size_mb: DEFAULT_MIN_SIZE_MB,
            io_threads: DEFAULT_IO_THREADS,
            snapshot_dir: None,
            strict: false,
        }
    }
}

impl Config {
    /// Load the layered configuration.
    ///
    /// Any failure (unreadable file, wrong types, bad environment value) is
    /// reported as a warning and the defaults are used instead.
    pub fn load(explicit: Option<&Path>) -> Self {
        match Self::try_load(explicit) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Ignoring configuration, using defaults: {:#}", e);
                Self::default()
            }
        }
    }

    /// Load the layered configuration, surfacing any failure.
    ///
    /// # Errors
    ///
    /// Fails on malformed TOML, type mismatches or a zero thread count.
    pub fn try_load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            if !path.exists() {
                log::warn!("Config file not found: {}", path.display());
            }
        }
        Self::extract(Self::figment(explicit))
    }

    /// The provider stack without CLI overrides.
    #[must_use]
    pub fn figment(explicit: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(path) = explicit.map(Path::to_path_buf).or_else(Self::default_path) {
            figment = figment.merge(Toml::file(path));
        }
        figment.merge(Env::prefixed(ENV_PREFIX))
    }

    /// Extract and validate a configuration.
    ///
    /// # Errors
    ///
    /// Fails on type mismatches or a zero thread count.
    pub fn extract(figment: Figment) -> Result<Self> {
        let config: Self = figment
            .extract()
            .context("Invalid dupescan configuration")?;
        if config.io_threads == 0 {
            anyhow::bail!("io_threads must be at least 1");
        }
        Ok(config)
    }

    /// Default config file location, if the platform has one.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "dupescan").map(|dirs| dirs.config_dir().join("config.toml"))
    }
}
