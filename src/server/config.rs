//! Configuration loading for calorie-counterd.
//!
//! Configuration is loaded from TOML files with the following resolution order:
//! 1. `--config <path>` (CLI flag)
//! 2. `~/.calorie-counter/config.toml` (user)
//! 3. `/etc/calorie-counter/config.toml` (system)
//!
//! Unlike an explicit path, the default locations are optional: with no file
//! present the daemon runs on built-in defaults.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::cache::{CacheConfig, TableConfig};
use crate::{CalorieError, Result};

/// Daemon configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub cache: CacheSection,
    #[serde(default)]
    pub log: LogSection,
}

/// `[cache]` section. Table settings left out keep their defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheSection {
    /// Seconds between expiry sweeps (default: 60).
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
    #[serde(default)]
    pub intakes_by_date: TableSection,
    #[serde(default)]
    pub intakes_by_user: TableSection,
    #[serde(default)]
    pub nutrition_by_date: TableSection,
    #[serde(default)]
    pub nutrition_by_intake: TableSection,
}

impl Default for CacheSection {
    fn default() -> Self {
        Self {
            sweep_interval_secs: default_sweep_interval_secs(),
            intakes_by_date: TableSection::default(),
            intakes_by_user: TableSection::default(),
            nutrition_by_date: TableSection::default(),
            nutrition_by_intake: TableSection::default(),
        }
    }
}

fn default_sweep_interval_secs() -> u64 {
    60
}

/// Overrides for one cache table.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct TableSection {
    #[serde(default)]
    pub ttl_minutes: Option<u64>,
    #[serde(default)]
    pub max_entries: Option<usize>,
}

impl TableSection {
    fn apply(self, name: &str, base: TableConfig) -> Result<TableConfig> {
        let mut table = base;
        if let Some(minutes) = self.ttl_minutes {
            let secs = minutes.checked_mul(60).ok_or_else(|| {
                CalorieError::Configuration(format!(
                    "cache.{name}.ttl_minutes is too large: {minutes}"
                ))
            })?;
            table = table.ttl(Duration::from_secs(secs));
        }
        if let Some(n) = self.max_entries {
            table = table.max_entries(n);
        }
        Ok(table)
    }
}

/// `[log]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct LogSection {
    /// `tracing_subscriber::EnvFilter` directive (default: "info").
    #[serde(default = "default_log_filter")]
    pub filter: String,
    /// Seconds between cache statistics log lines; 0 disables them
    /// (default: 300).
    #[serde(default = "default_stats_interval_secs")]
    pub stats_interval_secs: u64,
}

impl Default for LogSection {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
            stats_interval_secs: default_stats_interval_secs(),
        }
    }
}

fn default_log_filter() -> String {
    "info".to_string()
}

fn default_stats_interval_secs() -> u64 {
    300
}

impl Config {
    /// Load configuration from the standard locations.
    ///
    /// Resolution order:
    /// 1. Explicit path (if provided; must exist)
    /// 2. `~/.calorie-counter/config.toml`
    /// 3. `/etc/calorie-counter/config.toml`
    ///
    /// Returns the defaults when no implicit location has a file.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        match Self::resolve_config_path(explicit_path)? {
            Some(path) => Self::load_from_file(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            CalorieError::Configuration(format!("Failed to read config file {path:?}: {e}"))
        })?;
        toml::from_str(&content).map_err(|e| {
            CalorieError::Configuration(format!("Failed to parse config file {path:?}: {e}"))
        })
    }

    fn resolve_config_path(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
        if let Some(path) = explicit {
            if path.exists() {
                return Ok(Some(path.to_path_buf()));
            }
            return Err(CalorieError::Configuration(format!(
                "Config file not found: {path:?}"
            )));
        }

        // User config
        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".calorie-counter").join("config.toml");
            if user_config.exists() {
                return Ok(Some(user_config));
            }
        }

        // System config
        let system_config = PathBuf::from("/etc/calorie-counter/config.toml");
        if system_config.exists() {
            return Ok(Some(system_config));
        }

        Ok(None)
    }

    /// Translate the `[cache]` section into a validated [`CacheConfig`].
    pub fn cache_config(&self) -> Result<CacheConfig> {
        let base = CacheConfig::default();
        let section = &self.cache;
        let config = CacheConfig::new()
            .intakes_by_date(
                section
                    .intakes_by_date
                    .apply("intakes_by_date", base.intakes_by_date)?,
            )
            .intakes_by_user(
                section
                    .intakes_by_user
                    .apply("intakes_by_user", base.intakes_by_user)?,
            )
            .nutrition_by_date(
                section
                    .nutrition_by_date
                    .apply("nutrition_by_date", base.nutrition_by_date)?,
            )
            .nutrition_by_intake(
                section
                    .nutrition_by_intake
                    .apply("nutrition_by_intake", base.nutrition_by_intake)?,
            )
            .sweep_interval(Duration::from_secs(section.sweep_interval_secs));
        config.validate()?;
        Ok(config)
    }

    /// Interval for periodic cache statistics, if enabled.
    pub fn stats_interval(&self) -> Option<Duration> {
        let secs = self.log.stats_interval_secs;
        (secs > 0).then(|| Duration::from_secs(secs))
    }
}
