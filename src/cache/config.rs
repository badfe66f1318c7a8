//! Cache configuration.

use std::time::Duration;

use crate::{CalorieError, Result};

/// TTL for the intake-list tables. Default: 10 minutes.
pub const DEFAULT_INTAKES_TTL: Duration = Duration::from_secs(10 * 60);
/// TTL for the nutrition tables. Default: 30 minutes.
pub const DEFAULT_NUTRITION_TTL: Duration = Duration::from_secs(30 * 60);
/// Size cap per table (per user for the dated tables). Default: 100.
pub const DEFAULT_MAX_ENTRIES: usize = 100;
/// Interval between background sweeps. Default: 1 minute.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// TTL and size cap for one cache table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableConfig {
    /// Time-to-live measured from insertion.
    pub ttl: Duration,
    /// Maximum entries; for dated tables this applies per user.
    pub max_entries: usize,
}

impl TableConfig {
    pub const fn new(ttl: Duration, max_entries: usize) -> Self {
        Self { ttl, max_entries }
    }

    /// Set the time-to-live.
    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Set the size cap.
    pub fn max_entries(mut self, n: usize) -> Self {
        self.max_entries = n;
        self
    }
}

/// Configuration for [`DailyIntakeCache`](super::DailyIntakeCache).
///
/// ```rust
/// # use calorie_counter::cache::{CacheConfig, TableConfig};
/// # use std::time::Duration;
/// let config = CacheConfig::new()
///     .nutrition_by_date(TableConfig::new(Duration::from_secs(3600), 50))
///     .sweep_interval(Duration::from_secs(30));
/// assert_eq!(config.nutrition_by_date.max_entries, 50);
/// assert_eq!(config.intakes_by_date.ttl, Duration::from_secs(600));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Intake lists keyed by (user, date). Default: 10 minutes, 100 per user.
    pub intakes_by_date: TableConfig,
    /// Intake lists keyed by user only. Default: 10 minutes, 100 total.
    pub intakes_by_user: TableConfig,
    /// Nutrition totals keyed by (user, date). Default: 30 minutes, 100 per user.
    pub nutrition_by_date: TableConfig,
    /// Nutrition totals keyed by intake id. Default: 30 minutes, 100 total.
    pub nutrition_by_intake: TableConfig,
    /// How often the background sweep runs. Default: 1 minute.
    pub sweep_interval: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            intakes_by_date: TableConfig::new(DEFAULT_INTAKES_TTL, DEFAULT_MAX_ENTRIES),
            intakes_by_user: TableConfig::new(DEFAULT_INTAKES_TTL, DEFAULT_MAX_ENTRIES),
            nutrition_by_date: TableConfig::new(DEFAULT_NUTRITION_TTL, DEFAULT_MAX_ENTRIES),
            nutrition_by_intake: TableConfig::new(DEFAULT_NUTRITION_TTL, DEFAULT_MAX_ENTRIES),
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
        }
    }
}

impl CacheConfig {
    /// Create a config with the default TTLs and caps.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intakes_by_date(mut self, table: TableConfig) -> Self {
        self.intakes_by_date = table;
        self
    }

    pub fn intakes_by_user(mut self, table: TableConfig) -> Self {
        self.intakes_by_user = table;
        self
    }

    pub fn nutrition_by_date(mut self, table: TableConfig) -> Self {
        self.nutrition_by_date = table;
        self
    }

    pub fn nutrition_by_intake(mut self, table: TableConfig) -> Self {
        self.nutrition_by_intake = table;
        self
    }

    /// Set the background sweep interval.
    pub fn sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = interval;
        self
    }

    /// Reject settings the sweep task cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.sweep_interval.is_zero() {
            return Err(CalorieError::Configuration(
                "cache sweep interval must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = CacheConfig::default();
        assert_eq!(config.intakes_by_date, TableConfig::new(DEFAULT_INTAKES_TTL, 100));
        assert_eq!(config.intakes_by_user.ttl, Duration::from_secs(600));
        assert_eq!(config.nutrition_by_date.ttl, Duration::from_secs(1800));
        assert_eq!(config.nutrition_by_intake.max_entries, 100);
        assert_eq!(config.sweep_interval, Duration::from_secs(60));
    }

    #[test]
    fn table_config_builder() {
        let table = TableConfig::new(DEFAULT_INTAKES_TTL, 1)
            .ttl(Duration::from_secs(5))
            .max_entries(7);
        assert_eq!(table, TableConfig::new(Duration::from_secs(5), 7));
    }

    #[test]
    fn zero_sweep_interval_is_rejected() {
        let config = CacheConfig::new().sweep_interval(Duration::ZERO);
        let err = config.validate().unwrap_err();
        assert!(matches!(err, CalorieError::Configuration(_)));
        assert!(CacheConfig::default().validate().is_ok());
    }
}
