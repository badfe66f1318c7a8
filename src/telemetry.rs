//! Telemetry metric name constants.
//!
//! Consumers install their own `metrics` recorder (e.g. prometheus, statsd);
//! without a recorder installed, all metric calls are no-ops.
//!
//! # Metric naming conventions
//!
//! All metrics are prefixed with `calorie_`. Counters end in `_total`.
//!
//! # Common labels
//!
//! - `table`: cache table, "intakes_by_date", "intakes_by_user",
//!   "nutrition_by_date" or "nutrition_by_intake"
//! - `reason`: why an entry left the cache: "capacity" or "explicit"

/// Cache lookups that returned a live entry.
///
/// Labels: `table`.
pub const CACHE_HITS_TOTAL: &str = "calorie_cache_hits_total";

/// Cache lookups that found nothing or an expired entry.
///
/// Labels: `table`.
pub const CACHE_MISSES_TOTAL: &str = "calorie_cache_misses_total";

/// Entries removed by size-cap enforcement or explicit eviction.
///
/// Labels: `table`, `reason`.
pub const CACHE_EVICTIONS_TOTAL: &str = "calorie_cache_evictions_total";

/// Expired entries reclaimed by the background sweep.
///
/// Labels: `table`.
pub const CACHE_SWEPT_TOTAL: &str = "calorie_cache_swept_total";

/// Intake-deletion events delivered to listeners.
pub const INTAKE_DELETED_EVENTS_TOTAL: &str = "calorie_intake_deleted_events_total";
