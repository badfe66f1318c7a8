//! In-process TTL cache for daily intake and nutrition reads.
//!
//! [`DailyIntakeCache`] holds four independent tables:
//!
//! | Table | Key | Value | Default TTL | Default cap |
//! |---|---|---|---|---|
//! | `intakes_by_date` | (email, date) | intake list | 10 min | 100 per user |
//! | `intakes_by_user` | email | intake list | 10 min | 100 |
//! | `nutrition_by_date` | (email, date) | nutrient map | 30 min | 100 per user |
//! | `nutrition_by_intake` | intake id | nutrient map | 30 min | 100 |
//!
//! # Expiry
//!
//! Expiry is checked lazily: a read of an expired entry is a miss but does
//! not remove it. Memory is reclaimed by [`DailyIntakeCache::sweep_expired`],
//! which [`SweepTask`] runs on a fixed interval, and by size-cap eviction,
//! which drops the oldest entries after every put that overflows a table.
//!
//! # Invalidation
//!
//! Services evict entries they know a mutation touched. Intake deletions
//! additionally arrive as [`IntakeDeleted`] events, which evict the dated
//! and per-intake entries. `intakes_by_user` is left to its TTL on deletion.
//!
//! # Failure semantics
//!
//! No operation fails or panics. A blank user identifier is logged and
//! ignored; empty lists and maps are not cached. The cache can be bypassed
//! entirely without changing results, only latency.

mod clock;
mod config;
mod entry;
mod sweeper;
mod table;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{
    CacheConfig, DEFAULT_INTAKES_TTL, DEFAULT_MAX_ENTRIES, DEFAULT_NUTRITION_TTL,
    DEFAULT_SWEEP_INTERVAL, TableConfig,
};
pub use entry::CacheEntry;
pub use sweeper::SweepTask;

use std::fmt;
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::events::{IntakeDeleted, IntakeEventListener};
use crate::telemetry;
use crate::types::{DailyIntake, IntakeId, NutritionMap};
use table::{NestedTable, Table, TablePolicy};

const INTAKES_BY_DATE: &str = "intakes_by_date";
const INTAKES_BY_USER: &str = "intakes_by_user";
const NUTRITION_BY_DATE: &str = "nutrition_by_date";
const NUTRITION_BY_INTAKE: &str = "nutrition_by_intake";
/// Log scope of operations spanning every user-keyed table.
const EVICT_ALL_SCOPE: &str = "evict_all_for_user";

/// Shared, immutable intake list as stored in and returned from the cache.
pub type IntakeList = Arc<[DailyIntake]>;

/// Per-table entry counts, used for stats and sweep reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TableCounts {
    pub intakes_by_date: usize,
    pub intakes_by_user: usize,
    pub nutrition_by_date: usize,
    pub nutrition_by_intake: usize,
}

impl TableCounts {
    pub fn total(&self) -> usize {
        self.intakes_by_date
            + self.intakes_by_user
            + self.nutrition_by_date
            + self.nutrition_by_intake
    }
}

/// TTL cache for intake lists and nutrition totals.
///
/// Thread-safe; share it behind an `Arc`. Construct one per process.
pub struct DailyIntakeCache {
    intakes_by_date: NestedTable<String, NaiveDate, IntakeList>,
    intakes_by_user: Table<String, IntakeList>,
    nutrition_by_date: NestedTable<String, NaiveDate, Arc<NutritionMap>>,
    nutrition_by_intake: Table<IntakeId, Arc<NutritionMap>>,
    clock: Arc<dyn Clock>,
}

impl DailyIntakeCache {
    /// Create a cache on the system clock.
    pub fn new(config: &CacheConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Create a cache that reads time from `clock`.
    pub fn with_clock(config: &CacheConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            intakes_by_date: NestedTable::new(TablePolicy::new(
                INTAKES_BY_DATE,
                &config.intakes_by_date,
            )),
            intakes_by_user: Table::new(TablePolicy::new(
                INTAKES_BY_USER,
                &config.intakes_by_user,
            )),
            nutrition_by_date: NestedTable::new(TablePolicy::new(
                NUTRITION_BY_DATE,
                &config.nutrition_by_date,
            )),
            nutrition_by_intake: Table::new(TablePolicy::new(
                NUTRITION_BY_INTAKE,
                &config.nutrition_by_intake,
            )),
            clock,
        }
    }

    // ===== intakes_by_date =====

    /// Cache a user's intakes for one date.
    pub fn put_intakes_for_date(&self, user: &str, date: NaiveDate, intakes: &[DailyIntake]) {
        let table = self.intakes_by_date.name();
        if !accepts_user(table, user) || !accepts_value(table, intakes.is_empty()) {
            return;
        }
        let evicted = self.intakes_by_date.insert(
            user.to_string(),
            date,
            Arc::from(intakes),
            self.clock.now(),
        );
        record_capacity_evictions(table, evicted);
    }

    pub fn intakes_for_date(&self, user: &str, date: NaiveDate) -> Option<IntakeList> {
        let table = self.intakes_by_date.name();
        if !accepts_user(table, user) {
            return None;
        }
        let hit = self.intakes_by_date.get(user, &date, self.clock.now());
        record_lookup(table, &user, hit.as_ref().map(|list| list.len()));
        hit
    }

    pub fn evict_intakes_for_date(&self, user: &str, date: NaiveDate) {
        let removed = self.intakes_by_date.remove(user, &date);
        record_explicit_eviction(self.intakes_by_date.name(), removed);
    }

    // ===== intakes_by_user =====

    /// Cache all of a user's intakes, regardless of date.
    pub fn put_user_intakes(&self, user: &str, intakes: &[DailyIntake]) {
        let table = self.intakes_by_user.name();
        if !accepts_user(table, user) || !accepts_value(table, intakes.is_empty()) {
            return;
        }
        let evicted = self
            .intakes_by_user
            .insert(user.to_string(), Arc::from(intakes), self.clock.now());
        record_capacity_evictions(table, evicted);
    }

    pub fn user_intakes(&self, user: &str) -> Option<IntakeList> {
        let table = self.intakes_by_user.name();
        if !accepts_user(table, user) {
            return None;
        }
        let hit = self.intakes_by_user.get(user, self.clock.now());
        record_lookup(table, &user, hit.as_ref().map(|list| list.len()));
        hit
    }

    pub fn evict_user_intakes(&self, user: &str) {
        let removed = self.intakes_by_user.remove(user);
        record_explicit_eviction(self.intakes_by_user.name(), removed);
    }

    // ===== nutrition_by_date =====

    /// Cache a user's nutrition totals for one date.
    pub fn put_daily_nutrition(&self, user: &str, date: NaiveDate, nutrition: &NutritionMap) {
        let table = self.nutrition_by_date.name();
        if !accepts_user(table, user) || !accepts_value(table, nutrition.is_empty()) {
            return;
        }
        let evicted = self.nutrition_by_date.insert(
            user.to_string(),
            date,
            Arc::new(nutrition.clone()),
            self.clock.now(),
        );
        record_capacity_evictions(table, evicted);
    }

    pub fn daily_nutrition(&self, user: &str, date: NaiveDate) -> Option<Arc<NutritionMap>> {
        let table = self.nutrition_by_date.name();
        if !accepts_user(table, user) {
            return None;
        }
        let hit = self.nutrition_by_date.get(user, &date, self.clock.now());
        record_lookup(table, &user, hit.as_ref().map(|map| map.len()));
        hit
    }

    pub fn evict_daily_nutrition(&self, user: &str, date: NaiveDate) {
        let removed = self.nutrition_by_date.remove(user, &date);
        record_explicit_eviction(self.nutrition_by_date.name(), removed);
    }

    // ===== nutrition_by_intake =====

    /// Cache the nutrition totals of a single intake.
    pub fn put_intake_nutrition(&self, intake_id: IntakeId, nutrition: &NutritionMap) {
        let table = self.nutrition_by_intake.name();
        if !accepts_value(table, nutrition.is_empty()) {
            return;
        }
        let evicted = self.nutrition_by_intake.insert(
            intake_id,
            Arc::new(nutrition.clone()),
            self.clock.now(),
        );
        record_capacity_evictions(table, evicted);
    }

    pub fn intake_nutrition(&self, intake_id: IntakeId) -> Option<Arc<NutritionMap>> {
        let table = self.nutrition_by_intake.name();
        let hit = self.nutrition_by_intake.get(&intake_id, self.clock.now());
        record_lookup(table, &intake_id, hit.as_ref().map(|map| map.len()));
        hit
    }

    pub fn evict_intake_nutrition(&self, intake_id: IntakeId) {
        let removed = self.nutrition_by_intake.remove(&intake_id);
        record_explicit_eviction(self.nutrition_by_intake.name(), removed);
    }

    // ===== cross-table =====

    /// Drop everything cached under `user` in the three user-keyed tables.
    ///
    /// Used when the user's email changes or the user is deleted.
    /// `nutrition_by_intake` is keyed by intake id; callers evict those
    /// entries individually.
    pub fn evict_all_for_user(&self, user: &str) {
        if !accepts_user(EVICT_ALL_SCOPE, user) {
            return;
        }
        let dated = self.intakes_by_date.remove_all(user);
        let listed = usize::from(self.intakes_by_user.remove(user));
        let nutrition = self.nutrition_by_date.remove_all(user);
        debug!(
            user,
            intakes_by_date = dated,
            intakes_by_user = listed,
            nutrition_by_date = nutrition,
            "evicted all entries for user"
        );
    }

    /// Remove expired entries from every table, and drop users whose dated
    /// sub-tables end up empty. Returns how many entries each table lost.
    pub fn sweep_expired(&self) -> TableCounts {
        let now = self.clock.now();
        let report = TableCounts {
            intakes_by_date: self.intakes_by_date.purge_expired(now),
            intakes_by_user: self.intakes_by_user.purge_expired(now),
            nutrition_by_date: self.nutrition_by_date.purge_expired(now),
            nutrition_by_intake: self.nutrition_by_intake.purge_expired(now),
        };
        record_swept(INTAKES_BY_DATE, report.intakes_by_date);
        record_swept(INTAKES_BY_USER, report.intakes_by_user);
        record_swept(NUTRITION_BY_DATE, report.nutrition_by_date);
        record_swept(NUTRITION_BY_INTAKE, report.nutrition_by_intake);
        report
    }

    /// Stored entries per table, including expired ones not yet swept.
    pub fn stats(&self) -> TableCounts {
        TableCounts {
            intakes_by_date: self.intakes_by_date.len(),
            intakes_by_user: self.intakes_by_user.len(),
            nutrition_by_date: self.nutrition_by_date.len(),
            nutrition_by_intake: self.nutrition_by_intake.len(),
        }
    }

    /// Users with at least one dated intake or nutrition entry.
    pub fn cached_users(&self) -> usize {
        let nutrition_only = self
            .nutrition_by_date
            .outer_keys()
            .iter()
            .filter(|user| !self.intakes_by_date.contains_outer(user.as_str()))
            .count();
        self.intakes_by_date.outer_len() + nutrition_only
    }

    /// Dated intake entries stored for one user.
    pub fn dated_intake_entries(&self, user: &str) -> usize {
        self.intakes_by_date.len_for(user)
    }
}

impl IntakeEventListener for DailyIntakeCache {
    fn on_intake_deleted(&self, event: &IntakeDeleted) {
        self.evict_intakes_for_date(&event.user, event.date);
        self.evict_daily_nutrition(&event.user, event.date);
        self.evict_intake_nutrition(event.intake_id);
        debug!(
            user = %event.user,
            date = %event.date,
            intake_id = event.intake_id,
            "evicted entries for deleted intake"
        );
    }
}

impl fmt::Debug for DailyIntakeCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DailyIntakeCache")
            .field("stats", &self.stats())
            .field("clock", &self.clock)
            .finish()
    }
}

/// `scope` is the table, or the cross-table operation, being called.
fn accepts_user(scope: &'static str, user: &str) -> bool {
    if user.trim().is_empty() {
        warn!(scope, "ignoring cache call with blank user identifier");
        return false;
    }
    true
}

fn accepts_value(table: &'static str, is_empty: bool) -> bool {
    if is_empty {
        debug!(table, "not caching empty result");
        return false;
    }
    true
}

fn record_lookup(table: &'static str, key: &dyn fmt::Display, hit_len: Option<usize>) {
    match hit_len {
        Some(entries) => {
            metrics::counter!(telemetry::CACHE_HITS_TOTAL, "table" => table).increment(1);
            debug!(table, key = %key, entries, "cache hit");
        }
        None => {
            metrics::counter!(telemetry::CACHE_MISSES_TOTAL, "table" => table).increment(1);
            debug!(table, key = %key, "cache miss");
        }
    }
}

fn record_capacity_evictions(table: &'static str, evicted: usize) {
    if evicted > 0 {
        metrics::counter!(
            telemetry::CACHE_EVICTIONS_TOTAL,
            "table" => table,
            "reason" => "capacity"
        )
        .increment(evicted as u64);
        debug!(table, evicted, "evicted oldest entries over capacity");
    }
}

fn record_explicit_eviction(table: &'static str, removed: bool) {
    if removed {
        metrics::counter!(
            telemetry::CACHE_EVICTIONS_TOTAL,
            "table" => table,
            "reason" => "explicit"
        )
        .increment(1);
    }
}

fn record_swept(table: &'static str, removed: usize) {
    if removed > 0 {
        metrics::counter!(telemetry::CACHE_SWEPT_TOTAL, "table" => table).increment(removed as u64);
    }
}
