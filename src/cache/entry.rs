//! A single cached value with its creation time and TTL.

use chrono::{DateTime, TimeDelta, Utc};

/// An immutable cache entry.
///
/// Entries are never updated in place; a put replaces the whole entry.
/// `seq` is a per-table insertion counter that orders entries created within
/// the same clock tick.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    value: V,
    created_at: DateTime<Utc>,
    ttl: TimeDelta,
    seq: u64,
}

impl<V> CacheEntry<V> {
    pub(crate) fn new(value: V, created_at: DateTime<Utc>, ttl: TimeDelta, seq: u64) -> Self {
        Self {
            value,
            created_at,
            ttl,
            seq,
        }
    }

    pub fn value(&self) -> &V {
        &self.value
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn ttl(&self) -> TimeDelta {
        self.ttl
    }

    /// `true` once `now` is strictly past `created_at + ttl`.
    ///
    /// A TTL too large to represent never expires.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.created_at
            .checked_add_signed(self.ttl)
            .is_some_and(|deadline| now > deadline)
    }

    /// Sort key for oldest-first eviction.
    pub(crate) fn age_key(&self) -> (DateTime<Utc>, u64) {
        (self.created_at, self.seq)
    }

    pub(crate) fn seq(&self) -> u64 {
        self.seq
    }
}
