//! Concurrent TTL tables backing [`DailyIntakeCache`](super::DailyIntakeCache).
//!
//! [`Table`] is a flat `key → entry` map with a size cap. [`NestedTable`]
//! keys a [`Table`] per outer key, so each user's dated entries are capped
//! independently. Both are built on `DashMap`, which locks per shard rather
//! than per table.

use std::borrow::Borrow;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, TimeDelta, Utc};
use dashmap::DashMap;

use super::config::TableConfig;
use super::entry::CacheEntry;

/// Name, TTL and cap shared by every sub-table of one cache table.
#[derive(Debug, Clone, Copy)]
pub(crate) struct TablePolicy {
    pub name: &'static str,
    pub ttl: TimeDelta,
    pub max_entries: usize,
}

impl TablePolicy {
    pub fn new(name: &'static str, config: &TableConfig) -> Self {
        Self {
            name,
            ttl: TimeDelta::from_std(config.ttl).unwrap_or(TimeDelta::MAX),
            max_entries: config.max_entries,
        }
    }
}

/// Flat TTL table with oldest-first size-cap eviction.
pub(crate) struct Table<K, V> {
    entries: DashMap<K, CacheEntry<V>>,
    policy: TablePolicy,
    next_seq: AtomicU64,
}

impl<K, V> Table<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new(policy: TablePolicy) -> Self {
        Self {
            entries: DashMap::new(),
            policy,
            next_seq: AtomicU64::new(0),
        }
    }

    pub fn name(&self) -> &'static str {
        self.policy.name
    }

    /// Return the value if present and not expired. Never removes anything.
    pub fn get<Q>(&self, key: &Q, now: DateTime<Utc>) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries
            .get(key)
            .filter(|entry| !entry.is_expired(now))
            .map(|entry| entry.value().value().clone())
    }

    /// Store a fresh entry, then enforce the cap.
    ///
    /// Returns the number of entries evicted to get back under the cap.
    pub fn insert(&self, key: K, value: V, now: DateTime<Utc>) -> usize {
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        self.entries
            .insert(key, CacheEntry::new(value, now, self.policy.ttl, seq));
        self.enforce_capacity()
    }

    pub fn remove<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.remove(key).is_some()
    }

    /// Remove the oldest entries until at most `max_entries` remain.
    ///
    /// An entry replaced by a concurrent put between the snapshot and the
    /// removal is left alone (matched on `seq`).
    fn enforce_capacity(&self) -> usize {
        let max = self.policy.max_entries;
        if self.entries.len() <= max {
            return 0;
        }

        let mut ages: Vec<_> = self
            .entries
            .iter()
            .map(|entry| (entry.value().age_key(), entry.key().clone()))
            .collect();
        if ages.len() <= max {
            return 0;
        }
        ages.sort_unstable_by(|a, b| a.0.cmp(&b.0));

        let excess = ages.len() - max;
        ages.into_iter()
            .take(excess)
            .filter(|((_, seq), key)| {
                self.entries
                    .remove_if(key, |_, entry| entry.seq() == *seq)
                    .is_some()
            })
            .count()
    }

    /// Drop every expired entry. Returns how many were removed.
    pub fn purge_expired(&self, now: DateTime<Utc>) -> usize {
        let mut removed = 0;
        self.entries.retain(|_, entry| {
            let keep = !entry.is_expired(now);
            if !keep {
                removed += 1;
            }
            keep
        });
        removed
    }

    /// Number of stored entries, expired ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[cfg(test)]
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.contains_key(key)
    }
}

/// Two-level table: outer key → capped [`Table`] of inner key → entry.
pub(crate) struct NestedTable<K, S, V> {
    outer: DashMap<K, Table<S, V>>,
    policy: TablePolicy,
}

impl<K, S, V> NestedTable<K, S, V>
where
    K: Eq + Hash + Clone,
    S: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new(policy: TablePolicy) -> Self {
        Self {
            outer: DashMap::new(),
            policy,
        }
    }

    pub fn name(&self) -> &'static str {
        self.policy.name
    }

    pub fn get<Q>(&self, key: &Q, sub: &S, now: DateTime<Utc>) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.outer.get(key)?.get(sub, now)
    }

    /// Insert into the outer key's sub-table, creating it on first use.
    ///
    /// The outer shard is held read-locked while the sub-table is written,
    /// so the sweep cannot drop the sub-table mid-insert.
    pub fn insert(&self, key: K, sub: S, value: V, now: DateTime<Utc>) -> usize {
        let inner = self
            .outer
            .entry(key)
            .or_insert_with(|| Table::new(self.policy))
            .downgrade();
        inner.insert(sub, value, now)
    }

    pub fn remove<Q>(&self, key: &Q, sub: &S) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.outer.get(key).is_some_and(|inner| inner.remove(sub))
    }

    /// Drop the whole sub-table for `key`. Returns how many entries it held.
    pub fn remove_all<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.outer
            .remove(key)
            .map(|(_, inner)| inner.len())
            .unwrap_or(0)
    }

    /// Purge expired inner entries, then drop outer keys left empty.
    pub fn purge_expired(&self, now: DateTime<Utc>) -> usize {
        let mut removed = 0;
        let mut emptied = Vec::new();
        for inner in self.outer.iter() {
            removed += inner.purge_expired(now);
            if inner.is_empty() {
                emptied.push(inner.key().clone());
            }
        }
        // Re-checked under the shard write lock: a put may have refilled it.
        for key in emptied {
            self.outer.remove_if(&key, |_, inner| inner.is_empty());
        }
        removed
    }

    /// Total entries across every sub-table.
    pub fn len(&self) -> usize {
        self.outer.iter().map(|inner| inner.len()).sum()
    }

    /// Entries held for one outer key.
    pub fn len_for<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.outer.get(key).map(|inner| inner.len()).unwrap_or(0)
    }

    /// Number of outer keys with a sub-table.
    pub fn outer_len(&self) -> usize {
        self.outer.len()
    }

    pub fn outer_keys(&self) -> Vec<K> {
        self.outer.iter().map(|inner| inner.key().clone()).collect()
    }

    pub fn contains_outer<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.outer.contains_key(key)
    }
}
