//! # Cache Trait and Stats
//!
//! `Cache` is the policy-agnostic surface every eviction strategy
//! implements. `CacheStats` is the atomic snapshot returned by `get_stats`
//! and aggregated across shards by the router.

use std::time::Duration;

/// Snapshot of a cache instance's monotonically non-decreasing counters.
///
/// Reset only by `clear`. Field order mirrors the response grammar
/// (`HITS .. MISSES .. EVICTIONS .. GETS .. PUTS ..`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of `get` calls that found a live entry.
    pub hits: u64,
    /// Number of `get` calls that found nothing (absent or expired).
    pub misses: u64,
    /// Number of capacity-driven LRU removals (never TTL-expiry-on-read).
    pub evictions: u64,
    /// Total number of `get` calls.
    pub gets: u64,
    /// Total number of `put` calls.
    pub puts: u64,
}

impl CacheStats {
    /// Adds another snapshot's counters into this one, in place.
    ///
    /// Used by the router to fold per-shard snapshots into a cluster-wide
    /// total for `STATS`.
    pub fn merge(&mut self, other: &CacheStats) {
        self.hits += other.hits;
        self.misses += other.misses;
        self.evictions += other.evictions;
        self.gets += other.gets;
        self.puts += other.puts;
    }
}

/// A single-instance, policy-bound cache: one index, one recency structure,
/// one capacity, one set of counters.
///
/// Implementations must be thread-safe on their own (interior mutability),
/// since the router shares one instance per owned shard across connections.
pub trait Cache: Send + Sync {
    /// Looks up `key`, promoting it to most-recently-used on a hit.
    ///
    /// Returns `None` on a miss or when the entry is present but expired
    /// (expired entries are evicted synchronously, without counting as an
    /// eviction). Always increments `gets` and exactly one of `hits`/`misses`.
    fn get(&self, key: &str) -> Option<String>;

    /// Inserts or overwrites `key`, promoting it to most-recently-used.
    ///
    /// `ttl` is a duration from now; `None` means "never expires". Inserting
    /// past capacity evicts the least-recently-used entry and increments
    /// `evictions`. Always increments `puts`.
    fn put(&self, key: String, value: String, ttl: Option<Duration>);

    /// Removes `key` if present. Returns whether a live entry was removed.
    fn delete(&self, key: &str) -> bool;

    /// Returns a point-in-time copy of this cache's counters.
    fn get_stats(&self) -> CacheStats;

    /// Removes every entry and resets all counters to zero.
    fn clear(&self);

    /// Current number of live entries (for tests and invariant checks).
    fn len(&self) -> usize;

    /// True when `len() == 0`.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
