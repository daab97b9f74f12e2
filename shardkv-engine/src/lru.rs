//! # LRU Cache
//!
//! An O(1) recency-aware cache over a doubly linked arena of slots with two
//! fixed sentinels (head at index 0, tail at index 1), rather than a
//! pointer-rich linked list of heap nodes. Sentinels are never returned by
//! any public operation; they exist purely to make `detach`/`insert-at-head`
//! branch-free.
//!
//! The list order runs `HEAD -> MRU -> ... -> LRU -> TAIL`. Insertion always
//! happens right after `HEAD`; eviction always removes the node right before
//! `TAIL`.

use crate::cache::{Cache, CacheStats};
use crate::error::{EngineError, EngineResult};
use ahash::RandomState;
use hashbrown::HashMap;
use parking_lot::Mutex;
use std::time::{Duration, Instant};

const HEAD: usize = 0;
const TAIL: usize = 1;

#[derive(Debug)]
struct Node {
    key: String,
    value: String,
    expires_at: Option<Instant>,
    prev: usize,
    next: usize,
}

impl Node {
    fn sentinel() -> Self {
        Node {
            key: String::new(),
            value: String::new(),
            expires_at: None,
            prev: 0,
            next: 0,
        }
    }

    fn is_expired(&self, now: Instant) -> bool {
        matches!(self.expires_at, Some(deadline) if now >= deadline)
    }
}

struct LruInner {
    nodes: Vec<Node>,
    index: HashMap<String, usize, RandomState>,
    free: Vec<usize>,
    capacity: usize,
    stats: CacheStats,
}

impl LruInner {
    fn new(capacity: usize) -> Self {
        let mut nodes = Vec::with_capacity(capacity + 2);
        nodes.push(Node::sentinel());
        nodes.push(Node::sentinel());
        nodes[HEAD].next = TAIL;
        nodes[TAIL].prev = HEAD;

        LruInner {
            nodes,
            index: HashMap::with_hasher(RandomState::new()),
            free: Vec::new(),
            capacity,
            stats: CacheStats::default(),
        }
    }

    /// Unlinks `idx` from the list. Does not touch the index or free list.
    fn detach(&mut self, idx: usize) {
        let (prev, next) = (self.nodes[idx].prev, self.nodes[idx].next);
        self.nodes[prev].next = next;
        self.nodes[next].prev = prev;
    }

    /// Links `idx` in immediately after `HEAD` (the MRU position).
    fn insert_at_head(&mut self, idx: usize) {
        let old_first = self.nodes[HEAD].next;
        self.nodes[idx].prev = HEAD;
        self.nodes[idx].next = old_first;
        self.nodes[HEAD].next = idx;
        self.nodes[old_first].prev = idx;
    }

    /// Moves an already-linked node to the MRU position.
    fn move_to_head(&mut self, idx: usize) {
        if self.nodes[HEAD].next == idx {
            return;
        }
        self.detach(idx);
        self.insert_at_head(idx);
    }

    /// Detaches and returns the LRU node's slot index, or `None` if empty.
    fn pop_tail(&mut self) -> Option<usize> {
        let idx = self.nodes[TAIL].prev;
        if idx == HEAD {
            return None;
        }
        self.detach(idx);
        Some(idx)
    }

    /// Removes a live entry at `idx` from both the list and the key index,
    /// recycling its slot. Caller has already removed the index entry.
    fn free_slot(&mut self, idx: usize) {
        self.nodes[idx].key.clear();
        self.nodes[idx].value.clear();
        self.nodes[idx].expires_at = None;
        self.free.push(idx);
    }

    fn allocate(&mut self, key: String, value: String, expires_at: Option<Instant>) -> usize {
        let idx = self.free.pop().unwrap_or_else(|| {
            self.nodes.push(Node::sentinel());
            self.nodes.len() - 1
        });
        self.nodes[idx].key = key;
        self.nodes[idx].value = value;
        self.nodes[idx].expires_at = expires_at;
        idx
    }

    /// Removes an expired entry found during a read; does not count as an
    /// eviction, per the counter semantics documented on `Cache::get`.
    fn expire_in_place(&mut self, idx: usize) {
        self.detach(idx);
        self.index.remove(&self.nodes[idx].key);
        self.free_slot(idx);
    }
}

/// Least-recently-used cache: one capacity, one recency list, one set of
/// counters, guarded by a single lock so every operation observes and
/// updates both the index and the list atomically.
pub struct LruCache {
    inner: Mutex<LruInner>,
}

impl LruCache {
    /// Creates a cache with a fixed positive capacity.
    pub fn new(capacity: usize) -> EngineResult<Self> {
        if capacity == 0 {
            return Err(EngineError::InvalidCapacity { capacity: 0 });
        }
        Ok(LruCache {
            inner: Mutex::new(LruInner::new(capacity)),
        })
    }
}

impl Cache for LruCache {
    fn get(&self, key: &str) -> Option<String> {
        let mut inner = self.inner.lock();
        inner.stats.gets += 1;
        let now = Instant::now();

        let idx = match inner.index.get(key) {
            Some(&idx) => idx,
            None => {
                inner.stats.misses += 1;
                return None;
            }
        };

        if inner.nodes[idx].is_expired(now) {
            inner.expire_in_place(idx);
            inner.stats.misses += 1;
            return None;
        }

        inner.move_to_head(idx);
        inner.stats.hits += 1;
        Some(inner.nodes[idx].value.clone())
    }

    fn put(&self, key: String, value: String, ttl: Option<Duration>) {
        let mut inner = self.inner.lock();
        inner.stats.puts += 1;
        let now = Instant::now();
        let expires_at = ttl.map(|d| now + d);

        if let Some(&idx) = inner.index.get(key.as_str()) {
            inner.nodes[idx].value = value;
            inner.nodes[idx].expires_at = expires_at;
            inner.move_to_head(idx);
            return;
        }

        let idx = inner.allocate(key.clone(), value, expires_at);
        inner.insert_at_head(idx);
        inner.index.insert(key, idx);

        if inner.index.len() > inner.capacity {
            if let Some(evict_idx) = inner.pop_tail() {
                inner.index.remove(&inner.nodes[evict_idx].key);
                inner.free_slot(evict_idx);
                inner.stats.evictions += 1;
            }
        }
    }

    fn delete(&self, key: &str) -> bool {
        let mut inner = self.inner.lock();

        let idx = match inner.index.remove(key) {
            Some(idx) => idx,
            None => return false,
        };

        inner.detach(idx);
        inner.free_slot(idx);
        true
    }

    fn get_stats(&self) -> CacheStats {
        self.inner.lock().stats
    }

    fn clear(&self) {
        let mut inner = self.inner.lock();
        let capacity = inner.capacity;
        *inner = LruInner::new(capacity);
    }

    fn len(&self) -> usize {
        self.inner.lock().index.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_zero_capacity() {
        assert_eq!(
            LruCache::new(0).unwrap_err(),
            EngineError::InvalidCapacity { capacity: 0 }
        );
    }

    #[test]
    fn get_put_roundtrip() {
        let cache = LruCache::new(4).unwrap();
        cache.put("a".into(), "1".into(), None);
        assert_eq!(cache.get("a"), Some("1".to_string()));
    }

    #[test]
    fn miss_increments_misses_and_gets() {
        let cache = LruCache::new(4).unwrap();
        assert_eq!(cache.get("missing"), None);
        let stats = cache.get_stats();
        assert_eq!(stats.gets, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits, 0);
    }

    #[test]
    fn scenario_s1_capacity_three_evicts_first_unread_key() {
        let cache = LruCache::new(3).unwrap();
        cache.put("a".into(), "1".into(), None);
        cache.put("b".into(), "2".into(), None);
        cache.put("c".into(), "3".into(), None);
        cache.get("a");
        cache.put("d".into(), "4".into(), None);

        assert_eq!(cache.get("b"), None);
        let stats = cache.get_stats();
        assert_eq!(stats.evictions, 1);
    }

    #[test]
    fn scenario_s2_overwrite_does_not_change_size_or_evict() {
        let cache = LruCache::new(2).unwrap();
        cache.put("a".into(), "1".into(), None);
        cache.put("b".into(), "2".into(), None);
        cache.put("a".into(), "42".into(), None);
        assert_eq!(cache.get("a"), Some("42".to_string()));

        assert_eq!(cache.len(), 2);
        let stats = cache.get_stats();
        assert_eq!(stats.puts, 3);
        assert_eq!(stats.gets, 1);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.evictions, 0);
    }

    #[test]
    fn scenario_s3_ttl_expiry_on_read_does_not_increment_evictions() {
        let cache = LruCache::new(4).unwrap();
        cache.put("a".into(), "1".into(), Some(Duration::from_millis(50)));
        std::thread::sleep(Duration::from_millis(70));

        assert_eq!(cache.get("a"), None);
        let stats = cache.get_stats();
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.evictions, 0);
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn delete_removes_live_entry() {
        let cache = LruCache::new(4).unwrap();
        cache.put("a".into(), "1".into(), None);
        assert!(cache.delete("a"));
        assert_eq!(cache.get("a"), None);
        assert!(!cache.delete("a"));
    }

    #[test]
    fn delete_on_expired_but_still_indexed_entry_reports_found() {
        // delete() only consults index presence, not expiry; only `get`
        // treats a present-but-expired entry as absent (spec.md §4.1/§8 I7).
        let cache = LruCache::new(4).unwrap();
        cache.put("a".into(), "1".into(), Some(Duration::from_millis(10)));
        std::thread::sleep(Duration::from_millis(30));
        assert!(cache.delete("a"));
        assert!(!cache.delete("a"));
    }

    #[test]
    fn clear_resets_entries_and_counters() {
        let cache = LruCache::new(4).unwrap();
        cache.put("a".into(), "1".into(), None);
        cache.get("a");
        cache.clear();

        assert_eq!(cache.len(), 0);
        assert_eq!(cache.get_stats(), CacheStats::default());
    }

    #[test]
    fn invariant_index_never_exceeds_capacity() {
        let cache = LruCache::new(3).unwrap();
        for i in 0..100 {
            cache.put(format!("k{i}"), "v".into(), None);
            assert!(cache.len() <= 3);
        }
    }

    #[test]
    fn null_ttl_means_never_expires() {
        let cache = LruCache::new(4).unwrap();
        cache.put("a".into(), "1".into(), None);
        std::thread::sleep(Duration::from_millis(20));
        assert_eq!(cache.get("a"), Some("1".to_string()));
    }

    #[test]
    fn lru_order_evicts_exactly_the_oldest_on_sequential_inserts() {
        let cache = LruCache::new(2).unwrap();
        cache.put("k1".into(), "1".into(), None);
        cache.put("k2".into(), "2".into(), None);
        cache.put("k3".into(), "3".into(), None);

        assert_eq!(cache.get("k1"), None);
        assert_eq!(cache.get("k2"), Some("2".to_string()));
        assert_eq!(cache.get("k3"), Some("3".to_string()));
    }
}
