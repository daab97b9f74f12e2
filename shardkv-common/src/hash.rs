//! # Key-to-Shard Hashing
//!
//! The shard function must be stable across processes, architectures, and
//! language implementations, so it is pinned to CRC-32 (IEEE polynomial)
//! over the UTF-8 bytes of the key rather than any host-dependent hasher
//! (Rust's default `SipHash`, for instance, is randomly seeded per process
//! and would make `shard_for_key` disagree with itself across restarts).

/// Maps a key to a shard id in `[0, n_shards)`.
///
/// `n_shards` must be positive; callers validate this once at startup
/// (`CacheNode::new`) rather than on every call.
pub fn shard_for_key(key: &str, n_shards: u32) -> u32 {
    crc32fast::hash(key.as_bytes()) % n_shards
}
