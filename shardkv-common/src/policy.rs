//! # Eviction Policy Tags
//!
//! A closed set of registrable policy names. Only `Lru` has a concrete
//! implementation (in `shardkv-engine`); the rest exist so config files and
//! the factory's error reporting have a name to refer to ahead of the
//! implementation landing.

use serde::Deserialize;
use std::fmt;

/// Eviction policy selected for a cache or shard set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EvictionPolicy {
    /// Least Recently Used — the only policy with a body today.
    Lru,
    /// Least Frequently Used — registrable tag, not implemented.
    Lfu,
    /// First In, First Out — registrable tag, not implemented.
    Fifo,
    /// Adaptive Replacement Cache — registrable tag, not implemented.
    Arc,
    /// TinyLFU — registrable tag, not implemented.
    #[serde(rename = "TinyLFU")]
    TinyLfu,
}

impl Default for EvictionPolicy {
    fn default() -> Self {
        EvictionPolicy::Lru
    }
}

impl fmt::Display for EvictionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EvictionPolicy::Lru => "LRU",
            EvictionPolicy::Lfu => "LFU",
            EvictionPolicy::Fifo => "FIFO",
            EvictionPolicy::Arc => "ARC",
            EvictionPolicy::TinyLfu => "TinyLFU",
        };
        write!(f, "{name}")
    }
}
