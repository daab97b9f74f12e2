// shardkv-engine - The eviction engine: cache trait, LRU implementation, and factory.
//
// Every cache instance here is a single policy + single index + single
// capacity + TTL enforcement, safe to share across connections via `Arc`.
// Shards never share state at runtime; the router in shardkv-server owns
// one instance per owned shard id.

pub mod cache;
pub mod error;
pub mod factory;
pub mod lru;

pub use cache::{Cache, CacheStats};
pub use error::{EngineError, EngineResult};
pub use factory::CacheFactory;
pub use lru::LruCache;
