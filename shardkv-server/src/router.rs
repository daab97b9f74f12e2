//! # Shard Router (`CacheNode`)
//!
//! Owns one `Cache` per locally-owned shard and decides, per key, whether
//! this node serves it directly or redirects the client with `MOVED`.
//! Non-keyed commands (`STATS`, `QUIT`) never consult the shard map.

use crate::protocol::{Command, ProtocolError, Response};
use shardkv_common::config::{Address, ClusterConfig, NodeConfig};
use shardkv_common::{shard_for_key, EvictionPolicy};
use shardkv_engine::{Cache, CacheFactory, EngineError};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Errors raised while constructing a `CacheNode`, all fatal to startup.
#[derive(Debug, Error)]
pub enum RouterError {
    #[error("n_shards must be > 0")]
    NShardsNotPositive,
    #[error("owned_shards cannot be empty")]
    OwnedShardsEmpty,
    #[error("owned_shards contains shard id {shard_id} outside [0, {n_shards})")]
    OwnedShardOutOfRange { shard_id: u32, n_shards: u32 },
    #[error("cluster_map must contain every shard_id in [0, n_shards)")]
    ClusterMapIncomplete,
    #[error(
        "shard {shard_id} is owned but cluster_map points at {mapped_host}:{mapped_port}, not this node's {bind_host}:{bind_port}"
    )]
    OwnershipMismatch {
        shard_id: u32,
        mapped_host: String,
        mapped_port: u16,
        bind_host: String,
        bind_port: u16,
    },
    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// One node's view of the cluster: which shards it owns, how to reach the
/// owners of the ones it doesn't, and a live `Cache` per owned shard.
pub struct CacheNode {
    n_shards: u32,
    owned_shards: HashSet<u32>,
    cluster_map: HashMap<u32, Address>,
    shards: BTreeMap<u32, Arc<dyn Cache>>,
}

impl CacheNode {
    /// Builds a node directly from its constituent parts, independently
    /// re-validating the invariants the config loader already checked —
    /// this keeps `CacheNode` constructible (and testable) without a
    /// round-trip through JSON files.
    ///
    /// `bind_host`/`bind_port` is this node's own listen address; every
    /// owned shard's `cluster_map` entry must point back at it, per
    /// spec.md §4.3's startup validation (this is re-checked here even
    /// though `shardkv_common::config::NodeConfig::load` already enforces
    /// it, so that `CacheNode` is self-defending when built directly
    /// rather than through the config loader).
    pub fn new(
        n_shards: u32,
        owned_shards: Vec<u32>,
        cluster_map: HashMap<u32, Address>,
        capacity: u64,
        policy: EvictionPolicy,
        bind_host: &str,
        bind_port: u16,
    ) -> Result<Self, RouterError> {
        if n_shards == 0 {
            return Err(RouterError::NShardsNotPositive);
        }
        if owned_shards.is_empty() {
            return Err(RouterError::OwnedShardsEmpty);
        }
        for &shard_id in &owned_shards {
            if shard_id >= n_shards {
                return Err(RouterError::OwnedShardOutOfRange { shard_id, n_shards });
            }
        }
        let expected: HashSet<u32> = (0..n_shards).collect();
        let actual: HashSet<u32> = cluster_map.keys().copied().collect();
        if expected != actual {
            return Err(RouterError::ClusterMapIncomplete);
        }
        for &shard_id in &owned_shards {
            let mapped = &cluster_map[&shard_id];
            if mapped.host != bind_host || mapped.port != bind_port {
                return Err(RouterError::OwnershipMismatch {
                    shard_id,
                    mapped_host: mapped.host.clone(),
                    mapped_port: mapped.port,
                    bind_host: bind_host.to_string(),
                    bind_port,
                });
            }
        }

        let shards = CacheFactory::create_shards(capacity, policy, &owned_shards)?;

        Ok(CacheNode {
            n_shards,
            owned_shards: owned_shards.into_iter().collect(),
            cluster_map,
            shards,
        })
    }

    /// Builds a node from a loaded cluster/node config pair.
    pub fn from_config(cluster: &ClusterConfig, node: &NodeConfig) -> Result<Self, RouterError> {
        Self::new(
            cluster.n_shards,
            node.owned_shards.clone(),
            cluster.cluster_map.clone(),
            node.capacity,
            node.policy,
            &node.host,
            node.port,
        )
    }

    /// Hashes `key` to its owning shard id, stable across processes.
    pub fn shard_id(&self, key: &str) -> u32 {
        shard_for_key(key, self.n_shards)
    }

    fn moved(&self, shard_id: u32) -> Response {
        let addr = &self.cluster_map[&shard_id];
        Response::Moved {
            shard_id,
            host: addr.host.clone(),
            port: addr.port,
        }
    }

    fn sum_stats(&self) -> Response {
        let mut total = shardkv_engine::CacheStats::default();
        for cache in self.shards.values() {
            total.merge(&cache.get_stats());
        }
        Response::Stats {
            hits: total.hits,
            misses: total.misses,
            evictions: total.evictions,
            gets: total.gets,
            puts: total.puts,
        }
    }

    /// Parses and executes one command line.
    ///
    /// Returns `None` only for `QUIT`, signaling the caller to close the
    /// connection without writing a response line.
    pub fn handle(&self, line: &str) -> Option<String> {
        let command = match Command::parse(line) {
            Ok(command) => command,
            Err(err) => return Some(Response::Err(err).to_string()),
        };

        match command {
            Command::Quit => None,
            Command::Stats => Some(self.sum_stats().to_string()),
            Command::Get { key } => {
                let shard_id = self.shard_id(&key);
                if !self.owned_shards.contains(&shard_id) {
                    return Some(self.moved(shard_id).to_string());
                }
                let response = match self.shards[&shard_id].get(&key) {
                    Some(value) => Response::Value(value),
                    None => Response::NotFound,
                };
                Some(response.to_string())
            }
            Command::Put { key, value, ttl_secs } => {
                let shard_id = self.shard_id(&key);
                if !self.owned_shards.contains(&shard_id) {
                    return Some(self.moved(shard_id).to_string());
                }
                let ttl = ttl_secs.map(ttl_to_duration);
                self.shards[&shard_id].put(key, value, ttl);
                Some(Response::Stored.to_string())
            }
            Command::Del { key } => {
                let shard_id = self.shard_id(&key);
                if !self.owned_shards.contains(&shard_id) {
                    return Some(self.moved(shard_id).to_string());
                }
                let response = if self.shards[&shard_id].delete(&key) {
                    Response::Deleted
                } else {
                    Response::NotFound
                };
                Some(response.to_string())
            }
        }
    }
}

/// Converts a wire-supplied TTL (seconds, possibly fractional) into a
/// `Duration`. Non-positive or non-finite values collapse to zero (an
/// already-expired entry) rather than panicking, since `Duration` has no
/// negative representation.
fn ttl_to_duration(secs: f64) -> Duration {
    if !secs.is_finite() || secs <= 0.0 {
        Duration::from_secs(0)
    } else {
        Duration::from_secs_f64(secs)
    }
}
