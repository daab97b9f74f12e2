//! # Configuration Contract
//!
//! Two JSON documents describe a running cluster: a `ClusterConfig` shared
//! by every node (the shard count and the full shard-to-address map) and a
//! per-node `NodeConfig` (which shards this process owns, its capacity, and
//! its bind address). Loading either one validates it against the other so
//! a node refuses to start rather than silently serve the wrong shards.

use crate::error::{ConfigError, ConfigResult};
use crate::policy::EvictionPolicy;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// `host:port` pair a shard is reachable at.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Address {
    /// Hostname or IP literal.
    pub host: String,
    /// TCP port.
    pub port: u16,
}

/// Raw shape of the cluster config JSON document, before validation.
#[derive(Debug, Deserialize)]
struct ClusterConfigRaw {
    n_shards: u32,
    cluster_map: HashMap<String, (String, u16)>,
}

/// Cluster-wide topology: how many shards exist, and who owns each.
///
/// Shared verbatim by every node in the cluster; every node validates its
/// own `NodeConfig` against this map at startup.
#[derive(Debug, Clone)]
pub struct ClusterConfig {
    /// Total number of shards across the cluster.
    pub n_shards: u32,
    /// Shard id -> address currently owning it.
    pub cluster_map: HashMap<u32, Address>,
}

impl ClusterConfig {
    /// Loads and validates a cluster config document from `path`.
    ///
    /// Validates that `cluster_map` contains exactly the shard ids
    /// `0..n_shards` with no gaps or extras.
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|_| ConfigError::NotFound {
            path: path.to_path_buf(),
        })?;
        let raw: ClusterConfigRaw =
            serde_json::from_str(&text).map_err(|source| ConfigError::InvalidJson {
                path: path.to_path_buf(),
                source,
            })?;

        let mut cluster_map = HashMap::with_capacity(raw.cluster_map.len());
        for (shard_id, (host, port)) in raw.cluster_map {
            let shard_id: u32 = shard_id
                .parse()
                .map_err(|_| ConfigError::ClusterMapIncomplete {
                    n_shards: raw.n_shards,
                })?;
            cluster_map.insert(shard_id, Address { host, port });
        }

        let expected: std::collections::HashSet<u32> = (0..raw.n_shards).collect();
        let actual: std::collections::HashSet<u32> = cluster_map.keys().copied().collect();
        if expected != actual {
            return Err(ConfigError::ClusterMapIncomplete {
                n_shards: raw.n_shards,
            });
        }

        Ok(ClusterConfig {
            n_shards: raw.n_shards,
            cluster_map,
        })
    }
}

/// Raw shape of the node config JSON document, before validation.
#[derive(Debug, Deserialize)]
struct NodeConfigRaw {
    host: String,
    port: u16,
    node_id: Option<String>,
    owned_shards: Vec<u32>,
    capacity: u64,
    #[serde(default)]
    policy: Option<EvictionPolicy>,
}

/// This node's own identity, shard ownership, and storage capacity.
#[derive(Debug, Clone)]
pub struct NodeConfig {
    /// Human-readable id; defaults to `host:port` if not given.
    pub node_id: String,
    /// Address this node binds and listens on.
    pub host: String,
    /// Address this node binds and listens on.
    pub port: u16,
    /// Shard ids this node is responsible for serving locally.
    pub owned_shards: Vec<u32>,
    /// Total key budget split across `owned_shards`.
    pub capacity: u64,
    /// Eviction policy applied to every local shard. Defaults to LRU.
    pub policy: EvictionPolicy,
}

impl NodeConfig {
    /// Loads a node config document and validates it against `cluster`.
    ///
    /// Checks, in order: `owned_shards` non-empty, every owned id within
    /// `[0, n_shards)`, every owned shard's `cluster_map` entry actually
    /// points back at this node's own `(host, port)`, and `capacity` is at
    /// least the number of owned shards (so every shard gets a nonzero
    /// slice under the `capacity / shards` split).
    pub fn load(path: impl AsRef<Path>, cluster: &ClusterConfig) -> ConfigResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|_| ConfigError::NotFound {
            path: path.to_path_buf(),
        })?;
        let raw: NodeConfigRaw =
            serde_json::from_str(&text).map_err(|source| ConfigError::InvalidJson {
                path: path.to_path_buf(),
                source,
            })?;

        if raw.owned_shards.is_empty() {
            return Err(ConfigError::OwnedShardsEmpty);
        }

        for &shard_id in &raw.owned_shards {
            if shard_id >= cluster.n_shards {
                return Err(ConfigError::OwnedShardOutOfRange {
                    shard_id,
                    n_shards: cluster.n_shards,
                });
            }
        }

        for &shard_id in &raw.owned_shards {
            let mapped = cluster.cluster_map.get(&shard_id).expect(
                "shard_id already range-checked against cluster.n_shards and ClusterConfig::load \
                 guarantees cluster_map covers every id in [0, n_shards)",
            );
            if mapped.host != raw.host || mapped.port != raw.port {
                return Err(ConfigError::OwnershipMismatch {
                    shard_id,
                    mapped_host: mapped.host.clone(),
                    mapped_port: mapped.port,
                    bind_host: raw.host.clone(),
                    bind_port: raw.port,
                });
            }
        }

        if raw.capacity < raw.owned_shards.len() as u64 {
            return Err(ConfigError::CapacityTooSmall {
                capacity: raw.capacity,
                shards: raw.owned_shards.len(),
            });
        }

        let node_id = raw
            .node_id
            .unwrap_or_else(|| format!("{}:{}", raw.host, raw.port));

        Ok(NodeConfig {
            node_id,
            host: raw.host,
            port: raw.port,
            owned_shards: raw.owned_shards,
            capacity: raw.capacity,
            policy: raw.policy.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicU64, Ordering};

    // Minimal throwaway temp-file helper: avoids pulling in the `tempfile`
    // crate for a handful of config-loader tests.
    struct TempPath(PathBuf);

    static SEQ: AtomicU64 = AtomicU64::new(0);

    fn write_temp(contents: &str) -> TempPath {
        let mut path = std::env::temp_dir();
        let unique = format!(
            "shardkv-test-{}-{}.json",
            std::process::id(),
            SEQ.fetch_add(1, Ordering::Relaxed)
        );
        path.push(unique);
        fs::write(&path, contents).unwrap();
        TempPath(path)
    }

    impl Drop for TempPath {
        fn drop(&mut self) {
            let _ = fs::remove_file(&self.0);
        }
    }

    impl AsRef<std::path::Path> for TempPath {
        fn as_ref(&self) -> &std::path::Path {
            self.0.as_path()
        }
    }

    fn sample_cluster_json() -> &'static str {
        r#"{
            "n_shards": 2,
            "cluster_map": {
                "0": ["127.0.0.1", 7000],
                "1": ["127.0.0.1", 7001]
            }
        }"#
    }

    #[test]
    fn loads_valid_cluster_config() {
        let path = write_temp(sample_cluster_json());
        let cfg = ClusterConfig::load(&path).unwrap();
        assert_eq!(cfg.n_shards, 2);
        assert_eq!(cfg.cluster_map.len(), 2);
        assert_eq!(cfg.cluster_map[&0].port, 7000);
    }

    #[test]
    fn rejects_incomplete_cluster_map() {
        let path = write_temp(
            r#"{"n_shards": 3, "cluster_map": {"0": ["127.0.0.1", 7000]}}"#,
        );
        let result = ClusterConfig::load(&path);
        assert!(matches!(
            result,
            Err(ConfigError::ClusterMapIncomplete { n_shards: 3 })
        ));
    }

    #[test]
    fn rejects_missing_file() {
        let result = ClusterConfig::load("/nonexistent/path/does-not-exist.json");
        assert!(matches!(result, Err(ConfigError::NotFound { .. })));
    }

    #[test]
    fn loads_valid_node_config_with_defaults() {
        let cluster_path = write_temp(sample_cluster_json());
        let cluster = ClusterConfig::load(&cluster_path).unwrap();

        let node_path = write_temp(
            r#"{
                "host": "127.0.0.1",
                "port": 7000,
                "owned_shards": [0],
                "capacity": 100
            }"#,
        );
        let node = NodeConfig::load(&node_path, &cluster).unwrap();
        assert_eq!(node.node_id, "127.0.0.1:7000");
        assert_eq!(node.policy, EvictionPolicy::Lru);
        assert_eq!(node.owned_shards, vec![0]);
    }

    #[test]
    fn rejects_ownership_mismatch() {
        let cluster_path = write_temp(sample_cluster_json());
        let cluster = ClusterConfig::load(&cluster_path).unwrap();

        let node_path = write_temp(
            r#"{
                "host": "127.0.0.1",
                "port": 9999,
                "owned_shards": [0],
                "capacity": 100
            }"#,
        );
        let result = NodeConfig::load(&node_path, &cluster);
        assert!(matches!(
            result,
            Err(ConfigError::OwnershipMismatch { shard_id: 0, .. })
        ));
    }

    #[test]
    fn rejects_empty_owned_shards() {
        let cluster_path = write_temp(sample_cluster_json());
        let cluster = ClusterConfig::load(&cluster_path).unwrap();

        let node_path = write_temp(
            r#"{"host": "127.0.0.1", "port": 7000, "owned_shards": [], "capacity": 10}"#,
        );
        let result = NodeConfig::load(&node_path, &cluster);
        assert!(matches!(result, Err(ConfigError::OwnedShardsEmpty)));
    }

    #[test]
    fn rejects_capacity_smaller_than_shard_count() {
        let cluster_path = write_temp(sample_cluster_json());
        let cluster = ClusterConfig::load(&cluster_path).unwrap();

        let node_path = write_temp(
            r#"{"host": "127.0.0.1", "port": 7000, "owned_shards": [0], "capacity": 0}"#,
        );
        let result = NodeConfig::load(&node_path, &cluster);
        assert!(matches!(
            result,
            Err(ConfigError::CapacityTooSmall { capacity: 0, shards: 1 })
        ));
    }
}
