//! # Configuration Errors
//!
//! Errors raised while loading and validating the cluster/node config
//! documents described in the configuration contract.

use std::path::PathBuf;

/// Errors surfaced by config loading and validation.
///
/// Every variant here is fatal to the owning process: the caller is expected
/// to print the message and exit non-zero rather than attempt recovery.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The config file could not be read from disk.
    #[error("config file not found: {path}")]
    NotFound {
        /// Path that failed to open.
        path: PathBuf,
    },

    /// The config file exists but is not valid JSON for its expected shape.
    #[error("invalid json in {path}: {source}")]
    InvalidJson {
        /// Path that failed to parse.
        path: PathBuf,
        /// Underlying serde error.
        #[source]
        source: serde_json::Error,
    },

    /// `cluster_map` does not contain exactly `{0, .., n_shards-1}`.
    #[error("cluster_map must contain every shard id in [0, {n_shards})")]
    ClusterMapIncomplete {
        /// Declared shard count.
        n_shards: u32,
    },

    /// `owned_shards` is empty.
    #[error("owned_shards cannot be empty")]
    OwnedShardsEmpty,

    /// `owned_shards` contains an id outside `[0, n_shards)`.
    #[error("owned_shards contains shard id {shard_id} outside [0, {n_shards})")]
    OwnedShardOutOfRange {
        /// Offending shard id.
        shard_id: u32,
        /// Declared shard count.
        n_shards: u32,
    },

    /// An owned shard's cluster_map entry does not point back at this node.
    #[error(
        "config mismatch: shard {shard_id} is owned but cluster_map says {mapped_host}:{mapped_port}, not {bind_host}:{bind_port}"
    )]
    OwnershipMismatch {
        /// Offending shard id.
        shard_id: u32,
        /// Address the cluster map points to for this shard.
        mapped_host: String,
        /// Address the cluster map points to for this shard.
        mapped_port: u16,
        /// This node's own bind address.
        bind_host: String,
        /// This node's own bind address.
        bind_port: u16,
    },

    /// `capacity` is smaller than the number of owned shards.
    #[error("capacity ({capacity}) must be >= number of owned shards ({shards})")]
    CapacityTooSmall {
        /// Declared total capacity.
        capacity: u64,
        /// Number of owned shards requesting a slice of it.
        shards: usize,
    },
}

/// Result alias for config operations.
pub type ConfigResult<T> = Result<T, ConfigError>;
