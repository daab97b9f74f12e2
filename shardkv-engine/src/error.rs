//! # Engine Errors
//!
//! Errors raised by cache construction and the factory. Nothing in this
//! crate's hot path (`get`/`put`/`delete`) is fallible — these are all
//! construction-time failures, fatal to the component that hit them.

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum EngineError {
    /// Capacity must be a positive integer.
    #[error("capacity must be >= 1, got {capacity}")]
    InvalidCapacity {
        /// The rejected capacity value.
        capacity: i64,
    },

    /// Shard-set construction arguments are malformed.
    #[error("invalid shard configuration: {reason}")]
    InvalidConfig {
        /// Human-readable explanation of what was wrong.
        reason: String,
    },

    /// The requested policy has a tag but no implementation.
    #[error("eviction policy {policy} is not implemented")]
    UnsupportedPolicy {
        /// The policy that was requested.
        policy: shardkv_common::EvictionPolicy,
    },
}

pub type EngineResult<T> = Result<T, EngineError>;
