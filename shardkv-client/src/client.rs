//! # Synchronous Client API
//!
//! Purpose: expose a compact, blocking API for issuing shardkv's line
//! protocol commands to a node over TCP.
//!
//! ## Design Principles
//! 1. **Facade Pattern**: `KVClient` hides pooling and protocol details.
//! 2. **Fail Fast**: Protocol violations surface immediately as errors.
//! 3. **One Round Trip Per Call**: each method sends exactly one line and
//!    reads exactly one reply line (no pipelining at this layer).

use std::fmt;
use std::time::Duration;

use crate::codec::Reply;
use crate::pool::{ConnectionPool, PoolConfig};

/// Result type for the sync client.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors surfaced by the sync client.
#[derive(Debug)]
pub enum ClientError {
    /// Network or IO failure while reading/writing.
    Io(std::io::Error),
    /// Line framing or parse error (malformed or unrecognized reply).
    Protocol,
    /// Server returned an `ERR ...` line.
    Server { message: String },
    /// Server returned `MOVED <shard> <host>:<port>`.
    Moved { shard_id: u32, host: String, port: u16 },
    /// Reply type did not match the expected command response.
    UnexpectedResponse,
    /// Pool is at capacity and no idle connections are available.
    PoolExhausted,
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientError::Io(err) => write!(f, "io error: {err}"),
            ClientError::Protocol => write!(f, "protocol error"),
            ClientError::Server { message } => write!(f, "server error: {message}"),
            ClientError::Moved { shard_id, host, port } => {
                write!(f, "moved: shard {shard_id} is at {host}:{port}")
            }
            ClientError::UnexpectedResponse => write!(f, "unexpected response"),
            ClientError::PoolExhausted => write!(f, "connection pool exhausted"),
        }
    }
}

impl std::error::Error for ClientError {}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        ClientError::Io(err)
    }
}

/// Configuration for the synchronous client and its pool.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Server address, e.g. "127.0.0.1:9000".
    pub addr: String,
    /// Maximum idle connections kept in the pool.
    pub max_idle: usize,
    /// Maximum total connections (idle + in-use).
    pub max_total: usize,
    /// Optional TCP read timeout.
    pub read_timeout: Option<Duration>,
    /// Optional TCP write timeout.
    pub write_timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            addr: "127.0.0.1:9000".to_string(),
            max_idle: 8,
            max_total: 16,
            read_timeout: None,
            write_timeout: None,
        }
    }
}

/// Snapshot of a `STATS` reply, fields in the order the wire emits them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub gets: u64,
    pub puts: u64,
}

/// Synchronous client with connection pooling.
///
/// A facade over the pool and the line codec. Each call acquires a
/// connection, executes one command, and returns the connection to the
/// pool.
pub struct KVClient {
    pool: ConnectionPool,
}

impl KVClient {
    /// Creates a client with default pooling configuration.
    pub fn connect(addr: impl Into<String>) -> ClientResult<Self> {
        let mut config = ClientConfig::default();
        config.addr = addr.into();
        Self::with_config(config)
    }

    /// Creates a client with a custom configuration.
    pub fn with_config(config: ClientConfig) -> ClientResult<Self> {
        let pool = ConnectionPool::new(PoolConfig {
            addr: config.addr,
            max_idle: config.max_idle,
            max_total: config.max_total,
            read_timeout: config.read_timeout,
            write_timeout: config.write_timeout,
        });
        Ok(KVClient { pool })
    }

    /// Fetches a value by key. Returns `Ok(None)` on `NOT_FOUND`.
    pub fn get(&self, key: &str) -> ClientResult<Option<String>> {
        let mut conn = self.pool.acquire()?;
        match conn.exec(&["GET", key])? {
            Reply::Value(value) => Ok(Some(value)),
            Reply::NotFound => Ok(None),
            other => Err(unexpected(other)),
        }
    }

    /// Writes a key with no expiration.
    pub fn put(&self, key: &str, value: &str) -> ClientResult<()> {
        let mut conn = self.pool.acquire()?;
        match conn.exec(&["PUT", key, value])? {
            Reply::Stored => Ok(()),
            other => Err(unexpected(other)),
        }
    }

    /// Writes a key with a TTL in seconds (fractional seconds allowed).
    pub fn put_with_ttl(&self, key: &str, value: &str, ttl_secs: f64) -> ClientResult<()> {
        let ttl = ttl_secs.to_string();
        let mut conn = self.pool.acquire()?;
        match conn.exec(&["PUT", key, value, &ttl])? {
            Reply::Stored => Ok(()),
            other => Err(unexpected(other)),
        }
    }

    /// Deletes a key. Returns whether a live entry was removed.
    pub fn delete(&self, key: &str) -> ClientResult<bool> {
        let mut conn = self.pool.acquire()?;
        match conn.exec(&["DEL", key])? {
            Reply::Deleted => Ok(true),
            Reply::NotFound => Ok(false),
            other => Err(unexpected(other)),
        }
    }

    /// Fetches the node's aggregate counters.
    pub fn stats(&self) -> ClientResult<Stats> {
        let mut conn = self.pool.acquire()?;
        match conn.exec(&["STATS"])? {
            Reply::Stats {
                hits,
                misses,
                evictions,
                gets,
                puts,
            } => Ok(Stats {
                hits,
                misses,
                evictions,
                gets,
                puts,
            }),
            other => Err(unexpected(other)),
        }
    }
}

fn unexpected(reply: Reply) -> ClientError {
    match reply {
        Reply::Moved { shard_id, host, port } => ClientError::Moved { shard_id, host, port },
        Reply::Err(message) => ClientError::Server { message },
        _ => ClientError::UnexpectedResponse,
    }
}
