// shardkv-client - Synchronous, pooled client for the shardkv line protocol.
//
// Used by the integration test suite in shardkv-server and available as a
// small library for anything that wants to script against a running node
// without hand-rolling the wire format.

mod client;
mod codec;
mod pool;

pub use client::{ClientConfig, ClientError, ClientResult, KVClient, Stats};
pub use codec::Reply;
