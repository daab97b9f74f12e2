// shardkv-server - Wire protocol, shard router, and the TCP connection server.
//
// The router (`CacheNode`) and protocol codec are pure and synchronous;
// `server` is the only module that touches tokio, so the dispatch logic is
// unit-testable without a socket.

pub mod protocol;
pub mod router;
pub mod server;

pub use protocol::{Command, ProtocolError, Response};
pub use router::{CacheNode, RouterError};
