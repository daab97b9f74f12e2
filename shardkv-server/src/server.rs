//! # Connection Server
//!
//! Frames newline-delimited lines off a `TcpStream` into a connection-local
//! buffer and hands each complete line to `CacheNode::handle`. A blank line
//! (empty after trimming) is silently skipped here and never reaches the
//! router, matching the framer's own filtering in the original reference
//! server.

use crate::router::CacheNode;
use bytes::BytesMut;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, info, warn};

/// Runs the accept loop forever, spawning one task per connection.
///
/// Returns only on a fatal listener error (the accept call itself failing,
/// not an individual connection's IO error).
pub async fn run(listener: TcpListener, node: Arc<CacheNode>) -> std::io::Result<()> {
    loop {
        let (stream, addr) = listener.accept().await?;
        info!(%addr, "accepted connection");
        let node = Arc::clone(&node);
        tokio::spawn(async move {
            if let Err(err) = handle_connection(stream, node).await {
                warn!(%addr, error = %err, "connection ended with error");
            } else {
                debug!(%addr, "connection closed");
            }
        });
    }
}

/// Reads lines off `stream`, dispatches each to `node`, and writes back the
/// response line. Returns when the peer closes the socket or sends `QUIT`.
async fn handle_connection(stream: TcpStream, node: Arc<CacheNode>) -> std::io::Result<()> {
    let mut stream = stream;
    stream.set_nodelay(true)?;
    let mut buffer = BytesMut::with_capacity(4 * 1024);

    loop {
        let read = stream.read_buf(&mut buffer).await?;
        if read == 0 {
            return Ok(());
        }

        while let Some(pos) = buffer.iter().position(|&b| b == b'\n') {
            let line_bytes = buffer.split_to(pos + 1);
            let line = &line_bytes[..line_bytes.len() - 1];
            let line = strip_trailing_cr(line);
            let line = String::from_utf8_lossy(line);
            let line = line.trim_end();
            if line.is_empty() {
                continue;
            }

            match node.handle(line) {
                Some(response) => {
                    stream.write_all(response.as_bytes()).await?;
                    stream.write_all(b"\n").await?;
                }
                None => return Ok(()),
            }
        }
    }
}

fn strip_trailing_cr(line: &[u8]) -> &[u8] {
    match line.last() {
        Some(b'\r') => &line[..line.len() - 1],
        _ => line,
    }
}
