//! shardkv-server - Distributed sharded KV cache node.

use clap::Parser;
use shardkv_common::config::{ClusterConfig, NodeConfig};
use shardkv_server::{router::CacheNode, server};
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// One node of a distributed, sharded, in-memory KV cache.
#[derive(Parser, Debug)]
#[command(name = "shardkv-server")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the cluster-wide config JSON (shard count, shard->address map).
    #[arg(long)]
    cluster_config: String,

    /// Path to this node's own config JSON (owned shards, capacity, policy).
    #[arg(long)]
    node_config: String,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let cluster = match ClusterConfig::load(&args.cluster_config) {
        Ok(cluster) => cluster,
        Err(err) => {
            tracing::error!(error = %err, "invalid cluster config");
            return ExitCode::FAILURE;
        }
    };

    let node_config = match NodeConfig::load(&args.node_config, &cluster) {
        Ok(node_config) => node_config,
        Err(err) => {
            tracing::error!(error = %err, "invalid node config");
            return ExitCode::FAILURE;
        }
    };

    let host = node_config.host.clone();
    let port = node_config.port;
    let capacity = node_config.capacity;

    let node = match CacheNode::from_config(&cluster, &node_config) {
        Ok(node) => Arc::new(node),
        Err(err) => {
            tracing::error!(error = %err, "failed to build cache node");
            return ExitCode::FAILURE;
        }
    };

    let listener = match tokio::net::TcpListener::bind((host.as_str(), port)).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!(%host, port, error = %err, "could not bind");
            return ExitCode::FAILURE;
        }
    };

    tracing::info!(%host, port, capacity, "shardkv-server listening");

    if let Err(err) = server::run(listener, node).await {
        tracing::error!(error = %err, "server stopped unexpectedly");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
