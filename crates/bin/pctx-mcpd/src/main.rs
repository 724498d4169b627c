//! Server entry point for prompt-context.
//!
//! Loads configuration from the command line, opens the collection and the
//! embedding model, and serves the MCP protocol over stdio.

mod config;
mod store;

use std::sync::Arc;

use pctx_core::embedding::FastEmbedder;
use pctx_mcp::server::serve_stdio;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::ServerConfig;
use crate::store::open_collection;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let config = ServerConfig::from_args()?;
    init_logging();

    let embedder = FastEmbedder::new(config.model_cache_dir.clone())?;
    let handle = open_collection(&config, Arc::new(embedder)).await?;

    info!(
        store = %config.store_path.display(),
        collection = %config.collection_name,
        "prompt context server started"
    );
    serve_stdio(Arc::new(handle)).await
}

// Stdout carries the MCP transport, so logs go to stderr.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}
