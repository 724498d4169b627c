//! MCP server runner for prompt-context.

use std::sync::Arc;

use pctx_core::services::CollectionHandle;
use rmcp::serve_server;
use rmcp::transport::io::stdio;
use surrealdb::Connection;
use tracing::info;

use crate::PromptContextMcp;

/// Serves the MCP server over stdio until the client disconnects.
///
/// # Errors
/// Returns any transport or server error.
pub async fn serve_stdio<C: Connection>(
    handle: Arc<CollectionHandle<C>>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let service = PromptContextMcp::with_handle(handle);
    let (stdin, stdout) = stdio();
    let running = serve_server(service, (stdin, stdout)).await?;
    info!("serving MCP over stdio");
    let _ = running.waiting().await?;
    info!("MCP session ended");
    Ok(())
}
