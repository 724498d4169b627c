//! MCP server implementation for prompt-context.
//!
//! This crate wires the collection handle into rmcp tool handlers and exposes
//! the retrieval tool to agents over stdio.

mod helpers;
mod tools;
pub mod server;

use std::sync::Arc;

use pctx_core::control::ContextControlPlane;
use pctx_core::services::CollectionHandle;
use rmcp::{
    ErrorData,
    ServerHandler,
    handler::server::tool::ToolRouter,
    tool,
    tool_handler,
    tool_router,
};
use rmcp::model::{CallToolResult, Content, ServerCapabilities, ServerInfo};
use surrealdb::Connection;

pub use tools::context::{ContextParams, ContextReply};

const SERVER_INSTRUCTIONS: &str = r#"prompt-context retrieves prompt fragments from a local vector collection.

Workflow:
1. Call `get_prompt_context` with a `query` describing the kind of prompt you are looking for.
2. The result is a JSON list of up to 20 fragments, most similar first. An empty list means the
   collection holds nothing close to the query.
3. On failure the result is flagged as an error and carries `{ "error": "<message>" }`.

Notes:
- Queries are embedded with all-MiniLM-L6-v2; keywords and short phrases work best.
- The collection is read-only.
- `health` returns `ok`."#;

/// MCP server wrapper around the collection handle and tool routers.
#[derive(Clone)]
pub struct PromptContextMcp<C: Connection> {
    tool_router: ToolRouter<Self>,
    handle: Arc<CollectionHandle<C>>,
}

impl<C: Connection> PromptContextMcp<C> {
    /// Creates a new server using a handle by value.
    #[must_use]
    pub fn new(handle: CollectionHandle<C>) -> Self {
        Self::with_handle(Arc::new(handle))
    }

    /// Creates a new server using a shared handle.
    #[must_use]
    pub fn with_handle(handle: Arc<CollectionHandle<C>>) -> Self {
        let tool_router = Self::tool_router_core() + Self::tool_router_context();
        Self {
            tool_router,
            handle,
        }
    }

    pub(crate) fn control(&self) -> &ContextControlPlane<C> {
        self.handle.control()
    }
}

#[tool_router(router = tool_router_core, vis = "pub")]
impl<C: Connection> PromptContextMcp<C> {
    #[tool(description = "Health check. Returns 'ok'.")]
    async fn health(&self) -> Result<CallToolResult, ErrorData> {
        Ok(CallToolResult::success(vec![Content::text("ok")]))
    }
}

#[tool_handler]
impl<C: Connection> ServerHandler for PromptContextMcp<C> {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(SERVER_INSTRUCTIONS.to_string()),
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .build(),
            ..Default::default()
        }
    }
}
