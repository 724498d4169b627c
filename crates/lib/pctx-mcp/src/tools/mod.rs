//! MCP tool modules.

pub mod context;
