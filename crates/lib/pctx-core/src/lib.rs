//! Core types and services for prompt-context.
//!
//! This crate owns the embedding seam, the `SurrealDB` backed fragment store,
//! and the control plane that turns a query string into ranked fragments.

pub mod control;
pub mod embedding;
pub mod services;
pub mod store;
