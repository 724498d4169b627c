//! Collection record models and schema helpers for prompt-context.
//!
//! This crate defines the shape of the records a collection holds and the
//! constants shared by the store, the control plane, and the binaries.

pub mod models;
pub mod schema;

pub use models::*;
