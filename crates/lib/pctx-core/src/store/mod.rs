//! Store interfaces and `SurrealDB` implementation.
//!
//! The store layer reads fragments from an existing collection; it never
//! writes to it.

pub mod surreal;

pub use surreal::{StoreError, StoreResult, SurrealFragmentStore, ensure_store_dir};
