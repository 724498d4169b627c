pub const DEFAULT_DB_NAMESPACE: &str = "pctx";
pub const DEFAULT_DB_NAME: &str = "pctx";

pub const FIELD_DOCUMENT: &str = "document";
pub const FIELD_EMBEDDING: &str = "embedding";

/// Number of neighbors requested from a collection per query.
pub const DEFAULT_N_RESULTS: usize = 20;

/// Returns true when `name` can be used as a collection table name.
#[must_use]
pub fn is_valid_collection_name(name: &str) -> bool {
    let trimmed = name.trim();
    !trimmed.is_empty() && trimmed == name
}
