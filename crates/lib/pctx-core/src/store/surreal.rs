use std::collections::BTreeMap;
use std::{error::Error, fmt, path::Path, sync::Arc};

use pctx_store::models::{FragmentMatch, QueryResult};
use pctx_store::schema::{FIELD_DOCUMENT, FIELD_EMBEDDING};
use surrealdb::{Connection, Surreal};
use surrealdb_types::{SurrealValue, Value};

#[derive(Debug)]
pub enum StoreError {
    Surreal(Box<surrealdb::Error>),
    MissingStore(String),
    MissingCollection(String),
    InvalidInput(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Surreal(err) => write!(f, "SurrealDB error: {err}"),
            Self::MissingStore(path) => write!(f, "vector store directory not found: {path}"),
            Self::MissingCollection(name) => write!(f, "collection does not exist: {name}"),
            Self::InvalidInput(message) => write!(f, "Invalid input: {message}"),
        }
    }
}

impl Error for StoreError {}

impl From<surrealdb::Error> for StoreError {
    fn from(err: surrealdb::Error) -> Self {
        Self::Surreal(Box::new(err))
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Read-only view over one collection table.
pub struct SurrealFragmentStore<C: Connection> {
    db: Arc<Surreal<C>>,
    collection: String,
}

impl<C: Connection> Clone for SurrealFragmentStore<C> {
    fn clone(&self) -> Self {
        Self {
            db: self.db.clone(),
            collection: self.collection.clone(),
        }
    }
}

impl<C: Connection> SurrealFragmentStore<C> {
    /// Binds to `collection` after checking that the table is defined.
    ///
    /// # Errors
    /// Returns `StoreError::MissingCollection` if the table does not exist, or
    /// `StoreError::Surreal` if the database cannot be inspected.
    pub async fn open(db: Arc<Surreal<C>>, collection: &str) -> StoreResult<Self> {
        ensure_non_empty(collection, "collection")?;
        let mut response = db.query("INFO FOR DB;").await?;
        let info: Option<DbInfoRow> = response.take(0)?;
        let defined = info.is_some_and(|info| info.tables.contains_key(collection));
        if !defined {
            return Err(StoreError::MissingCollection(collection.to_string()));
        }
        Ok(Self {
            db,
            collection: collection.to_string(),
        })
    }

    #[must_use]
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Runs a nearest-neighbor search for each embedding, nearest first.
    ///
    /// Ranking uses Euclidean distance. The result holds one entry per
    /// submitted embedding, each with at most `n_results` documents.
    ///
    /// # Errors
    /// Returns `StoreError` if the limit is invalid or the database query fails,
    /// including when stored embeddings cannot be compared with the query.
    pub async fn query(
        &self,
        embeddings: &[Vec<f32>],
        n_results: usize,
    ) -> StoreResult<QueryResult> {
        let limit = limit_to_i64(n_results)?;
        let query = format!(
            "SELECT {FIELD_DOCUMENT}, vector::distance::euclidean({FIELD_EMBEDDING}, $embedding) AS distance FROM type::table($collection) ORDER BY distance ASC LIMIT $limit;"
        );
        let mut result = QueryResult::default();
        for embedding in embeddings {
            let mut response = self
                .db
                .query(query.as_str())
                .bind(("embedding", embedding.clone()))
                .bind(("collection", self.collection.clone()))
                .bind(("limit", limit))
                .await?;
            let matches: Vec<FragmentMatch> = response.take(0)?;
            result.push_matches(matches);
        }
        Ok(result)
    }

    /// Counts the records in the collection.
    ///
    /// # Errors
    /// Returns `StoreError` if the database query fails.
    pub async fn count(&self) -> StoreResult<usize> {
        let query = "SELECT count() AS total FROM type::table($collection) GROUP ALL;";
        let mut response = self
            .db
            .query(query)
            .bind(("collection", self.collection.clone()))
            .await?;
        let rows: Vec<CountRow> = response.take(0)?;
        let total = rows.first().map_or(0, |row| row.total);
        usize::try_from(total).map_err(|_| {
            StoreError::InvalidInput(format!("record count out of range: {total}"))
        })
    }
}

/// Checks that a persistent store directory exists before opening it.
///
/// # Errors
/// Returns `StoreError::MissingStore` if `path` is not an existing directory.
pub fn ensure_store_dir(path: &Path) -> StoreResult<()> {
    if path.is_dir() {
        Ok(())
    } else {
        Err(StoreError::MissingStore(path.display().to_string()))
    }
}

fn ensure_non_empty(value: &str, field: &str) -> StoreResult<()> {
    if value.is_empty() {
        return Err(StoreError::InvalidInput(format!("{field} is required")));
    }
    Ok(())
}

fn limit_to_i64(limit: usize) -> StoreResult<i64> {
    i64::try_from(limit).map_err(|_| {
        StoreError::InvalidInput("limit exceeds supported range".to_string())
    })
}

#[derive(SurrealValue)]
#[surreal(crate = "surrealdb_types")]
struct DbInfoRow {
    #[surreal(default)]
    tables: BTreeMap<String, Value>,
}

#[derive(SurrealValue)]
#[surreal(crate = "surrealdb_types")]
struct CountRow {
    total: i64,
}
