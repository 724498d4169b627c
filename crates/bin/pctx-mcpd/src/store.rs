use std::sync::Arc;

use pctx_core::embedding::Embedder;
use pctx_core::services::CollectionHandle;
use pctx_core::store::{StoreError, ensure_store_dir};
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, SurrealKv};

use crate::config::ServerConfig;

/// Opens the persistent store and binds the configured collection.
///
/// The store directory must already exist; it is never created here.
pub async fn open_collection(
    config: &ServerConfig,
    embedder: Arc<dyn Embedder>,
) -> Result<CollectionHandle<Db>, StoreError> {
    ensure_store_dir(&config.store_path)?;

    let path = config.store_path.to_string_lossy().into_owned();
    let db = Surreal::new::<SurrealKv>(path).await?;
    db.use_ns(config.db_namespace.as_str())
        .use_db(config.db_name.as_str())
        .await?;

    CollectionHandle::open(db, &config.collection_name, embedder).await
}
