use std::sync::Arc;

use surrealdb::{Connection, Surreal};
use tracing::info;

use crate::control::ContextControlPlane;
use crate::embedding::Embedder;
use crate::store::{StoreResult, SurrealFragmentStore};

/// Process-wide handle over the opened collection and the query model.
///
/// Built once at startup and shared read-only by every tool call.
pub struct CollectionHandle<C: Connection> {
    store: SurrealFragmentStore<C>,
    control: ContextControlPlane<C>,
}

impl<C: Connection> Clone for CollectionHandle<C> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            control: self.control.clone(),
        }
    }
}

impl<C: Connection> CollectionHandle<C> {
    /// Opens `collection` in an already selected namespace and database.
    ///
    /// # Errors
    /// Returns `StoreError` if the collection is not defined or cannot be read.
    pub async fn open(
        db: Surreal<C>,
        collection: &str,
        embedder: Arc<dyn Embedder>,
    ) -> StoreResult<Self> {
        let store = SurrealFragmentStore::open(Arc::new(db), collection).await?;
        let fragments = store.count().await?;
        info!(
            collection,
            fragments,
            dimension = embedder.dimension(),
            "opened collection"
        );
        let control = ContextControlPlane::new(store.clone(), embedder);
        Ok(Self { store, control })
    }

    #[must_use]
    pub const fn store(&self) -> &SurrealFragmentStore<C> {
        &self.store
    }

    #[must_use]
    pub const fn control(&self) -> &ContextControlPlane<C> {
        &self.control
    }
}
