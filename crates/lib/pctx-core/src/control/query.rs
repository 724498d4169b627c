use surrealdb::Connection;
use tracing::{debug, info, warn};

use super::{ContextControlPlane, ControlError};

impl<C: Connection> ContextControlPlane<C> {
    /// Returns the collection's documents nearest to `query`, nearest first.
    ///
    /// The query text is passed to the model unmodified. An empty collection
    /// or a search without documents yields an empty list.
    ///
    /// # Errors
    /// Returns `ControlError` if encoding the query or searching the store fails.
    pub async fn fetch_context(&self, query: &str) -> Result<Vec<String>, ControlError> {
        info!(collection = self.store.collection(), "processing query: {query}");

        let embedding = self.embed_query(query).await?;
        let result = self.store.query(&[embedding], self.n_results).await?;
        if let Some(distances) = result.distances.first() {
            debug!(?distances, "nearest fragment distances");
        }

        let mut documents = result.into_first_documents();
        documents.truncate(self.n_results);
        if documents.is_empty() {
            warn!("query returned no documents");
        } else {
            info!("query succeeded, returning {} fragments", documents.len());
        }
        Ok(documents)
    }

    async fn embed_query(&self, query: &str) -> Result<Vec<f32>, ControlError> {
        let embedder = self.embedder.clone();
        let query = query.to_string();
        let mut embeddings = tokio::task::spawn_blocking(move || embedder.embed(&[query.as_str()]))
            .await
            .map_err(|err| ControlError::Task(err.to_string()))??;
        if embeddings.is_empty() {
            return Err(ControlError::Task("model returned no embedding".to_string()));
        }
        Ok(embeddings.swap_remove(0))
    }
}
