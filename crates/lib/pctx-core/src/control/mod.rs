use std::{error::Error, fmt, sync::Arc};

use pctx_store::schema::DEFAULT_N_RESULTS;
use surrealdb::Connection;

use crate::embedding::{EmbedError, Embedder};
use crate::store::{StoreError, SurrealFragmentStore};

pub mod query;

#[derive(Debug)]
pub enum ControlError {
    Embed(EmbedError),
    Store(StoreError),
    Task(String),
}

impl fmt::Display for ControlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Embed(err) => write!(f, "{err}"),
            Self::Store(err) => write!(f, "{err}"),
            Self::Task(message) => write!(f, "embedding task failed: {message}"),
        }
    }
}

impl Error for ControlError {}

impl From<EmbedError> for ControlError {
    fn from(err: EmbedError) -> Self {
        Self::Embed(err)
    }
}

impl From<StoreError> for ControlError {
    fn from(err: StoreError) -> Self {
        Self::Store(err)
    }
}

/// Query entry point pairing a collection with the model that encodes queries.
pub struct ContextControlPlane<C: Connection> {
    store: SurrealFragmentStore<C>,
    embedder: Arc<dyn Embedder>,
    n_results: usize,
}

impl<C: Connection> Clone for ContextControlPlane<C> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            embedder: self.embedder.clone(),
            n_results: self.n_results,
        }
    }
}

impl<C: Connection> ContextControlPlane<C> {
    #[must_use]
    pub const fn new(store: SurrealFragmentStore<C>, embedder: Arc<dyn Embedder>) -> Self {
        Self {
            store,
            embedder,
            n_results: DEFAULT_N_RESULTS,
        }
    }
}
