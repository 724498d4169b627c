//! Text embedding seam.
//!
//! Queries are encoded with `sentence-transformers/all-MiniLM-L6-v2` through
//! fastembed. The [`Embedder`] trait lets the control plane run against any
//! model producing fixed-length vectors.

use std::error::Error;
use std::fmt;
use std::path::PathBuf;
use std::sync::Mutex;

use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};

/// Output dimension of `all-MiniLM-L6-v2`.
pub const MINILM_DIMENSION: usize = 384;

#[derive(Debug)]
pub enum EmbedError {
    ModelInit(String),
    Encode(String),
    DimensionMismatch { expected: usize, actual: usize },
    LockPoisoned,
}

impl fmt::Display for EmbedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ModelInit(message) => {
                write!(f, "failed to initialize embedding model: {message}")
            }
            Self::Encode(message) => write!(f, "failed to encode text: {message}"),
            Self::DimensionMismatch { expected, actual } => {
                write!(f, "embedding dimension mismatch: expected {expected}, got {actual}")
            }
            Self::LockPoisoned => write!(f, "embedding model lock is poisoned"),
        }
    }
}

impl Error for EmbedError {}

/// Encodes text into fixed-length vectors.
///
/// Implementations must be safe to share across threads; the control plane
/// calls them from the blocking pool.
pub trait Embedder: Send + Sync {
    /// Encodes each input text, returning one vector per text in input order.
    ///
    /// # Errors
    /// Returns `EmbedError` if the model fails to encode any of the inputs.
    fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbedError>;

    /// Length of every vector produced by [`Embedder::embed`].
    fn dimension(&self) -> usize;
}

/// fastembed backed `all-MiniLM-L6-v2` embedder.
pub struct FastEmbedder {
    model: Mutex<TextEmbedding>,
}

impl fmt::Debug for FastEmbedder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FastEmbedder")
            .field("model", &"all-MiniLM-L6-v2")
            .finish()
    }
}

impl FastEmbedder {
    /// Loads the model, downloading it into `cache_dir` on first use.
    ///
    /// # Errors
    /// Returns `EmbedError::ModelInit` if the model cannot be loaded.
    pub fn new(cache_dir: Option<PathBuf>) -> Result<Self, EmbedError> {
        let mut options =
            InitOptions::new(EmbeddingModel::AllMiniLML6V2).with_show_download_progress(false);
        if let Some(cache_dir) = cache_dir {
            options = options.with_cache_dir(cache_dir);
        }
        let model =
            TextEmbedding::try_new(options).map_err(|err| EmbedError::ModelInit(err.to_string()))?;
        Ok(Self {
            model: Mutex::new(model),
        })
    }
}

impl Embedder for FastEmbedder {
    fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbedError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let inputs: Vec<String> = texts.iter().map(|&text| text.to_string()).collect();
        let embeddings = self
            .model
            .lock()
            .map_err(|_| EmbedError::LockPoisoned)?
            .embed(inputs, None)
            .map_err(|err| EmbedError::Encode(err.to_string()))?;

        for embedding in &embeddings {
            ensure_dimension(embedding, MINILM_DIMENSION)?;
        }
        Ok(embeddings)
    }

    fn dimension(&self) -> usize {
        MINILM_DIMENSION
    }
}

/// Checks that an embedding has the expected length.
///
/// # Errors
/// Returns `EmbedError::DimensionMismatch` when the lengths differ.
pub fn ensure_dimension(embedding: &[f32], expected: usize) -> Result<(), EmbedError> {
    if embedding.len() == expected {
        Ok(())
    } else {
        Err(EmbedError::DimensionMismatch {
            expected,
            actual: embedding.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dimension_check_reports_both_lengths() {
        assert!(ensure_dimension(&[0.0; 4], 4).is_ok());

        let err = ensure_dimension(&[0.0; 3], 4).expect_err("lengths differ");
        assert_eq!(
            err.to_string(),
            "embedding dimension mismatch: expected 4, got 3"
        );
    }
}
