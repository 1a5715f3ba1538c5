use async_trait::async_trait;

use crate::domain::{Embedding, ImageSource};

/// Maps images and text into the shared 512-dimension unit-vector space.
///
/// Single-text and batch encoding are separate methods so callers can tell a
/// flat vector from a batch of one. Every returned vector has unit L2 norm.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Encode a batch of images. An empty input yields an empty batch, not
    /// an error.
    async fn encode_images(&self, images: Vec<ImageSource>)
        -> Result<Vec<Embedding>, EmbedderError>;

    /// Encode one text into a single flat vector.
    async fn encode_text(&self, text: &str) -> Result<Embedding, EmbedderError>;

    /// Encode several texts into a batch of vectors, one per input.
    async fn encode_text_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>, EmbedderError>;
}

#[derive(Debug, thiserror::Error)]
pub enum EmbedderError {
    #[error("model loading failed: {0}")]
    ModelLoadFailed(String),
    #[error("invalid image input: {0}")]
    InvalidImage(String),
    #[error("inference failed: {0}")]
    InferenceFailed(String),
}
