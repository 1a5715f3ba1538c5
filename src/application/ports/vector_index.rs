use async_trait::async_trait;

use crate::domain::{Embedding, VideoId};

/// Nearest-neighbor store mapping embeddings to video identifiers.
///
/// The index only knows the foreign key; it never enforces integrity against
/// the metadata store. Insert-and-search only, no update or delete.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    async fn insert(
        &self,
        embedding: &Embedding,
        video_id: &VideoId,
    ) -> Result<(), VectorIndexError>;

    /// Ranked nearest vectors under squared Euclidean distance, closest
    /// first. May contain several hits for the same video.
    async fn search(
        &self,
        embedding: &Embedding,
        top_k: usize,
    ) -> Result<Vec<VectorHit>, VectorIndexError>;
}

#[derive(Debug, Clone)]
pub struct VectorHit {
    pub video_id: VideoId,
    /// Squared Euclidean distance to the query, on every adapter.
    pub distance: f32,
}

#[derive(Debug, thiserror::Error)]
pub enum VectorIndexError {
    #[error("connection failed: {0}")]
    ConnectionFailed(String),
    #[error("collection creation failed: {0}")]
    CollectionCreationFailed(String),
    #[error("insert failed: {0}")]
    InsertFailed(String),
    #[error("search failed: {0}")]
    SearchFailed(String),
}
