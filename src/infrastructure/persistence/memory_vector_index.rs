use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::application::ports::{VectorHit, VectorIndex, VectorIndexError};
use crate::domain::{Embedding, VideoId};

/// Exact brute-force vector index over squared Euclidean distance.
///
/// Used by tests and small single-process deployments; semantics match the
/// Qdrant adapter, including multiple entries per video id.
pub struct InMemoryVectorIndex {
    entries: RwLock<Vec<(VideoId, Embedding)>>,
}

impl InMemoryVectorIndex {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
        }
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

impl Default for InMemoryVectorIndex {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VectorIndex for InMemoryVectorIndex {
    async fn insert(
        &self,
        embedding: &Embedding,
        video_id: &VideoId,
    ) -> Result<(), VectorIndexError> {
        self.entries
            .write()
            .await
            .push((video_id.clone(), embedding.clone()));
        Ok(())
    }

    async fn search(
        &self,
        embedding: &Embedding,
        top_k: usize,
    ) -> Result<Vec<VectorHit>, VectorIndexError> {
        let entries = self.entries.read().await;

        let mut hits: Vec<VectorHit> = entries
            .iter()
            .map(|(video_id, stored)| VectorHit {
                video_id: video_id.clone(),
                distance: embedding.squared_distance(stored),
            })
            .collect();

        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits.truncate(top_k);

        Ok(hits)
    }
}
