use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use qdrant_client::qdrant::{
    CreateCollectionBuilder, Distance, PointId, PointStruct, SearchPointsBuilder,
    UpsertPointsBuilder, VectorParamsBuilder, VectorsConfig,
};
use qdrant_client::Qdrant;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::application::ports::{VectorHit, VectorIndex, VectorIndexError};
use crate::domain::{Embedding, VideoId, EMBEDDING_DIM};

/// Qdrant-backed vector index. Points carry only the `video_id` payload;
/// which embeddings belong to which frame is opaque at this level.
///
/// Euclidean distance is monotonic with cosine similarity for the
/// unit-normalized vectors stored here.
pub struct QdrantVectorIndex {
    client: Arc<Qdrant>,
    collection_name: String,
}

impl QdrantVectorIndex {
    pub async fn new(url: &str, collection_name: String) -> Result<Self, VectorIndexError> {
        let client = Qdrant::from_url(url)
            .build()
            .map_err(|e| VectorIndexError::ConnectionFailed(e.to_string()))?;

        Ok(Self {
            client: Arc::new(client),
            collection_name,
        })
    }

    pub fn with_client(client: Arc<Qdrant>, collection_name: String) -> Self {
        Self {
            client,
            collection_name,
        }
    }

    /// Create the collection when missing. Returns `true` when it was
    /// created by this call.
    #[instrument(skip(self), fields(collection = %self.collection_name))]
    pub async fn ensure_collection(&self) -> Result<bool, VectorIndexError> {
        let exists = self
            .client
            .collection_exists(&self.collection_name)
            .await
            .map_err(|e| VectorIndexError::ConnectionFailed(e.to_string()))?;
        if exists {
            return Ok(false);
        }

        let vectors_config = VectorsConfig::from(VectorParamsBuilder::new(
            EMBEDDING_DIM as u64,
            Distance::Euclid,
        ));

        self.client
            .create_collection(
                CreateCollectionBuilder::new(&self.collection_name).vectors_config(vectors_config),
            )
            .await
            .map_err(|e| VectorIndexError::CollectionCreationFailed(e.to_string()))?;

        info!(collection = %self.collection_name, "collection_created");
        Ok(true)
    }
}

#[async_trait]
impl VectorIndex for QdrantVectorIndex {
    #[instrument(skip(self, embedding), fields(collection = %self.collection_name, video_id = %video_id))]
    async fn insert(
        &self,
        embedding: &Embedding,
        video_id: &VideoId,
    ) -> Result<(), VectorIndexError> {
        let mut payload: HashMap<String, serde_json::Value> = HashMap::new();
        payload.insert(
            "video_id".to_string(),
            serde_json::Value::String(video_id.as_str().to_string()),
        );

        let point = PointStruct::new(
            PointId::from(Uuid::new_v4().to_string()),
            embedding.values.clone(),
            payload,
        );

        self.client
            .upsert_points(UpsertPointsBuilder::new(&self.collection_name, vec![point]))
            .await
            .map_err(|e| VectorIndexError::InsertFailed(e.to_string()))?;

        Ok(())
    }

    #[instrument(skip(self, embedding), fields(collection = %self.collection_name, top_k = top_k))]
    async fn search(
        &self,
        embedding: &Embedding,
        top_k: usize,
    ) -> Result<Vec<VectorHit>, VectorIndexError> {
        let response = self
            .client
            .search_points(
                SearchPointsBuilder::new(
                    &self.collection_name,
                    embedding.values.clone(),
                    top_k as u64,
                )
                .with_payload(true),
            )
            .await
            .map_err(|e| VectorIndexError::SearchFailed(e.to_string()))?;

        let hits = response
            .result
            .into_iter()
            .filter_map(|point| {
                let video_id = point.payload.get("video_id")?.as_str()?.to_string();
                // Qdrant reports root Euclidean distance; the port contract
                // is squared distance.
                Some(VectorHit {
                    video_id: VideoId::new(video_id),
                    distance: point.score * point.score,
                })
            })
            .collect();

        Ok(hits)
    }
}
