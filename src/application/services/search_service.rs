use std::collections::HashSet;
use std::sync::Arc;

use crate::application::ports::{
    Embedder, EmbedderError, MetadataStore, RepositoryError, VectorIndex, VectorIndexError,
};
use crate::domain::{Tag, Video, VideoId};

/// Query-time coordinator over the metadata store and the vector index.
///
/// Tag queries are exact-match joins; text queries are embedded and resolved
/// through the index with dedup-by-first-occurrence, so the earliest
/// (closest) hit for each video wins and rank order survives resolution.
pub struct SearchService<M, V>
where
    M: MetadataStore,
    V: VectorIndex,
{
    embedder: Arc<dyn Embedder>,
    metadata_store: Arc<M>,
    vector_index: Arc<V>,
    /// How many raw candidates to pull from the index before dedup.
    candidate_pool: usize,
    /// Distinct videos returned per semantic query.
    max_results: usize,
}

#[derive(Debug, Clone)]
pub enum SearchQuery {
    /// Exact match against stored tag rows.
    Tag(String),
    /// Free text, embedded and matched against the vector index.
    Text(String),
}

#[derive(Debug, Clone)]
pub struct VideoMatch {
    pub video: Video,
    pub tags: Vec<Tag>,
    /// Vector distance for semantic hits; absent for tag matches.
    pub distance: Option<f32>,
}

impl<M, V> SearchService<M, V>
where
    M: MetadataStore,
    V: VectorIndex,
{
    pub fn new(
        embedder: Arc<dyn Embedder>,
        metadata_store: Arc<M>,
        vector_index: Arc<V>,
        candidate_pool: usize,
        max_results: usize,
    ) -> Self {
        Self {
            embedder,
            metadata_store,
            vector_index,
            candidate_pool,
            max_results,
        }
    }

    pub async fn search(&self, query: SearchQuery) -> Result<Vec<VideoMatch>, SearchError> {
        match query {
            SearchQuery::Tag(tag) => self.search_by_tag(&tag).await,
            SearchQuery::Text(text) => self.search_by_text(&text).await,
        }
    }

    /// Zero matches is an empty list, never an error.
    async fn search_by_tag(&self, tag: &str) -> Result<Vec<VideoMatch>, SearchError> {
        let videos = self
            .metadata_store
            .videos_by_tag(tag)
            .await
            .map_err(SearchError::Metadata)?;

        let mut matches = Vec::with_capacity(videos.len());
        for video in videos {
            let tags = self
                .metadata_store
                .tags_for_video(&video.id)
                .await
                .map_err(SearchError::Metadata)?;
            matches.push(VideoMatch {
                video,
                tags,
                distance: None,
            });
        }

        tracing::debug!(tag, results = matches.len(), "Tag search completed");
        Ok(matches)
    }

    async fn search_by_text(&self, text: &str) -> Result<Vec<VideoMatch>, SearchError> {
        let query_embedding = self
            .embedder
            .encode_text(text)
            .await
            .map_err(SearchError::Embedding)?;

        let hits = self
            .vector_index
            .search(&query_embedding, self.candidate_pool)
            .await
            .map_err(SearchError::Index)?;

        // Walk ranked hits keeping the first occurrence per video until
        // enough distinct videos are collected or candidates run out.
        let mut seen: HashSet<VideoId> = HashSet::new();
        let mut matches = Vec::new();

        for hit in hits {
            if matches.len() >= self.max_results {
                break;
            }
            if !seen.insert(hit.video_id.clone()) {
                continue;
            }

            let Some(video) = self
                .metadata_store
                .video_by_id(&hit.video_id)
                .await
                .map_err(SearchError::Metadata)?
            else {
                // The ingestion ordering commits metadata before vectors, so
                // a dangling hit means an out-of-band index write. Skip it.
                tracing::warn!(video_id = %hit.video_id, "Vector hit without metadata row");
                continue;
            };

            let tags = self
                .metadata_store
                .tags_for_video(&video.id)
                .await
                .map_err(SearchError::Metadata)?;

            matches.push(VideoMatch {
                video,
                tags,
                distance: Some(hit.distance),
            });
        }

        tracing::debug!(results = matches.len(), "Semantic search completed");
        Ok(matches)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("embedding: {0}")]
    Embedding(EmbedderError),
    #[error("index: {0}")]
    Index(#[from] VectorIndexError),
    #[error("metadata: {0}")]
    Metadata(RepositoryError),
}
